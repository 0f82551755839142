//! Concurrent document writes and queries

use crate::common::*;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;
const PER_THREAD: usize = 50;

#[test]
fn concurrent_creates_get_distinct_ids() {
    let test = TestStore::new();
    test.register_soup("events", &[IndexSpec::integer("thread")])
        .unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&test.store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..PER_THREAD)
                    .map(|i| {
                        store
                            .create("events", &json!({"thread": t, "seq": i}))
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "duplicate id {}", id);
        }
    }
    assert_eq!(ids.len(), THREADS * PER_THREAD);

    for t in 0..THREADS {
        let count = test
            .count("events", &QuerySpec::exact("thread", json!(t), Order::Ascending))
            .unwrap();
        assert_eq!(count, PER_THREAD);
    }
}

#[test]
fn readers_never_see_half_written_batches() {
    let test = TestStore::new();
    test.register_soup("pairs", &[IndexSpec::integer("round")])
        .unwrap();
    let barrier = Arc::new(Barrier::new(3));

    let writer = {
        let store = Arc::clone(&test.store);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for round in 0..100 {
                store
                    .batch(
                        "pairs",
                        &[
                            BatchOp::Create { doc: json!({"round": round, "half": 0}) },
                            BatchOp::Create { doc: json!({"round": round, "half": 1}) },
                        ],
                    )
                    .unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let store = Arc::clone(&test.store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..100 {
                    let total = store
                        .count("pairs", &QuerySpec::all("round", Order::Ascending))
                        .unwrap();
                    assert_eq!(total % 2, 0, "saw a partial batch");
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(
        test.count("pairs", &QuerySpec::all("round", Order::Ascending))
            .unwrap(),
        200
    );
}

#[test]
fn concurrent_upserts_on_distinct_keys() {
    let store = Arc::new(memory_store());
    store.register_soup(PEOPLE, &people_specs()).unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for age in 0..20 {
                    store
                        .upsert(PEOPLE, &person(&format!("p{}", t), age, "Oslo"), "name")
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let all = store
        .query_soup(PEOPLE, &QuerySpec::all("name", Order::Ascending))
        .unwrap();
    assert_eq!(all.len(), THREADS);
    assert!(all.iter().all(|d| d["age"] == json!(19)));
}
