//! Batch writes: ordering, results, atomicity

use crate::common::*;
use std::sync::Arc;

#[test]
fn batch_results_line_up_with_ops() {
    let store = memory_store();
    let ids = seed_people(&store);

    let results = store
        .batch(
            PEOPLE,
            &[
                BatchOp::Create { doc: person("Dee", 20, "Rome") },
                BatchOp::Update { id: ids[0], doc: person("Ann", 33, "Oslo") },
                BatchOp::Update { id: 777, doc: person("Nobody", 0, "-") },
                BatchOp::Upsert {
                    doc: person("Bob", 26, "Rome"),
                    external_id_path: "name".to_string(),
                },
                BatchOp::Delete { id: ids[2] },
            ],
        )
        .unwrap();

    assert!(matches!(results[0], BatchResult::Created { .. }));
    assert_eq!(results[1], BatchResult::Updated { found: true });
    assert_eq!(results[2], BatchResult::Updated { found: false });
    assert_eq!(results[3], BatchResult::Upserted { id: ids[1] });
    assert_eq!(results[4], BatchResult::Deleted);

    let all = store
        .query_soup(PEOPLE, &QuerySpec::all("age", Order::Ascending))
        .unwrap();
    assert_eq!(strings_at(&all, "name"), vec!["Dee", "Bob", "Ann"]);
}

#[test]
fn later_ops_see_earlier_ones() {
    let store = memory_store();
    seed_people(&store);
    let results = store
        .batch(
            PEOPLE,
            &[
                BatchOp::Upsert {
                    doc: person("Zed", 1, "Ulm"),
                    external_id_path: "name".to_string(),
                },
                BatchOp::Upsert {
                    doc: person("Zed", 2, "Ulm"),
                    external_id_path: "name".to_string(),
                },
            ],
        )
        .unwrap();
    assert_eq!(results[0], results[1]);
}

#[test]
fn failed_batch_leaves_no_trace() {
    let store = memory_store();
    let ids = seed_people(&store);
    let before = store
        .query_soup(PEOPLE, &QuerySpec::all("name", Order::Ascending))
        .unwrap();

    let res = store.batch(
        PEOPLE,
        &[
            BatchOp::Create { doc: person("Dee", 20, "Rome") },
            BatchOp::Delete { id: ids[0] },
            BatchOp::Upsert {
                doc: person("Eve", 1, "Oslo"),
                external_id_path: "address/city".to_string(),
            },
        ],
    );
    assert!(matches!(res, Err(Error::AmbiguousMatch { .. })));

    let after = store
        .query_soup(PEOPLE, &QuerySpec::all("name", Order::Ascending))
        .unwrap();
    assert_eq!(before, after);
}

#[test]
fn storage_failure_mid_batch_rolls_back() {
    use smartstore::SqliteStore;
    use smartstore_storage::testing::{FaultPoint, FaultyStore};

    let faulty = Arc::new(FaultyStore::new(SqliteStore::open_in_memory().unwrap()));
    let store = SmartStore::with_store(faulty.clone(), StoreConfig::default()).unwrap();
    seed_people(&store);

    faulty.arm(FaultPoint::Delete("\"people\"".to_string()));
    let res = store.batch(
        PEOPLE,
        &[
            BatchOp::Create { doc: person("Dee", 20, "Rome") },
            BatchOp::Delete { id: 1 },
        ],
    );
    assert!(matches!(res, Err(Error::StorageError(_))));
    assert_eq!(
        store
            .count(PEOPLE, &QuerySpec::all("name", Order::Ascending))
            .unwrap(),
        3
    );
}

#[test]
fn empty_batch_is_fine() {
    let store = memory_store();
    seed_people(&store);
    assert!(store.batch(PEOPLE, &[]).unwrap().is_empty());
}
