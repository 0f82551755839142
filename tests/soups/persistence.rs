//! On-disk stores: config file, reopen

use crate::common::*;

#[test]
fn schema_and_documents_survive_reopen() {
    let test = TestStore::new();
    let ids = seed_people(&test);

    let test = test.reopen();
    assert_eq!(test.soup_names().unwrap(), vec![PEOPLE]);
    assert_eq!(test.index_specs(PEOPLE).unwrap(), people_specs());
    assert_eq!(
        test.retrieve(PEOPLE, ids[1]).unwrap(),
        Some(person("Bob", 25, "Rome"))
    );

    // ids keep increasing across reopen
    let next = test.create(PEOPLE, &person("Dee", 20, "Rome")).unwrap();
    assert!(ids.iter().all(|id| *id < next));
}

#[test]
fn dropped_soup_stays_dropped() {
    let test = TestStore::new();
    seed_people(&test);
    test.drop_soup(PEOPLE).unwrap();

    let test = test.reopen();
    assert!(!test.has_soup(PEOPLE).unwrap());
    assert!(!test.store().table_exists(PEOPLE).unwrap());
}

#[test]
fn config_file_is_written_and_honored() {
    let test = TestStore::with_config(StoreConfig {
        cache_catalog: false,
        journal_mode: smartstore::JournalMode::Delete,
        busy_timeout_ms: 1_000,
    });
    let text = std::fs::read_to_string(test.path().join("smartstore.toml")).unwrap();
    assert!(text.contains("journal_mode = \"delete\""));

    let test = test.reopen();
    assert!(!test.config().cache_catalog);
    assert_eq!(test.config().busy_timeout_ms, 1_000);
}

#[test]
fn uncached_and_cached_stores_agree() {
    for cfg in cache_configs() {
        let test = TestStore::with_config(cfg);
        let ids = seed_people(&test);
        let hits = test
            .query_soup(
                PEOPLE,
                &QuerySpec::exact("address/city", json!("Oslo"), Order::Descending),
            )
            .unwrap();
        assert_eq!(strings_at(&hits, "name"), vec!["Cy", "Ann"]);
        assert_eq!(test.retrieve_many(PEOPLE, &ids).unwrap().len(), 3);
    }
}
