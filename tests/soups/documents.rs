//! Document lifecycle through the facade

use crate::common::*;

#[test]
fn create_retrieve_round_trip() {
    let store = memory_store();
    store.register_soup(PEOPLE, &people_specs()).unwrap();

    let doc = json!({
        "name": "Ann",
        "age": 30,
        "address": {"city": "Oslo", "zip": "0150"},
        "tags": ["x", {"deep": [1, 2.5, null]}],
        "active": true,
        "note": null
    });
    let id = store.create(PEOPLE, &doc).unwrap();
    assert_eq!(store.retrieve(PEOPLE, id).unwrap(), Some(doc));
}

#[test]
fn index_columns_track_the_latest_write() {
    let store = memory_store();
    let ids = seed_people(&store);

    store
        .update(PEOPLE, &person("Ann", 31, "Bergen"), ids[0])
        .unwrap();

    let oslo = store
        .query_soup(PEOPLE, &QuerySpec::exact("address/city", json!("Oslo"), Order::Ascending))
        .unwrap();
    assert_eq!(strings_at(&oslo, "name"), vec!["Cy"]);

    let bergen = store
        .query_soup(PEOPLE, &QuerySpec::exact("address/city", json!("Bergen"), Order::Ascending))
        .unwrap();
    assert_eq!(bergen, vec![person("Ann", 31, "Bergen")]);

    let thirty = store
        .count(PEOPLE, &QuerySpec::exact("age", json!(30), Order::Ascending))
        .unwrap();
    assert_eq!(thirty, 0);
}

#[test]
fn update_missing_id_reports_false() {
    let store = memory_store();
    seed_people(&store);
    assert!(!store.update(PEOPLE, &person("X", 1, "Y"), 9_999).unwrap());
}

#[test]
fn delete_is_idempotent() {
    let store = memory_store();
    let ids = seed_people(&store);

    store.delete(PEOPLE, ids[1]).unwrap();
    store.delete(PEOPLE, ids[1]).unwrap();
    store.delete(PEOPLE, 9_999).unwrap();

    assert_eq!(store.retrieve(PEOPLE, ids[1]).unwrap(), None);
    let all = store
        .query_soup(PEOPLE, &QuerySpec::all("name", Order::Ascending))
        .unwrap();
    assert_eq!(strings_at(&all, "name"), vec!["Ann", "Cy"]);
}

#[test]
fn retrieve_many_returns_found_documents_in_id_order() {
    let store = memory_store();
    let ids = seed_people(&store);
    let docs = store
        .retrieve_many(PEOPLE, &[ids[2], 12_345, ids[0]])
        .unwrap();
    assert_eq!(strings_at(&docs, "name"), vec!["Ann", "Cy"]);
}

#[test]
fn upsert_by_external_id() {
    let store = memory_store();
    seed_people(&store);

    let id = store
        .upsert(PEOPLE, &person("Dee", 50, "Rome"), "name")
        .unwrap();
    let same = store
        .upsert(PEOPLE, &person("Dee", 51, "Rome"), "name")
        .unwrap();
    assert_eq!(id, same);
    assert_eq!(
        store.retrieve(PEOPLE, id).unwrap(),
        Some(person("Dee", 51, "Rome"))
    );

    assert!(matches!(
        store.upsert(PEOPLE, &person("Eve", 1, "Oslo"), "address/city"),
        Err(Error::AmbiguousMatch { count: 2, .. })
    ));
    assert!(matches!(
        store.upsert(PEOPLE, &person("Eve", 1, "Oslo"), "address/zip"),
        Err(Error::NoSuchIndex { .. })
    ));
}

#[test]
fn non_object_documents_are_rejected() {
    let store = memory_store();
    seed_people(&store);
    for doc in [json!(null), json!(1), json!("Ann"), json!([person("Ann", 1, "x")])] {
        assert!(matches!(
            store.create(PEOPLE, &doc),
            Err(Error::InvalidInput(_))
        ));
    }
}

#[test]
fn documents_of_other_soups_are_invisible() {
    let store = memory_store();
    let ids = seed_people(&store);
    store
        .register_soup("pets", &[IndexSpec::text("name")])
        .unwrap();
    let pet = store.create("pets", &json!({"name": "Rex"})).unwrap();

    assert_eq!(pet, ids[0]);
    assert_eq!(
        store.retrieve("pets", pet).unwrap(),
        Some(json!({"name": "Rex"}))
    );
    assert_eq!(
        store.retrieve(PEOPLE, ids[0]).unwrap(),
        Some(person("Ann", 30, "Oslo"))
    );
}

#[test]
fn unregistered_soup_operations_fail() {
    let store = memory_store();
    assert!(matches!(
        store.create("ghosts", &json!({})),
        Err(Error::NoSuchSoup(_))
    ));
    assert!(matches!(
        store.delete("ghosts", 1),
        Err(Error::NoSuchSoup(_))
    ));
}
