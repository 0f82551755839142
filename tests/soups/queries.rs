//! Queries: exact, range, like, all, projections, paging

use crate::common::*;

fn numbers_store() -> SmartStore {
    let store = memory_store();
    store
        .register_soup("numbers", &[IndexSpec::integer("n"), IndexSpec::text("label")])
        .unwrap();
    for n in [5, 1, 7, 3, 9] {
        store
            .create("numbers", &json!({"n": n, "label": format!("n{}", n)}))
            .unwrap();
    }
    store
}

fn ns(docs: &[Value]) -> Vec<i64> {
    docs.iter().map(|d| d["n"].as_i64().unwrap()).collect()
}

#[test]
fn range_is_inclusive_and_ordered() {
    let store = numbers_store();

    let asc = store
        .query_soup("numbers", &QuerySpec::range("n", json!(2), json!(8), Order::Ascending))
        .unwrap();
    assert_eq!(ns(&asc), vec![3, 5, 7]);

    let desc = store
        .query_soup("numbers", &QuerySpec::range("n", json!(3), json!(9), Order::Descending))
        .unwrap();
    assert_eq!(ns(&desc), vec![9, 7, 5, 3]);
}

#[test]
fn empty_range_returns_empty() {
    let store = numbers_store();
    let none = store
        .query_soup("numbers", &QuerySpec::range("n", json!(100), json!(200), Order::Ascending))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn exact_match() {
    let store = numbers_store();
    let hits = store
        .query_soup("numbers", &QuerySpec::exact("label", json!("n7"), Order::Ascending))
        .unwrap();
    assert_eq!(ns(&hits), vec![7]);

    // begin == end collapses to an exact match
    let q = QuerySpec::from_keys("n", json!(3), Some(json!(3)), Order::Ascending);
    assert_eq!(ns(&store.query_soup("numbers", &q).unwrap()), vec![3]);
}

#[test]
fn text_index_compares_lexically() {
    let store = memory_store();
    store
        .register_soup("codes", &[IndexSpec::text("code")])
        .unwrap();
    for code in ["10", "9", "2"] {
        store.create("codes", &json!({ "code": code })).unwrap();
    }
    let hits = store
        .query_soup("codes", &QuerySpec::range("code", json!("1"), json!("3"), Order::Ascending))
        .unwrap();
    assert_eq!(strings_at(&hits, "code"), vec!["10", "2"]);
}

#[test]
fn mismatched_key_type_is_invalid_query() {
    let store = numbers_store();
    assert!(matches!(
        store.query_soup("numbers", &QuerySpec::exact("n", json!("seven"), Order::Ascending)),
        Err(Error::InvalidQuery(_))
    ));
    assert!(matches!(
        store.query_soup("numbers", &QuerySpec::exact("n", json!(null), Order::Ascending)),
        Err(Error::InvalidQuery(_))
    ));
}

#[test]
fn unindexed_path_is_no_such_index() {
    let store = numbers_store();
    assert!(matches!(
        store.query_soup("numbers", &QuerySpec::all("missing", Order::Ascending)),
        Err(Error::NoSuchIndex { .. })
    ));
}

#[test]
fn like_and_all() {
    let store = memory_store();
    seed_people(&store);

    let like = store
        .query_soup(PEOPLE, &QuerySpec::like("name", "%n%", Order::Ascending))
        .unwrap();
    assert_eq!(strings_at(&like, "name"), vec!["Ann"]);

    let all = store
        .query_soup(PEOPLE, &QuerySpec::all("age", Order::Descending))
        .unwrap();
    assert_eq!(strings_at(&all, "name"), vec!["Cy", "Ann", "Bob"]);
}

#[test]
fn documents_without_the_value_never_match() {
    let store = numbers_store();
    store.create("numbers", &json!({"label": "none"})).unwrap();

    let total = store
        .count("numbers", &QuerySpec::range("n", json!(i64::MIN), json!(i64::MAX), Order::Ascending))
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(
        store.count("numbers", &QuerySpec::all("n", Order::Ascending)).unwrap(),
        6
    );
}

#[test]
fn projections_return_flat_objects() {
    let store = memory_store();
    seed_people(&store);

    let spec = QuerySpec::exact("address/city", json!("Rome"), Order::Ascending)
        .with_projections(["name", "address/city", "address/zip"])
        .unwrap();
    let hits = store.query_soup(PEOPLE, &spec).unwrap();
    assert_eq!(
        hits,
        vec![json!({"name": "Bob", "address/city": "Rome", "address/zip": null})]
    );
}

#[test]
fn pages_partition_the_ordered_result() {
    let store = numbers_store();
    let spec = QuerySpec::all("n", Order::Ascending).with_page_size(2);

    let mut pages = Vec::new();
    for index in 0..4 {
        pages.push(ns(&store.query_soup_page("numbers", &spec, index).unwrap()));
    }
    assert_eq!(pages, vec![vec![1, 3], vec![5, 7], vec![9], vec![]]);

    // query_soup returns the first page
    assert_eq!(ns(&store.query_soup("numbers", &spec).unwrap()), vec![1, 3]);
    // count ignores paging
    assert_eq!(store.count("numbers", &spec).unwrap(), 5);
}

#[test]
fn bad_paging_is_invalid_query() {
    let store = numbers_store();
    let zero = QuerySpec::all("n", Order::Ascending).with_page_size(0);
    assert!(matches!(
        store.query_soup("numbers", &zero),
        Err(Error::InvalidQuery(_))
    ));
    let unpaged = QuerySpec::all("n", Order::Ascending);
    assert!(matches!(
        store.query_soup_page("numbers", &unpaged, 1),
        Err(Error::InvalidQuery(_))
    ));
}

#[test]
fn bridge_json_query() {
    let store = memory_store();
    seed_people(&store);

    let spec: QuerySpec = serde_json::from_value(json!({
        "queryType": "range",
        "indexPath": "age",
        "beginKey": 25,
        "endKey": 35,
        "order": "descending",
        "projections": ["name"]
    }))
    .unwrap();
    let hits = store.query_soup(PEOPLE, &spec).unwrap();
    assert_eq!(hits, vec![json!({"name": "Ann"}), json!({"name": "Bob"})]);
}

#[test]
fn corrupt_document_is_reported() {
    let store = memory_store();
    let ids = seed_people(&store);
    store
        .store()
        .execute(
            "UPDATE \"people\" SET soup = ? WHERE id = ?",
            &[smartstore::SqlValue::from("{broken"), smartstore::SqlValue::Integer(ids[1])],
        )
        .unwrap();

    let res = store.query_soup(PEOPLE, &QuerySpec::all("name", Order::Ascending));
    assert!(matches!(res, Err(Error::Corruption { id, .. }) if id == ids[1]));
    assert!(matches!(
        store.retrieve(PEOPLE, ids[1]),
        Err(Error::Corruption { .. })
    ));
    assert!(store.retrieve(PEOPLE, ids[0]).unwrap().is_some());
}

/// The `people` scenario from the store's overview.
#[test]
fn people_scenario() {
    let store = memory_store();
    store
        .register_soup(PEOPLE, &[IndexSpec::text("name"), IndexSpec::integer("age")])
        .unwrap();
    for (name, age) in [("Ann", 30), ("Bob", 25), ("Cy", 40)] {
        store
            .create(PEOPLE, &json!({"name": name, "age": age}))
            .unwrap();
    }

    let spec = QuerySpec::range("age", json!(26), json!(40), Order::Ascending)
        .with_projections(["name"])
        .unwrap();
    assert_eq!(
        store.query_soup(PEOPLE, &spec).unwrap(),
        vec![json!({"name": "Ann"}), json!({"name": "Cy"})]
    );
}

#[test]
fn people_name_range() {
    let store = memory_store();
    store
        .register_soup(PEOPLE, &[IndexSpec::text("name")])
        .unwrap();
    store
        .create(PEOPLE, &json!({"name": "Ann", "age": 30}))
        .unwrap();
    store
        .create(PEOPLE, &json!({"name": "Bob", "age": 25}))
        .unwrap();

    let spec = QuerySpec::from_keys("name", json!("Ann"), Some(json!("Bob")), Order::Ascending);
    assert_eq!(
        store.query_soup(PEOPLE, &spec).unwrap(),
        vec![
            json!({"name": "Ann", "age": 30}),
            json!({"name": "Bob", "age": 25})
        ]
    );
}
