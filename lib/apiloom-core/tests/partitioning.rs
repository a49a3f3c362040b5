#![allow(missing_docs)]

use apiloom_core::GroupConfig;
use apiloom_core::merge::merge_endpoint_records;
use apiloom_core::model::Schema;
use apiloom_core::partition::{OutputKey, partition};
use indexmap::IndexMap;
use rstest::rstest;

mod common;
use common::{base_document, get, operation_ids};

fn key(group: Option<&str>, version: Option<&str>) -> OutputKey {
    OutputKey::new(group.map(ToString::to_string), version.map(ToString::to_string))
}

#[rstest]
#[case::unversioned(None)]
#[case::versioned(Some("v1"))]
fn should_put_record_in_each_of_its_groups(#[case] version: Option<&str>) {
    common::init_tracing();
    let mut record = get("/users", "listUsers").in_group("g1").in_group("g2");
    record.version = version.map(ToString::to_string);
    let records = [record, get("/other", "other").in_group("g3")];

    let outputs = partition(base_document(), &records, &IndexMap::new());

    for group in ["g1", "g2"] {
        let output = outputs.get(&key(Some(group), version)).expect("group output");
        assert!(operation_ids(&output.document).contains(&"listUsers".to_string()));
    }
    let other = outputs.get(&key(Some("g3"), None)).expect("g3 output");
    assert!(!operation_ids(&other.document).contains(&"listUsers".to_string()));
    assert_eq!(outputs.len(), 3);
}

#[test]
fn should_never_add_excluded_record() {
    common::init_tracing();
    let records = [
        get("/users", "listUsers").in_group("g").excluded_from("g").in_group("h"),
        get("/pets", "listPets").in_group("g"),
        get("/health-check", "healthCheck").excluded_from("g"),
    ];

    let outputs = partition(base_document(), &records, &IndexMap::new());

    let group = outputs.get(&key(Some("g"), None)).expect("g output");
    assert_eq!(operation_ids(&group.document), vec!["listPets"]);
    let other = outputs.get(&key(Some("h"), None)).expect("h output");
    assert_eq!(operation_ids(&other.document), vec!["listUsers", "healthCheck"]);
}

#[test]
fn should_fan_out_common_records_except_common_excluded_groups() {
    common::init_tracing();
    let groups = IndexMap::from([
        ("public".to_string(), GroupConfig::new("public")),
        (
            "internal".to_string(),
            GroupConfig::new("internal").with_common_exclude(true),
        ),
    ]);
    let records = [
        get("/pets", "listPets").in_group("public").with_version("v1"),
        get("/pets", "listPetsV2").in_group("public").with_version("v2"),
        get("/metrics", "metrics").in_group("internal"),
        get("/ping", "ping"),
    ];

    let outputs = partition(base_document(), &records, &groups);

    assert_eq!(
        outputs.keys().cloned().collect::<Vec<_>>(),
        vec![
            key(Some("public"), Some("v1")),
            key(Some("public"), Some("v2")),
            key(Some("internal"), None),
        ]
    );
    for version in ["v1", "v2"] {
        let output = outputs
            .get(&key(Some("public"), Some(version)))
            .expect("public output");
        assert!(operation_ids(&output.document).contains(&"ping".to_string()));
    }
    let internal = outputs.get(&key(Some("internal"), None)).expect("internal output");
    assert_eq!(operation_ids(&internal.document), vec!["metrics"]);
}

#[test]
fn should_copy_metadata_into_independent_documents() {
    common::init_tracing();
    let mut unified = base_document().with_schema("Pet", Schema::of_type("object"));
    let records = [
        get("/pets", "listPets").in_group("a"),
        get("/owners", "listOwners").in_group("b"),
    ];
    merge_endpoint_records(&mut unified, &records);

    let mut outputs = partition(unified, &records, &IndexMap::new()).into_iter();
    let mut first = outputs.next().expect("first output");
    let second = outputs.next().expect("second output");
    first
        .document
        .components_mut()
        .schemas
        .insert("Extra".to_string(), Schema::default());

    assert_eq!(first.document.info, second.document.info);
    assert_eq!(operation_ids(&first.document), vec!["listPets"]);
    assert_eq!(operation_ids(&second.document), vec!["listOwners"]);
    let second_schemas = &second.document.components.as_ref().expect("components").schemas;
    assert_eq!(second_schemas.keys().collect::<Vec<_>>(), vec!["Pet"]);
}
