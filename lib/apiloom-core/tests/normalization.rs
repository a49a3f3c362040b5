#![allow(missing_docs)]

use apiloom_core::model::{
    ApiResponse, Document, HttpMethod, Info, MediaType, Operation, PathItem, Schema,
};
use apiloom_core::{normalize, normalize_schema};
use rstest::{fixture, rstest};

mod common;

#[fixture]
fn document() -> Document {
    common::init_tracing();
    let show_pet = Operation::with_id("showPet").with_response(
        "200",
        ApiResponse::new("a pet").with_content(
            "application/json",
            MediaType::new(Schema::default().with_all_of(Schema::reference_to("Pet"))),
        ),
    );
    let mut item = PathItem::default();
    *item.operation_mut(HttpMethod::Get) = Some(show_pet);

    Document::new(Info::new("Pet Store", "1.0"))
        .with_path("/pets/{id}", item)
        .with_path("/owners", PathItem::default())
        .with_schema(
            "Pet",
            Schema::of_type("object")
                .with_description("A pet")
                .with_all_of(Schema::of_type("object").with_property("name", Schema::of_type("string")))
                .with_all_of(Schema::reference_to("Animal"))
                .with_all_of(Schema::of_type("object").with_description("A pet")),
        )
        .with_schema("Animal", Schema::of_type("object"))
        .with_schema("Orphan", Schema::of_type("object"))
}

#[rstest]
fn should_be_idempotent(mut document: Document) -> anyhow::Result<()> {
    normalize(&mut document)?;
    let once = document.clone();

    normalize(&mut document)?;

    assert_eq!(document, once);
    Ok(())
}

#[rstest]
fn should_prune_orphans_and_keep_referenced(mut document: Document) -> anyhow::Result<()> {
    normalize(&mut document)?;

    let schemas = &document.components.as_ref().expect("components").schemas;
    assert_eq!(schemas.keys().collect::<Vec<_>>(), vec!["Animal", "Pet"]);
    Ok(())
}

#[rstest]
fn should_sort_paths_and_unwrap_single_references(mut document: Document) -> anyhow::Result<()> {
    normalize(&mut document)?;

    assert_eq!(
        document.paths.keys().collect::<Vec<_>>(),
        vec!["/owners", "/pets/{id}"]
    );
    let schema = document
        .paths
        .get("/pets/{id}")
        .and_then(|item| item.get.as_ref())
        .and_then(|operation| operation.responses.get("200"))
        .and_then(|response| response.content.get("application/json"))
        .and_then(|media| media.schema.as_ref())
        .expect("response schema");
    assert_eq!(schema, &Schema::reference_to("Pet"));
    Ok(())
}

#[rstest]
fn should_order_references_first_and_drop_repeated_description(
    mut document: Document,
) -> anyhow::Result<()> {
    normalize(&mut document)?;

    let pet = document
        .components
        .as_ref()
        .and_then(|components| components.schemas.get("Pet"))
        .expect("Pet schema");
    let all_of = &pet.all_of;
    assert_eq!(all_of.len(), 3);
    assert_eq!(all_of.first(), Some(&Schema::reference_to("Animal")));
    assert_eq!(all_of.get(2), Some(&Schema::of_type("object")));
    assert_eq!(pet.description.as_deref(), Some("A pet"));
    Ok(())
}

#[test]
fn should_collapse_single_entry_wrapper() {
    let inner = Schema::of_type("object").with_property("a", Schema::of_type("integer"));
    let mut wrapper = Schema::default().with_all_of(inner.clone());

    assert_eq!(normalize_schema(&mut wrapper), Some(inner));
}

#[test]
fn should_keep_relative_order_of_each_kind() {
    let first = Schema::of_type("object").with_description("X");
    let second = Schema::reference_to("Y");
    let third = Schema::of_type("object").with_description("Z");
    let fourth = Schema::reference_to("W");
    let mut schema = Schema::default()
        .with_all_of(first.clone())
        .with_all_of(second.clone())
        .with_all_of(third.clone())
        .with_all_of(fourth.clone());

    normalize_schema(&mut schema);

    assert_eq!(schema.all_of, vec![second, fourth, first, third]);
}
