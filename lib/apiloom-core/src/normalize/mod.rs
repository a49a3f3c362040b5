//! Canonical form of documents.
//!
//! [`normalize`] makes a document deterministic and free of dead weight:
//!
//! - path keys and every component map are sorted;
//! - every schema goes through [`normalize_schema`];
//! - component schemas nothing refers to are removed;
//! - empty component maps are dropped, and the components block with them.
//!
//! Normalizing an already normalized document changes nothing.

mod schema;

pub use self::schema::normalize_schema;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use self::schema::normalize_slot;
use crate::AssemblyError;
use crate::model::{
    ApiResponse, COMPONENTS_SCHEMAS_REF, Components, Document, MediaType, Parameter, PathItem,
    RequestBody, Schema,
};

/// Normalizes a document in place.
///
/// # Errors
///
/// Fails only if the document cannot be serialized to detect unused schemas.
pub fn normalize(doc: &mut Document) -> Result<(), AssemblyError> {
    doc.paths.sort_keys();
    for item in doc.paths.values_mut() {
        normalize_path_item(item);
    }

    if let Some(components) = doc.components.as_mut() {
        normalize_components(components);
    }

    remove_unused_schemas(doc)?;

    if doc
        .components
        .as_ref()
        .is_some_and(Components::is_empty)
    {
        doc.components = None;
    }
    Ok(())
}

fn normalize_path_item(item: &mut PathItem) {
    normalize_parameters(&mut item.parameters);
    for operation in item.operations_mut() {
        normalize_parameters(&mut operation.parameters);
        if let Some(body) = operation.request_body.as_mut() {
            normalize_request_body(body);
        }
        for response in operation.responses.values_mut() {
            normalize_response(response);
        }
    }
}

fn normalize_parameters(parameters: &mut [Parameter]) {
    for schema in parameters
        .iter_mut()
        .filter_map(|param| param.schema.as_mut())
    {
        normalize_slot(schema);
    }
}

fn normalize_content(content: &mut IndexMap<String, MediaType>) {
    for schema in content
        .values_mut()
        .filter_map(|media| media.schema.as_mut())
    {
        normalize_slot(schema);
    }
}

fn normalize_request_body(body: &mut RequestBody) {
    normalize_content(&mut body.content);
}

fn normalize_response(response: &mut ApiResponse) {
    normalize_content(&mut response.content);
}

fn normalize_components(components: &mut Components) {
    for schema in components.schemas.values_mut() {
        normalize_slot(schema);
    }
    for response in components.responses.values_mut() {
        normalize_response(response);
    }
    for parameter in components.parameters.values_mut() {
        if let Some(schema) = parameter.schema.as_mut() {
            normalize_slot(schema);
        }
    }
    for body in components.request_bodies.values_mut() {
        normalize_request_body(body);
    }

    components.schemas.sort_keys();
    components.responses.sort_keys();
    components.parameters.sort_keys();
    components.examples.sort_keys();
    components.request_bodies.sort_keys();
    components.headers.sort_keys();
    components.security_schemes.sort_keys();
    components.links.sort_keys();
    components.callbacks.sort_keys();
}

/// The reference to a component schema, as it appears in serialized JSON.
fn quoted_reference(name: &str) -> Result<String, AssemblyError> {
    let reference = format!("{COMPONENTS_SCHEMAS_REF}{name}");
    Ok(serde_json::to_string(&reference)?)
}

/// Removes the component schemas that cannot be reached from the rest of the
/// document.
///
/// References are found textually in the serialized document. Schemas referenced
/// outside the schema map are roots; a schema is kept when a root reaches it through
/// schema references. Cycles nothing else refers to are removed, self-references
/// included.
fn remove_unused_schemas(doc: &mut Document) -> Result<(), AssemblyError> {
    let Some(components) = doc.components.as_mut() else {
        return Ok(());
    };
    if components.schemas.is_empty() {
        return Ok(());
    }

    let schemas = std::mem::take(&mut components.schemas);
    let outside = serde_json::to_string(&*doc)?;
    let needles = schemas
        .keys()
        .map(|name| Ok((name.as_str(), quoted_reference(name)?)))
        .collect::<Result<Vec<_>, AssemblyError>>()?;

    let mut reachable = needles
        .iter()
        .filter(|(_, needle)| outside.contains(needle.as_str()))
        .map(|(name, _)| *name)
        .collect::<IndexSet<_>>();
    let mut pending = reachable.iter().copied().collect::<Vec<_>>();
    while let Some(name) = pending.pop() {
        let Some(schema) = schemas.get(name) else {
            continue;
        };
        let text = serde_json::to_string(schema)?;
        for (other, needle) in &needles {
            if !reachable.contains(other) && text.contains(needle.as_str()) {
                reachable.insert(*other);
                pending.push(*other);
            }
        }
    }

    let unused = schemas
        .keys()
        .filter(|name| !reachable.contains(name.as_str()))
        .cloned()
        .collect::<Vec<_>>();
    if !unused.is_empty() {
        debug!(?unused, "removing unused schemas");
    }

    let kept = schemas
        .into_iter()
        .filter(|(name, _)| !unused.contains(name))
        .collect::<IndexMap<String, Schema>>();
    doc.components_mut().schemas = kept;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HttpMethod, Info, Operation};
    use serde_json::json;

    fn pets_document() -> Document {
        let list_pets = Operation::with_id("listPets").with_response(
            "200",
            ApiResponse::new("pets").with_content(
                "application/json",
                MediaType::new(Schema::of_type("array").with_items(Schema::reference_to("Pet"))),
            ),
        );
        let mut item = PathItem::default();
        *item.operation_mut(HttpMethod::Get) = Some(list_pets);

        Document::new(Info::new("Pets", "1.0"))
            .with_path("/pets", item)
            .with_path("/health", PathItem::default())
            .with_schema(
                "Pet",
                Schema::of_type("object").with_property("owner", Schema::reference_to("Owner")),
            )
            .with_schema("Owner", Schema::of_type("object"))
            .with_schema("Orphan", Schema::of_type("object"))
    }

    #[test]
    fn should_sort_paths() -> anyhow::Result<()> {
        let mut doc = pets_document();

        normalize(&mut doc)?;

        assert_eq!(doc.paths.keys().collect::<Vec<_>>(), vec!["/health", "/pets"]);
        Ok(())
    }

    #[test]
    fn should_remove_unused_schemas() -> anyhow::Result<()> {
        let mut doc = pets_document();

        normalize(&mut doc)?;

        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert_eq!(schemas.keys().collect::<Vec<_>>(), vec!["Owner", "Pet"]);
        Ok(())
    }

    #[test]
    fn should_remove_schema_chains() -> anyhow::Result<()> {
        let mut doc = Document::new(Info::new("Pets", "1.0"))
            .with_schema("A", Schema::of_type("object").with_property("b", Schema::reference_to("B")))
            .with_schema("B", Schema::of_type("object").with_property("c", Schema::reference_to("C")))
            .with_schema("C", Schema::of_type("object"));

        normalize(&mut doc)?;

        assert_eq!(doc.components, None);
        Ok(())
    }

    #[test]
    fn should_remove_unreachable_cycles() -> anyhow::Result<()> {
        let mut doc = Document::new(Info::new("Tree", "1.0"))
            .with_schema(
                "Node",
                Schema::of_type("object").with_property("parent", Schema::reference_to("Node")),
            )
            .with_schema("A", Schema::of_type("object").with_property("b", Schema::reference_to("B")))
            .with_schema("B", Schema::of_type("object").with_property("a", Schema::reference_to("A")));

        normalize(&mut doc)?;

        assert_eq!(doc.components, None);
        Ok(())
    }

    #[test]
    fn should_keep_reachable_cycles() -> anyhow::Result<()> {
        let mut doc = pets_document()
            .with_schema(
                "Owner",
                Schema::of_type("object")
                    .with_property("friend", Schema::reference_to("Owner"))
                    .with_property("pet", Schema::reference_to("Pet")),
            )
            .with_schema(
                "Node",
                Schema::of_type("object").with_property("parent", Schema::reference_to("Node")),
            );

        normalize(&mut doc)?;

        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert_eq!(schemas.keys().collect::<Vec<_>>(), vec!["Owner", "Pet"]);
        Ok(())
    }

    #[test]
    fn should_keep_other_components() -> anyhow::Result<()> {
        let mut doc = Document::new(Info::new("Pets", "1.0")).with_schema("Orphan", Schema::default());
        let components = doc.components_mut();
        components
            .security_schemes
            .insert("basic".to_string(), json!({ "type": "http", "scheme": "basic" }));
        components
            .examples
            .insert("b".to_string(), json!({ "value": 2 }));
        components
            .examples
            .insert("a".to_string(), json!({ "value": 1 }));

        normalize(&mut doc)?;

        let components = doc.components.as_ref().expect("components");
        assert!(components.schemas.is_empty());
        assert_eq!(components.examples.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(components.security_schemes.contains_key("basic"));
        Ok(())
    }

    #[test]
    fn should_set_object_type_on_empty_schemas() -> anyhow::Result<()> {
        let mut doc = Document::new(Info::new("Pets", "1.0"))
            .with_path(
                "/pets",
                PathItem {
                    post: Some(Operation::with_id("createPet").with_request_body(
                        RequestBody::default().with_content("application/json", MediaType::new(Schema::default())),
                    )),
                    ..PathItem::default()
                },
            );

        normalize(&mut doc)?;

        let schema = doc
            .paths
            .get("/pets")
            .and_then(|item| item.post.as_ref())
            .and_then(|operation| operation.request_body.as_ref())
            .and_then(|body| body.content.get("application/json"))
            .and_then(|media| media.schema.as_ref())
            .expect("request schema");
        assert_eq!(schema, &Schema::of_type("object"));
        Ok(())
    }

    #[test]
    fn should_be_idempotent() -> anyhow::Result<()> {
        let mut doc = pets_document().with_schema(
            "Wrapped",
            Schema::default()
                .with_all_of(Schema::of_type("object").with_property("a", Schema::default())),
        );
        doc.paths
            .get_mut("/health")
            .expect("/health")
            .parameters
            .push(Parameter::new("x-trace", "header", Schema::reference_to("Wrapped")));

        normalize(&mut doc)?;
        let once = doc.clone();
        normalize(&mut doc)?;

        assert_eq!(doc, once);
        Ok(())
    }
}
