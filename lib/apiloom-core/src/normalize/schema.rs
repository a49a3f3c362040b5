use crate::model::{Schema, SchemaType};

/// Normalizes a schema tree.
///
/// Every nested schema (`properties`, `items`, `allOf` entries) is normalized first.
/// Then the `allOf` list of the node itself is simplified:
///
/// - a single entry wrapped by an otherwise empty node replaces the node, provided
///   the node's `default` and `type` do not contradict the entry: the replacement is
///   returned and the caller substitutes it;
/// - with several entries, `$ref` entries are moved first (keeping the relative
///   order of each kind) and a non-`$ref` entry repeating the node's `description`
///   or `default` loses its copy.
///
/// `$ref` values are plain strings here; they are never followed.
pub fn normalize_schema(schema: &mut Schema) -> Option<Schema> {
    for property in schema.properties.values_mut() {
        normalize_slot(property);
    }
    if let Some(items) = schema.items.as_deref_mut() {
        normalize_slot(items);
    }
    for entry in &mut schema.all_of {
        normalize_entry(entry);
    }

    match schema.all_of.len() {
        0 => None,
        1 => collapse_single(schema),
        _ => {
            reorder_entries(schema);
            None
        }
    }
}

/// Normalizes a schema in place, substituting the replacement if any.
pub(crate) fn normalize_entry(schema: &mut Schema) {
    if let Some(replacement) = normalize_schema(schema) {
        *schema = replacement;
    }
}

/// Normalizes a schema slot (component, property, parameter or media type schema).
///
/// A slot left completely empty becomes `type: object`.
pub(crate) fn normalize_slot(schema: &mut Schema) {
    normalize_entry(schema);
    if schema.is_empty() {
        schema.schema_type = Some(SchemaType::object());
    }
}

fn collapse_single(schema: &mut Schema) -> Option<Schema> {
    if !schema.is_wrapper_only() {
        return None;
    }
    let entry = schema.all_of.first()?;

    let same_default = schema.default.is_none() || schema.default == entry.default;
    let same_type = schema.schema_type.is_none()
        || entry.schema_type.is_none()
        || schema.schema_type == entry.schema_type;
    if same_default && same_type {
        schema.all_of.pop()
    } else {
        None
    }
}

fn reorder_entries(schema: &mut Schema) {
    let entries = std::mem::take(&mut schema.all_of);
    let (mut references, others): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(Schema::has_reference);

    for mut entry in others {
        if entry.description.is_some() && entry.description == schema.description {
            entry.description = None;
        }
        if entry.default.is_some() && entry.default == schema.default {
            entry.default = None;
        }
        references.push(entry);
    }
    schema.all_of = references;
}
