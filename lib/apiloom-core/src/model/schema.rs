use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix of every reference pointing into `components/schemas`.
pub const COMPONENTS_SCHEMAS_REF: &str = "#/components/schemas/";

/// The `type` keyword of a schema.
///
/// OpenAPI 3.0 only allows a single type name, OpenAPI 3.1 also accepts an array
/// (e.g. `["string", "null"]` as emitted by utoipa for optional values).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// A single type name such as `object` or `string`.
    Single(String),
    /// A list of type names.
    Multiple(Vec<String>),
}

impl SchemaType {
    /// The `object` type.
    #[must_use]
    pub fn object() -> Self {
        Self::Single("object".to_string())
    }
}

impl From<&str> for SchemaType {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

/// A recursive schema node.
///
/// Only the keywords the engine reasons about are modelled as fields; every other
/// keyword (`format`, `enum`, `oneOf`, `nullable`, `x-*` extensions, ...) is kept
/// verbatim in [`Schema::extensions`].
///
/// `$ref` is kept as a plain string and never dereferenced, so cyclic schema graphs
/// need no special care.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The schema's own name, assigned when it is registered as a component.
    ///
    /// Not part of the serialized form.
    #[serde(skip)]
    pub name: Option<String>,

    /// `$ref`
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// `type`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    /// `title`
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::scalar::optional_text")]
    pub title: Option<String>,

    /// `description`
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::scalar::optional_text")]
    pub description: Option<String>,

    /// `default`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// `properties`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,

    /// `required`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// `allOf`
    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,

    /// `items`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    /// Every other keyword.
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Schema {
    /// Creates a schema with the given `type`.
    #[must_use]
    pub fn of_type(schema_type: impl Into<SchemaType>) -> Self {
        Self {
            schema_type: Some(schema_type.into()),
            ..Self::default()
        }
    }

    /// Creates a `$ref` schema pointing at the named component schema.
    #[must_use]
    pub fn reference_to(schema_name: &str) -> Self {
        Self {
            reference: Some(format!("{COMPONENTS_SCHEMAS_REF}{schema_name}")),
            ..Self::default()
        }
    }

    /// Adds a property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, schema: Self) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Marks a property as required.
    #[must_use]
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Appends an `allOf` entry.
    #[must_use]
    pub fn with_all_of(mut self, schema: Self) -> Self {
        self.all_of.push(schema);
        self
    }

    /// Sets the `items` schema.
    #[must_use]
    pub fn with_items(mut self, items: Self) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Returns `true` when this schema carries a non-empty `$ref`.
    #[must_use]
    pub fn has_reference(&self) -> bool {
        self.reference.as_deref().is_some_and(|reference| !reference.is_empty())
    }

    /// Returns `true` when no keyword at all is set (`{}`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reference.is_none()
            && self.schema_type.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.default.is_none()
            && self.properties.is_empty()
            && self.required.is_empty()
            && self.all_of.is_empty()
            && self.items.is_none()
            && self.extensions.is_empty()
    }

    /// Returns `true` when nothing but `allOf`, `default` and `type` is set.
    ///
    /// Such a schema is a pure wrapper around its `allOf` entries.
    #[must_use]
    pub(crate) fn is_wrapper_only(&self) -> bool {
        self.reference.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.properties.is_empty()
            && self.required.is_empty()
            && self.items.is_none()
            && self.extensions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_keep_unknown_keywords() {
        let input = json!({
            "type": "string",
            "format": "uuid",
            "x-internal": true
        });

        let schema: Schema = serde_json::from_value(input.clone()).expect("valid schema");

        assert_eq!(schema.schema_type, Some(SchemaType::from("string")));
        assert_eq!(schema.extensions.get("format"), Some(&json!("uuid")));
        assert_eq!(serde_json::to_value(&schema).expect("serialize"), input);
    }

    #[test]
    fn should_accept_type_arrays() {
        let schema: Schema =
            serde_json::from_value(json!({ "type": ["string", "null"] })).expect("valid schema");

        assert_eq!(
            schema.schema_type,
            Some(SchemaType::Multiple(vec![
                "string".to_string(),
                "null".to_string()
            ]))
        );
    }

    #[test]
    fn should_not_serialize_name() {
        let schema = Schema {
            name: Some("Pet".to_string()),
            ..Schema::of_type("object")
        };

        let value = serde_json::to_value(&schema).expect("serialize");

        assert_eq!(value, json!({ "type": "object" }));
    }

    #[test]
    fn should_detect_empty_schema() {
        assert!(Schema::default().is_empty());
        assert!(!Schema::of_type("object").is_empty());
        assert!(!Schema::reference_to("Pet").is_empty());
    }

    #[test]
    fn should_build_reference() {
        let schema = Schema::reference_to("Pet");

        assert_eq!(schema.reference.as_deref(), Some("#/components/schemas/Pet"));
        assert!(schema.has_reference());
    }
}
