use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::path::{ApiResponse, Parameter, PathItem, RequestBody};
use super::schema::Schema;

/// A security requirement: scheme name to required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// `title`
    #[serde(default, deserialize_with = "super::scalar::text")]
    pub title: String,
    /// `version`
    #[serde(default, deserialize_with = "super::scalar::text")]
    pub version: String,
    /// `description`
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::scalar::optional_text")]
    pub description: Option<String>,

    /// `contact`, `license`, `x-*`, ...
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Info {
    /// Creates the document metadata.
    #[must_use]
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            ..Self::default()
        }
    }
}

/// A tag declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// `name`
    #[serde(deserialize_with = "super::scalar::text")]
    pub name: String,
    /// `description`
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::scalar::optional_text")]
    pub description: Option<String>,

    /// `externalDocs`, `x-*`, ...
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Tag {
    /// Creates a tag.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A server declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// `url`
    pub url: String,
    /// `description`
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::scalar::optional_text")]
    pub description: Option<String>,

    /// `variables`, `x-*`, ...
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Server {
    /// Creates a server.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Reusable named objects of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// `schemas`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,
    /// `responses`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ApiResponse>,
    /// `parameters`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Parameter>,
    /// `examples`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, Value>,
    /// `requestBodies`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub request_bodies: IndexMap<String, RequestBody>,
    /// `headers`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Value>,
    /// `securitySchemes`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub security_schemes: IndexMap<String, Value>,
    /// `links`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub links: IndexMap<String, Value>,
    /// `callbacks`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: IndexMap<String, Value>,

    /// `pathItems`, `x-*`, ...
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Components {
    /// Returns `true` when none of the nine component maps holds an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
            && self.responses.is_empty()
            && self.parameters.is_empty()
            && self.examples.is_empty()
            && self.request_bodies.is_empty()
            && self.headers.is_empty()
            && self.security_schemes.is_empty()
            && self.links.is_empty()
            && self.callbacks.is_empty()
    }
}

/// The root API description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// `openapi` version string.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::scalar::optional_text")]
    pub openapi: Option<String>,
    /// `info`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    /// `externalDocs`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Value>,
    /// `servers`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// `security`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    /// `tags`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// `paths`, keyed by URL path.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// `components`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    /// `webhooks`, `jsonSchemaDialect`, `x-*`, ...
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Document {
    /// Creates an empty document with metadata.
    #[must_use]
    pub fn new(info: Info) -> Self {
        Self {
            openapi: Some("3.0.1".to_string()),
            info: Some(info),
            ..Self::default()
        }
    }

    /// The components block, created when absent.
    pub fn components_mut(&mut self) -> &mut Components {
        self.components.get_or_insert_with(Components::default)
    }

    /// Registers a component schema.
    #[must_use]
    pub fn with_schema(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.components_mut().schemas.insert(name.into(), schema);
        self
    }

    /// Adds (or replaces) a path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>, item: PathItem) -> Self {
        self.paths.insert(path.into(), item);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use serde_json::json;

    #[test]
    fn should_round_trip_unknown_fields() {
        let input = json!({
            "openapi": "3.0.1",
            "info": { "title": "Pets", "version": "1.0", "license": { "name": "MIT" } },
            "paths": {},
            "webhooks": {},
            "x-audience": "public"
        });

        let doc: Document = serde_json::from_value(input.clone()).expect("valid document");

        assert_eq!(doc.extensions.len(), 2);
        assert_eq!(serde_json::to_value(&doc).expect("serialize"), input);
    }

    #[test]
    fn should_serialize_minimal_document() {
        let doc = Document::new(Info::new("Pets", "1.0"))
            .with_schema("Pet", Schema::of_type("object"));

        let json = serde_json::to_string_pretty(&doc).expect("serialize");

        assert_snapshot!(json, @r#"
        {
          "openapi": "3.0.1",
          "info": {
            "title": "Pets",
            "version": "1.0"
          },
          "paths": {},
          "components": {
            "schemas": {
              "Pet": {
                "type": "object"
              }
            }
          }
        }
        "#);
    }

    #[test]
    fn should_report_empty_components() {
        let mut components = Components::default();
        assert!(components.is_empty());

        components
            .security_schemes
            .insert("basic".to_string(), json!({ "type": "http", "scheme": "basic" }));
        assert!(!components.is_empty());
    }
}
