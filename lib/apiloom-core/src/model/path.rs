use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{SecurityRequirement, schema::Schema};

/// HTTP methods a [`PathItem`] can hold an [`Operation`] for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
    /// `HEAD`
    Head,
    /// `PATCH`
    Patch,
    /// `TRACE`
    Trace,
}

impl HttpMethod {
    /// All methods, in the order operations are visited and serialized.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// The upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One URL path with at most one [`Operation`] per HTTP method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// `get`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// `put`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// `post`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// `delete`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// `options`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// `head`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// `patch`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// `trace`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,

    /// Parameters shared by every operation of this path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    /// `summary`, `description`, `servers`, `x-*`, ...
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl PathItem {
    /// The operation slot for a method.
    #[must_use]
    pub const fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }

    /// The mutable operation slot for a method.
    pub const fn operation_mut(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Trace => &mut self.trace,
        }
    }

    /// Iterates over the present operations, in [`HttpMethod::ALL`] order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(|method| self.operation(method).map(|operation| (method, operation)))
    }

    /// Iterates mutably over the present operations, in [`HttpMethod::ALL`] order.
    pub fn operations_mut(&mut self) -> impl Iterator<Item = &mut Operation> {
        [
            self.get.as_mut(),
            self.put.as_mut(),
            self.post.as_mut(),
            self.delete.as_mut(),
            self.options.as_mut(),
            self.head.as_mut(),
            self.patch.as_mut(),
            self.trace.as_mut(),
        ]
        .into_iter()
        .flatten()
    }
}

/// A single API operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// `tags`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// `summary`
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::scalar::optional_text")]
    pub summary: Option<String>,
    /// `description`
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::scalar::optional_text")]
    pub description: Option<String>,
    /// `operationId`
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::scalar::optional_text")]
    pub operation_id: Option<String>,
    /// `parameters`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// `requestBody`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// `responses`, keyed by status code (or `default`).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ApiResponse>,
    /// `deprecated`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    /// `security`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    /// `externalDocs`, `callbacks`, `servers`, `x-*`, ...
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Operation {
    /// Creates an operation with an identifier.
    #[must_use]
    pub fn with_id(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: Some(operation_id.into()),
            ..Self::default()
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Adds (or replaces) a response.
    #[must_use]
    pub fn with_response(mut self, status: impl Into<String>, response: ApiResponse) -> Self {
        self.responses.insert(status.into(), response);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_request_body(mut self, request_body: RequestBody) -> Self {
        self.request_body = Some(request_body);
        self
    }
}

/// An operation or path parameter.
///
/// `name` and `in` are optional so that `$ref` parameters deserialize too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// `$ref`
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// `name`
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::scalar::optional_text")]
    pub name: Option<String>,
    /// `in` (`path`, `query`, `header`, `cookie`)
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// `description`
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::scalar::optional_text")]
    pub description: Option<String>,
    /// `required`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// `schema`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    /// `style`, `explode`, `example`, `x-*`, ...
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Parameter {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, location: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: Some(name.into()),
            location: Some(location.into()),
            schema: Some(schema),
            ..Self::default()
        }
    }

    /// The identity of a parameter within an operation.
    pub(crate) fn identity(&self) -> (Option<&str>, Option<&str>, Option<&str>) {
        (
            self.name.as_deref(),
            self.location.as_deref(),
            self.reference.as_deref(),
        )
    }
}

/// A media type entry of a content map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// `schema`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    /// `example`, `examples`, `encoding`, ...
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl MediaType {
    /// Creates a media type with a schema.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Some(schema),
            extensions: IndexMap::new(),
        }
    }
}

/// An operation request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// `$ref`
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// `description`
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::scalar::optional_text")]
    pub description: Option<String>,
    /// `content`, keyed by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
    /// `required`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    /// Every other keyword.
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl RequestBody {
    /// Adds a content entry.
    #[must_use]
    pub fn with_content(mut self, media_type: impl Into<String>, content: MediaType) -> Self {
        self.content.insert(media_type.into(), content);
        self
    }
}

/// A response of an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// `$ref`
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// `description`
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::scalar::optional_text")]
    pub description: Option<String>,
    /// `content`, keyed by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    /// `headers`, `links`, `x-*`, ...
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl ApiResponse {
    /// Creates a response with a description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Adds a content entry.
    #[must_use]
    pub fn with_content(mut self, media_type: impl Into<String>, content: MediaType) -> Self {
        self.content.insert(media_type.into(), content);
        self
    }
}
