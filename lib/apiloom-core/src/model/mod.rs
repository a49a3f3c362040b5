//! The API description model.
//!
//! A serde model of the OpenAPI document covering the parts the engine reasons about.
//! Every node keeps the keywords it does not model in a flattened `extensions` map,
//! so documents read from files survive a read/write cycle unchanged.

mod document;
mod interop;
mod path;
mod scalar;
mod schema;

pub use self::document::{Components, Document, Info, SecurityRequirement, Server, Tag};
pub use self::path::{
    ApiResponse, HttpMethod, MediaType, Operation, Parameter, PathItem, RequestBody,
};
pub use self::schema::{COMPONENTS_SCHEMAS_REF, Schema, SchemaType};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::AssemblyError;

/// Deserializes a JSON value, reporting the failing path on mismatch.
pub(crate) fn from_value<T: DeserializeOwned>(origin: &str, value: Value) -> Result<T, AssemblyError> {
    serde_path_to_error::deserialize(value).map_err(|err| AssemblyError::InvalidDocument {
        origin: origin.to_string(),
        path: err.path().to_string(),
        error: err.into_inner(),
    })
}

/// Deserializes JSON text, reporting the failing path on mismatch.
pub(crate) fn from_json_str<T: DeserializeOwned>(origin: &str, json: &str) -> Result<T, AssemblyError> {
    let deserializer = &mut serde_json::Deserializer::from_str(json);
    serde_path_to_error::deserialize(deserializer).map_err(|err| AssemblyError::InvalidDocument {
        origin: origin.to_string(),
        path: err.path().to_string(),
        error: err.into_inner(),
    })
}

/// Deserializes YAML text.
///
/// The YAML is first read as a generic tree, then mapped onto the model so that
/// mismatches report the same paths as with JSON input.
pub(crate) fn from_yaml_str<T: DeserializeOwned>(origin: &str, yaml: &str) -> Result<T, AssemblyError> {
    let value = serde_saphyr::from_str::<Value>(yaml).map_err(AssemblyError::yaml)?;
    from_value(origin, value)
}

impl Document {
    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidDocument`] with the failing path when the text
    /// is not a valid document.
    pub fn from_json(origin: &str, json: &str) -> Result<Self, AssemblyError> {
        from_json_str(origin, json)
    }

    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Yaml`] for malformed YAML and
    /// [`AssemblyError::InvalidDocument`] when the tree is not a valid document.
    pub fn from_yaml(origin: &str, yaml: &str) -> Result<Self, AssemblyError> {
        from_yaml_str(origin, yaml)
    }
}
