use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::AssemblyError;
use crate::model::{HttpMethod, Operation};

/// One discovered operation, as produced by an endpoint scanner.
///
/// A record without groups and without version is a *common* record: it is part of
/// the ungrouped document and fans out into every group document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRecord {
    /// The URL path, e.g. `/pets/{id}`.
    pub url: String,
    /// The HTTP method.
    pub method: HttpMethod,
    /// The operation description.
    pub operation: Operation,
    /// Groups the operation belongs to.
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub groups: IndexSet<String>,
    /// Groups the operation must never appear in.
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub excluded_groups: IndexSet<String>,
    /// The API version the operation belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// The package (module path) the operation was discovered in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

impl EndpointRecord {
    /// Creates a common record.
    #[must_use]
    pub fn new(url: impl Into<String>, method: HttpMethod, operation: Operation) -> Self {
        Self {
            url: url.into(),
            method,
            operation,
            groups: IndexSet::new(),
            excluded_groups: IndexSet::new(),
            version: None,
            package: None,
        }
    }

    /// Adds a group.
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }

    /// Excludes the record from a group.
    #[must_use]
    pub fn excluded_from(mut self, group: impl Into<String>) -> Self {
        self.excluded_groups.insert(group.into());
        self
    }

    /// Sets the version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the package the operation was discovered in.
    #[must_use]
    pub fn in_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Parses a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidDocument`] with the failing path.
    pub fn list_from_json(origin: &str, json: &str) -> Result<Vec<Self>, AssemblyError> {
        crate::model::from_json_str(origin, json)
    }
}
