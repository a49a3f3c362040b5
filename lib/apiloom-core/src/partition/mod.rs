//! Splitting a unified document into group and version documents.
//!
//! The [`GroupVersionPartitioner`] decides which operations go in which output
//! document. Each output document owns its content: shared parts of the unified
//! document are cloned when the output is created.

mod group_version;

pub use self::group_version::GroupVersionPartitioner;

use std::fmt;

use indexmap::IndexMap;

use crate::config::GroupConfig;
use crate::endpoint::EndpointRecord;
use crate::model::Document;

/// The partition key: a group and a version, both optional.
///
/// The key with neither is the ungrouped document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputKey {
    /// The group name.
    pub group: Option<String>,
    /// The API version.
    pub version: Option<String>,
}

impl OutputKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(group: Option<String>, version: Option<String>) -> Self {
        Self { group, version }
    }

    /// The key of the ungrouped, unversioned document.
    #[must_use]
    pub const fn ungrouped() -> Self {
        Self::new(None, None)
    }

    /// Whether this is the ungrouped, unversioned key.
    #[must_use]
    pub const fn is_ungrouped(&self) -> bool {
        self.group.is_none() && self.version.is_none()
    }
}

impl fmt::Display for OutputKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = self.group.as_deref().unwrap_or("*");
        let version = self.version.as_deref().unwrap_or("*");
        write!(formatter, "{group}@{version}")
    }
}

/// A document produced by partitioning.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDocument {
    /// The partition key.
    pub key: OutputKey,
    /// The document.
    pub document: Document,
    /// The file name configured for the group, if any.
    pub filename: Option<String>,
    /// The display name configured for the group, if any.
    pub display_name: Option<String>,
    /// Whether the group is the primary one.
    pub primary: bool,
}

impl OutputDocument {
    /// Wraps a document with the settings of its group.
    #[must_use]
    pub fn new(key: OutputKey, document: Document, config: Option<&GroupConfig>) -> Self {
        Self {
            key,
            document,
            filename: config.and_then(|config| config.filename.clone()),
            display_name: config.and_then(|config| config.display_name.clone()),
            primary: config.is_some_and(GroupConfig::is_primary),
        }
    }
}

/// The output documents of a run, in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputDocuments {
    documents: IndexMap<OutputKey, OutputDocument>,
}

impl OutputDocuments {
    /// The single ungrouped output.
    #[must_use]
    pub fn single(document: Document) -> Self {
        let key = OutputKey::ungrouped();
        let mut documents = IndexMap::with_capacity(1);
        documents.insert(key.clone(), OutputDocument::new(key, document, None));
        Self { documents }
    }

    /// The number of outputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether there is no output.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The output for a key.
    #[must_use]
    pub fn get(&self, key: &OutputKey) -> Option<&OutputDocument> {
        self.documents.get(key)
    }

    /// The keys, in creation order.
    pub fn keys(&self) -> impl Iterator<Item = &OutputKey> {
        self.documents.keys()
    }

    /// The outputs, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &OutputDocument> {
        self.documents.values()
    }

    pub(crate) fn get_mut(&mut self, key: &OutputKey) -> Option<&mut OutputDocument> {
        self.documents.get_mut(key)
    }

    pub(crate) fn insert(&mut self, output: OutputDocument) {
        self.documents.insert(output.key.clone(), output);
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut OutputDocument> {
        self.documents.values_mut()
    }
}

impl IntoIterator for OutputDocuments {
    type Item = OutputDocument;
    type IntoIter = indexmap::map::IntoValues<OutputKey, OutputDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_values()
    }
}

/// Splits a unified document into output documents.
pub trait DocumentPartitioner {
    /// Partitions the unified document with the endpoint records.
    ///
    /// The unified document already holds the operations of every record.
    fn partition(&self, unified: Document, records: &[EndpointRecord]) -> OutputDocuments;
}

/// Partitions a unified document by group and version.
///
/// See [`GroupVersionPartitioner`].
#[must_use]
pub fn partition(
    unified: Document,
    records: &[EndpointRecord],
    groups: &IndexMap<String, GroupConfig>,
) -> OutputDocuments {
    let known_documents = IndexMap::new();
    GroupVersionPartitioner::new(groups, &known_documents).partition(unified, records)
}
