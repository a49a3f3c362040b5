use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use super::{DocumentPartitioner, OutputDocument, OutputDocuments, OutputKey};
use crate::config::GroupConfig;
use crate::endpoint::EndpointRecord;
use crate::merge::merge_endpoint_records;
use crate::model::Document;

/// Splits a unified document by group and version.
///
/// - when no record has a group nor a version, the unified document is the only
///   output, moved as is;
/// - otherwise every record with groups goes in the `(group, version)` document of
///   each group it is not excluded from, and a record with a version but no group
///   goes in the `(none, version)` document;
/// - common records (no group, no version) then go in every output document, except
///   the ones of `common-exclude` groups and of groups they are excluded from.
///
/// Package rules of the group configurations add groups and exclusions to records
/// discovered in a matching package.
#[derive(Debug, Clone, Copy)]
pub struct GroupVersionPartitioner<'a> {
    groups: &'a IndexMap<String, GroupConfig>,
    known_documents: &'a IndexMap<String, Document>,
}

/// The groups of a record once package rules are applied.
#[derive(Debug, Default)]
struct Membership {
    groups: IndexSet<String>,
    excluded: IndexSet<String>,
}

impl Membership {
    fn is_common(&self, record: &EndpointRecord) -> bool {
        self.groups.is_empty() && record.version.is_none()
    }
}

impl<'a> GroupVersionPartitioner<'a> {
    /// Creates a partitioner.
    ///
    /// A document of `known_documents` is the starting point of its group documents
    /// instead of the metadata of the unified document.
    #[must_use]
    pub const fn new(
        groups: &'a IndexMap<String, GroupConfig>,
        known_documents: &'a IndexMap<String, Document>,
    ) -> Self {
        Self {
            groups,
            known_documents,
        }
    }

    fn membership(&self, record: &EndpointRecord) -> Membership {
        let mut membership = Membership {
            groups: record.groups.clone(),
            excluded: record.excluded_groups.clone(),
        };
        if let Some(package) = record.package.as_deref() {
            for (name, config) in self.groups {
                if config.includes_package(package) {
                    membership.groups.insert(name.clone());
                }
                if config.excludes_package(package) {
                    membership.excluded.insert(name.clone());
                }
            }
        }
        membership
    }

    /// The starting content of a new output document.
    ///
    /// Components always come from the unified document.
    fn seed(&self, group: Option<&str>, unified: &Document) -> Document {
        let known = group.and_then(|group| self.known_documents.get(group));
        let mut doc = match known {
            Some(known) => known.clone(),
            None => Document {
                openapi: unified.openapi.clone(),
                info: unified.info.clone(),
                external_docs: unified.external_docs.clone(),
                servers: unified.servers.clone(),
                security: unified.security.clone(),
                tags: unified.tags.clone(),
                extensions: unified.extensions.clone(),
                ..Document::default()
            },
        };
        if doc.openapi.is_none() {
            doc.openapi.clone_from(&unified.openapi);
        }
        doc.components.clone_from(&unified.components);
        doc
    }

    fn add_record(
        &self,
        outputs: &mut OutputDocuments,
        unified: &Document,
        group: Option<&str>,
        record: &EndpointRecord,
    ) {
        let key = OutputKey::new(group.map(ToString::to_string), record.version.clone());
        if outputs.get(&key).is_none() {
            debug!(%key, "creating output document");
            let config = group.and_then(|group| self.groups.get(group));
            let doc = self.seed(group, unified);
            outputs.insert(OutputDocument::new(key.clone(), doc, config));
        }
        if let Some(output) = outputs.get_mut(&key) {
            merge_endpoint_records(&mut output.document, [record]);
        }
    }

    fn excludes_common(&self, group: Option<&str>) -> bool {
        group
            .and_then(|group| self.groups.get(group))
            .is_some_and(GroupConfig::is_common_exclude)
    }
}

impl DocumentPartitioner for GroupVersionPartitioner<'_> {
    fn partition(&self, unified: Document, records: &[EndpointRecord]) -> OutputDocuments {
        let memberships = records
            .iter()
            .map(|record| self.membership(record))
            .collect::<Vec<_>>();

        if records
            .iter()
            .zip(&memberships)
            .all(|(record, membership)| membership.is_common(record))
        {
            debug!("no group nor version, single output document");
            return OutputDocuments::single(unified);
        }

        let mut outputs = OutputDocuments::default();
        let mut common = Vec::new();
        for (record, membership) in records.iter().zip(&memberships) {
            if membership.is_common(record) {
                common.push((record, membership));
                continue;
            }
            if membership.groups.is_empty() {
                self.add_record(&mut outputs, &unified, None, record);
            }
            for group in &membership.groups {
                if membership.excluded.contains(group) {
                    debug!(%group, url = %record.url, "record excluded from group");
                    continue;
                }
                self.add_record(&mut outputs, &unified, Some(group), record);
            }
        }

        for output in outputs.values_mut() {
            let group = output.key.group.as_deref();
            if self.excludes_common(group) {
                debug!(key = %output.key, "common records excluded");
                continue;
            }
            let included = common
                .iter()
                .filter(|(_, membership)| {
                    group.is_none_or(|group| !membership.excluded.contains(group))
                })
                .map(|(record, _)| *record);
            merge_endpoint_records(&mut output.document, included);
        }
        outputs
    }
}
