//! Document merging.
//!
//! Combines a base document with externally supplied partial documents, and with
//! the operations of endpoint records.

mod operation;

use std::path::Path;

use tracing::{debug, info};

use crate::diagnostics::{Diagnostics, Warning};
use crate::endpoint::EndpointRecord;
use crate::model::Document;

pub(crate) use self::operation::merge_operation;

/// Copies a partial document into `base`.
///
/// Tags, servers and security requirements are appended; paths, schemas, security
/// schemes and extensions are inserted, replacing entries with the same key. A path
/// already present in `base` is replaced as a whole and reported.
pub fn merge_document(base: &mut Document, from: Document, diagnostics: &Diagnostics) {
    base.tags.extend(from.tags);
    base.servers.extend(from.servers);
    base.security.extend(from.security);

    for (path, item) in from.paths {
        if base.paths.contains_key(&path) {
            diagnostics.report(Warning::DuplicatePath { path: path.clone() });
        }
        base.paths.insert(path, item);
    }

    if let Some(components) = from.components {
        let target = base.components_mut();
        for (name, mut schema) in components.schemas {
            if schema.name.is_none() {
                schema.name = Some(name.clone());
            }
            target.schemas.insert(name, schema);
        }
        target.security_schemes.extend(components.security_schemes);
    }

    if from.external_docs.is_some() {
        base.external_docs = from.external_docs;
    }
    base.extensions.extend(from.extensions);
}

/// Merges every partial document into `base`, in order.
pub fn merge_documents(
    mut base: Document,
    additional: impl IntoIterator<Item = Document>,
    diagnostics: &Diagnostics,
) -> Document {
    for doc in additional {
        merge_document(&mut base, doc, diagnostics);
    }
    base
}

/// Adds the operations of endpoint records to a document.
///
/// An operation already present for the same path and method is merged with the
/// record's one rather than replaced.
pub fn merge_endpoint_records<'a>(
    doc: &mut Document,
    records: impl IntoIterator<Item = &'a EndpointRecord>,
) {
    for record in records {
        let item = doc.paths.entry(record.url.clone()).or_default();
        let slot = item.operation_mut(record.method);
        let operation = match slot.take() {
            Some(current) => merge_operation(current, record.operation.clone()),
            None => record.operation.clone(),
        };
        *slot = Some(operation);
    }
}

/// Reads every `*.yml`, `*.yaml` and `*.json` document of a directory, in file name
/// order.
///
/// Files that cannot be read or parsed are reported and skipped. A missing location
/// is reported and gives no document.
pub fn load_additional_documents(dir: &Path, diagnostics: &Diagnostics) -> Vec<Document> {
    if !dir.is_dir() {
        diagnostics.report(Warning::NotADirectory {
            path: dir.display().to_string(),
        });
        return Vec::new();
    }
    info!(dir = %dir.display(), "merging additional documents");

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            diagnostics.report(Warning::UnreadableDocument {
                origin: dir.display().to_string(),
                reason: err.to_string(),
            });
            return Vec::new();
        }
    };

    let mut files = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && DocumentKind::of(path).is_some())
        .collect::<Vec<_>>();
    files.sort();

    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        match read_document(&path) {
            Ok(doc) => {
                debug!(path = %path.display(), "additional document read");
                documents.push(doc);
            }
            Err(reason) => diagnostics.report(Warning::UnreadableDocument {
                origin: path.display().to_string(),
                reason,
            }),
        }
    }
    documents
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Json,
    Yaml,
}

impl DocumentKind {
    fn of(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

fn read_document(path: &Path) -> Result<Document, String> {
    let origin = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
    let text = std::fs::read_to_string(path).map_err(|err| err.to_string())?;
    let parsed = match DocumentKind::of(path) {
        Some(DocumentKind::Yaml) => Document::from_yaml(&origin, &text),
        _ => Document::from_json(&origin, &text),
    };
    parsed.map_err(|err| err.to_string())
}
