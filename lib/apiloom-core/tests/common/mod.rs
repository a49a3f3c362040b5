#![allow(dead_code)]

use apiloom_core::model::{Document, HttpMethod, Info, Operation, PathItem};
use apiloom_core::{EndpointRecord, ResolutionContext};
use tracing::info;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

/// A context isolated from the process environment.
pub fn context(project_dir: &std::path::Path, properties: &[(&str, &str)]) -> ResolutionContext {
    ResolutionContext::builder()
        .project_dir(project_dir)
        .system_properties(properties.iter().copied())
        .environment_variables(Vec::<(String, String)>::new())
        .build()
}

pub fn get(url: &str, operation_id: &str) -> EndpointRecord {
    EndpointRecord::new(url, HttpMethod::Get, Operation::with_id(operation_id))
}

pub fn base_document() -> Document {
    Document::new(Info::new("Pet Store", "1.0")).with_path(
        "/health",
        PathItem {
            get: Some(Operation::with_id("health")),
            ..PathItem::default()
        },
    )
}

/// The operation ids of a document, in path order.
pub fn operation_ids(doc: &Document) -> Vec<String> {
    doc.paths
        .values()
        .flat_map(|item| item.operations())
        .filter_map(|(_, operation)| operation.operation_id.clone())
        .collect()
}
