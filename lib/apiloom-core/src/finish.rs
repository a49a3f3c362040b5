//! The finish orchestrator.
//!
//! An [`Assembler`] collects the inputs of a run: the base document, the endpoint
//! records and the documents already known for some groups. [`Assembler::finish`]
//! turns them into output documents:
//!
//! 1. the endpoint records are merged into the base document,
//! 2. the result is partitioned by group and version,
//! 3. each output document gets the server context path, is normalized, has its
//!    property names translated and its placeholders resolved,
//! 4. its file name is computed and it is rendered and emitted.
//!
//! Every input counts as an observed element. `finish` does nothing while no new
//! element has been observed since the last successful emission.

use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::{debug, error, info};

use crate::AssemblyError;
use crate::config::ResolutionContext;
use crate::diagnostics::Warning;
use crate::endpoint::EndpointRecord;
use crate::merge::{load_additional_documents, merge_document, merge_documents, merge_endpoint_records};
use crate::model::{Document, from_value};
use crate::naming::{NamingStrategy, apply_naming};
use crate::normalize::normalize;
use crate::output::{Emitter, OutputFormat, RenderedDocument, output_filename};
use crate::partition::{DocumentPartitioner, GroupVersionPartitioner, OutputKey};
use crate::paths::apply_context_path;
use crate::placeholder::{Expand, resolve_placeholders};

/// Whether something new was observed since the last emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishState {
    /// New elements are waiting to be emitted.
    Dirty,
    /// Everything observed has been emitted.
    Settled,
}

/// One emitted output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedOutput {
    /// The partition key.
    pub key: OutputKey,
    /// The file name.
    pub filename: String,
    /// The display name of the group.
    pub display_name: Option<String>,
    /// Whether the group is the primary one.
    pub primary: bool,
    /// Where the document went.
    pub path: PathBuf,
}

/// The outcome of [`Assembler::finish`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinishReport {
    /// The emitted documents, in partition order.
    pub outputs: Vec<EmittedOutput>,
    /// The warnings of the run.
    pub warnings: Vec<Warning>,
}

/// Collects the inputs of a run and produces the output documents.
#[derive(Debug)]
pub struct Assembler {
    context: ResolutionContext,
    base: Option<Document>,
    records: Vec<EndpointRecord>,
    known_documents: IndexMap<String, Document>,
    observed: u64,
    emitted_at: Option<u64>,
}

impl Assembler {
    /// Creates an assembler.
    #[must_use]
    pub fn new(context: ResolutionContext) -> Self {
        Self {
            context,
            base: None,
            records: Vec::new(),
            known_documents: IndexMap::new(),
            observed: 0,
            emitted_at: None,
        }
    }

    /// The configuration of the run.
    #[must_use]
    pub const fn context(&self) -> &ResolutionContext {
        &self.context
    }

    /// The base document assembled so far.
    #[must_use]
    pub const fn base(&self) -> Option<&Document> {
        self.base.as_ref()
    }

    /// The number of elements observed so far.
    #[must_use]
    pub const fn observed(&self) -> u64 {
        self.observed
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> FinishState {
        if self.emitted_at == Some(self.observed) {
            FinishState::Settled
        } else {
            FinishState::Dirty
        }
    }

    /// Adds a base document.
    ///
    /// The first one is merged with the additional documents of the configured
    /// directory. Later ones are merged into it, their `info` replacing the current
    /// one.
    pub fn visit_document(&mut self, doc: Document) {
        self.observed += 1;
        let diagnostics = self.context.diagnostics();
        let base = match self.base.take() {
            None => {
                let additional = self
                    .context
                    .additional_files()
                    .map(|dir| load_additional_documents(&dir, diagnostics))
                    .unwrap_or_default();
                merge_documents(doc, additional, diagnostics)
            }
            Some(mut base) => {
                let info = doc.info.clone();
                merge_document(&mut base, doc, diagnostics);
                if info.is_some() {
                    base.info = info;
                }
                base
            }
        };
        self.base = Some(base);
    }

    /// Adds an endpoint record.
    pub fn record_endpoint(&mut self, record: EndpointRecord) {
        self.observed += 1;
        self.records.push(record);
    }

    /// Adds endpoint records.
    pub fn record_endpoints(&mut self, records: impl IntoIterator<Item = EndpointRecord>) {
        for record in records {
            self.record_endpoint(record);
        }
    }

    /// Registers the document a group starts from, instead of the base document
    /// metadata.
    pub fn register_known_document(&mut self, group: impl Into<String>, doc: Document) {
        self.observed += 1;
        self.known_documents.insert(group.into(), doc);
    }

    /// Produces and emits the output documents.
    ///
    /// Does nothing when the engine is disabled, when there is no base document, or
    /// when nothing new was observed since the last emission. Problems with a single
    /// document are reported as warnings.
    ///
    /// # Errors
    ///
    /// Fails when an output document has no destination, or cannot be processed.
    pub fn finish(&mut self, emitter: &mut dyn Emitter) -> Result<FinishReport, AssemblyError> {
        if !self.context.is_enabled() {
            debug!("assembly disabled");
            return Ok(FinishReport::default());
        }
        if self.state() == FinishState::Settled {
            debug!(observed = self.observed, "nothing new observed, skipping");
            return Ok(FinishReport::default());
        }
        let Some(base) = self.base.as_ref() else {
            debug!("no base document, skipping");
            return Ok(FinishReport::default());
        };

        let context = &self.context;
        let diagnostics = context.diagnostics();

        let mut unified = base.clone();
        merge_endpoint_records(&mut unified, &self.records);
        let outputs = GroupVersionPartitioner::new(context.groups(), &self.known_documents)
            .partition(unified, &self.records);
        let output_count = outputs.len();
        info!(outputs = output_count, records = self.records.len(), "assembling documents");

        let format = OutputFormat::from_json_flag(context.json_format());
        let naming = naming_strategy(context);
        let context_path = context.context_path();
        let configured_filename = context.filename();
        let expander = context.expander();
        let filename_expander = context.expander();

        let mut emitted = Vec::with_capacity(output_count);
        for mut output in outputs {
            if let Some(context_path) = context_path.as_deref() {
                apply_context_path(&mut output.document, context_path);
            }
            normalize(&mut output.document)?;
            if let Some(strategy) = naming {
                apply_naming(&mut output.document, |name| strategy.translate(name));
            }
            output.document = resolve_document(output.document, &expander)?;

            let filename = output_filename(
                &output,
                output_count,
                format,
                configured_filename.as_deref(),
                &filename_expander,
                diagnostics,
            );
            let contents = format.render(&output.document)?;
            let rendered = RenderedDocument {
                key: &output.key,
                filename: &filename,
                contents: &contents,
                single: output_count == 1,
            };
            match emitter.emit(rendered) {
                Ok(path) => emitted.push(EmittedOutput {
                    key: output.key,
                    filename,
                    display_name: output.display_name,
                    primary: output.primary,
                    path,
                }),
                Err(err @ AssemblyError::NoDestination { .. }) => {
                    error!(error = %err, "no destination for output document");
                    return Err(err);
                }
                Err(err) => diagnostics.report(Warning::EmitFailed {
                    filename,
                    reason: err.to_string(),
                }),
            }
        }
        expander.report_unresolved(diagnostics);

        let warnings = diagnostics.take();
        self.emitted_at = Some(self.observed);
        Ok(FinishReport {
            outputs: emitted,
            warnings,
        })
    }
}

fn naming_strategy(context: &ResolutionContext) -> Option<NamingStrategy> {
    let name = context.naming_strategy()?;
    match name.parse::<NamingStrategy>() {
        Ok(strategy) => Some(strategy),
        Err(err) => {
            context
                .diagnostics()
                .report(Warning::UnknownNamingStrategy { name: err.name });
            None
        }
    }
}

fn resolve_document(doc: Document, expand: &impl Expand) -> Result<Document, AssemblyError> {
    let value = serde_json::to_value(&doc)?;
    from_value("<resolved>", resolve_placeholders(value, expand))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HttpMethod, Info, Operation, PathItem};
    use crate::output::MemoryEmitter;

    fn context(properties: &[(&str, &str)]) -> ResolutionContext {
        ResolutionContext::builder()
            .project_dir("/nonexistent-project")
            .system_properties(properties.iter().copied())
            .environment_variables(Vec::<(String, String)>::new())
            .build()
    }

    fn list_pets() -> EndpointRecord {
        EndpointRecord::new("/pets", HttpMethod::Get, Operation::with_id("listPets"))
    }

    #[test]
    fn should_emit_single_document() -> anyhow::Result<()> {
        let mut assembler = Assembler::new(context(&[]));
        assembler.visit_document(Document::new(Info::new("Pets", "1.0")));
        assembler.record_endpoint(list_pets());
        let mut emitter = MemoryEmitter::new();

        let report = assembler.finish(&mut emitter)?;

        assert_eq!(report.outputs.len(), 1);
        let output = report.outputs.first().expect("output");
        assert_eq!(output.filename, "pets-1.0.yml");
        assert!(output.key.is_ungrouped());
        let contents = emitter.get("pets-1.0.yml").expect("emitted document");
        assert!(contents.contains("listPets"));
        assert_eq!(assembler.state(), FinishState::Settled);
        Ok(())
    }

    #[test]
    fn should_skip_when_nothing_new() -> anyhow::Result<()> {
        let mut assembler = Assembler::new(context(&[]));
        assembler.visit_document(Document::new(Info::new("Pets", "1.0")));
        let mut emitter = MemoryEmitter::new();

        assembler.finish(&mut emitter)?;
        let second = assembler.finish(&mut emitter)?;

        assert!(second.outputs.is_empty());
        assert_eq!(emitter.documents().len(), 1);

        assembler.record_endpoint(list_pets());
        assert_eq!(assembler.state(), FinishState::Dirty);
        assembler.finish(&mut emitter)?;
        assert_eq!(emitter.documents().len(), 2);
        Ok(())
    }

    #[test]
    fn should_do_nothing_when_disabled() -> anyhow::Result<()> {
        let mut assembler = Assembler::new(context(&[("apiloom.enabled", "false")]));
        assembler.visit_document(Document::new(Info::new("Pets", "1.0")));
        let mut emitter = MemoryEmitter::new();

        let report = assembler.finish(&mut emitter)?;

        assert_eq!(report, FinishReport::default());
        assert!(emitter.documents().is_empty());
        Ok(())
    }

    #[test]
    fn should_replace_info_on_second_visit() {
        let mut assembler = Assembler::new(context(&[]));
        assembler.visit_document(Document::new(Info::new("Pets", "1.0")).with_path(
            "/pets",
            PathItem {
                get: Some(Operation::with_id("listPets")),
                ..PathItem::default()
            },
        ));
        assembler.visit_document(Document::new(Info::new("Pet Store", "2.0")));

        let base = assembler.base().expect("base document");
        assert_eq!(base.info, Some(Info::new("Pet Store", "2.0")));
        assert!(base.paths.contains_key("/pets"));
        assert_eq!(assembler.observed(), 2);
    }

    #[test]
    fn should_warn_on_unknown_naming_strategy() -> anyhow::Result<()> {
        let mut assembler = Assembler::new(context(&[("apiloom.property.naming.strategy", "CAMEL")]));
        assembler.visit_document(Document::new(Info::new("Pets", "1.0")));
        let mut emitter = MemoryEmitter::new();

        let report = assembler.finish(&mut emitter)?;

        assert_eq!(
            report.warnings,
            vec![Warning::UnknownNamingStrategy {
                name: "CAMEL".to_string()
            }]
        );
        assert_eq!(report.outputs.len(), 1);
        Ok(())
    }
}
