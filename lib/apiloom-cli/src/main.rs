#![allow(missing_docs)]
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use apiloom_core::config::CONFIG_FILE;
use apiloom_core::output::FileEmitter;
use apiloom_core::{Assembler, Document, EndpointRecord, ResolutionContext};

fn main() -> Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let args = AppArgs::parse().context("parsing arguments")?;

    let mut properties = args.properties;
    if let Some(config) = &args.config {
        properties.push((CONFIG_FILE.to_string(), config.display().to_string()));
    }
    let context = ResolutionContext::builder()
        .project_dir(&args.project_dir)
        .system_properties(properties)
        .build();
    let target_file = context.target_file();
    let mut assembler = Assembler::new(context);

    let base = read_document(&args.base)?;
    assembler.visit_document(base);

    if let Some(endpoints) = &args.endpoints {
        let json = fs::read_to_string(endpoints)
            .with_context(|| format!("reading endpoints {}", endpoints.display()))?;
        let records = EndpointRecord::list_from_json(&endpoints.display().to_string(), &json)?;
        info!(count = records.len(), "endpoint records loaded");
        assembler.record_endpoints(records);
    }

    let mut emitter = FileEmitter::new(target_file, args.out_dir);
    let report = assembler
        .finish(&mut emitter)
        .context("assembling documents")?;

    for output in &report.outputs {
        info!(key = %output.key, path = %output.path.display(), "document emitted");
    }
    if !report.warnings.is_empty() {
        warn!(count = report.warnings.len(), "finished with warnings");
    }
    Ok(())
}

fn read_document(path: &Path) -> Result<Document> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading document {}", path.display()))?;
    let origin = path.display().to_string();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let doc = if is_json {
        Document::from_json(&origin, &text)?
    } else {
        Document::from_yaml(&origin, &text)?
    };
    Ok(doc)
}

#[derive(Debug)]
struct AppArgs {
    base: PathBuf,
    endpoints: Option<PathBuf>,
    config: Option<PathBuf>,
    project_dir: PathBuf,
    out_dir: Option<PathBuf>,
    properties: Vec<(String, String)>,
}

impl AppArgs {
    fn parse() -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_env();

        let base = pargs
            .value_from_str(["-b", "--base"])
            .context("parsing base document argument")?;
        let endpoints = pargs
            .opt_value_from_str(["-e", "--endpoints"])
            .context("parsing endpoints argument")?;
        let config = pargs
            .opt_value_from_str(["-c", "--config"])
            .context("parsing config argument")?;
        let project_dir = pargs
            .opt_value_from_str(["-p", "--project-dir"])
            .context("parsing project directory argument")?;
        let out_dir = pargs
            .opt_value_from_str(["-o", "--out-dir"])
            .context("parsing output directory argument")?;
        let definitions: Vec<String> = pargs
            .values_from_str("-D")
            .context("parsing property definitions")?;

        let mut properties = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let Some((key, value)) = definition.split_once('=') else {
                bail!("invalid property definition '{definition}', expected key=value");
            };
            properties.push((key.trim().to_string(), value.trim().to_string()));
        }

        let result = Self {
            base,
            endpoints,
            config,
            project_dir: project_dir.unwrap_or_else(|| PathBuf::from(".")),
            out_dir,
            properties,
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            warn!(?remaining, "Warning: unused arguments left");
        }
        Ok(result)
    }
}
