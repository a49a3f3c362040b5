use crate::diagnostics::{Diagnostics, Warning};
use crate::partition::OutputDocument;
use crate::placeholder::Expand;

use super::OutputFormat;

const DEFAULT_STEM: &str = "swagger";

/// Computes the file name of an output document.
///
/// - by default `swagger.<ext>`, or `<title>-<version>.<ext>` when the document
///   has an `info` block;
/// - a `configured` name (the `filename` setting) replaces it, with placeholders
///   expanded and `${version}` set to the `info` version;
/// - when there are several outputs, the group file name is used, or else
///   `-<group>-<version>` is appended to the stem; `${apiVersion}`, `${version}`
///   and `${group}` are then substituted.
///
/// A name still holding a placeholder is reported.
pub fn output_filename(
    output: &OutputDocument,
    output_count: usize,
    format: OutputFormat,
    configured: Option<&str>,
    expand: &impl Expand,
    diagnostics: &Diagnostics,
) -> String {
    let ext = format.extension();
    let info = output.document.info.as_ref();
    let info_version = info.map_or("", |info| info.version.as_str());

    let mut filename = info.map_or_else(
        || format!("{DEFAULT_STEM}{ext}"),
        |info| {
            let mut stem = slug::slugify(&info.title);
            if stem.is_empty() {
                stem = DEFAULT_STEM.to_string();
            }
            if !info.version.is_empty() {
                stem = format!("{stem}-{}", info.version);
            }
            format!("{stem}{ext}")
        },
    );

    if let Some(configured) = configured.filter(|name| !name.trim().is_empty()) {
        let expanded = expand.expand(configured);
        filename = format!("{expanded}{ext}").replace("${version}", info_version);
    }

    if output_count > 1 {
        let stem = match output.filename.as_deref().filter(|name| !name.is_empty()) {
            Some(group_filename) => group_filename.to_string(),
            None => {
                let mut stem = filename
                    .strip_suffix(ext)
                    .unwrap_or(&filename)
                    .to_string();
                for part in [&output.key.group, &output.key.version].into_iter().flatten() {
                    stem.push('-');
                    stem.push_str(part);
                }
                stem
            }
        };
        let api_version = output.key.version.as_deref().unwrap_or(info_version);
        let group = output.key.group.as_deref().unwrap_or_default();
        filename = format!("{}{ext}", expand.expand(&stem))
            .replace("${apiVersion}", api_version)
            .replace("${version}", info_version)
            .replace("${group}", group);
    }

    if filename.contains("${") {
        diagnostics.report(Warning::UnresolvedFilename {
            filename: filename.clone(),
        });
    }
    filename
}
