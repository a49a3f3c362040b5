//! Output stage: file names, rendering and emission of the output documents.

mod emitter;
mod filename;

pub use self::emitter::{Emitter, FileEmitter, MemoryEmitter, RenderedDocument};
pub use self::filename::output_filename;

use serde::Serialize;

use crate::AssemblyError;

/// The text format of the output documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_more::Display)]
pub enum OutputFormat {
    /// YAML, `.yml` files.
    #[default]
    #[display("yaml")]
    Yaml,
    /// Pretty-printed JSON, `.json` files.
    #[display("json")]
    Json,
}

impl OutputFormat {
    /// The format selected by the `json.format` flag.
    #[must_use]
    pub const fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Yaml }
    }

    /// The file extension, with its leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Yaml => ".yml",
            Self::Json => ".json",
        }
    }

    /// Renders a value.
    ///
    /// # Errors
    ///
    /// Fails if the value cannot be serialized.
    pub fn render(self, value: &impl Serialize) -> Result<String, AssemblyError> {
        match self {
            Self::Yaml => serde_saphyr::to_string(value).map_err(AssemblyError::yaml),
            Self::Json => Ok(serde_json::to_string_pretty(value)?),
        }
    }
}
