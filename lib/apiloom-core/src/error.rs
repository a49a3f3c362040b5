/// Errors that abort an operation of the assembly engine.
///
/// Per-item problems (a malformed additional document, an unreadable configuration
/// file, an unresolved placeholder, ...) never surface as an `AssemblyError`: they are
/// reported as a [`Warning`](crate::Warning) and processing continues.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum AssemblyError {
    /// Reading or writing a file failed.
    Io(std::io::Error),

    /// JSON serialization failure.
    Json(serde_json::Error),

    /// YAML parsing or serialization failure.
    #[display("YAML error: {message}")]
    #[from(skip)]
    Yaml {
        /// The underlying error message.
        message: String,
    },

    /// A document (or endpoint record list) does not match the expected structure.
    #[display("Invalid document '{origin}' at '{path}': {error}")]
    #[from(skip)]
    InvalidDocument {
        /// Where the document comes from (file name, `<base>`, ...).
        origin: String,
        /// The path inside the document where the mismatch happened.
        path: String,
        /// The underlying deserialization error.
        error: serde_json::Error,
    },

    /// No output location can be determined for a generated document.
    ///
    /// Occurs when neither a target file nor an output directory is configured.
    #[display("No destination for '{filename}': configure a target file or an output directory")]
    #[from(skip)]
    NoDestination {
        /// The file name that could not be placed.
        filename: String,
    },
}

impl AssemblyError {
    pub(crate) fn yaml(error: impl std::fmt::Display) -> Self {
        Self::Yaml {
            message: error.to_string(),
        }
    }
}
