use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::AssemblyError;
use crate::partition::OutputKey;

/// A rendered output document, ready to be written.
#[derive(Debug, Clone, Copy)]
pub struct RenderedDocument<'a> {
    /// The partition key.
    pub key: &'a OutputKey,
    /// The computed file name.
    pub filename: &'a str,
    /// The rendered text.
    pub contents: &'a str,
    /// Whether this is the only output of the run.
    pub single: bool,
}

/// Writes rendered documents somewhere.
pub trait Emitter {
    /// Writes a document, returning where it went.
    ///
    /// # Errors
    ///
    /// [`AssemblyError::NoDestination`] when no location can be determined for the
    /// document; any other error concerns this document only.
    fn emit(&mut self, document: RenderedDocument<'_>) -> Result<PathBuf, AssemblyError>;
}

/// Writes documents to the file system.
///
/// A single output goes to the target file when one is set. Otherwise documents go
/// in the directory of the target file, or else in the output directory.
#[derive(Debug, Clone, Default)]
pub struct FileEmitter {
    target_file: Option<PathBuf>,
    out_dir: Option<PathBuf>,
}

impl FileEmitter {
    /// Creates an emitter.
    #[must_use]
    pub const fn new(target_file: Option<PathBuf>, out_dir: Option<PathBuf>) -> Self {
        Self {
            target_file,
            out_dir,
        }
    }

    fn destination(&self, filename: &str, single: bool) -> Result<PathBuf, AssemblyError> {
        if single && let Some(target) = &self.target_file {
            return Ok(target.clone());
        }
        let target_dir = self
            .target_file
            .as_deref()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty());
        target_dir
            .or(self.out_dir.as_deref())
            .map(|dir| dir.join(filename))
            .ok_or_else(|| AssemblyError::NoDestination {
                filename: filename.to_string(),
            })
    }
}

impl Emitter for FileEmitter {
    fn emit(&mut self, document: RenderedDocument<'_>) -> Result<PathBuf, AssemblyError> {
        let path = self.destination(document.filename, document.single)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, document.contents)?;
        info!(key = %document.key, path = %path.display(), "document written");
        Ok(path)
    }
}

/// Keeps documents in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEmitter {
    documents: Vec<(String, String)>,
}

impl MemoryEmitter {
    /// Creates an empty emitter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(filename, contents)` written so far, in order.
    #[must_use]
    pub fn documents(&self) -> &[(String, String)] {
        &self.documents
    }

    /// The contents of the last document written with this file name.
    #[must_use]
    pub fn get(&self, filename: &str) -> Option<&str> {
        self.documents
            .iter()
            .rev()
            .find(|(name, _)| name == filename)
            .map(|(_, contents)| contents.as_str())
    }
}

impl Emitter for MemoryEmitter {
    fn emit(&mut self, document: RenderedDocument<'_>) -> Result<PathBuf, AssemblyError> {
        self.documents
            .push((document.filename.to_string(), document.contents.to_string()));
        Ok(PathBuf::from(document.filename))
    }
}
