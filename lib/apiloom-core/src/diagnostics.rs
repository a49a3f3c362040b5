use std::cell::RefCell;

use tracing::warn;

/// A recoverable problem met during a run.
///
/// The item concerned is skipped (or left as is) and processing continues.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Warning {
    /// An additional document could not be read or parsed.
    #[display("Unable to read document '{origin}': {reason}")]
    UnreadableDocument {
        /// The document source.
        origin: String,
        /// Why it was skipped.
        reason: String,
    },

    /// The additional documents location is missing or not a directory.
    #[display("'{path}' does not exist or is not a directory")]
    NotADirectory {
        /// The configured location.
        path: String,
    },

    /// A configuration file could not be read.
    #[display("Unable to read configuration '{origin}': {reason}")]
    UnreadableConfig {
        /// The configuration source.
        origin: String,
        /// Why it was ignored.
        reason: String,
    },

    /// A `${...}` token matched no property source.
    #[display("Unresolved placeholder '${{{token}}}'")]
    UnresolvedPlaceholder {
        /// The token name, without `${` and `}`.
        token: String,
    },

    /// A custom schema rule targets a type that does not exist.
    #[display("Unknown type '{target}' for custom schema '{type_name}', rule skipped")]
    UnknownSchemaTarget {
        /// The configured type.
        type_name: String,
        /// The replacement type that could not be found.
        target: String,
    },

    /// The configured property naming strategy is not supported.
    #[display("Unknown property naming strategy '{name}'")]
    UnknownNamingStrategy {
        /// The configured identifier.
        name: String,
    },

    /// Two sources declare the same path, the later one replaced the former.
    #[display("Path '{path}' declared more than once, keeping the last one")]
    DuplicatePath {
        /// The path key.
        path: String,
    },

    /// An output file name still contains a placeholder.
    #[display("Output file name '{filename}' contains an unresolved placeholder")]
    UnresolvedFilename {
        /// The computed file name.
        filename: String,
    },

    /// An output document could not be written.
    #[display("Unable to write '{filename}': {reason}")]
    EmitFailed {
        /// The output file name.
        filename: String,
        /// Why the write failed.
        reason: String,
    },
}

/// Collects the warnings of a run.
///
/// Every reported warning is also logged with `tracing` at `WARN` level.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: RefCell<Vec<Warning>>,
}

impl Diagnostics {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning.
    pub fn report(&self, warning: Warning) {
        warn!(%warning, "recoverable problem");
        self.warnings.borrow_mut().push(warning);
    }

    /// Number of warnings recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings.borrow().len()
    }

    /// Returns `true` when nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.borrow().is_empty()
    }

    /// A copy of the warnings recorded so far.
    #[must_use]
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.borrow().clone()
    }

    /// Removes and returns the warnings recorded so far.
    pub fn take(&self) -> Vec<Warning> {
        self.warnings.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_collect_and_drain_warnings() {
        let diagnostics = Diagnostics::new();

        diagnostics.report(Warning::NotADirectory {
            path: "/missing".to_string(),
        });
        diagnostics.report(Warning::UnresolvedPlaceholder {
            token: "api.version".to_string(),
        });

        assert_eq!(diagnostics.len(), 2);
        let warnings = diagnostics.take();
        assert_eq!(warnings.len(), 2);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn should_display_placeholder_token() {
        let warning = Warning::UnresolvedPlaceholder {
            token: "missing".to_string(),
        };

        assert_eq!(warning.to_string(), "Unresolved placeholder '${missing}'");
    }
}
