//! # Apiloom Core
//!
//! Assemble OpenAPI documents from pieces: a base document, external partial
//! documents and the operations discovered by an endpoint scanner.
//!
//! The engine merges everything into a unified document, splits it into one
//! document per group and version, and makes each of them canonical:
//!
//! - **[`merge`]** - combine partial documents and endpoint records
//! - **[`partition`]** - split by group and version, with exclusions and common endpoints
//! - **[`normalize()`]** - sort, flatten `allOf` wrappers and remove unused schemas
//! - **[`naming`]** - rewrite schema property names
//! - **[`placeholder`]** - resolve `${key}` tokens against the configuration
//! - **[`Assembler`]** - run all of the above and emit the output documents
//!
//! ## Quick Start
//!
//! ```rust
//! use apiloom_core::model::{Document, HttpMethod, Info, Operation};
//! use apiloom_core::output::MemoryEmitter;
//! use apiloom_core::{Assembler, EndpointRecord, ResolutionContext};
//!
//! # fn main() -> Result<(), apiloom_core::AssemblyError> {
//! let context = ResolutionContext::builder()
//!     .system_property("apiloom.groups.admin.display-name", "Administration")
//!     .environment_variables(Vec::<(String, String)>::new())
//!     .build();
//!
//! let mut assembler = Assembler::new(context);
//! assembler.visit_document(Document::new(Info::new("Pet Store", "1.0")));
//! assembler.record_endpoint(EndpointRecord::new(
//!     "/pets",
//!     HttpMethod::Get,
//!     Operation::with_id("listPets"),
//! ));
//! assembler.record_endpoint(
//!     EndpointRecord::new("/users", HttpMethod::Get, Operation::with_id("listUsers"))
//!         .in_group("admin"),
//! );
//!
//! let mut emitter = MemoryEmitter::new();
//! let report = assembler.finish(&mut emitter)?;
//!
//! let output = report.outputs.first().expect("admin document");
//! assert_eq!(output.display_name.as_deref(), Some("Administration"));
//! assert_eq!(output.filename, "pet-store-1.0.yml");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Problems with a single item (an unreadable additional document, an unresolved
//! placeholder, ...) are [`Warning`]s: they are logged with `tracing`, collected in
//! the [`FinishReport`] and processing goes on. [`AssemblyError`] is for failures
//! that stop a run.

pub mod config;
mod diagnostics;
mod endpoint;
mod error;
mod finish;
pub mod merge;
pub mod model;
pub mod naming;
mod normalize;
pub mod output;
pub mod partition;
mod paths;
pub mod placeholder;

pub use self::config::{GroupConfig, ResolutionContext, ResolutionContextBuilder};
pub use self::diagnostics::{Diagnostics, Warning};
pub use self::endpoint::EndpointRecord;
pub use self::error::AssemblyError;
pub use self::finish::{Assembler, EmittedOutput, FinishReport, FinishState};
pub use self::model::Document;
pub use self::normalize::{normalize, normalize_schema};
pub use self::paths::apply_context_path;
