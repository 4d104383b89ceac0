//! Pipeline orchestrator for the skyforge cloud-architecture compiler.
//!
//! An [`Engine`] holds the process-wide immutable state — inventory,
//! generator registry, mapper registry, rule registry, configuration and the
//! persistence gateway — and runs one synchronous compile per call: parse,
//! normalize, validate, generate, evaluate rules, sort, enrich, persist and
//! emit. A compile returns either the emitted files plus warnings, or the
//! collected errors plus warnings; never both.
//!
//! # Example
//!
//! ```ignore
//! let engine = Engine::with_defaults()?;
//! let output = engine.compile(diagram_bytes, &CompileOptions::default())?;
//! for file in output.files {
//!     println!("{}:\n{}", file.path, file.content);
//! }
//! ```

mod config;
mod engine;
mod error;

pub use config::{EngineConfig, PersistOrder};
pub use engine::{CompileOptions, CompileOutput, Engine, EngineBuilder};
pub use error::{BuildError, CompileError, CompileFailure, ErrorCode, Stage};

// The surface callers need alongside the engine.
pub use skyforge_core::CancellationToken;
pub use skyforge_hcl::IacFile;
pub use skyforge_rules::RuleProfile;
