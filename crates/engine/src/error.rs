//! The user-facing error envelope.
//!
//! Every stage error converts into a [`CompileError`] carrying a stable
//! code, the stage it arose in and, where known, the offending resource or
//! node id. A failed compile returns a [`CompileFailure`] with every error
//! the failing stage collected.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use skyforge_core::Warning;

/// Pipeline stage a diagnostic belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// IR decoding.
    Parse,
    /// Graph normalization.
    Normalize,
    /// Diagram validation.
    Validate,
    /// Architecture generation.
    Map,
    /// Rule evaluation.
    Rules,
    /// Topological ordering.
    Sort,
    /// IaC emission.
    Emit,
    /// Persistence.
    Persist,
}

impl Stage {
    /// The lowercase stage tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Normalize => "normalize",
            Self::Validate => "validate",
            Self::Map => "map",
            Self::Rules => "rules",
            Self::Sort => "sort",
            Self::Emit => "emit",
            Self::Persist => "persist",
        }
    }
}

/// Stable machine-readable error code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    /// The document is not a diagram.
    MalformedIr,
    /// Two nodes share an id.
    DuplicateNodeId,
    /// A parent reference does not resolve.
    DanglingParent,
    /// An edge endpoint does not resolve.
    DanglingEdge,
    /// The containment relation is cyclic.
    ContainmentCycle,
    /// A validation check failed.
    SchemaViolation,
    /// A non-visual node's type is unknown.
    UnknownResourceType,
    /// A mapper needs config the resource lacks.
    MissingRequiredConfig,
    /// A constraint rule was violated.
    RuleViolation,
    /// The combined ordering relation is cyclic.
    DependencyCycle,
    /// The provider cannot emit a resource type.
    UnsupportedResource,
    /// No component registered for the provider tag.
    MapperNotRegistered,
    /// The persistence gateway failed; the transaction was rolled back.
    PersistenceFailure,
    /// The compile was cancelled.
    Cancelled,
}

/// One diagnostic in the envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompileError {
    /// Stable code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Offending resource, when resource-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    /// Offending diagram node, when node-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    /// Stage the error arose in.
    pub stage: Stage,
}

impl CompileError {
    /// Create an error with neither resource nor node context.
    pub fn new(code: ErrorCode, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            resource_id: None,
            node_id: None,
            stage,
        }
    }

    /// Attach a resource id.
    #[must_use]
    pub fn with_resource(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Attach a node id.
    #[must_use]
    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    /// The cancellation error for a stage.
    #[must_use]
    pub fn cancelled(stage: Stage) -> Self {
        Self::new(ErrorCode::Cancelled, stage, "compile cancelled")
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.stage.as_str(), self.message)
    }
}

/// A failed compile: every error the failing stage produced, plus any
/// warnings gathered before the failure.
#[derive(Error, Debug, Clone, Diagnostic)]
#[error("Compile failed with {} error(s): {}", errors.len(), errors.first().map(ToString::to_string).unwrap_or_default())]
#[diagnostic(code(skyforge::engine::compile_failed))]
pub struct CompileFailure {
    /// The collected errors.
    pub errors: Vec<CompileError>,
    /// Warnings gathered before the failure.
    pub warnings: Vec<Warning>,
}

impl CompileFailure {
    /// The stage the compile failed in.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        self.errors.first().map(|e| e.stage)
    }
}

/// Errors raised while building an [`Engine`].
///
/// [`Engine`]: crate::Engine
#[derive(Error, Debug, Diagnostic)]
pub enum BuildError {
    /// The configuration file failed to load or decode.
    #[error("Invalid engine configuration: {message}")]
    #[diagnostic(code(skyforge::engine::invalid_config))]
    Config {
        /// Description of the failure.
        message: String,
    },

    /// Inventory construction or generator registration failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] skyforge_core::Error),

    /// Mapper registration failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Emitter(#[from] skyforge_hcl::Error),

    /// Constraint records failed to decode.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Rules(#[from] skyforge_rules::Error),
}

impl BuildError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
