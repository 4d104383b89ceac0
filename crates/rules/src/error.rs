//! Error types for the rule engine.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for rule engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading constraint records or evaluating rules.
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum Error {
    /// A constraint record names an unknown rule family.
    #[error("Unknown constraint type '{constraint_type}' for resource type '{resource_type}'")]
    #[diagnostic(
        code(skyforge::rules::unknown_constraint),
        help("Valid constraint types: RequiresParent, AllowedParent, RequiresRegion, MaxChildren, MinChildren, AllowedDependencies, ForbiddenDependencies, RequiresDependency")
    )]
    UnknownConstraintType {
        /// The record's resource type scope.
        resource_type: String,
        /// The unrecognized constraint tag.
        constraint_type: String,
    },

    /// A constraint record's payload does not decode for its family.
    #[error("Invalid constraint value '{value}' for {constraint_type} on '{resource_type}': {message}")]
    #[diagnostic(code(skyforge::rules::invalid_constraint_value))]
    InvalidConstraintValue {
        /// The record's resource type scope.
        resource_type: String,
        /// The rule family.
        constraint_type: String,
        /// The raw payload.
        value: String,
        /// Why it failed to decode.
        message: String,
    },

    /// The compile was cancelled during evaluation.
    #[error("Rule evaluation cancelled")]
    #[diagnostic(code(skyforge::rules::cancelled))]
    Cancelled,
}
