//! Error types for resource graph operations.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for resource graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or sorting the resource graph.
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum Error {
    /// The combined containment + dependency relation contains a cycle.
    #[error("Dependency cycle through resources: {}", members.join(" -> "))]
    #[diagnostic(
        code(skyforge::graph::dependency_cycle),
        help("Break the cycle by removing one of the dependency edges or containment links")
    )]
    CycleDetected {
        /// Resource ids on the cycle, in id order.
        members: Vec<String>,
    },

    /// A relation references an id that is not a resource.
    #[error("Relation references unknown resource '{id}'")]
    #[diagnostic(code(skyforge::graph::unknown_resource))]
    UnknownResource {
        /// The unresolved id.
        id: String,
    },
}
