//! Error types for diagram IR operations.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for diagram IR operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or normalizing a diagram document.
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum Error {
    /// The document is not a diagram in either accepted shape.
    #[error("Malformed diagram document: {message}")]
    #[diagnostic(
        code(skyforge::ir::malformed),
        help("The document must be a diagram object with a 'nodes' array, or a wrapper whose value is one")
    )]
    MalformedIr {
        /// Description of what failed to decode.
        message: String,
    },

    /// Two nodes share the same id.
    #[error("Duplicate node id '{node_id}'")]
    #[diagnostic(code(skyforge::ir::duplicate_node_id))]
    DuplicateNodeId {
        /// The id that appears more than once.
        node_id: String,
    },

    /// A node references a parent that does not exist.
    #[error("Node '{node_id}' references missing parent '{parent_id}'")]
    #[diagnostic(code(skyforge::ir::dangling_parent))]
    DanglingParent {
        /// The node carrying the reference.
        node_id: String,
        /// The parent id that does not resolve.
        parent_id: String,
    },

    /// An edge endpoint does not resolve to a node.
    #[error("Edge '{edge_id}' references missing node '{endpoint}'")]
    #[diagnostic(code(skyforge::ir::dangling_edge))]
    DanglingEdge {
        /// The offending edge.
        edge_id: String,
        /// The endpoint id that does not resolve.
        endpoint: String,
    },

    /// The parent-id relation contains a cycle.
    #[error("Containment cycle through nodes: {}", cycle.join(" -> "))]
    #[diagnostic(
        code(skyforge::ir::containment_cycle),
        help("Containment must form a forest; remove one of the parent references")
    )]
    ContainmentCycle {
        /// Node ids along the cycle, in walk order.
        cycle: Vec<String>,
    },
}

impl Error {
    /// Create a malformed-document error with a message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedIr {
            message: message.into(),
        }
    }
}
