//! Error types for the skyforge domain model.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by inventory construction, generator registration and
/// architecture generation.
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum Error {
    /// A non-visual node references a type the inventory does not know.
    #[error("Unknown resource type '{resource_type}' on node '{node_id}'")]
    #[diagnostic(
        code(skyforge::core::unknown_resource_type),
        help("Check the node's resourceType against the provider inventory, or flag the node visual-only")
    )]
    UnknownResourceType {
        /// The node carrying the unknown type.
        node_id: String,
        /// The unresolved type tag.
        resource_type: String,
    },

    /// Two inventory classifications share a resource name.
    #[error("Duplicate inventory entry for resource type '{name}'")]
    #[diagnostic(code(skyforge::core::duplicate_type))]
    DuplicateType {
        /// The duplicated PascalCase name.
        name: String,
    },

    /// The inventory bootstrap document failed to decode.
    #[error("Invalid inventory document: {message}")]
    #[diagnostic(code(skyforge::core::invalid_inventory))]
    InvalidInventory {
        /// Description of the decode failure.
        message: String,
    },

    /// A generator was registered under an empty provider tag.
    #[error("Generator registered with an empty provider tag")]
    #[diagnostic(code(skyforge::core::empty_provider))]
    EmptyProvider,

    /// Two generators were registered for the same provider.
    #[error("Generator already registered for provider '{provider}'")]
    #[diagnostic(code(skyforge::core::duplicate_provider))]
    DuplicateProvider {
        /// The provider tag registered twice.
        provider: String,
    },

    /// The compile was cancelled while generating.
    #[error("Architecture generation cancelled")]
    #[diagnostic(code(skyforge::core::cancelled))]
    Cancelled,
}

impl Error {
    /// Create an unknown-resource-type error.
    pub fn unknown_type(node_id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self::UnknownResourceType {
            node_id: node_id.into(),
            resource_type: resource_type.into(),
        }
    }

    /// Create an invalid-inventory error.
    pub fn invalid_inventory(message: impl Into<String>) -> Self {
        Self::InvalidInventory {
            message: message.into(),
        }
    }
}
