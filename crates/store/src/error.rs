//! Error types for persistence operations.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by gateway implementations.
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum Error {
    /// A save or ensure operation failed.
    #[error("Persistence failure during {operation}: {message}")]
    #[diagnostic(code(skyforge::store::persistence_failure))]
    PersistenceFailure {
        /// The operation that failed.
        operation: String,
        /// Backend-provided description.
        message: String,
    },

    /// An operation referenced a transaction the gateway does not know.
    #[error("Unknown transaction {tx_id}")]
    #[diagnostic(
        code(skyforge::store::unknown_transaction),
        help("The transaction was already committed or rolled back")
    )]
    UnknownTransaction {
        /// The stale transaction id.
        tx_id: u64,
    },
}

impl Error {
    /// Create a persistence failure with operation context.
    pub fn failure(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PersistenceFailure {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
