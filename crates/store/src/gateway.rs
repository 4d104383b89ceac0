//! The persistence gateway contract.

use crate::error::Result;
use crate::records::{ProjectRecord, ResourceRecord};

/// Opaque transaction handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tx {
    /// Gateway-assigned transaction id.
    pub id: u64,
}

/// The single interface the compiler uses for storage.
///
/// One transaction spans one compile: everything saved between [`begin`] and
/// [`commit`] lands atomically, and any error rolls the whole compile's
/// writes back. Implementations may block on I/O; this is the only stage of
/// the pipeline allowed to.
///
/// [`begin`]: Gateway::begin
/// [`commit`]: Gateway::commit
pub trait Gateway: Send + Sync {
    /// Open a transaction.
    ///
    /// # Errors
    ///
    /// Returns a persistence failure if the backend cannot open one.
    fn begin(&self) -> Result<Tx>;

    /// Commit a transaction.
    ///
    /// # Errors
    ///
    /// Returns a persistence failure or an unknown-transaction error.
    fn commit(&self, tx: Tx) -> Result<()>;

    /// Roll a transaction back, discarding its writes.
    ///
    /// # Errors
    ///
    /// Returns an unknown-transaction error for a stale handle.
    fn rollback(&self, tx: Tx) -> Result<()>;

    /// Save the project header.
    ///
    /// # Errors
    ///
    /// Returns a persistence failure on write error.
    fn save_project(&self, tx: Tx, project: &ProjectRecord) -> Result<()>;

    /// Save one resource row.
    ///
    /// # Errors
    ///
    /// Returns a persistence failure on write error.
    fn save_resource(&self, tx: Tx, resource: &ResourceRecord) -> Result<()>;

    /// Save one containment link between two resource external ids.
    ///
    /// # Errors
    ///
    /// Returns a persistence failure on write error.
    fn save_containment(&self, tx: Tx, parent: &str, child: &str) -> Result<()>;

    /// Save one dependency link between two resource external ids.
    ///
    /// # Errors
    ///
    /// Returns a persistence failure on write error.
    fn save_dependency(&self, tx: Tx, from: &str, to: &str, kind: &str) -> Result<()>;

    /// Ensure a user row exists.
    ///
    /// # Errors
    ///
    /// Returns a persistence failure on write error.
    fn ensure_user(&self, tx: Tx, user_id: &str) -> Result<()>;

    /// Ensure an IaC target row exists (e.g. `terraform`).
    ///
    /// # Errors
    ///
    /// Returns a persistence failure on write error.
    fn ensure_iac_target(&self, tx: Tx, target: &str) -> Result<()>;

    /// Ensure a resource type row exists.
    ///
    /// # Errors
    ///
    /// Returns a persistence failure on write error.
    fn ensure_resource_type(&self, tx: Tx, type_name: &str) -> Result<()>;

    /// Ensure a dependency type row exists.
    ///
    /// # Errors
    ///
    /// Returns a persistence failure on write error.
    fn ensure_dependency_type(&self, tx: Tx, kind: &str) -> Result<()>;
}
