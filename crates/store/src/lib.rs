//! Persistence gateway contract and in-memory store for skyforge.
//!
//! The compiler talks to storage through the narrow [`Gateway`] trait: one
//! transaction per compile, explicit commit/rollback, and save/ensure
//! operations for the handful of record shapes the domain produces. The
//! [`MemoryGateway`] implements the contract in process for tests and
//! embedded use; a real database adapter lives outside the core.

mod error;
mod gateway;
mod memory;
mod records;

pub use error::{Error, Result};
pub use gateway::{Gateway, Tx};
pub use memory::MemoryGateway;
pub use records::{ProjectRecord, ResourceRecord};
