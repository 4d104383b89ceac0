//! Resource graph and deterministic topological ordering for skyforge.
//!
//! Builds a directed graph over an architecture's resources from two
//! relations (containment and explicit dependency) and produces a total
//! order in which parents precede children and dependencies precede their
//! dependents. Ties break by ascending resource id, so the order is stable
//! across runs.

mod error;
mod graph;

pub use error::{Error, Result};
pub use graph::ResourceGraph;
