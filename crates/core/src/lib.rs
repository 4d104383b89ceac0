//! Domain model and provider surface for the skyforge compiler.
//!
//! The types here are cloud-agnostic: an [`Architecture`] aggregates
//! [`Resource`]s plus their containment and dependency relations, an
//! [`Inventory`] classifies the resource types a provider knows about, and
//! [`ArchitectureGenerator`] is the seam a provider crate implements to map a
//! normalized diagram into an architecture.
//!
//! Registries are built once at process start and handed to the engine as
//! immutable values; nothing in this crate is ambient global state.

mod architecture;
mod canonical;
mod error;
mod generator;
mod inventory;
mod resource;

pub use architecture::{Architecture, Warning};
pub use canonical::canonical_json;
pub use error::{Error, Result};
pub use generator::{ArchitectureGenerator, GeneratorRegistry};
pub use inventory::{Classification, Inventory, TypeScope};
pub use resource::{Category, Resource, ResourceType};

// The cancellation token every long stage checks between resources.
pub use tokio_util::sync::CancellationToken;
