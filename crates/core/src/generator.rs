//! Provider generator trait and registry.

use std::collections::HashMap;
use std::sync::Arc;

use skyforge_ir::{DiagramGraph, ValidationSchema};

use crate::architecture::Architecture;
use crate::error::{Error, Result};
use crate::inventory::Inventory;
use crate::CancellationToken;

/// Maps a normalized diagram graph into a domain architecture for one
/// provider.
///
/// Implementations live in provider crates; the engine only ever sees this
/// trait through the [`GeneratorRegistry`].
pub trait ArchitectureGenerator: Send + Sync {
    /// The provider tag this generator handles, e.g. `aws`.
    fn provider(&self) -> &'static str;

    /// The validation schema for this provider (required config keys,
    /// regional type tags), derived from the inventory.
    fn validation_schema(&self, inventory: &Inventory) -> ValidationSchema;

    /// Map a diagram graph into an architecture.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownResourceType`] for a non-visual node whose
    /// type does not resolve, or [`Error::Cancelled`] when the token fires.
    fn generate(
        &self,
        graph: &DiagramGraph,
        inventory: &Inventory,
        cancel: &CancellationToken,
    ) -> Result<Architecture>;

    /// Enrich an architecture with cross-resource metadata after the
    /// resources have been ordered.
    ///
    /// Writes only engine-reserved (`_`-prefixed) metadata keys; must be
    /// idempotent.
    fn enrich(&self, architecture: &mut Architecture, order: &[String]);
}

/// Registry of architecture generators, keyed by provider tag.
///
/// Built once at process start and handed to the engine; read-only
/// afterwards.
#[derive(Default, Clone)]
pub struct GeneratorRegistry {
    generators: HashMap<&'static str, Arc<dyn ArchitectureGenerator>>,
}

impl GeneratorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyProvider`] for an empty provider tag, or
    /// [`Error::DuplicateProvider`] when the tag is already registered.
    pub fn register(&mut self, generator: Arc<dyn ArchitectureGenerator>) -> Result<()> {
        let provider = generator.provider();
        if provider.is_empty() {
            return Err(Error::EmptyProvider);
        }
        if self.generators.contains_key(provider) {
            return Err(Error::DuplicateProvider {
                provider: provider.to_string(),
            });
        }
        self.generators.insert(provider, generator);
        Ok(())
    }

    /// Get the generator for a provider tag.
    #[must_use]
    pub fn get(&self, provider: &str) -> Option<&Arc<dyn ArchitectureGenerator>> {
        self.generators.get(provider)
    }

    /// Registered provider tags.
    #[must_use]
    pub fn providers(&self) -> Vec<&'static str> {
        self.generators.keys().copied().collect()
    }

    /// Number of registered generators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("providers", &self.providers())
            .finish()
    }
}
