//! Resource mapper trait and registry.

use std::collections::HashMap;
use std::sync::Arc;

use skyforge_core::Resource;

use crate::block::Block;
use crate::error::{Error, Result};

/// Maps domain resources into HCL blocks for one provider.
pub trait ResourceMapper: Send + Sync {
    /// The provider tag this mapper emits for, e.g. `aws`.
    fn provider(&self) -> &'static str;

    /// Whether the mapper can emit resources of the given type name.
    fn supports_resource(&self, type_name: &str) -> bool;

    /// Map one resource into zero or more blocks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRequiredConfig`] when metadata lacks fields
    /// the mapping needs, or [`Error::InvalidFieldValue`] when a field is
    /// present but undecodable.
    fn map_resource(&self, resource: &Resource) -> Result<Vec<Block>>;
}

/// Registry of resource mappers, keyed by provider tag.
///
/// Built once at process start and handed to the emitter; read-only
/// afterwards.
#[derive(Default, Clone)]
pub struct MapperRegistry {
    mappers: HashMap<&'static str, Arc<dyn ResourceMapper>>,
}

impl MapperRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapper.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyProvider`] for an empty provider tag, or
    /// [`Error::DuplicateProvider`] when the tag is already registered.
    pub fn register(&mut self, mapper: Arc<dyn ResourceMapper>) -> Result<()> {
        let provider = mapper.provider();
        if provider.is_empty() {
            return Err(Error::EmptyProvider);
        }
        if self.mappers.contains_key(provider) {
            return Err(Error::DuplicateProvider {
                provider: provider.to_string(),
            });
        }
        self.mappers.insert(provider, mapper);
        Ok(())
    }

    /// Get the mapper for a provider tag.
    #[must_use]
    pub fn get(&self, provider: &str) -> Option<&Arc<dyn ResourceMapper>> {
        self.mappers.get(provider)
    }

    /// Registered provider tags.
    #[must_use]
    pub fn providers(&self) -> Vec<&'static str> {
        self.mappers.keys().copied().collect()
    }

    /// Number of registered mappers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

impl std::fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperRegistry")
            .field("providers", &self.providers())
            .finish()
    }
}
