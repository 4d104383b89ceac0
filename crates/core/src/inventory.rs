//! Per-provider resource type inventory.
//!
//! The inventory is populated once at process start from classification
//! records (usually a JSON document) and read-only afterwards. It answers the
//! three lookups generation needs: by PascalCase name, by IR type tag or
//! alias, and by category.

use std::collections::BTreeSet;
use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::resource::{Category, ResourceType};

/// Deployment scope of a classified type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TypeScope {
    /// Deploys into a region.
    #[default]
    Regional,
    /// Global to the account.
    Global,
}

/// One classification record from the bootstrap document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Functional category.
    pub category: Category,
    /// PascalCase resource name, unique per provider.
    pub resource_name: String,
    /// Primary IR type tag (kebab-case).
    pub ir_type: String,
    /// Additional IR tags that resolve to this type.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Sub-kind; defaults to the resource name.
    #[serde(default)]
    pub kind: Option<String>,
    /// Deployment scope; defaults to regional.
    #[serde(default)]
    pub scope: TypeScope,
}

/// Resource type classification table for one provider.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    by_name: IndexMap<String, ResourceType>,
    // IR tags and aliases, stored lowercased.
    ir_index: HashMap<String, String>,
    by_category: IndexMap<Category, Vec<String>>,
}

impl Inventory {
    /// Build an inventory from classification records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateType`] if two records share a resource name.
    pub fn from_classifications(records: Vec<Classification>) -> Result<Self> {
        let mut inventory = Self::default();
        for record in records {
            let kind = record.kind.clone().unwrap_or_else(|| record.resource_name.clone());
            let resource_type = match record.scope {
                TypeScope::Regional => {
                    ResourceType::regional(&record.ir_type, &record.resource_name, record.category, &kind)
                }
                TypeScope::Global => {
                    ResourceType::global(&record.ir_type, &record.resource_name, record.category, &kind)
                }
            };

            if inventory.by_name.contains_key(&resource_type.name) {
                return Err(Error::DuplicateType {
                    name: resource_type.name,
                });
            }

            inventory
                .ir_index
                .insert(record.ir_type.to_lowercase(), resource_type.name.clone());
            for alias in &record.aliases {
                inventory
                    .ir_index
                    .insert(alias.to_lowercase(), resource_type.name.clone());
            }
            inventory
                .by_category
                .entry(record.category)
                .or_default()
                .push(resource_type.name.clone());
            inventory
                .by_name
                .insert(resource_type.name.clone(), resource_type);
        }
        debug!(types = inventory.by_name.len(), "inventory populated");
        Ok(inventory)
    }

    /// Build an inventory from a JSON array of classification records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInventory`] on decode failure, or
    /// [`Error::DuplicateType`] on a duplicate name.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<Classification> =
            serde_json::from_str(json).map_err(|e| Error::invalid_inventory(e.to_string()))?;
        Self::from_classifications(records)
    }

    /// Look up a type by its PascalCase name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&ResourceType> {
        self.by_name.get(name)
    }

    /// Resolve an IR type tag to a classified type.
    ///
    /// Resolution order: the tag as written, the lowercased tag, then the tag
    /// taken directly as a PascalCase name.
    #[must_use]
    pub fn resolve(&self, ir_type: &str) -> Option<&ResourceType> {
        if let Some(name) = self.ir_index.get(ir_type) {
            return self.by_name.get(name);
        }
        if let Some(name) = self.ir_index.get(&ir_type.to_lowercase()) {
            return self.by_name.get(name);
        }
        self.by_name.get(ir_type)
    }

    /// Names of every type in a category, in registration order.
    #[must_use]
    pub fn names_in_category(&self, category: Category) -> &[String] {
        self.by_category
            .get(&category)
            .map_or(&[], Vec::as_slice)
    }

    /// IR tags (primary tags only, not aliases) of every regional type.
    ///
    /// Used to build the validator's region-presence check.
    #[must_use]
    pub fn regional_ir_types(&self) -> BTreeSet<String> {
        self.by_name
            .values()
            .filter(|t| t.is_regional)
            .map(|t| t.id.clone())
            .collect()
    }

    /// Number of classified types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the inventory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
