//! The cloud-agnostic architecture aggregate.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use skyforge_ir::{OutputDecl, VariableDecl};

use crate::resource::Resource;

/// A non-fatal diagnostic attached to a resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    /// The resource the warning refers to.
    pub resource_id: String,
    /// Human-readable message.
    pub message: String,
}

/// The domain aggregate one compile operates on.
///
/// Invariants: resource ids are unique; every id appearing in `containments`
/// or `dependencies` is a resource id; containment is a forest. The aggregate
/// is owned by a single compile and never shared across compiles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Architecture {
    /// Provider tag, e.g. `aws`.
    pub provider: String,
    /// Deployment region, empty when the diagram has none.
    pub region: String,
    /// Resources in mapping order.
    pub resources: Vec<Resource>,
    /// Parent id to child ids.
    pub containments: IndexMap<String, Vec<String>>,
    /// Resource id to the ids it depends on.
    pub dependencies: IndexMap<String, Vec<String>>,
    /// Input variables passed through from the diagram.
    pub variables: Vec<VariableDecl>,
    /// Outputs passed through from the diagram.
    pub outputs: Vec<OutputDecl>,
    /// Append-only non-fatal diagnostics.
    pub warnings: Vec<Warning>,
}

impl Architecture {
    /// Look up a resource by id.
    #[must_use]
    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Look up a resource mutably by id.
    pub fn resource_mut(&mut self, id: &str) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|r| r.id == id)
    }

    /// The direct parent of a resource, if any.
    #[must_use]
    pub fn parent_of(&self, id: &str) -> Option<&Resource> {
        let parent_id = self.resource(id)?.parent_id.as_deref()?;
        self.resource(parent_id)
    }

    /// The ancestor chain of a resource, nearest first.
    #[must_use]
    pub fn ancestors_of(&self, id: &str) -> Vec<&Resource> {
        let mut chain = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            // Containment is a forest, but guard anyway so a corrupted
            // aggregate cannot loop forever.
            if chain.iter().any(|r: &&Resource| r.id == parent.id) {
                break;
            }
            chain.push(parent);
            current = self.parent_of(&parent.id);
        }
        chain
    }

    /// Direct children of a resource.
    #[must_use]
    pub fn children_of(&self, id: &str) -> Vec<&Resource> {
        self.containments
            .get(id)
            .map(|children| {
                children
                    .iter()
                    .filter_map(|child| self.resource(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resources a given resource depends on.
    #[must_use]
    pub fn dependencies_of(&self, id: &str) -> Vec<&Resource> {
        self.dependencies
            .get(id)
            .map(|deps| deps.iter().filter_map(|dep| self.resource(dep)).collect())
            .unwrap_or_default()
    }

    /// Append a warning.
    pub fn push_warning(&mut self, resource_id: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Warning {
            resource_id: resource_id.into(),
            message: message.into(),
        });
    }

    /// Recompute `containments` and `dependencies` from the resources.
    ///
    /// Called after any pass that adds resources or rewires parents, so the
    /// relation maps never drift from the per-resource fields.
    pub fn rebuild_relations(&mut self) {
        let mut containments: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut dependencies: IndexMap<String, Vec<String>> = IndexMap::new();
        for resource in &self.resources {
            if let Some(parent_id) = &resource.parent_id {
                containments
                    .entry(parent_id.clone())
                    .or_default()
                    .push(resource.id.clone());
            }
            if !resource.depends_on.is_empty() {
                dependencies.insert(resource.id.clone(), resource.depends_on.clone());
            }
        }
        self.containments = containments;
        self.dependencies = dependencies;
    }
}
