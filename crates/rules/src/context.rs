//! Per-resource evaluation context.

use indexmap::IndexMap;
use serde_json::Value;

use skyforge_core::{Architecture, Resource};

/// Everything a rule can see while judging one resource.
///
/// Built from the architecture immediately before evaluation and dropped
/// right after; never stored. `parents` is the ancestor chain nearest-first,
/// which is what makes ancestor-counting rules meaningful on a containment
/// forest where every resource has at most one direct parent.
#[derive(Debug)]
pub struct EvaluationContext<'a> {
    /// The resource under evaluation.
    pub resource: &'a Resource,
    /// Ancestor chain, nearest first.
    pub parents: Vec<&'a Resource>,
    /// Direct children.
    pub children: Vec<&'a Resource>,
    /// Resources this one depends on.
    pub dependencies: Vec<&'a Resource>,
    /// Provider tag of the architecture.
    pub provider: &'a str,
    /// The resource's metadata.
    pub metadata: &'a IndexMap<String, Value>,
}

impl<'a> EvaluationContext<'a> {
    /// Build the context for one resource.
    #[must_use]
    pub fn for_resource(architecture: &'a Architecture, id: &str) -> Option<Self> {
        let resource = architecture.resource(id)?;
        Some(Self {
            resource,
            parents: architecture.ancestors_of(id),
            children: architecture.children_of(id),
            dependencies: architecture.dependencies_of(id),
            provider: &architecture.provider,
            metadata: &resource.metadata,
        })
    }
}
