//! Diagram graph to architecture mapping for AWS.

use std::collections::BTreeSet;

use serde_json::json;
use tracing::debug;

use skyforge_core::{
    Architecture, ArchitectureGenerator, CancellationToken, Error, Inventory, Resource,
    ResourceType, Result,
};
use skyforge_ir::{DiagramGraph, ValidationSchema};

use crate::enrich;
use crate::synthesis;
use crate::PROVIDER;

/// The AWS architecture generator.
///
/// Mapping runs in two passes: the first fixes the id set (every non-region
/// node becomes a resource whose id is the node id), the second resolves
/// types, names, parents, dependencies and metadata. Bounded fallback
/// synthesis then fills in collaborators certain types cannot live without.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsGenerator;

impl AwsGenerator {
    /// Create the generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ArchitectureGenerator for AwsGenerator {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn validation_schema(&self, inventory: &Inventory) -> ValidationSchema {
        let mut schema = ValidationSchema::new()
            .require_keys("region", &["name"])
            .require_keys("vpc", &["cidr"])
            .require_keys("subnet", &["cidr"]);
        for tag in inventory.regional_ir_types() {
            schema = schema.regional(&tag);
        }
        schema
    }

    fn generate(
        &self,
        graph: &DiagramGraph,
        inventory: &Inventory,
        cancel: &CancellationToken,
    ) -> Result<Architecture> {
        let region = graph
            .region_node()
            .and_then(|node| node.config_name())
            .unwrap_or_default()
            .to_string();

        // First pass: the id set. Resource ids equal node ids, so edges can
        // be resolved against it in the second pass.
        let known_ids: BTreeSet<&str> = graph.resource_nodes().map(|n| n.id.as_str()).collect();

        let mut resources = Vec::new();
        for node in graph.resource_nodes() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let resource_type = match inventory.resolve(&node.resource_type) {
                Some(found) => found.clone(),
                None if node.is_visual_only => {
                    debug!(node = %node.id, tag = %node.resource_type, "visual-only node kept as icon");
                    ResourceType::visual_icon(&node.resource_type)
                }
                None => return Err(Error::unknown_type(&node.id, &node.resource_type)),
            };

            let name = node
                .config_name()
                .filter(|value| !value.is_empty())
                .map(ToString::to_string)
                .or_else(|| (!node.label.is_empty()).then(|| node.label.clone()))
                .unwrap_or_else(|| "unnamed-resource".to_string());

            // A region parent only contributes the region string; containment
            // keeps non-region parents.
            let parent_id = node
                .parent_id
                .as_ref()
                .filter(|pid| graph.node(pid).is_some_and(|p| !p.is_region()))
                .cloned();

            let mut depends_on = Vec::new();
            for edge in graph.dependency_edges_from(&node.id) {
                if edge.target != node.id
                    && known_ids.contains(edge.target.as_str())
                    && !depends_on.contains(&edge.target)
                {
                    depends_on.push(edge.target.clone());
                }
            }

            let mut metadata = node.config.clone();
            metadata.insert(
                "position".to_string(),
                json!({ "x": node.position_x, "y": node.position_y }),
            );
            metadata.insert("isVisualOnly".to_string(), json!(node.is_visual_only));

            resources.push(Resource {
                id: node.id.clone(),
                name,
                resource_type: resource_type.clone(),
                provider: PROVIDER.to_string(),
                region: if resource_type.is_regional {
                    region.clone()
                } else {
                    String::new()
                },
                parent_id,
                depends_on,
                metadata,
            });
        }

        let mut architecture = Architecture {
            provider: PROVIDER.to_string(),
            region,
            resources,
            variables: graph.variables.clone(),
            outputs: graph.outputs.clone(),
            ..Architecture::default()
        };

        synthesis::apply(&mut architecture, inventory);
        architecture.rebuild_relations();

        debug!(
            resources = architecture.resources.len(),
            warnings = architecture.warnings.len(),
            "architecture generated"
        );
        Ok(architecture)
    }

    fn enrich(&self, architecture: &mut Architecture, order: &[String]) {
        enrich::apply(architecture, order);
    }
}
