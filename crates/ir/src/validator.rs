//! Collecting validator for normalized diagram graphs.
//!
//! The validator is pure and stateless: it runs a fixed battery of checks
//! against a [`DiagramGraph`] and collects every violation instead of
//! stopping at the first one. Provider knowledge (which IR types require
//! which config keys, which types are regional) is injected through a
//! [`ValidationSchema`] so the crate stays free of provider tables.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use crate::graph::{DiagramGraph, EdgeKind};

/// Allowed characters for configured resource names.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    let pattern = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 ._/-]*$").unwrap();
    pattern
});

/// Provider-derived knowledge the validator needs.
#[derive(Debug, Clone, Default)]
pub struct ValidationSchema {
    /// Required config keys per IR resource type.
    pub required_keys: IndexMap<String, Vec<String>>,
    /// IR resource types that only exist inside a region.
    pub regional_types: BTreeSet<String>,
}

impl ValidationSchema {
    /// Create an empty schema (every check that needs one is skipped).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `keys` on nodes of `ir_type`.
    #[must_use]
    pub fn require_keys(mut self, ir_type: &str, keys: &[&str]) -> Self {
        self.required_keys
            .insert(ir_type.to_string(), keys.iter().map(ToString::to_string).collect());
        self
    }

    /// Mark `ir_type` as regional.
    #[must_use]
    pub fn regional(mut self, ir_type: &str) -> Self {
        self.regional_types.insert(ir_type.to_string());
        self
    }
}

/// What kind of violation a [`ValidationIssue`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssueKind {
    /// A required config key is missing or a config value is malformed.
    SchemaViolation,
    /// More than one region node, or a region expected but absent.
    RegionViolation,
    /// A configured name uses characters outside the allowed set.
    InvalidName,
    /// A containment edge disagrees with the target's parent id.
    ClassificationMismatch,
}

/// A single validation violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Violation category.
    pub kind: ValidationIssueKind,
    /// Offending node, when the violation is node-scoped.
    pub node_id: Option<String>,
    /// Human-readable description.
    pub message: String,
}

/// Result of running the validation battery.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Whether the graph passed every check.
    pub valid: bool,
    /// Violations in node-appearance order.
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// The validation battery.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    schema: ValidationSchema,
    stop_on_first: bool,
}

impl Validator {
    /// Create a validator with the given schema.
    #[must_use]
    pub fn new(schema: ValidationSchema) -> Self {
        Self {
            schema,
            stop_on_first: false,
        }
    }

    /// Stop at the first violation instead of collecting all of them.
    #[must_use]
    pub fn stop_on_first(mut self) -> Self {
        self.stop_on_first = true;
        self
    }

    /// Run the battery against a graph.
    #[must_use]
    pub fn validate(&self, graph: &DiagramGraph) -> ValidationResult {
        let mut errors = Vec::new();

        self.check_regions(graph, &mut errors);
        for node in graph.nodes.values() {
            if self.stop_on_first && !errors.is_empty() {
                break;
            }
            self.check_required_keys(graph, &node.id, &mut errors);
            self.check_name(graph, &node.id, &mut errors);
        }
        if !(self.stop_on_first && !errors.is_empty()) {
            self.check_containment_edges(graph, &mut errors);
        }

        if self.stop_on_first {
            errors.truncate(1);
        }
        debug!(violations = errors.len(), "diagram validation finished");
        ValidationResult::from_errors(errors)
    }

    fn check_regions(&self, graph: &DiagramGraph, errors: &mut Vec<ValidationIssue>) {
        let regions: Vec<_> = graph.nodes.values().filter(|n| n.is_region()).collect();
        if regions.len() > 1 {
            errors.push(ValidationIssue {
                kind: ValidationIssueKind::RegionViolation,
                node_id: Some(regions[1].id.clone()),
                message: format!("diagram has {} region nodes, at most one allowed", regions.len()),
            });
        }
        for region in &regions {
            if region.parent_id.is_some() {
                errors.push(ValidationIssue {
                    kind: ValidationIssueKind::SchemaViolation,
                    node_id: Some(region.id.clone()),
                    message: format!("region node '{}' must not have a parent", region.id),
                });
            }
        }

        let needs_region = graph
            .resource_nodes()
            .any(|n| self.schema.regional_types.contains(&n.resource_type));
        if needs_region && regions.is_empty() {
            errors.push(ValidationIssue {
                kind: ValidationIssueKind::RegionViolation,
                node_id: None,
                message: "diagram contains regional resources but no region node".to_string(),
            });
        }
    }

    fn check_required_keys(
        &self,
        graph: &DiagramGraph,
        node_id: &str,
        errors: &mut Vec<ValidationIssue>,
    ) {
        let Some(node) = graph.node(node_id) else {
            return;
        };
        let lookup = if node.is_region() {
            "region"
        } else {
            node.resource_type.as_str()
        };
        let Some(keys) = self.schema.required_keys.get(lookup) else {
            return;
        };
        for key in keys {
            if !node.config.contains_key(key) {
                errors.push(ValidationIssue {
                    kind: ValidationIssueKind::SchemaViolation,
                    node_id: Some(node.id.clone()),
                    message: format!(
                        "node '{}' of type '{lookup}' is missing required config key '{key}'",
                        node.id
                    ),
                });
            }
        }
    }

    fn check_name(&self, graph: &DiagramGraph, node_id: &str, errors: &mut Vec<ValidationIssue>) {
        let Some(node) = graph.node(node_id) else {
            return;
        };
        if let Some(name) = node.config_name()
            && !NAME_PATTERN.is_match(name)
        {
            errors.push(ValidationIssue {
                kind: ValidationIssueKind::InvalidName,
                node_id: Some(node.id.clone()),
                message: format!("node '{}' has invalid name '{name}'", node.id),
            });
        }
    }

    fn check_containment_edges(&self, graph: &DiagramGraph, errors: &mut Vec<ValidationIssue>) {
        for edge in &graph.edges {
            if edge.kind != EdgeKind::Containment {
                continue;
            }
            let Some(child) = graph.node(&edge.target) else {
                continue;
            };
            if child.parent_id.as_deref() != Some(edge.source.as_str()) {
                errors.push(ValidationIssue {
                    kind: ValidationIssueKind::ClassificationMismatch,
                    node_id: Some(child.id.clone()),
                    message: format!(
                        "containment edge '{}' says '{}' contains '{}', but the node's parent is {}",
                        edge.id,
                        edge.source,
                        edge.target,
                        child
                            .parent_id
                            .as_deref()
                            .map_or_else(|| "unset".to_string(), |p| format!("'{p}'")),
                    ),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{normalize, parse_diagram};

    fn graph_from(json: &str) -> DiagramGraph {
        normalize(&parse_diagram(json.as_bytes()).unwrap()).unwrap()
    }

    fn schema() -> ValidationSchema {
        ValidationSchema::new()
            .require_keys("region", &["name"])
            .require_keys("vpc", &["cidr"])
            .require_keys("subnet", &["cidr"])
            .regional("vpc")
            .regional("ec2")
    }

    #[test]
    fn test_valid_minimal_diagram() {
        let graph = graph_from(
            r#"{"nodes":[
                {"id":"region-1","type":"region","config":{"name":"us-east-1"}},
                {"id":"vpc-1","resourceType":"vpc","config":{"cidr":"10.0.0.0/16"}}
            ]}"#,
        );
        let result = Validator::new(schema()).validate(&graph);
        assert!(result.valid, "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn test_missing_required_key_is_schema_violation() {
        let graph = graph_from(
            r#"{"nodes":[
                {"id":"region-1","type":"region","config":{"name":"us-east-1"}},
                {"id":"vpc-1","resourceType":"vpc","config":{}}
            ]}"#,
        );
        let result = Validator::new(schema()).validate(&graph);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ValidationIssueKind::SchemaViolation);
        assert_eq!(result.errors[0].node_id.as_deref(), Some("vpc-1"));
    }

    #[test]
    fn test_two_region_nodes_rejected() {
        let graph = graph_from(
            r#"{"nodes":[
                {"id":"r1","type":"region","config":{"name":"us-east-1"}},
                {"id":"r2","type":"region","config":{"name":"eu-west-1"}}
            ]}"#,
        );
        let result = Validator::new(schema()).validate(&graph);
        assert!(!result.valid);
        assert_eq!(result.errors[0].kind, ValidationIssueKind::RegionViolation);
    }

    #[test]
    fn test_regional_resource_requires_region_node() {
        let graph = graph_from(
            r#"{"nodes":[{"id":"vpc-1","resourceType":"vpc","config":{"cidr":"10.0.0.0/16"}}]}"#,
        );
        let result = Validator::new(schema()).validate(&graph);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.kind == ValidationIssueKind::RegionViolation));
    }

    #[test]
    fn test_region_with_parent_rejected() {
        let graph = graph_from(
            r#"{"nodes":[
                {"id":"vpc-1","resourceType":"vpc","config":{"cidr":"10.0.0.0/16"}},
                {"id":"r1","type":"region","config":{"name":"us-east-1"},"parentId":"vpc-1"}
            ]}"#,
        );
        let result = Validator::new(schema()).validate(&graph);
        assert!(!result.valid);
    }

    #[test]
    fn test_invalid_name_characters() {
        let graph = graph_from(
            r#"{"nodes":[
                {"id":"r1","type":"region","config":{"name":"us-east-1"}},
                {"id":"vpc-1","resourceType":"vpc","config":{"cidr":"10.0.0.0/16","name":"bad\nname"}}
            ]}"#,
        );
        let result = Validator::new(schema()).validate(&graph);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.kind == ValidationIssueKind::InvalidName));
    }

    #[test]
    fn test_containment_edge_must_match_parent() {
        let graph = graph_from(
            r#"{"nodes":[
                {"id":"r1","type":"region","config":{"name":"us-east-1"}},
                {"id":"vpc-1","resourceType":"vpc","config":{"cidr":"10.0.0.0/16"}},
                {"id":"other","resourceType":"vpc","config":{"cidr":"10.1.0.0/16"}},
                {"id":"subnet-1","resourceType":"subnet","config":{"cidr":"10.0.1.0/24"},"parentId":"other"}
            ],
            "edges":[{"id":"e1","source":"vpc-1","target":"subnet-1","type":"containment"}]}"#,
        );
        let result = Validator::new(schema()).validate(&graph);
        assert!(!result.valid);
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.kind == ValidationIssueKind::ClassificationMismatch)
        );
    }

    #[test]
    fn test_collects_multiple_violations() {
        let graph = graph_from(
            r#"{"nodes":[
                {"id":"vpc-1","resourceType":"vpc","config":{}},
                {"id":"subnet-1","resourceType":"subnet","config":{}}
            ]}"#,
        );
        let result = Validator::new(schema()).validate(&graph);
        assert!(result.errors.len() >= 3);
    }

    #[test]
    fn test_stop_on_first_truncates() {
        let graph = graph_from(
            r#"{"nodes":[
                {"id":"vpc-1","resourceType":"vpc","config":{}},
                {"id":"subnet-1","resourceType":"subnet","config":{}}
            ]}"#,
        );
        let result = Validator::new(schema()).stop_on_first().validate(&graph);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_empty_schema_skips_provider_checks() {
        let graph = graph_from(
            r#"{"nodes":[{"id":"vpc-1","resourceType":"vpc","config":{}}]}"#,
        );
        let result = Validator::new(ValidationSchema::new()).validate(&graph);
        assert!(result.valid);
    }
}
