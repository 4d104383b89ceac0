//! Diagram normalizer.
//!
//! Turns a decoded [`DiagramIr`] into a [`DiagramGraph`]: nodes keyed by id,
//! edge classifications resolved, and the containment view made consistent.
//! The normalizer never mutates its input and is idempotent.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{DiagramGraph, Edge, EdgeKind, Node};
use crate::model::DiagramIr;

/// Normalize a decoded diagram into a graph.
///
/// Containment edges fill in a missing `parent_id` on their target node, so
/// both representations agree after normalization; a conflicting `parent_id`
/// is left in place for the validator to report.
///
/// # Errors
///
/// - [`Error::DuplicateNodeId`] when two nodes share an id
/// - [`Error::DanglingParent`] when a `parentId` does not resolve
/// - [`Error::DanglingEdge`] when an edge endpoint does not resolve
/// - [`Error::ContainmentCycle`] when the parent relation is cyclic
pub fn normalize(ir: &DiagramIr) -> Result<DiagramGraph> {
    let mut nodes: IndexMap<String, Node> = IndexMap::with_capacity(ir.nodes.len());
    for ir_node in &ir.nodes {
        if nodes.contains_key(&ir_node.id) {
            return Err(Error::DuplicateNodeId {
                node_id: ir_node.id.clone(),
            });
        }
        nodes.insert(ir_node.id.clone(), Node::from(ir_node));
    }

    let mut edges = Vec::with_capacity(ir.edges.len());
    for ir_edge in &ir.edges {
        for endpoint in [&ir_edge.source, &ir_edge.target] {
            if !nodes.contains_key(endpoint) {
                return Err(Error::DanglingEdge {
                    edge_id: ir_edge.id.clone(),
                    endpoint: endpoint.clone(),
                });
            }
        }
        edges.push(Edge {
            id: ir_edge.id.clone(),
            source: ir_edge.source.clone(),
            target: ir_edge.target.clone(),
            kind: EdgeKind::parse(&ir_edge.kind),
        });
    }

    // Mirror containment edges into parent ids where the node has none.
    let mut implied_parents: Vec<(String, String)> = Vec::new();
    for edge in &edges {
        if edge.kind == EdgeKind::Containment {
            let child = &nodes[&edge.target];
            if child.parent_id.is_none() {
                implied_parents.push((edge.target.clone(), edge.source.clone()));
            }
        }
    }
    for (child, parent) in implied_parents {
        debug!(%child, %parent, "containment edge implies parent");
        if let Some(node) = nodes.get_mut(&child) {
            node.parent_id = Some(parent);
        }
    }

    for node in nodes.values() {
        if let Some(parent_id) = &node.parent_id
            && !nodes.contains_key(parent_id)
        {
            return Err(Error::DanglingParent {
                node_id: node.id.clone(),
                parent_id: parent_id.clone(),
            });
        }
    }

    check_containment_acyclic(&nodes)?;

    Ok(DiagramGraph {
        nodes,
        edges,
        variables: ir.variables.clone(),
        outputs: ir.outputs.clone(),
    })
}

/// Walk every parent chain; a revisited node on the current walk is a cycle.
fn check_containment_acyclic(nodes: &IndexMap<String, Node>) -> Result<()> {
    for start in nodes.values() {
        let mut seen = vec![start.id.as_str()];
        let mut current = start;
        while let Some(parent_id) = &current.parent_id {
            if seen.contains(&parent_id.as_str()) {
                let mut cycle: Vec<String> = seen.iter().map(ToString::to_string).collect();
                cycle.push(parent_id.clone());
                return Err(Error::ContainmentCycle { cycle });
            }
            seen.push(parent_id);
            match nodes.get(parent_id) {
                Some(parent) => current = parent,
                None => break,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_diagram;

    fn ir_from(json: &str) -> DiagramIr {
        parse_diagram(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_normalize_keys_nodes_by_id() {
        let ir = ir_from(r#"{"nodes":[{"id":"a"},{"id":"b"}]}"#);
        let graph = normalize(&ir).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert!(graph.node("a").is_some());
        assert!(graph.node("b").is_some());
    }

    #[test]
    fn test_normalize_rejects_duplicate_ids() {
        let ir = ir_from(r#"{"nodes":[{"id":"a"},{"id":"a"}]}"#);
        let err = normalize(&ir).unwrap_err();
        assert!(matches!(err, Error::DuplicateNodeId { node_id } if node_id == "a"));
    }

    #[test]
    fn test_normalize_rejects_dangling_parent() {
        let ir = ir_from(r#"{"nodes":[{"id":"a","parentId":"ghost"}]}"#);
        let err = normalize(&ir).unwrap_err();
        assert!(matches!(err, Error::DanglingParent { parent_id, .. } if parent_id == "ghost"));
    }

    #[test]
    fn test_normalize_rejects_dangling_edge() {
        let ir = ir_from(
            r#"{"nodes":[{"id":"a"}],"edges":[{"id":"e1","source":"a","target":"ghost","type":"dependency"}]}"#,
        );
        let err = normalize(&ir).unwrap_err();
        assert!(matches!(err, Error::DanglingEdge { endpoint, .. } if endpoint == "ghost"));
    }

    #[test]
    fn test_normalize_unknown_edge_kind_defaults_to_dependency() {
        let ir = ir_from(
            r#"{"nodes":[{"id":"a"},{"id":"b"}],"edges":[{"id":"e1","source":"a","target":"b","type":"mystery"}]}"#,
        );
        let graph = normalize(&ir).unwrap();
        assert_eq!(graph.edges[0].kind, EdgeKind::Dependency);
    }

    #[test]
    fn test_normalize_containment_edge_fills_parent() {
        let ir = ir_from(
            r#"{"nodes":[{"id":"vpc"},{"id":"subnet"}],"edges":[{"id":"e1","source":"vpc","target":"subnet","type":"containment"}]}"#,
        );
        let graph = normalize(&ir).unwrap();
        assert_eq!(graph.node("subnet").unwrap().parent_id.as_deref(), Some("vpc"));
    }

    #[test]
    fn test_normalize_containment_edge_keeps_conflicting_parent() {
        // A conflicting parent id is the validator's problem, not ours.
        let ir = ir_from(
            r#"{"nodes":[{"id":"vpc"},{"id":"other"},{"id":"subnet","parentId":"other"}],
                "edges":[{"id":"e1","source":"vpc","target":"subnet","type":"containment"}]}"#,
        );
        let graph = normalize(&ir).unwrap();
        assert_eq!(graph.node("subnet").unwrap().parent_id.as_deref(), Some("other"));
    }

    #[test]
    fn test_normalize_rejects_containment_cycle() {
        let ir = ir_from(
            r#"{"nodes":[{"id":"a","parentId":"b"},{"id":"b","parentId":"a"}]}"#,
        );
        let err = normalize(&ir).unwrap_err();
        assert!(matches!(err, Error::ContainmentCycle { .. }));
    }

    #[test]
    fn test_normalize_self_containment_is_a_cycle() {
        let ir = ir_from(r#"{"nodes":[{"id":"a","parentId":"a"}]}"#);
        let err = normalize(&ir).unwrap_err();
        assert!(matches!(err, Error::ContainmentCycle { .. }));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let ir = ir_from(
            r#"{"nodes":[{"id":"vpc","resourceType":"vpc"},{"id":"subnet","resourceType":"subnet"}],
                "edges":[{"id":"e1","source":"vpc","target":"subnet","type":"containment"},
                         {"id":"e2","source":"subnet","target":"vpc","type":"weird"}]}"#,
        );
        let once = normalize(&ir).unwrap();
        let twice = normalize(&once.to_ir()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_does_not_mutate_input() {
        let ir = ir_from(
            r#"{"nodes":[{"id":"vpc"},{"id":"subnet"}],"edges":[{"id":"e1","source":"vpc","target":"subnet","type":"containment"}]}"#,
        );
        let before = ir.clone();
        let _ = normalize(&ir).unwrap();
        assert_eq!(ir, before);
    }
}
