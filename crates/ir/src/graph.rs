//! Normalized diagram graph.
//!
//! The graph is the view the rest of the pipeline works from: nodes keyed by
//! id, edges carrying a resolved classification, and variables/outputs passed
//! through from the document.

use indexmap::IndexMap;
use serde_json::Value;

use crate::model::{DiagramIr, IrEdge, IrNode, OutputDecl, Position, VariableDecl};

/// Classification of a diagram edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Provisioning-order dependency between two resources.
    Dependency,
    /// Containment of the target inside the source.
    Containment,
    /// Purely visual connection with no provisioning meaning.
    Visual,
}

impl EdgeKind {
    /// Parse a classification tag. Unknown tags default to `Dependency`.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag {
            "containment" => Self::Containment,
            "visual" => Self::Visual,
            _ => Self::Dependency,
        }
    }

    /// The canonical tag for this classification.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dependency => "dependency",
            Self::Containment => "containment",
            Self::Visual => "visual",
        }
    }
}

/// A normalized node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique node id.
    pub id: String,
    /// Node kind, e.g. `resource` or `region`.
    pub kind: String,
    /// Resource type tag in IR form.
    pub resource_type: String,
    /// Display label.
    pub label: String,
    /// Free-form configuration mapping.
    pub config: IndexMap<String, Value>,
    /// Canvas x coordinate.
    pub position_x: f64,
    /// Canvas y coordinate.
    pub position_y: f64,
    /// Containing node, if any.
    pub parent_id: Option<String>,
    /// Whether the node is decoration only.
    pub is_visual_only: bool,
}

impl Node {
    /// Whether this node represents a deployment region rather than a resource.
    #[must_use]
    pub fn is_region(&self) -> bool {
        self.kind == "region" || self.resource_type == "region"
    }

    /// The configured name, if present and a string.
    #[must_use]
    pub fn config_name(&self) -> Option<&str> {
        self.config.get("name").and_then(Value::as_str)
    }
}

impl From<&IrNode> for Node {
    fn from(node: &IrNode) -> Self {
        Self {
            id: node.id.clone(),
            kind: node.kind.clone(),
            resource_type: node.resource_type.clone(),
            label: node.label.clone(),
            config: node.config.clone(),
            position_x: node.position.x,
            position_y: node.position.y,
            parent_id: node.parent_id.clone(),
            is_visual_only: node.is_visual_only,
        }
    }
}

/// A normalized edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Unique edge id.
    pub id: String,
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Resolved classification.
    pub kind: EdgeKind,
}

/// The normalized diagram graph.
///
/// Containment is represented twice: through [`Node::parent_id`] and through
/// `containment`-classified edges. The normalizer makes the two views agree
/// where it can; the validator reports any remaining disagreement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiagramGraph {
    /// Nodes keyed by id, in document order.
    pub nodes: IndexMap<String, Node>,
    /// Edges in document order.
    pub edges: Vec<Edge>,
    /// Input variable declarations, passed through.
    pub variables: Vec<VariableDecl>,
    /// Output declarations, passed through.
    pub outputs: Vec<OutputDecl>,
}

impl DiagramGraph {
    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// The region node, if the diagram has one.
    #[must_use]
    pub fn region_node(&self) -> Option<&Node> {
        self.nodes.values().find(|n| n.is_region())
    }

    /// Iterate nodes that are not the region, in document order.
    pub fn resource_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| !n.is_region())
    }

    /// Outgoing dependency-classified edges of a node.
    pub fn dependency_edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges
            .iter()
            .filter(move |e| e.kind == EdgeKind::Dependency && e.source == id)
    }

    /// Rebuild a document from this graph.
    ///
    /// The result decodes and normalizes back to a structurally identical
    /// graph, which is what makes normalization observably idempotent.
    #[must_use]
    pub fn to_ir(&self) -> DiagramIr {
        DiagramIr {
            nodes: self
                .nodes
                .values()
                .map(|n| IrNode {
                    id: n.id.clone(),
                    kind: n.kind.clone(),
                    resource_type: n.resource_type.clone(),
                    label: n.label.clone(),
                    config: n.config.clone(),
                    position: Position {
                        x: n.position_x,
                        y: n.position_y,
                    },
                    parent_id: n.parent_id.clone(),
                    is_visual_only: n.is_visual_only,
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|e| IrEdge {
                    id: e.id.clone(),
                    source: e.source.clone(),
                    target: e.target.clone(),
                    kind: e.kind.as_str().to_string(),
                })
                .collect(),
            variables: self.variables.clone(),
            outputs: self.outputs.clone(),
        }
    }
}
