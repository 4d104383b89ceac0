//! Serde models for the external diagram document.
//!
//! These types mirror the wire format one-to-one and do not interpret
//! `resourceType` semantically; resolution against a provider inventory
//! happens later, during architecture generation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node descriptor as sent by the editor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IrNode {
    /// Unique node id within the document.
    pub id: String,
    /// Node kind, e.g. `resource` or `region`.
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Resource type tag in IR form (kebab-case or an alias).
    #[serde(default)]
    pub resource_type: String,
    /// Display label from the canvas.
    #[serde(default)]
    pub label: String,
    /// Free-form configuration mapping.
    #[serde(default)]
    pub config: IndexMap<String, Value>,
    /// Canvas position.
    #[serde(default)]
    pub position: Position,
    /// Containing node, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Whether the node is decoration only and carries no provisioned resource.
    #[serde(default)]
    pub is_visual_only: bool,
}

/// Canvas position of a node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// An edge descriptor as sent by the editor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IrEdge {
    /// Unique edge id.
    pub id: String,
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Edge classification tag; unknown values normalize to `dependency`.
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// An input variable declaration, passed through to the emitted IaC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VariableDecl {
    /// Variable name.
    pub name: String,
    /// Type expression, rendered unquoted (e.g. `string`, `list(string)`).
    #[serde(default, rename = "type")]
    pub type_expr: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Default value, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Whether the value is sensitive.
    #[serde(default)]
    pub sensitive: bool,
}

/// An output declaration, passed through to the emitted IaC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutputDecl {
    /// Output name.
    pub name: String,
    /// Value expression, typically a resource traversal.
    pub value: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Whether the value is sensitive.
    #[serde(default)]
    pub sensitive: bool,
}

/// The decoded diagram document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagramIr {
    /// Node descriptors in document order.
    pub nodes: Vec<IrNode>,
    /// Edge descriptors in document order.
    #[serde(default)]
    pub edges: Vec<IrEdge>,
    /// Input variable declarations.
    #[serde(default)]
    pub variables: Vec<VariableDecl>,
    /// Output declarations.
    #[serde(default)]
    pub outputs: Vec<OutputDecl>,
}
