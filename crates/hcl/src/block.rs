//! The emitter's block model.
//!
//! A [`Block`] is one top-level HCL construct; a [`Value`] is a tagged
//! variant over the scalar, collection and traversal shapes HCL attributes
//! can take. Traversals ([`Value::Expr`]) are trusted token sequences and
//! must never collapse into quoted literals.

use indexmap::IndexMap;
use serde_json::Number;

/// Kind of a top-level block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `resource "type" "name" { ... }`
    Resource,
    /// `provider "name" { ... }`
    Provider,
    /// `data "type" "name" { ... }`
    Data,
    /// `output "name" { ... }`
    Output,
    /// `variable "name" { ... }`
    Variable,
}

impl BlockKind {
    /// The HCL keyword for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Provider => "provider",
            Self::Data => "data",
            Self::Output => "output",
            Self::Variable => "variable",
        }
    }
}

/// An attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A quoted string.
    Str(String),
    /// A number, rendered in its shortest decimal form.
    Num(Number),
    /// A boolean.
    Bool(bool),
    /// A list; elements render one per line.
    List(Vec<Value>),
    /// A map; keys render sorted.
    Map(IndexMap<String, Value>),
    /// A raw traversal such as `aws_vpc.main.id`, rendered unquoted.
    Expr(String),
}

impl Value {
    /// Convenience constructor for a string value.
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// Convenience constructor for an integer value.
    #[must_use]
    pub fn int(n: i64) -> Self {
        Self::Num(Number::from(n))
    }

    /// Convenience constructor for a traversal expression.
    pub fn expr(e: impl Into<String>) -> Self {
        Self::Expr(e.into())
    }

    /// Convert a JSON value from resource metadata.
    ///
    /// Nulls become empty strings; there is no null in the attribute model.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Str(String::new()),
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => Self::Num(n.clone()),
            serde_json::Value::String(s) => Self::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Self::List(items.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}

/// A nested block inside a top-level block, e.g. an `ingress` stanza.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NestedBlock {
    /// Block keyword.
    pub kind: String,
    /// Optional labels after the keyword.
    pub labels: Vec<String>,
    /// Attributes; rendered sorted by key.
    pub attributes: IndexMap<String, Value>,
}

impl NestedBlock {
    /// Create an empty nested block.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            labels: Vec::new(),
            attributes: IndexMap::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// One top-level HCL construct.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Block kind.
    pub kind: BlockKind,
    /// Labels after the keyword, each rendered quoted.
    pub labels: Vec<String>,
    /// Attributes; rendered sorted by key.
    pub attributes: IndexMap<String, Value>,
    /// Nested blocks; rendered after attributes, sorted by kind then by
    /// insertion order within a kind.
    pub nested: Vec<NestedBlock>,
}

impl Block {
    /// Create a `resource` block.
    pub fn resource(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Resource,
            labels: vec![resource_type.into(), name.into()],
            attributes: IndexMap::new(),
            nested: Vec::new(),
        }
    }

    /// Create a `provider` block.
    pub fn provider(name: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Provider,
            labels: vec![name.into()],
            attributes: IndexMap::new(),
            nested: Vec::new(),
        }
    }

    /// Create a `variable` block.
    pub fn variable(name: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Variable,
            labels: vec![name.into()],
            attributes: IndexMap::new(),
            nested: Vec::new(),
        }
    }

    /// Create an `output` block.
    pub fn output(name: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Output,
            labels: vec![name.into()],
            attributes: IndexMap::new(),
            nested: Vec::new(),
        }
    }

    /// Create a `data` block.
    pub fn data(data_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Data,
            labels: vec![data_type.into(), name.into()],
            attributes: IndexMap::new(),
            nested: Vec::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Add an attribute only when `value` is `Some`.
    #[must_use]
    pub fn attr_opt(mut self, key: impl Into<String>, value: Option<Value>) -> Self {
        if let Some(value) = value {
            self.attributes.insert(key.into(), value);
        }
        self
    }

    /// Add a nested block.
    #[must_use]
    pub fn nested(mut self, block: NestedBlock) -> Self {
        self.nested.push(block);
        self
    }

    /// The standard `tags = { Name = ... }` map.
    #[must_use]
    pub fn tagged(self, name: &str) -> Self {
        let mut tags = IndexMap::new();
        tags.insert("Name".to_string(), Value::str(name));
        self.attr("tags", Value::Map(tags))
    }
}
