//! Domain resources and their types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Functional category of a resource type. Closed set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    /// VPCs, subnets, gateways, route tables.
    Networking,
    /// Instances, autoscaling, serverless compute.
    Compute,
    /// Object and block storage.
    Storage,
    /// Managed database services.
    Database,
    /// Container orchestration and registries.
    Containers,
    /// Identity and access management.
    #[serde(rename = "IAM")]
    Iam,
    /// Metrics, logs and alarms.
    Monitoring,
    /// Security groups, firewalls, key management.
    Security,
    /// Data processing and analytics.
    Analytics,
    /// Application-level services (queues, notification, app hosts).
    Application,
    /// Decorative canvas elements with no provisioned counterpart.
    Visual,
}

/// A classified resource type from a provider inventory.
///
/// For inventory-registered types, exactly one of `is_regional` and
/// `is_global` is true; the constructors enforce it. The synthesized
/// [`ResourceType::visual_icon`] type sets neither, since an icon has no
/// deployment scope at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceType {
    /// Kebab-case identifier, matching the IR type tag.
    pub id: String,
    /// PascalCase display name, unique within a provider.
    pub name: String,
    /// Functional category.
    pub category: Category,
    /// Sub-kind within the category (e.g. `Instance`, `Gateway`).
    pub kind: String,
    /// Whether the type deploys into a region.
    pub is_regional: bool,
    /// Whether the type is global to the account.
    pub is_global: bool,
}

impl ResourceType {
    /// Create a regional type.
    #[must_use]
    pub fn regional(id: &str, name: &str, category: Category, kind: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            kind: kind.to_string(),
            is_regional: true,
            is_global: false,
        }
    }

    /// Create a global type.
    #[must_use]
    pub fn global(id: &str, name: &str, category: Category, kind: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            kind: kind.to_string(),
            is_regional: false,
            is_global: true,
        }
    }

    /// The type synthesized for visual-only nodes whose tag resolves to nothing.
    #[must_use]
    pub fn visual_icon(ir_type: &str) -> Self {
        Self {
            id: ir_type.to_string(),
            name: "VisualElement".to_string(),
            category: Category::Visual,
            kind: "Icon".to_string(),
            is_regional: false,
            is_global: false,
        }
    }

    /// Whether `tag` matches this type's name or kind.
    #[must_use]
    pub fn matches(&self, tag: &str) -> bool {
        self.name == tag || self.kind == tag
    }
}

/// A cloud resource inside a single architecture.
///
/// Resources are owned exclusively by their enclosing [`Architecture`]; they
/// have no identity outside one compile. Metadata carries the original node
/// config plus engine-reserved keys, which always start with `_`.
///
/// [`Architecture`]: crate::Architecture
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Stable resource id, equal to the originating node id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Resolved type.
    pub resource_type: ResourceType,
    /// Owning provider tag.
    pub provider: String,
    /// Deployment region, empty when the diagram has none.
    pub region: String,
    /// Containing resource, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Ids of resources this one depends on.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Original config plus engine-reserved (`_`-prefixed) keys.
    #[serde(default)]
    pub metadata: IndexMap<String, Value>,
}

impl Resource {
    /// The resolved type's PascalCase name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.resource_type.name
    }

    /// Whether this resource is decoration only.
    #[must_use]
    pub fn is_visual_only(&self) -> bool {
        self.resource_type.category == Category::Visual
            || self
                .metadata
                .get("isVisualOnly")
                .and_then(Value::as_bool)
                .unwrap_or(false)
    }

    /// Whether this resource was synthesized by a fallback rule rather than
    /// drawn by the user.
    #[must_use]
    pub fn is_synthesized(&self) -> bool {
        self.metadata
            .get("synthesized")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// A metadata value as a string, if present and a string.
    #[must_use]
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// A metadata value as a bool. Accepts JSON booleans and the literal
    /// strings `"true"`/`"false"` that diagram editors tend to send.
    #[must_use]
    pub fn meta_bool(&self, key: &str) -> Option<bool> {
        match self.metadata.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}
