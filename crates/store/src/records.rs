//! Record shapes the gateway persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A compiled project header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    /// Surrogate key.
    pub id: Uuid,
    /// Project display name.
    pub name: String,
    /// Owning user.
    pub user_id: String,
    /// Provider tag.
    pub provider: String,
    /// Deployment region, possibly empty.
    pub region: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ProjectRecord {
    /// Create a record stamped now.
    #[must_use]
    pub fn new(name: &str, user_id: &str, provider: &str, region: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            user_id: user_id.to_string(),
            provider: provider.to_string(),
            region: region.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// One persisted resource row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    /// Surrogate key.
    pub id: Uuid,
    /// Owning project.
    pub project_id: Uuid,
    /// The resource's diagram id.
    pub external_id: String,
    /// Display name.
    pub name: String,
    /// Resolved type name.
    pub resource_type: String,
    /// Deployment region, possibly empty.
    pub region: String,
    /// Metadata snapshot.
    pub metadata: serde_json::Value,
}
