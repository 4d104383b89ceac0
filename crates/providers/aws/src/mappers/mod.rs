//! Resource-to-block mappers for AWS.
//!
//! One function per resource type, dispatched through a closed match; the
//! set of types is small and enumerated, so a match table beats virtual
//! dispatch here. Providers remain the open axis via the mapper registry.

mod compute;
mod database;
mod network;
mod storage;

use serde_json::Value as JsonValue;

use skyforge_core::Resource;
use skyforge_hcl::{tf_name, Block, Error, ResourceMapper, Result, Value};

use crate::PROVIDER;

/// The AWS resource mapper.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsMapper;

impl AwsMapper {
    /// Create the mapper.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ResourceMapper for AwsMapper {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn supports_resource(&self, type_name: &str) -> bool {
        matches!(
            type_name,
            "VPC"
                | "Subnet"
                | "EC2"
                | "SecurityGroup"
                | "RouteTable"
                | "InternetGateway"
                | "NATGateway"
                | "ElasticIP"
                | "S3"
                | "LaunchTemplate"
                | "AutoScalingGroup"
                | "RDS"
        )
    }

    fn map_resource(&self, resource: &Resource) -> Result<Vec<Block>> {
        match resource.type_name() {
            "VPC" => network::map_vpc(resource),
            "Subnet" => network::map_subnet(resource),
            "SecurityGroup" => network::map_security_group(resource),
            "RouteTable" => network::map_route_table(resource),
            "InternetGateway" => network::map_internet_gateway(resource),
            "NATGateway" => network::map_nat_gateway(resource),
            "ElasticIP" => network::map_elastic_ip(resource),
            "EC2" => compute::map_instance(resource),
            "LaunchTemplate" => compute::map_launch_template(resource),
            "AutoScalingGroup" => compute::map_autoscaling_group(resource),
            "S3" => storage::map_bucket(resource),
            "RDS" => database::map_db_instance(resource),
            other => Err(Error::UnsupportedResource {
                resource_id: resource.id.clone(),
                resource_type: other.to_string(),
                provider: PROVIDER.to_string(),
            }),
        }
    }
}

/// The Terraform local name of a resource.
pub(crate) fn local_name(resource: &Resource) -> String {
    tf_name(&resource.id)
}

/// First present metadata key as a string. Numbers and booleans stringify,
/// so loosely-typed editor config still lands.
pub(crate) fn meta_string(resource: &Resource, keys: &[&str]) -> Option<String> {
    for key in keys {
        match resource.metadata.get(*key) {
            Some(JsonValue::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(JsonValue::Number(n)) => return Some(n.to_string()),
            Some(JsonValue::Bool(b)) => return Some(b.to_string()),
            _ => {}
        }
    }
    None
}

/// First present metadata key as an integer. Accepts numbers and decimal
/// strings.
pub(crate) fn meta_int(resource: &Resource, keys: &[&str]) -> Option<i64> {
    for key in keys {
        match resource.metadata.get(*key) {
            Some(JsonValue::Number(n)) => return n.as_i64(),
            Some(JsonValue::String(s)) => {
                if let Ok(parsed) = s.parse() {
                    return Some(parsed);
                }
            }
            _ => {}
        }
    }
    None
}

/// First present metadata key as a boolean.
pub(crate) fn meta_flag(resource: &Resource, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|key| resource.meta_bool(key))
}

/// Collects missing required fields so one error names all of them.
pub(crate) struct RequiredFields<'a> {
    resource: &'a Resource,
    missing: Vec<String>,
}

impl<'a> RequiredFields<'a> {
    pub(crate) fn new(resource: &'a Resource) -> Self {
        Self {
            resource,
            missing: Vec::new(),
        }
    }

    /// Require one of `keys`, reported under `label` when absent.
    pub(crate) fn string(&mut self, label: &str, keys: &[&str]) -> Option<String> {
        let found = meta_string(self.resource, keys);
        if found.is_none() {
            self.missing.push(label.to_string());
        }
        found
    }

    /// Require a non-region parent, reported under `label` when absent.
    pub(crate) fn parent(&mut self, label: &str) -> Option<String> {
        let found = self.resource.parent_id.clone();
        if found.is_none() {
            self.missing.push(label.to_string());
        }
        found
    }

    /// Fail with every missing field, or pass.
    pub(crate) fn check(self) -> Result<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(Error::missing_config(
                &self.resource.id,
                self.resource.type_name(),
                self.missing,
            ))
        }
    }
}

/// A traversal referencing another emitted resource's attribute.
pub(crate) fn reference(tf_type: &str, resource_id: &str, attribute: &str) -> Value {
    Value::expr(format!("{tf_type}.{}.{attribute}", tf_name(resource_id)))
}

/// The resolved security-group references of a resource, in config order.
pub(crate) fn security_group_ids(resource: &Resource) -> Vec<String> {
    if let Some(JsonValue::Array(groups)) = resource.metadata.get("securityGroups") {
        return groups
            .iter()
            .filter_map(|group| group.get("id").and_then(JsonValue::as_str))
            .map(ToString::to_string)
            .collect();
    }
    if let Some(JsonValue::Array(ids)) = resource.metadata.get("securityGroupIds") {
        return ids
            .iter()
            .filter_map(JsonValue::as_str)
            .map(ToString::to_string)
            .collect();
    }
    Vec::new()
}
