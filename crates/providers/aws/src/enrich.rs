//! Cross-resource metadata enrichment.
//!
//! One pass over the ordered resource sequence that writes reserved
//! (`_`-prefixed) metadata keys: parent names, normalized security-group
//! references, route-table-derived subnet publicness, parent-subnet state for
//! subnet-hosted resources, and dependency manifests. The pass reads user
//! config and writes only reserved keys, so running it twice is a no-op.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::debug;

use skyforge_core::Architecture;

/// Run the enrichment pass.
pub(crate) fn apply(architecture: &mut Architecture, order: &[String]) {
    write_parent_names(architecture, order);
    resolve_security_groups(architecture, order);
    let subnet_public = compute_subnet_publicness(architecture);
    write_subnet_flags(architecture, order, &subnet_public);
    write_parent_subnet_state(architecture, order, &subnet_public);
    write_dependency_manifests(architecture, order);
    debug!(resources = order.len(), "enrichment finished");
}

fn write_parent_names(architecture: &mut Architecture, order: &[String]) {
    let updates: Vec<(String, String)> = order
        .iter()
        .filter_map(|id| {
            let parent = architecture.parent_of(id)?;
            Some((id.clone(), parent.name.clone()))
        })
        .collect();
    for (id, parent_name) in updates {
        if let Some(resource) = architecture.resource_mut(&id) {
            resource
                .metadata
                .insert("_parentName".to_string(), json!(parent_name));
        }
    }
}

/// Rewrite security-group references through the metadata-id map.
///
/// Security groups drawn on a canvas may be referenced by an editor-internal
/// id carried in their config rather than by node id; the map sends both
/// forms to the resource id. The identity entries keep the rewrite
/// idempotent.
fn resolve_security_groups(architecture: &mut Architecture, order: &[String]) {
    let mut id_map: HashMap<String, String> = HashMap::new();
    let mut names: HashMap<String, String> = HashMap::new();
    for resource in &architecture.resources {
        if resource.type_name() == "SecurityGroup" {
            if let Some(meta_id) = resource.meta_str("id") {
                id_map.insert(meta_id.to_string(), resource.id.clone());
            }
            id_map.insert(resource.id.clone(), resource.id.clone());
            names.insert(resource.id.clone(), resource.name.clone());
        }
    }
    if id_map.is_empty() {
        return;
    }

    for id in order {
        let Some(resource) = architecture.resource_mut(id) else {
            continue;
        };

        let mut resolved: Vec<String> = Vec::new();
        if let Some(Value::Array(groups)) = resource.metadata.get_mut("securityGroups") {
            for group in groups.iter_mut() {
                let Some(reference) = group.get("id").and_then(Value::as_str) else {
                    continue;
                };
                if let Some(mapped) = id_map.get(reference) {
                    let mapped = mapped.clone();
                    group["id"] = json!(mapped);
                    resolved.push(mapped);
                }
            }
        } else if let Some(Value::Array(ids)) = resource.metadata.get_mut("securityGroupIds") {
            for reference in ids.iter_mut() {
                let Some(raw) = reference.as_str() else {
                    continue;
                };
                if let Some(mapped) = id_map.get(raw) {
                    let mapped = mapped.clone();
                    *reference = json!(mapped);
                    resolved.push(mapped);
                }
            }
        }

        if !resolved.is_empty() {
            let mut by_name = IndexMap::new();
            for sg_id in resolved {
                if let Some(name) = names.get(&sg_id) {
                    by_name.insert(sg_id, json!(name));
                }
            }
            resource
                .metadata
                .insert("_securityGroupNames".to_string(), Value::Object(by_name.into_iter().collect()));
        }
    }
}

/// Subnet id to publicness, derived from route tables.
///
/// A route table makes its associated subnets public iff any of its routes
/// targets an internet gateway. Publicness unions across route tables.
fn compute_subnet_publicness(architecture: &Architecture) -> HashMap<String, bool> {
    let mut public: HashMap<String, bool> = HashMap::new();
    for resource in &architecture.resources {
        if resource.type_name() != "RouteTable" {
            continue;
        }
        let has_igw_route = resource
            .metadata
            .get("routes")
            .and_then(Value::as_array)
            .is_some_and(|routes| {
                routes.iter().any(|route| {
                    route
                        .get("target")
                        .and_then(|t| t.get("type"))
                        .and_then(Value::as_str)
                        == Some("InternetGateway")
                })
            });
        for subnet_id in association_ids(resource.metadata.get("subnetAssociations"))
            .into_iter()
            .chain(association_ids(resource.metadata.get("associations")))
        {
            let entry = public.entry(subnet_id).or_insert(false);
            *entry = *entry || has_igw_route;
        }
    }
    public
}

/// Subnet association entries are either plain id strings or `{id}` objects.
fn association_ids(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    entry
                        .as_str()
                        .or_else(|| entry.get("id").and_then(Value::as_str))
                        .map(ToString::to_string)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn write_subnet_flags(
    architecture: &mut Architecture,
    order: &[String],
    subnet_public: &HashMap<String, bool>,
) {
    for id in order {
        let Some(resource) = architecture.resource_mut(id) else {
            continue;
        };
        if resource.type_name() != "Subnet" {
            continue;
        }
        let public = subnet_public.get(id).copied().unwrap_or_else(|| {
            resource
                .meta_bool("isPublic")
                .or_else(|| resource.meta_bool("map_public_ip_on_launch"))
                .or_else(|| resource.meta_bool("mapPublicIpOnLaunch"))
                .unwrap_or_else(|| resource.name.to_lowercase().contains("public"))
        });
        resource
            .metadata
            .insert("_isPublicByRouteTable".to_string(), json!(public));
    }
}

fn write_parent_subnet_state(
    architecture: &mut Architecture,
    order: &[String],
    subnet_public: &HashMap<String, bool>,
) {
    let updates: Vec<(String, String, String, bool)> = order
        .iter()
        .filter_map(|id| {
            let parent = architecture.parent_of(id)?;
            if parent.type_name() != "Subnet" {
                return None;
            }
            let public = parent
                .meta_bool("_isPublicByRouteTable")
                .or_else(|| subnet_public.get(&parent.id).copied())
                .unwrap_or(false);
            Some((id.clone(), parent.id.clone(), parent.name.clone(), public))
        })
        .collect();

    for (id, _, subnet_name, public) in updates {
        if let Some(resource) = architecture.resource_mut(&id) {
            resource
                .metadata
                .insert("_subnetName".to_string(), json!(subnet_name.clone()));
            resource
                .metadata
                .insert("_parentSubnetName".to_string(), json!(subnet_name));
            resource
                .metadata
                .insert("_parentSubnetIsPublic".to_string(), json!(public));
        }
    }
}

fn write_dependency_manifests(architecture: &mut Architecture, order: &[String]) {
    let updates: Vec<(String, Value)> = order
        .iter()
        .filter_map(|id| {
            let resource = architecture.resource(id)?;
            if resource.depends_on.is_empty() {
                return None;
            }
            let manifest: Vec<Value> = resource
                .depends_on
                .iter()
                .filter_map(|dep_id| {
                    let dep = architecture.resource(dep_id)?;
                    Some(json!({ "id": dep.id, "type": dep.type_name(), "name": dep.name }))
                })
                .collect();
            Some((id.clone(), Value::Array(manifest)))
        })
        .collect();
    for (id, manifest) in updates {
        if let Some(resource) = architecture.resource_mut(&id) {
            resource.metadata.insert("_dependsOn".to_string(), manifest);
        }
    }
}
