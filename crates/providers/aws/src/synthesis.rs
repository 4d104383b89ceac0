//! Bounded fallback synthesis of missing collaborators.
//!
//! When a mapped resource demands a collaborator the diagram never drew, a
//! deterministic default is synthesized, wired in through parent and
//! dependency links, tagged `synthesized=true`, and announced through exactly
//! one warning. Synthesis never fires for visual-only resources, and never
//! invents anchors: an instance with no VPC anywhere above it gets nothing.

use serde_json::json;
use tracing::debug;

use skyforge_core::{Architecture, Category, Inventory, Resource, ResourceType};

/// Run every synthesis rule.
pub(crate) fn apply(architecture: &mut Architecture, inventory: &Inventory) {
    synthesize_security_groups(architecture, inventory);
    synthesize_launch_templates(architecture, inventory);
}

/// An EC2 instance without any security-group metadata receives a default
/// security group inside its nearest VPC ancestor.
fn synthesize_security_groups(architecture: &mut Architecture, inventory: &Inventory) {
    let candidates: Vec<(String, String, String)> = architecture
        .resources
        .iter()
        .filter(|resource| {
            resource.type_name() == "EC2"
                && !resource.is_visual_only()
                && !resource.metadata.contains_key("securityGroups")
                && !resource.metadata.contains_key("securityGroupIds")
        })
        .filter_map(|resource| {
            let vpc = architecture
                .ancestors_of(&resource.id)
                .into_iter()
                .find(|ancestor| ancestor.type_name() == "VPC");
            match vpc {
                Some(vpc) => Some((resource.id.clone(), resource.name.clone(), vpc.id.clone())),
                None => {
                    debug!(resource = %resource.id, "no VPC ancestor, skipping security group synthesis");
                    None
                }
            }
        })
        .collect();

    for (instance_id, instance_name, vpc_id) in candidates {
        let sg_id = format!("{instance_id}-default-sg");
        let sg_name = format!("{instance_name}-default-sg");

        let mut sg = Resource {
            id: sg_id.clone(),
            name: sg_name,
            resource_type: security_group_type(inventory),
            provider: architecture.provider.clone(),
            region: architecture.region.clone(),
            parent_id: Some(vpc_id),
            depends_on: Vec::new(),
            metadata: indexmap::IndexMap::new(),
        };
        sg.metadata.insert("synthesized".to_string(), json!(true));
        sg.metadata.insert(
            "description".to_string(),
            json!(format!("Default security group for {instance_name}")),
        );
        architecture.resources.push(sg);

        if let Some(instance) = architecture.resource_mut(&instance_id) {
            instance.depends_on.push(sg_id.clone());
            instance
                .metadata
                .insert("securityGroups".to_string(), json!([{ "id": sg_id }]));
        }
        architecture.push_warning(
            &instance_id,
            format!(
                "EC2 instance '{instance_name}' is missing a security group; synthesized '{sg_id}'"
            ),
        );
    }
}

/// An autoscaling group without a launch-template reference receives a
/// synthesized launch template seeded from the group's own instance config.
fn synthesize_launch_templates(architecture: &mut Architecture, inventory: &Inventory) {
    let candidates: Vec<(String, String)> = architecture
        .resources
        .iter()
        .filter(|resource| {
            resource.type_name() == "AutoScalingGroup"
                && !resource.is_visual_only()
                && !resource.metadata.contains_key("launchTemplateId")
                && !resource.metadata.contains_key("launchTemplate")
        })
        .map(|resource| (resource.id.clone(), resource.name.clone()))
        .collect();

    for (group_id, group_name) in candidates {
        let template_id = format!("{group_id}-launch-template");
        let template_name = format!("{group_name}-launch-template");

        let mut metadata = indexmap::IndexMap::new();
        metadata.insert("synthesized".to_string(), json!(true));
        if let Some(group) = architecture.resource(&group_id) {
            for key in ["ami", "instanceType", "keyName"] {
                if let Some(value) = group.metadata.get(key) {
                    metadata.insert(key.to_string(), value.clone());
                }
            }
        }

        architecture.resources.push(Resource {
            id: template_id.clone(),
            name: template_name,
            resource_type: launch_template_type(inventory),
            provider: architecture.provider.clone(),
            region: architecture.region.clone(),
            parent_id: None,
            depends_on: Vec::new(),
            metadata,
        });

        if let Some(group) = architecture.resource_mut(&group_id) {
            group.depends_on.push(template_id.clone());
            group
                .metadata
                .insert("launchTemplateId".to_string(), json!(template_id));
        }
        architecture.push_warning(
            &group_id,
            format!(
                "AutoScalingGroup '{group_name}' is missing a launch template; synthesized '{template_id}'"
            ),
        );
    }
}

fn security_group_type(inventory: &Inventory) -> ResourceType {
    inventory.by_name("SecurityGroup").cloned().unwrap_or_else(|| {
        ResourceType::regional("security-group", "SecurityGroup", Category::Security, "Firewall")
    })
}

fn launch_template_type(inventory: &Inventory) -> ResourceType {
    inventory.by_name("LaunchTemplate").cloned().unwrap_or_else(|| {
        ResourceType::regional("launch-template", "LaunchTemplate", Category::Compute, "Template")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_inventory;
    use crate::generator::AwsGenerator;
    use skyforge_core::{ArchitectureGenerator, CancellationToken};
    use skyforge_ir::{normalize, parse_diagram};

    fn generate(json: &str) -> Architecture {
        let graph = normalize(&parse_diagram(json.as_bytes()).unwrap()).unwrap();
        AwsGenerator::new()
            .generate(&graph, &default_inventory().unwrap(), &CancellationToken::new())
            .unwrap()
    }

    const EC2_NO_SG: &str = r#"{"nodes":[
        {"id":"region-1","type":"region","config":{"name":"us-east-1"}},
        {"id":"vpc-1","resourceType":"vpc","config":{"cidr":"10.0.0.0/16"}},
        {"id":"subnet-1","resourceType":"subnet","parentId":"vpc-1","config":{"cidr":"10.0.1.0/24"}},
        {"id":"ec2-1","resourceType":"ec2","parentId":"subnet-1",
         "config":{"name":"web","ami":"ami-123","instanceType":"t3.micro"}}
    ]}"#;

    #[test]
    fn test_ec2_without_sg_gets_default() {
        let architecture = generate(EC2_NO_SG);
        let sg = architecture.resource("ec2-1-default-sg").unwrap();
        assert_eq!(sg.type_name(), "SecurityGroup");
        assert_eq!(sg.parent_id.as_deref(), Some("vpc-1"));
        assert!(sg.is_synthesized());

        let ec2 = architecture.resource("ec2-1").unwrap();
        assert!(ec2.depends_on.contains(&"ec2-1-default-sg".to_string()));
        assert_eq!(ec2.metadata["securityGroups"][0]["id"], "ec2-1-default-sg");
    }

    #[test]
    fn test_sg_synthesis_emits_one_warning() {
        let architecture = generate(EC2_NO_SG);
        let matching: Vec<_> = architecture
            .warnings
            .iter()
            .filter(|w| w.message.contains("missing a security group"))
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].resource_id, "ec2-1");
    }

    #[test]
    fn test_ec2_with_sg_untouched() {
        let architecture = generate(
            r#"{"nodes":[
                {"id":"region-1","type":"region","config":{"name":"us-east-1"}},
                {"id":"vpc-1","resourceType":"vpc","config":{"cidr":"10.0.0.0/16"}},
                {"id":"subnet-1","resourceType":"subnet","parentId":"vpc-1","config":{"cidr":"10.0.1.0/24"}},
                {"id":"sg-1","resourceType":"security-group","parentId":"vpc-1","config":{}},
                {"id":"ec2-1","resourceType":"ec2","parentId":"subnet-1",
                 "config":{"ami":"ami-123","instanceType":"t3.micro","securityGroups":[{"id":"sg-1"}]}}
            ]}"#,
        );
        assert!(architecture.resource("ec2-1-default-sg").is_none());
        assert!(architecture.warnings.is_empty());
    }

    #[test]
    fn test_ec2_without_vpc_ancestor_skipped() {
        let architecture = generate(
            r#"{"nodes":[
                {"id":"region-1","type":"region","config":{"name":"us-east-1"}},
                {"id":"ec2-1","resourceType":"ec2","config":{"ami":"ami-123","instanceType":"t3.micro"}}
            ]}"#,
        );
        assert_eq!(architecture.resources.len(), 1);
        assert!(architecture.warnings.is_empty());
    }

    #[test]
    fn test_visual_only_ec2_never_synthesizes() {
        let architecture = generate(
            r#"{"nodes":[
                {"id":"region-1","type":"region","config":{"name":"us-east-1"}},
                {"id":"vpc-1","resourceType":"vpc","config":{"cidr":"10.0.0.0/16"}},
                {"id":"ec2-icon","resourceType":"ec2","parentId":"vpc-1","isVisualOnly":true,"config":{}}
            ]}"#,
        );
        assert_eq!(architecture.resources.len(), 2);
        assert!(architecture.warnings.is_empty());
    }

    #[test]
    fn test_asg_without_template_gets_default() {
        let architecture = generate(
            r#"{"nodes":[
                {"id":"region-1","type":"region","config":{"name":"us-east-1"}},
                {"id":"asg-1","resourceType":"autoscaling-group",
                 "config":{"name":"workers","ami":"ami-456","instanceType":"t3.small","minSize":2}}
            ]}"#,
        );
        let template = architecture.resource("asg-1-launch-template").unwrap();
        assert_eq!(template.type_name(), "LaunchTemplate");
        assert!(template.is_synthesized());
        assert_eq!(template.metadata["ami"], "ami-456");
        assert_eq!(template.metadata["instanceType"], "t3.small");

        let group = architecture.resource("asg-1").unwrap();
        assert!(group.depends_on.contains(&"asg-1-launch-template".to_string()));
        assert_eq!(group.metadata["launchTemplateId"], "asg-1-launch-template");
        assert!(
            architecture
                .warnings
                .iter()
                .any(|w| w.message.contains("missing a launch template"))
        );
    }

    #[test]
    fn test_asg_with_template_untouched() {
        let architecture = generate(
            r#"{"nodes":[
                {"id":"region-1","type":"region","config":{"name":"us-east-1"}},
                {"id":"lt-1","resourceType":"launch-template","config":{"ami":"ami-456"}},
                {"id":"asg-1","resourceType":"autoscaling-group","config":{"launchTemplateId":"lt-1"}}
            ]}"#,
        );
        assert!(architecture.resource("asg-1-launch-template").is_none());
        assert!(architecture.warnings.is_empty());
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let first = generate(EC2_NO_SG);
        let second = generate(EC2_NO_SG);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
