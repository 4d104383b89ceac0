//! Networking resource mappers.

use serde_json::Value as JsonValue;
use tracing::debug;

use skyforge_core::Resource;
use skyforge_hcl::{parse_port_range, Block, Error, Result, Value};

use super::{local_name, meta_flag, meta_string, reference, RequiredFields};

pub(crate) fn map_vpc(resource: &Resource) -> Result<Vec<Block>> {
    let mut required = RequiredFields::new(resource);
    let cidr = required.string("cidr", &["cidr", "cidrBlock"]);
    required.check()?;

    let block = Block::resource("aws_vpc", local_name(resource))
        .attr("cidr_block", Value::str(cidr.unwrap_or_default()))
        .attr_opt(
            "enable_dns_hostnames",
            meta_flag(resource, &["enableDnsHostnames", "enable_dns_hostnames"]).map(Value::Bool),
        )
        .attr_opt(
            "enable_dns_support",
            meta_flag(resource, &["enableDnsSupport", "enable_dns_support"]).map(Value::Bool),
        )
        .attr_opt(
            "instance_tenancy",
            meta_string(resource, &["instanceTenancy"]).map(Value::str),
        )
        .tagged(&resource.name);
    Ok(vec![block])
}

pub(crate) fn map_subnet(resource: &Resource) -> Result<Vec<Block>> {
    let mut required = RequiredFields::new(resource);
    let cidr = required.string("cidr", &["cidr", "cidrBlock"]);
    let vpc = required.parent("vpc");
    required.check()?;

    let block = Block::resource("aws_subnet", local_name(resource))
        .attr(
            "vpc_id",
            reference("aws_vpc", &vpc.unwrap_or_default(), "id"),
        )
        .attr("cidr_block", Value::str(cidr.unwrap_or_default()))
        .attr_opt(
            "availability_zone",
            meta_string(resource, &["availabilityZone", "availabilityZoneId", "az"]).map(Value::str),
        )
        .attr_opt(
            "map_public_ip_on_launch",
            meta_flag(resource, &["mapPublicIpOnLaunch", "map_public_ip_on_launch"])
                .map(Value::Bool),
        )
        .tagged(&resource.name);
    Ok(vec![block])
}

pub(crate) fn map_security_group(resource: &Resource) -> Result<Vec<Block>> {
    let mut required = RequiredFields::new(resource);
    let vpc = required.parent("vpc");
    required.check()?;

    let name = local_name(resource);
    let description = meta_string(resource, &["description"])
        .unwrap_or_else(|| format!("Security group for {}", resource.name));

    let base = Block::resource("aws_security_group", &name)
        .attr("name", Value::str(&resource.name))
        .attr("description", Value::str(description))
        .attr(
            "vpc_id",
            reference("aws_vpc", &vpc.unwrap_or_default(), "id"),
        )
        .tagged(&resource.name);

    let mut blocks = vec![base];
    if let Some(JsonValue::Array(rules)) = resource.metadata.get("rules") {
        for (index, rule) in rules.iter().enumerate() {
            blocks.push(map_security_group_rule(resource, &name, index, rule)?);
        }
    }
    Ok(blocks)
}

fn map_security_group_rule(
    resource: &Resource,
    sg_name: &str,
    index: usize,
    rule: &JsonValue,
) -> Result<Block> {
    let direction = rule
        .get("type")
        .or_else(|| rule.get("direction"))
        .and_then(JsonValue::as_str)
        .unwrap_or("ingress");
    let protocol = rule
        .get("protocol")
        .and_then(JsonValue::as_str)
        .unwrap_or("tcp");

    let port_range = rule
        .get("portRange")
        .and_then(JsonValue::as_str)
        .map(|raw| {
            parse_port_range(raw).ok_or_else(|| Error::invalid_value(&resource.id, "portRange", raw))
        })
        .transpose()?
        .or_else(|| {
            let from = rule.get("fromPort").and_then(JsonValue::as_u64)?;
            let to = rule.get("toPort").and_then(JsonValue::as_u64).unwrap_or(from);
            Some((u16::try_from(from).ok()?, u16::try_from(to).ok()?))
        });
    let (from_port, to_port) = port_range.unwrap_or((0, 0));

    let cidr_blocks: Vec<Value> = rule
        .get("cidrBlocks")
        .and_then(JsonValue::as_array)
        .map(|cidrs| {
            cidrs
                .iter()
                .filter_map(JsonValue::as_str)
                .map(Value::str)
                .collect()
        })
        .or_else(|| {
            rule.get("cidr")
                .and_then(JsonValue::as_str)
                .map(|cidr| vec![Value::str(cidr)])
        })
        .unwrap_or_else(|| vec![Value::str("0.0.0.0/0")]);

    Ok(
        Block::resource("aws_security_group_rule", format!("{sg_name}_rule_{index}"))
            .attr("type", Value::str(direction))
            .attr("from_port", Value::int(i64::from(from_port)))
            .attr("to_port", Value::int(i64::from(to_port)))
            .attr("protocol", Value::str(protocol))
            .attr("cidr_blocks", Value::List(cidr_blocks))
            .attr(
                "security_group_id",
                Value::expr(format!("aws_security_group.{sg_name}.id")),
            ),
    )
}

pub(crate) fn map_route_table(resource: &Resource) -> Result<Vec<Block>> {
    if meta_flag(resource, &["isMain", "main"]).unwrap_or(false) {
        // The cloud creates main route tables implicitly.
        debug!(resource = %resource.id, "suppressing main route table");
        return Ok(vec![]);
    }

    let mut required = RequiredFields::new(resource);
    let vpc = required.parent("vpc");
    required.check()?;

    let name = local_name(resource);
    let mut blocks = vec![
        Block::resource("aws_route_table", &name)
            .attr(
                "vpc_id",
                reference("aws_vpc", &vpc.unwrap_or_default(), "id"),
            )
            .tagged(&resource.name),
    ];

    if let Some(JsonValue::Array(routes)) = resource.metadata.get("routes") {
        for (index, route) in routes.iter().enumerate() {
            if let Some(block) = map_route(&name, index, route) {
                blocks.push(block);
            }
        }
    }

    let associations = resource
        .metadata
        .get("subnetAssociations")
        .or_else(|| resource.metadata.get("associations"));
    if let Some(JsonValue::Array(entries)) = associations {
        for (index, entry) in entries.iter().enumerate() {
            let Some(subnet_id) = entry
                .as_str()
                .or_else(|| entry.get("id").and_then(JsonValue::as_str))
            else {
                continue;
            };
            blocks.push(
                Block::resource("aws_route_table_association", format!("{name}_assoc_{index}"))
                    .attr("subnet_id", reference("aws_subnet", subnet_id, "id"))
                    .attr("route_table_id", Value::expr(format!("aws_route_table.{name}.id"))),
            );
        }
    }
    Ok(blocks)
}

/// A single `aws_route` block. Local routes return `None`; the cloud manages
/// them.
fn map_route(table_name: &str, index: usize, route: &JsonValue) -> Option<Block> {
    let destination = route
        .get("destination")
        .or_else(|| route.get("destinationCidrBlock"))
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    let target_type = route
        .get("target")
        .and_then(|t| t.get("type"))
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    if destination == "local" || target_type.eq_ignore_ascii_case("local") {
        return None;
    }

    let mut block = Block::resource("aws_route", format!("{table_name}_route_{index}"))
        .attr("route_table_id", Value::expr(format!("aws_route_table.{table_name}.id")))
        .attr("destination_cidr_block", Value::str(destination));

    let target_id = route
        .get("target")
        .and_then(|t| t.get("id"))
        .and_then(JsonValue::as_str);
    match (target_type, target_id) {
        ("InternetGateway", Some(id)) => {
            block = block.attr("gateway_id", reference("aws_internet_gateway", id, "id"));
        }
        ("NATGateway", Some(id)) => {
            block = block.attr("nat_gateway_id", reference("aws_nat_gateway", id, "id"));
        }
        (_, Some(id)) => {
            block = block.attr("gateway_id", Value::str(id));
        }
        (_, None) => {}
    }
    Some(block)
}

pub(crate) fn map_internet_gateway(resource: &Resource) -> Result<Vec<Block>> {
    let mut required = RequiredFields::new(resource);
    let vpc = required.parent("vpc");
    required.check()?;

    Ok(vec![
        Block::resource("aws_internet_gateway", local_name(resource))
            .attr(
                "vpc_id",
                reference("aws_vpc", &vpc.unwrap_or_default(), "id"),
            )
            .tagged(&resource.name),
    ])
}

pub(crate) fn map_nat_gateway(resource: &Resource) -> Result<Vec<Block>> {
    let subnet = resource
        .parent_id
        .clone()
        .map(|parent| reference("aws_subnet", &parent, "id"))
        .or_else(|| meta_string(resource, &["subnetId"]).map(Value::str));
    let Some(subnet) = subnet else {
        return Err(Error::missing_config(
            &resource.id,
            resource.type_name(),
            vec!["subnetId".to_string()],
        ));
    };

    let block = Block::resource("aws_nat_gateway", local_name(resource))
        .attr("subnet_id", subnet)
        .attr_opt(
            "allocation_id",
            meta_string(resource, &["allocationId", "elasticIpId"])
                .map(|id| reference("aws_eip", &id, "id")),
        )
        .tagged(&resource.name);
    Ok(vec![block])
}

pub(crate) fn map_elastic_ip(resource: &Resource) -> Result<Vec<Block>> {
    Ok(vec![
        Block::resource("aws_eip", local_name(resource))
            .attr("domain", Value::str("vpc"))
            .tagged(&resource.name),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;
    use skyforge_core::{Category, ResourceType};
    use skyforge_hcl::render_blocks;

    fn resource(
        id: &str,
        type_name: &str,
        parent: Option<&str>,
        metadata: serde_json::Value,
    ) -> Resource {
        let metadata: IndexMap<String, JsonValue> = metadata
            .as_object()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        Resource {
            id: id.to_string(),
            name: id.to_string(),
            resource_type: ResourceType::regional("x", type_name, Category::Networking, "Network"),
            provider: "aws".to_string(),
            region: "us-east-1".to_string(),
            parent_id: parent.map(ToString::to_string),
            depends_on: vec![],
            metadata,
        }
    }

    #[test]
    fn test_vpc_requires_cidr() {
        let err = map_vpc(&resource("vpc-1", "VPC", None, json!({}))).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRequiredConfig { fields, .. } if fields == ["cidr"]
        ));
    }

    #[test]
    fn test_vpc_renders_options() {
        let blocks = map_vpc(&resource(
            "vpc-1",
            "VPC",
            None,
            json!({"cidr":"10.0.0.0/16","enableDnsHostnames":true,"instanceTenancy":"default"}),
        ))
        .unwrap();
        let text = render_blocks(&blocks);
        assert!(text.contains("cidr_block = \"10.0.0.0/16\""));
        assert!(text.contains("enable_dns_hostnames = true"));
        assert!(text.contains("instance_tenancy = \"default\""));
        assert!(text.contains("Name = \"vpc-1\""));
    }

    #[test]
    fn test_subnet_references_parent_vpc() {
        let blocks = map_subnet(&resource(
            "subnet-1",
            "Subnet",
            Some("vpc-1"),
            json!({"cidr":"10.0.1.0/24","availabilityZone":"us-east-1a"}),
        ))
        .unwrap();
        let text = render_blocks(&blocks);
        assert!(text.contains("vpc_id = aws_vpc.vpc_1.id"));
        assert!(text.contains("availability_zone = \"us-east-1a\""));
    }

    #[test]
    fn test_subnet_missing_everything_lists_both_fields() {
        let err = map_subnet(&resource("subnet-1", "Subnet", None, json!({}))).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRequiredConfig { fields, .. } if fields == ["cidr", "vpc"]
        ));
    }

    #[test]
    fn test_security_group_rule_port_range() {
        let blocks = map_security_group(&resource(
            "sg-1",
            "SecurityGroup",
            Some("vpc-1"),
            json!({"rules":[
                {"type":"ingress","protocol":"tcp","portRange":"80-443","cidrBlocks":["0.0.0.0/0"]},
                {"type":"ingress","protocol":"tcp","portRange":"22"}
            ]}),
        ))
        .unwrap();
        assert_eq!(blocks.len(), 3);
        let text = render_blocks(&blocks);
        assert!(text.contains("from_port = 80"));
        assert!(text.contains("to_port = 443"));
        assert!(text.contains("from_port = 22"));
        assert!(text.contains("to_port = 22"));
        assert!(text.contains("security_group_id = aws_security_group.sg_1.id"));
    }

    #[test]
    fn test_security_group_invalid_port_range() {
        let err = map_security_group(&resource(
            "sg-1",
            "SecurityGroup",
            Some("vpc-1"),
            json!({"rules":[{"portRange":"http"}]}),
        ))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidFieldValue { field, .. } if field == "portRange"));
    }

    #[test]
    fn test_main_route_table_suppressed() {
        let blocks = map_route_table(&resource(
            "rt-1",
            "RouteTable",
            Some("vpc-1"),
            json!({"isMain":true,"routes":[{"destination":"0.0.0.0/0","target":{"type":"InternetGateway","id":"igw-1"}}]}),
        ))
        .unwrap();
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_route_table_emits_routes_and_associations() {
        let blocks = map_route_table(&resource(
            "rt-1",
            "RouteTable",
            Some("vpc-1"),
            json!({
                "routes":[
                    {"destination":"10.0.0.0/16","target":{"type":"local"}},
                    {"destination":"0.0.0.0/0","target":{"type":"InternetGateway","id":"igw-1"}}
                ],
                "subnetAssociations":["subnet-1","subnet-2"]
            }),
        ))
        .unwrap();
        // Base table + one non-local route + two associations.
        assert_eq!(blocks.len(), 4);
        let text = render_blocks(&blocks);
        assert!(text.contains("gateway_id = aws_internet_gateway.igw_1.id"));
        assert!(!text.contains("destination_cidr_block = \"10.0.0.0/16\""));
        assert!(text.contains("subnet_id = aws_subnet.subnet_1.id"));
        assert!(text.contains("subnet_id = aws_subnet.subnet_2.id"));
    }

    #[test]
    fn test_nat_gateway_prefers_parent_subnet() {
        let blocks = map_nat_gateway(&resource(
            "nat-1",
            "NATGateway",
            Some("subnet-1"),
            json!({"allocationId":"eip-1"}),
        ))
        .unwrap();
        let text = render_blocks(&blocks);
        assert!(text.contains("subnet_id = aws_subnet.subnet_1.id"));
        assert!(text.contains("allocation_id = aws_eip.eip_1.id"));
    }

    #[test]
    fn test_nat_gateway_requires_subnet() {
        let err = map_nat_gateway(&resource("nat-1", "NATGateway", None, json!({}))).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRequiredConfig { fields, .. } if fields == ["subnetId"]
        ));
    }

    #[test]
    fn test_elastic_ip_renders() {
        let blocks = map_elastic_ip(&resource("eip-1", "ElasticIP", None, json!({}))).unwrap();
        let text = render_blocks(&blocks);
        assert!(text.contains("resource \"aws_eip\" \"eip_1\""));
        assert!(text.contains("domain = \"vpc\""));
    }

    #[test]
    fn test_internet_gateway_requires_parent() {
        let err =
            map_internet_gateway(&resource("igw-1", "InternetGateway", None, json!({}))).unwrap_err();
        assert!(matches!(err, Error::MissingRequiredConfig { .. }));
    }
}
