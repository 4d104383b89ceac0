//! Compute resource mappers.

use skyforge_core::Resource;
use skyforge_hcl::{Block, NestedBlock, Result, Value};

use super::{local_name, meta_int, meta_string, reference, security_group_ids, RequiredFields};

pub(crate) fn map_instance(resource: &Resource) -> Result<Vec<Block>> {
    let mut required = RequiredFields::new(resource);
    let ami = required.string("ami", &["ami", "imageId"]);
    let instance_type = required.string("instanceType", &["instanceType", "instance_type"]);
    required.check()?;

    let mut block = Block::resource("aws_instance", local_name(resource))
        .attr("ami", Value::str(ami.unwrap_or_default()))
        .attr("instance_type", Value::str(instance_type.unwrap_or_default()))
        .attr_opt(
            "subnet_id",
            resource
                .parent_id
                .as_deref()
                .map(|parent| reference("aws_subnet", parent, "id")),
        )
        .attr_opt("key_name", meta_string(resource, &["keyName"]).map(Value::str))
        .attr_opt(
            "iam_instance_profile",
            meta_string(resource, &["iamInstanceProfile"]).map(Value::str),
        )
        .attr_opt(
            "user_data",
            meta_string(resource, &["userData"]).map(Value::str),
        );

    let groups = security_group_ids(resource);
    if !groups.is_empty() {
        block = block.attr(
            "vpc_security_group_ids",
            Value::List(
                groups
                    .iter()
                    .map(|id| reference("aws_security_group", id, "id"))
                    .collect(),
            ),
        );
    }

    Ok(vec![block.tagged(&resource.name)])
}

pub(crate) fn map_launch_template(resource: &Resource) -> Result<Vec<Block>> {
    let block = Block::resource("aws_launch_template", local_name(resource))
        .attr("name", Value::str(&resource.name))
        .attr_opt(
            "image_id",
            meta_string(resource, &["ami", "imageId"]).map(Value::str),
        )
        .attr_opt(
            "instance_type",
            meta_string(resource, &["instanceType", "instance_type"]).map(Value::str),
        )
        .attr_opt("key_name", meta_string(resource, &["keyName"]).map(Value::str))
        .attr_opt(
            "user_data",
            meta_string(resource, &["userData"]).map(Value::str),
        );
    Ok(vec![block])
}

pub(crate) fn map_autoscaling_group(resource: &Resource) -> Result<Vec<Block>> {
    let min_size = meta_int(resource, &["minSize", "min_size"]).unwrap_or(1);
    let max_size = meta_int(resource, &["maxSize", "max_size"]).unwrap_or(min_size.max(1));

    let mut block = Block::resource("aws_autoscaling_group", local_name(resource))
        .attr("name", Value::str(&resource.name))
        .attr("min_size", Value::int(min_size))
        .attr("max_size", Value::int(max_size))
        .attr_opt(
            "desired_capacity",
            meta_int(resource, &["desiredCapacity", "desired_capacity"]).map(Value::int),
        )
        .attr_opt(
            "vpc_zone_identifier",
            resource
                .parent_id
                .as_deref()
                .map(|parent| Value::List(vec![reference("aws_subnet", parent, "id")])),
        );

    if let Some(template_id) = meta_string(resource, &["launchTemplateId", "launchTemplate"]) {
        block = block.nested(
            NestedBlock::new("launch_template")
                .attr("id", reference("aws_launch_template", &template_id, "id")),
        );
    }
    Ok(vec![block])
}
