//! Database resource mappers.

use skyforge_core::Resource;
use skyforge_hcl::{Block, Result, Value};

use super::{local_name, meta_int, meta_string, RequiredFields};

pub(crate) fn map_db_instance(resource: &Resource) -> Result<Vec<Block>> {
    let mut required = RequiredFields::new(resource);
    let engine = required.string("engine", &["engine"]);
    let instance_class = required.string("instanceClass", &["instanceClass", "instance_class"]);
    required.check()?;

    let block = Block::resource("aws_db_instance", local_name(resource))
        .attr("identifier", Value::str(&resource.name))
        .attr("engine", Value::str(engine.unwrap_or_default()))
        .attr("instance_class", Value::str(instance_class.unwrap_or_default()))
        .attr(
            "allocated_storage",
            Value::int(meta_int(resource, &["allocatedStorage", "allocated_storage"]).unwrap_or(20)),
        )
        .attr("skip_final_snapshot", Value::Bool(true))
        .attr_opt(
            "engine_version",
            meta_string(resource, &["engineVersion"]).map(Value::str),
        )
        .attr_opt(
            "db_name",
            meta_string(resource, &["databaseName", "dbName"]).map(Value::str),
        )
        .attr_opt(
            "username",
            meta_string(resource, &["username", "masterUsername"]).map(Value::str),
        )
        .tagged(&resource.name);
    Ok(vec![block])
}
