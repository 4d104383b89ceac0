//! Storage resource mappers.

use skyforge_core::Resource;
use skyforge_hcl::{sanitize_bucket_name, Block, Error, Result, Value};

use super::{local_name, meta_flag, meta_string};

pub(crate) fn map_bucket(resource: &Resource) -> Result<Vec<Block>> {
    let raw_name = meta_string(resource, &["bucketName", "bucket"])
        .unwrap_or_else(|| resource.name.clone());
    let bucket = sanitize_bucket_name(&raw_name);
    if bucket.is_empty() {
        return Err(Error::missing_config(
            &resource.id,
            resource.type_name(),
            vec!["bucketName".to_string()],
        ));
    }

    let block = Block::resource("aws_s3_bucket", local_name(resource))
        .attr("bucket", Value::str(bucket))
        .attr_opt(
            "force_destroy",
            meta_flag(resource, &["forceDestroy", "force_destroy"]).map(Value::Bool),
        )
        .tagged(&resource.name);
    Ok(vec![block])
}
