//! The per-resource emission loop and file assembly.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use skyforge_core::{Architecture, CancellationToken};

use crate::block::{Block, Value};
use crate::error::Error;
use crate::mapper::MapperRegistry;
use crate::sanitize::tf_name;
use crate::writer::render_blocks;

/// Variable names (compared case-insensitively) that can stand in for the
/// provider's region attribute.
const REGION_VARIABLE_NAMES: [&str; 3] = ["aws_region", "region", "aws-region"];

/// One emitted IaC file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IacFile {
    /// File name, e.g. `main.tf`.
    pub path: String,
    /// Rendered text.
    pub content: String,
    /// File format tag; always `hcl` today.
    #[serde(rename = "type")]
    pub file_type: String,
}

impl IacFile {
    fn hcl(path: &str, content: String) -> Self {
        Self {
            path: path.to_string(),
            content,
            file_type: "hcl".to_string(),
        }
    }
}

/// Emits an architecture's ordered resources through a mapper registry.
pub struct Emitter<'a> {
    registry: &'a MapperRegistry,
}

impl<'a> Emitter<'a> {
    /// Create an emitter over a registry.
    #[must_use]
    pub fn new(registry: &'a MapperRegistry) -> Self {
        Self { registry }
    }

    /// Emit `main.tf`, and `variables.tf` / `outputs.tf` when the
    /// architecture declares variables or outputs.
    ///
    /// Missing-config errors are collected across every resource and
    /// returned together, so one pass surfaces every under-configured
    /// resource. Any other error aborts immediately. Nothing partial is
    /// ever returned.
    ///
    /// # Errors
    ///
    /// Returns the collected [`Error::MissingRequiredConfig`] batch, or a
    /// single fatal error ([`Error::MapperNotRegistered`],
    /// [`Error::UnsupportedResource`], [`Error::Cancelled`], or a mapper
    /// failure).
    pub fn emit(
        &self,
        architecture: &Architecture,
        order: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<IacFile>, Vec<Error>> {
        let mut blocks = Vec::new();
        if !architecture.region.is_empty() {
            blocks.push(provider_block(architecture));
        }

        let mut missing = Vec::new();
        for id in order {
            if cancel.is_cancelled() {
                return Err(vec![Error::Cancelled]);
            }
            let Some(resource) = architecture.resource(id) else {
                continue;
            };
            if resource.is_visual_only() {
                debug!(resource = %resource.id, "skipping visual-only resource");
                continue;
            }

            let mapper = self.registry.get(&resource.provider).ok_or_else(|| {
                vec![Error::MapperNotRegistered {
                    provider: resource.provider.clone(),
                }]
            })?;
            if !mapper.supports_resource(resource.type_name()) {
                return Err(vec![Error::UnsupportedResource {
                    resource_id: resource.id.clone(),
                    resource_type: resource.type_name().to_string(),
                    provider: resource.provider.clone(),
                }]);
            }

            match mapper.map_resource(resource) {
                Ok(mapped) => blocks.extend(mapped),
                Err(error @ Error::MissingRequiredConfig { .. }) => missing.push(error),
                Err(fatal) => return Err(vec![fatal]),
            }
        }
        if !missing.is_empty() {
            return Err(missing);
        }

        let mut files = vec![IacFile::hcl("main.tf", render_blocks(&blocks))];
        if !architecture.variables.is_empty() {
            files.push(IacFile::hcl("variables.tf", render_variables(architecture)));
        }
        if !architecture.outputs.is_empty() {
            files.push(IacFile::hcl("outputs.tf", render_outputs(architecture)));
        }
        debug!(files = files.len(), blocks = blocks.len(), "emission finished");
        Ok(files)
    }
}

/// The synthetic provider block heading `main.tf`.
///
/// The region attribute becomes a variable reference when a declared input
/// variable matches one of the conventional region names (case-insensitive)
/// and its default equals the architecture's region; otherwise it is a
/// literal string.
fn provider_block(architecture: &Architecture) -> Block {
    let region_var = architecture.variables.iter().find(|v| {
        REGION_VARIABLE_NAMES.contains(&v.name.to_lowercase().as_str())
            && v.default == Some(JsonValue::String(architecture.region.clone()))
    });
    let region = region_var.map_or_else(
        || Value::str(&architecture.region),
        |v| Value::expr(format!("var.{}", v.name)),
    );
    Block::provider(&architecture.provider).attr("region", region)
}

fn render_variables(architecture: &Architecture) -> String {
    let blocks: Vec<Block> = architecture
        .variables
        .iter()
        .map(|variable| {
            let mut block = Block::variable(&variable.name);
            if !variable.description.is_empty() {
                block = block.attr("description", Value::str(&variable.description));
            }
            if !variable.type_expr.is_empty() {
                block = block.attr("type", Value::expr(&variable.type_expr));
            }
            if let Some(default) = &variable.default {
                block = block.attr("default", Value::from_json(default));
            }
            if variable.sensitive {
                block = block.attr("sensitive", Value::Bool(true));
            }
            block
        })
        .collect();
    render_blocks(&blocks)
}

fn render_outputs(architecture: &Architecture) -> String {
    let blocks: Vec<Block> = architecture
        .outputs
        .iter()
        .map(|output| {
            let mut block = Block::output(&output.name)
                .attr("value", rewrite_output_value(&output.value, architecture));
            if !output.description.is_empty() {
                block = block.attr("description", Value::str(&output.description));
            }
            if output.sensitive {
                block = block.attr("sensitive", Value::Bool(true));
            }
            block
        })
        .collect();
    render_blocks(&blocks)
}

/// Rewrite an output value of the shape `type.id.attr` so the middle segment
/// refers to the emitted local name of the resource whose original id equals
/// it. Best-effort: anything else passes through verbatim as an expression.
fn rewrite_output_value(value: &str, architecture: &Architecture) -> Value {
    let segments: Vec<&str> = value.split('.').collect();
    if segments.len() >= 3 {
        let id = segments[1];
        if architecture.resource(id).is_some() {
            return Value::expr(format!(
                "{}.{}.{}",
                segments[0],
                tf_name(id),
                segments[2..].join(".")
            ));
        }
    }
    Value::expr(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::ResourceMapper;
    use indexmap::IndexMap;
    use skyforge_core::{Category, Resource, ResourceType};
    use skyforge_ir::{OutputDecl, VariableDecl};
    use std::sync::Arc;

    struct StubMapper;

    impl ResourceMapper for StubMapper {
        fn provider(&self) -> &'static str {
            "aws"
        }

        fn supports_resource(&self, type_name: &str) -> bool {
            type_name != "Lambda"
        }

        fn map_resource(&self, resource: &Resource) -> crate::Result<Vec<Block>> {
            if resource.metadata.contains_key("breakEmission") {
                return Err(Error::missing_config(
                    &resource.id,
                    resource.type_name(),
                    vec!["cidr".to_string()],
                ));
            }
            Ok(vec![Block::resource("aws_vpc", tf_name(&resource.id))])
        }
    }

    fn resource(id: &str, type_name: &str) -> Resource {
        Resource {
            id: id.to_string(),
            name: id.to_string(),
            resource_type: ResourceType::regional("x", type_name, Category::Networking, "Network"),
            provider: "aws".to_string(),
            region: "us-east-1".to_string(),
            parent_id: None,
            depends_on: vec![],
            metadata: IndexMap::new(),
        }
    }

    fn arch(resources: Vec<Resource>) -> Architecture {
        Architecture {
            provider: "aws".to_string(),
            region: "us-east-1".to_string(),
            resources,
            ..Architecture::default()
        }
    }

    fn registry() -> MapperRegistry {
        let mut registry = MapperRegistry::new();
        registry.register(Arc::new(StubMapper)).unwrap();
        registry
    }

    #[test]
    fn test_emit_prepends_provider_block() {
        let registry = registry();
        let a = arch(vec![resource("vpc-1", "VPC")]);
        let files = Emitter::new(&registry)
            .emit(&a, &["vpc-1".to_string()], &CancellationToken::new())
            .unwrap();
        assert_eq!(files[0].path, "main.tf");
        assert!(files[0].content.starts_with("provider \"aws\" {\n  region = \"us-east-1\"\n}\n"));
    }

    #[test]
    fn test_emit_no_provider_block_without_region() {
        let registry = registry();
        let mut a = arch(vec![resource("vpc-1", "VPC")]);
        a.region = String::new();
        let files = Emitter::new(&registry)
            .emit(&a, &["vpc-1".to_string()], &CancellationToken::new())
            .unwrap();
        assert!(!files[0].content.contains("provider"));
    }

    #[test]
    fn test_emit_region_uses_matching_variable() {
        let registry = registry();
        let mut a = arch(vec![resource("vpc-1", "VPC")]);
        a.variables.push(VariableDecl {
            name: "aws_region".to_string(),
            type_expr: "string".to_string(),
            description: String::new(),
            default: Some(serde_json::json!("us-east-1")),
            sensitive: false,
        });
        let files = Emitter::new(&registry)
            .emit(&a, &["vpc-1".to_string()], &CancellationToken::new())
            .unwrap();
        assert!(files[0].content.contains("region = var.aws_region"));
    }

    #[test]
    fn test_emit_region_variable_requires_value_match() {
        let registry = registry();
        let mut a = arch(vec![resource("vpc-1", "VPC")]);
        a.variables.push(VariableDecl {
            name: "region".to_string(),
            type_expr: "string".to_string(),
            description: String::new(),
            default: Some(serde_json::json!("eu-west-1")),
            sensitive: false,
        });
        let files = Emitter::new(&registry)
            .emit(&a, &["vpc-1".to_string()], &CancellationToken::new())
            .unwrap();
        assert!(files[0].content.contains("region = \"us-east-1\""));
    }

    #[test]
    fn test_emit_skips_visual_only() {
        let registry = registry();
        let mut icon = resource("icon-1", "VPC");
        icon.metadata
            .insert("isVisualOnly".to_string(), serde_json::json!(true));
        let a = arch(vec![icon, resource("vpc-1", "VPC")]);
        let files = Emitter::new(&registry)
            .emit(
                &a,
                &["icon-1".to_string(), "vpc-1".to_string()],
                &CancellationToken::new(),
            )
            .unwrap();
        assert!(!files[0].content.contains("icon_1"));
        assert!(files[0].content.contains("vpc_1"));
    }

    #[test]
    fn test_emit_unsupported_resource_aborts() {
        let registry = registry();
        let a = arch(vec![resource("fn-1", "Lambda")]);
        let errors = Emitter::new(&registry)
            .emit(&a, &["fn-1".to_string()], &CancellationToken::new())
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], Error::UnsupportedResource { resource_id, .. } if resource_id == "fn-1"));
    }

    #[test]
    fn test_emit_missing_mapper_aborts() {
        let registry = MapperRegistry::new();
        let a = arch(vec![resource("vpc-1", "VPC")]);
        let errors = Emitter::new(&registry)
            .emit(&a, &["vpc-1".to_string()], &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(&errors[0], Error::MapperNotRegistered { provider } if provider == "aws"));
    }

    #[test]
    fn test_emit_collects_missing_config_across_resources() {
        let registry = registry();
        let mut broken_a = resource("vpc-a", "VPC");
        broken_a
            .metadata
            .insert("breakEmission".to_string(), serde_json::json!(true));
        let mut broken_b = resource("vpc-b", "VPC");
        broken_b
            .metadata
            .insert("breakEmission".to_string(), serde_json::json!(true));
        let a = arch(vec![broken_a, resource("vpc-ok", "VPC"), broken_b]);
        let errors = Emitter::new(&registry)
            .emit(
                &a,
                &["vpc-a".to_string(), "vpc-b".to_string(), "vpc-ok".to_string()],
                &CancellationToken::new(),
            )
            .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_emit_cancellation() {
        let registry = registry();
        let token = CancellationToken::new();
        token.cancel();
        let a = arch(vec![resource("vpc-1", "VPC")]);
        let errors = Emitter::new(&registry)
            .emit(&a, &["vpc-1".to_string()], &token)
            .unwrap_err();
        assert!(matches!(errors[0], Error::Cancelled));
    }

    #[test]
    fn test_variables_file_rendering() {
        let registry = registry();
        let mut a = arch(vec![resource("vpc-1", "VPC")]);
        a.variables.push(VariableDecl {
            name: "environment".to_string(),
            type_expr: "string".to_string(),
            description: "Deployment environment".to_string(),
            default: Some(serde_json::json!("dev")),
            sensitive: true,
        });
        let files = Emitter::new(&registry)
            .emit(&a, &["vpc-1".to_string()], &CancellationToken::new())
            .unwrap();
        let variables = files.iter().find(|f| f.path == "variables.tf").unwrap();
        assert!(variables.content.contains("variable \"environment\""));
        assert!(variables.content.contains("type = string"));
        assert!(!variables.content.contains("type = \"string\""));
        assert!(variables.content.contains("default = \"dev\""));
        assert!(variables.content.contains("sensitive = true"));
    }

    #[test]
    fn test_variables_file_omitted_when_empty() {
        let registry = registry();
        let a = arch(vec![resource("vpc-1", "VPC")]);
        let files = Emitter::new(&registry)
            .emit(&a, &["vpc-1".to_string()], &CancellationToken::new())
            .unwrap();
        assert!(files.iter().all(|f| f.path != "variables.tf"));
        assert!(files.iter().all(|f| f.path != "outputs.tf"));
    }

    #[test]
    fn test_outputs_rewrite_middle_segment() {
        let registry = registry();
        let mut a = arch(vec![resource("vpc-1", "VPC")]);
        a.outputs.push(OutputDecl {
            name: "vpc_id".to_string(),
            value: "aws_vpc.vpc-1.id".to_string(),
            description: String::new(),
            sensitive: false,
        });
        let files = Emitter::new(&registry)
            .emit(&a, &["vpc-1".to_string()], &CancellationToken::new())
            .unwrap();
        let outputs = files.iter().find(|f| f.path == "outputs.tf").unwrap();
        assert!(outputs.content.contains("value = aws_vpc.vpc_1.id"));
    }

    #[test]
    fn test_outputs_unknown_id_passes_verbatim() {
        let registry = registry();
        let mut a = arch(vec![resource("vpc-1", "VPC")]);
        a.outputs.push(OutputDecl {
            name: "mystery".to_string(),
            value: "aws_vpc.ghost.id".to_string(),
            description: String::new(),
            sensitive: false,
        });
        let files = Emitter::new(&registry)
            .emit(&a, &["vpc-1".to_string()], &CancellationToken::new())
            .unwrap();
        let outputs = files.iter().find(|f| f.path == "outputs.tf").unwrap();
        assert!(outputs.content.contains("value = aws_vpc.ghost.id"));
    }

    #[test]
    fn test_emission_is_deterministic() {
        let registry = registry();
        let a = arch(vec![resource("vpc-1", "VPC"), resource("vpc-2", "VPC")]);
        let order = vec!["vpc-1".to_string(), "vpc-2".to_string()];
        let first = Emitter::new(&registry)
            .emit(&a, &order, &CancellationToken::new())
            .unwrap();
        let second = Emitter::new(&registry)
            .emit(&a, &order, &CancellationToken::new())
            .unwrap();
        assert_eq!(first, second);
    }
}
