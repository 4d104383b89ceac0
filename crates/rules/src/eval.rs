//! Rule evaluation over an architecture.

use serde::{Deserialize, Serialize};
use tracing::debug;

use skyforge_core::{Architecture, CancellationToken, Resource};

use crate::context::EvaluationContext;
use crate::error::{Error, Result};
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleKind};

/// How serious a rule violation is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails the compile.
    #[default]
    Error,
    /// Reported but not fatal.
    Warning,
}

/// A single rule violation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleError {
    /// Which rule family was violated.
    pub rule_kind: RuleKind,
    /// The offending resource's id.
    pub resource_id: String,
    /// The offending resource's display name.
    pub resource_name: String,
    /// The offending resource's type name.
    pub resource_type: String,
    /// Human-readable description.
    pub message: String,
    /// Violation severity.
    #[serde(default)]
    pub severity: Severity,
}

/// Result of evaluating every rule against every resource.
#[derive(Debug, Clone, Default)]
pub struct RuleEvaluation {
    /// Whether no error-severity violation occurred.
    pub valid: bool,
    /// Every violation, in resource order.
    pub errors: Vec<RuleError>,
}

/// Evaluate the registry's rules against an architecture.
///
/// Each rule scoped to type `T` runs exactly once per resource whose type
/// name is `T`. Visual-only resources are trivially valid.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] when the token fires between resources.
pub fn evaluate(
    architecture: &Architecture,
    registry: &RuleRegistry,
    cancel: &CancellationToken,
) -> Result<RuleEvaluation> {
    let mut errors = Vec::new();

    for resource in &architecture.resources {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if resource.is_visual_only() {
            continue;
        }
        let rules = registry.rules_for(resource.type_name());
        if rules.is_empty() {
            continue;
        }
        let Some(context) = EvaluationContext::for_resource(architecture, &resource.id) else {
            continue;
        };
        for rule in rules {
            if let Some(error) = check(rule, &context) {
                errors.push(error);
            }
        }
    }

    debug!(violations = errors.len(), "rule evaluation finished");
    let valid = !errors.iter().any(|e| e.severity == Severity::Error);
    Ok(RuleEvaluation { valid, errors })
}

fn violation(rule: &Rule, resource: &Resource, message: String) -> RuleError {
    RuleError {
        rule_kind: rule.kind(),
        resource_id: resource.id.clone(),
        resource_name: resource.name.clone(),
        resource_type: resource.type_name().to_string(),
        message,
        severity: Severity::Error,
    }
}

/// Judge one rule against one context. `None` means the rule passes.
fn check(rule: &Rule, context: &EvaluationContext<'_>) -> Option<RuleError> {
    let resource = context.resource;
    match rule {
        Rule::RequiresParent {
            parent_type,
            min_count,
            ..
        } => {
            let matching = context
                .parents
                .iter()
                .filter(|p| p.resource_type.matches(parent_type))
                .count();
            (matching < *min_count).then(|| {
                violation(
                    rule,
                    resource,
                    format!(
                        "'{}' requires {min_count} parent(s) of type {parent_type}, found {matching}",
                        resource.name
                    ),
                )
            })
        }
        Rule::AllowedParent {
            allowed,
            allow_multiple,
            ..
        } => {
            if !allow_multiple && context.parents.len() > 1 {
                return Some(violation(
                    rule,
                    resource,
                    format!("'{}' allows a single parent, found {}", resource.name, context.parents.len()),
                ));
            }
            let outsider = context
                .parents
                .iter()
                .find(|p| !allowed.iter().any(|a| p.resource_type.matches(a)));
            outsider.map(|p| {
                violation(
                    rule,
                    resource,
                    format!(
                        "'{}' may not sit under '{}' (allowed: {})",
                        resource.name,
                        p.name,
                        allowed.join(", ")
                    ),
                )
            })
        }
        Rule::RequiresRegion { required, .. } => {
            let has_region = !resource.region.is_empty();
            (*required != has_region).then(|| {
                let detail = if *required {
                    "requires a region"
                } else {
                    "must not carry a region"
                };
                violation(rule, resource, format!("'{}' {detail}", resource.name))
            })
        }
        Rule::MaxChildren { max, .. } => (context.children.len() > *max).then(|| {
            violation(
                rule,
                resource,
                format!(
                    "'{}' holds {} children, at most {max} allowed",
                    resource.name,
                    context.children.len()
                ),
            )
        }),
        Rule::MinChildren { min, .. } => (context.children.len() < *min).then(|| {
            violation(
                rule,
                resource,
                format!(
                    "'{}' holds {} children, at least {min} required",
                    resource.name,
                    context.children.len()
                ),
            )
        }),
        Rule::AllowedDependencies { allowed, .. } => {
            if allowed.is_empty() {
                return None;
            }
            let outsider = context
                .dependencies
                .iter()
                .find(|d| !allowed.iter().any(|a| d.resource_type.matches(a)));
            outsider.map(|d| {
                violation(
                    rule,
                    resource,
                    format!(
                        "'{}' may not depend on '{}' (allowed: {})",
                        resource.name,
                        d.name,
                        allowed.join(", ")
                    ),
                )
            })
        }
        Rule::ForbiddenDependencies { forbidden, .. } => {
            let offender = context
                .dependencies
                .iter()
                .find(|d| forbidden.iter().any(|f| d.resource_type.matches(f)));
            offender.map(|d| {
                violation(
                    rule,
                    resource,
                    format!("'{}' must not depend on '{}'", resource.name, d.name),
                )
            })
        }
        Rule::RequiresDependency {
            dependency_type, ..
        } => {
            let found = context
                .dependencies
                .iter()
                .any(|d| d.type_name() == dependency_type);
            (!found).then(|| {
                violation(
                    rule,
                    resource,
                    format!(
                        "'{}' requires a dependency of type {dependency_type}",
                        resource.name
                    ),
                )
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::Value;
    use skyforge_core::{Category, ResourceType};

    fn resource_of(
        id: &str,
        ty: ResourceType,
        parent: Option<&str>,
        deps: &[&str],
        region: &str,
    ) -> Resource {
        Resource {
            id: id.to_string(),
            name: id.to_string(),
            resource_type: ty,
            provider: "aws".to_string(),
            region: region.to_string(),
            parent_id: parent.map(ToString::to_string),
            depends_on: deps.iter().map(ToString::to_string).collect(),
            metadata: IndexMap::new(),
        }
    }

    fn vpc_type() -> ResourceType {
        ResourceType::regional("vpc", "VPC", Category::Networking, "Network")
    }

    fn subnet_type() -> ResourceType {
        ResourceType::regional("subnet", "Subnet", Category::Networking, "Network")
    }

    fn ec2_type() -> ResourceType {
        ResourceType::regional("ec2", "EC2", Category::Compute, "Instance")
    }

    fn arch(resources: Vec<Resource>) -> Architecture {
        let mut arch = Architecture {
            provider: "aws".to_string(),
            region: "us-east-1".to_string(),
            resources,
            ..Architecture::default()
        };
        arch.rebuild_relations();
        arch
    }

    fn registry_with(rules: Vec<Rule>) -> RuleRegistry {
        let mut registry = RuleRegistry::new();
        for rule in rules {
            registry.register(rule);
        }
        registry
    }

    #[test]
    fn test_requires_parent_counts_ancestors() {
        let a = arch(vec![
            resource_of("vpc-1", vpc_type(), None, &[], "us-east-1"),
            resource_of("subnet-1", subnet_type(), Some("vpc-1"), &[], "us-east-1"),
            resource_of("ec2-1", ec2_type(), Some("subnet-1"), &[], "us-east-1"),
        ]);
        let registry = registry_with(vec![Rule::RequiresParent {
            resource_type: "EC2".to_string(),
            parent_type: "VPC".to_string(),
            min_count: 1,
        }]);
        let result = evaluate(&a, &registry, &CancellationToken::new()).unwrap();
        assert!(result.valid, "ancestor VPC should satisfy the rule: {:?}", result.errors);
    }

    #[test]
    fn test_requires_parent_violation() {
        let a = arch(vec![resource_of("ec2-1", ec2_type(), None, &[], "us-east-1")]);
        let registry = registry_with(vec![Rule::RequiresParent {
            resource_type: "EC2".to_string(),
            parent_type: "Subnet".to_string(),
            min_count: 1,
        }]);
        let result = evaluate(&a, &registry, &CancellationToken::new()).unwrap();
        assert!(!result.valid);
        assert_eq!(result.errors[0].rule_kind, RuleKind::RequiresParent);
        assert_eq!(result.errors[0].resource_id, "ec2-1");
    }

    #[test]
    fn test_allowed_parent_rejects_outsider() {
        let a = arch(vec![
            resource_of("subnet-1", subnet_type(), None, &[], "us-east-1"),
            resource_of("ec2-outer", ec2_type(), None, &[], "us-east-1"),
            resource_of("ec2-1", ec2_type(), Some("ec2-outer"), &[], "us-east-1"),
        ]);
        let registry = registry_with(vec![Rule::AllowedParent {
            resource_type: "EC2".to_string(),
            allowed: vec!["Subnet".to_string()],
            allow_multiple: false,
        }]);
        let result = evaluate(&a, &registry, &CancellationToken::new()).unwrap();
        assert!(!result.valid);
    }

    #[test]
    fn test_requires_region_both_directions() {
        let a = arch(vec![resource_of("ec2-1", ec2_type(), None, &[], "")]);
        let registry = registry_with(vec![Rule::RequiresRegion {
            resource_type: "EC2".to_string(),
            required: true,
        }]);
        let result = evaluate(&a, &registry, &CancellationToken::new()).unwrap();
        assert!(!result.valid);

        let a = arch(vec![resource_of("ec2-1", ec2_type(), None, &[], "us-east-1")]);
        let result = evaluate(&a, &registry, &CancellationToken::new()).unwrap();
        assert!(result.valid);
    }

    #[test]
    fn test_children_bounds() {
        let a = arch(vec![
            resource_of("vpc-1", vpc_type(), None, &[], "us-east-1"),
            resource_of("subnet-1", subnet_type(), Some("vpc-1"), &[], "us-east-1"),
            resource_of("subnet-2", subnet_type(), Some("vpc-1"), &[], "us-east-1"),
        ]);
        let max = registry_with(vec![Rule::MaxChildren {
            resource_type: "VPC".to_string(),
            max: 1,
        }]);
        assert!(!evaluate(&a, &max, &CancellationToken::new()).unwrap().valid);

        let min = registry_with(vec![Rule::MinChildren {
            resource_type: "VPC".to_string(),
            min: 2,
        }]);
        assert!(evaluate(&a, &min, &CancellationToken::new()).unwrap().valid);
    }

    #[test]
    fn test_dependency_sets() {
        let a = arch(vec![
            resource_of("vpc-1", vpc_type(), None, &[], "us-east-1"),
            resource_of("ec2-1", ec2_type(), None, &["vpc-1"], "us-east-1"),
        ]);
        let allowed = registry_with(vec![Rule::AllowedDependencies {
            resource_type: "EC2".to_string(),
            allowed: vec!["SecurityGroup".to_string()],
        }]);
        assert!(!evaluate(&a, &allowed, &CancellationToken::new()).unwrap().valid);

        let empty_allowed = registry_with(vec![Rule::AllowedDependencies {
            resource_type: "EC2".to_string(),
            allowed: vec![],
        }]);
        assert!(evaluate(&a, &empty_allowed, &CancellationToken::new()).unwrap().valid);

        let forbidden = registry_with(vec![Rule::ForbiddenDependencies {
            resource_type: "EC2".to_string(),
            forbidden: vec!["VPC".to_string()],
        }]);
        assert!(!evaluate(&a, &forbidden, &CancellationToken::new()).unwrap().valid);
    }

    #[test]
    fn test_requires_dependency() {
        let a = arch(vec![
            resource_of("lt-1", ResourceType::regional("launch-template", "LaunchTemplate", Category::Compute, "Template"), None, &[], "us-east-1"),
            resource_of("asg-1", ResourceType::regional("autoscaling-group", "AutoScalingGroup", Category::Compute, "Scaling"), None, &["lt-1"], "us-east-1"),
        ]);
        let registry = registry_with(vec![Rule::RequiresDependency {
            resource_type: "AutoScalingGroup".to_string(),
            dependency_type: "LaunchTemplate".to_string(),
        }]);
        assert!(evaluate(&a, &registry, &CancellationToken::new()).unwrap().valid);
    }

    #[test]
    fn test_visual_only_skipped() {
        let mut icon = resource_of("icon-1", ec2_type(), None, &[], "");
        icon.metadata
            .insert("isVisualOnly".to_string(), Value::Bool(true));
        let a = arch(vec![icon]);
        let registry = registry_with(vec![Rule::RequiresRegion {
            resource_type: "EC2".to_string(),
            required: true,
        }]);
        let result = evaluate(&a, &registry, &CancellationToken::new()).unwrap();
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_each_rule_fires_once_per_scoped_resource() {
        // Three EC2s with no parents and one VPC. The EC2-scoped rule must
        // produce exactly one violation per EC2 and none for the VPC.
        let a = arch(vec![
            resource_of("ec2-1", ec2_type(), None, &[], "us-east-1"),
            resource_of("ec2-2", ec2_type(), None, &[], "us-east-1"),
            resource_of("ec2-3", ec2_type(), None, &[], "us-east-1"),
            resource_of("vpc-1", vpc_type(), None, &[], "us-east-1"),
        ]);
        let registry = registry_with(vec![Rule::RequiresParent {
            resource_type: "EC2".to_string(),
            parent_type: "Subnet".to_string(),
            min_count: 1,
        }]);
        let result = evaluate(&a, &registry, &CancellationToken::new()).unwrap();
        assert_eq!(result.errors.len(), 3);
        let mut ids: Vec<_> = result.errors.iter().map(|e| e.resource_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids, ["ec2-1", "ec2-2", "ec2-3"]);
    }

    #[test]
    fn test_cancellation_aborts() {
        let token = CancellationToken::new();
        token.cancel();
        let a = arch(vec![resource_of("ec2-1", ec2_type(), None, &[], "")]);
        let err = evaluate(&a, &RuleRegistry::new(), &token).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
