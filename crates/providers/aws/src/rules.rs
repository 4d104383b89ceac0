//! Code-defined AWS constraint rule sets.

use skyforge_rules::{Rule, RuleProfile};

/// The default rule set for the given profile.
///
/// The minimal set carries only the structural essentials; the expanded set
/// adds the full networking constraints and is the default profile.
#[must_use]
pub fn default_rules(profile: RuleProfile) -> Vec<Rule> {
    let mut rules = minimal();
    if profile == RuleProfile::Expanded {
        rules.extend(expanded_extras());
    }
    rules
}

fn minimal() -> Vec<Rule> {
    vec![
        Rule::RequiresParent {
            resource_type: "Subnet".to_string(),
            parent_type: "VPC".to_string(),
            min_count: 1,
        },
        Rule::RequiresParent {
            resource_type: "EC2".to_string(),
            parent_type: "Subnet".to_string(),
            min_count: 1,
        },
        Rule::RequiresParent {
            resource_type: "SecurityGroup".to_string(),
            parent_type: "VPC".to_string(),
            min_count: 1,
        },
    ]
}

fn expanded_extras() -> Vec<Rule> {
    vec![
        Rule::RequiresRegion {
            resource_type: "VPC".to_string(),
            required: true,
        },
        Rule::RequiresRegion {
            resource_type: "EC2".to_string(),
            required: true,
        },
        Rule::AllowedParent {
            resource_type: "Subnet".to_string(),
            allowed: vec!["VPC".to_string()],
            allow_multiple: false,
        },
        Rule::AllowedParent {
            resource_type: "InternetGateway".to_string(),
            allowed: vec!["VPC".to_string()],
            allow_multiple: false,
        },
        Rule::RequiresParent {
            resource_type: "RouteTable".to_string(),
            parent_type: "VPC".to_string(),
            min_count: 1,
        },
        Rule::RequiresParent {
            resource_type: "NATGateway".to_string(),
            parent_type: "Subnet".to_string(),
            min_count: 1,
        },
        Rule::RequiresParent {
            resource_type: "RDS".to_string(),
            parent_type: "Subnet".to_string(),
            min_count: 1,
        },
        Rule::AllowedDependencies {
            resource_type: "InternetGateway".to_string(),
            allowed: vec!["VPC".to_string()],
        },
        Rule::RequiresDependency {
            resource_type: "AutoScalingGroup".to_string(),
            dependency_type: "LaunchTemplate".to_string(),
        },
    ]
}
