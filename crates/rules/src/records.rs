//! Data-driven constraint records.
//!
//! The external rule source hands over flat string records; payload decoding
//! depends on the rule family: booleans are the literals `true`/`false`,
//! integers are decimal strings, sets are comma-separated lists with
//! whitespace trimmed.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rule::{Rule, RuleKind};

/// One external constraint record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintRecord {
    /// Resource type the constraint scopes.
    pub resource_type: String,
    /// Rule family tag.
    pub constraint_type: String,
    /// Flat payload; format depends on the family.
    pub constraint_value: String,
}

/// Decode a batch of records into rules.
///
/// # Errors
///
/// Returns [`Error::UnknownConstraintType`] for an unrecognized family tag,
/// or [`Error::InvalidConstraintValue`] when the payload does not decode.
pub fn parse_records(records: &[ConstraintRecord]) -> Result<Vec<Rule>> {
    records.iter().map(parse_record).collect()
}

fn parse_record(record: &ConstraintRecord) -> Result<Rule> {
    let kind = RuleKind::parse(&record.constraint_type).ok_or_else(|| {
        Error::UnknownConstraintType {
            resource_type: record.resource_type.clone(),
            constraint_type: record.constraint_type.clone(),
        }
    })?;

    let resource_type = record.resource_type.clone();
    let value = record.constraint_value.trim();

    let invalid = |message: &str| Error::InvalidConstraintValue {
        resource_type: record.resource_type.clone(),
        constraint_type: kind.as_str().to_string(),
        value: record.constraint_value.clone(),
        message: message.to_string(),
    };

    let rule = match kind {
        RuleKind::RequiresParent => {
            if value.is_empty() {
                return Err(invalid("expected a parent type name"));
            }
            Rule::RequiresParent {
                resource_type,
                parent_type: value.to_string(),
                min_count: 1,
            }
        }
        RuleKind::AllowedParent => Rule::AllowedParent {
            resource_type,
            allowed: split_list(value),
            allow_multiple: false,
        },
        RuleKind::RequiresRegion => Rule::RequiresRegion {
            resource_type,
            required: parse_bool(value).ok_or_else(|| invalid("expected 'true' or 'false'"))?,
        },
        RuleKind::MaxChildren => Rule::MaxChildren {
            resource_type,
            max: value
                .parse()
                .map_err(|_| invalid("expected a decimal integer"))?,
        },
        RuleKind::MinChildren => Rule::MinChildren {
            resource_type,
            min: value
                .parse()
                .map_err(|_| invalid("expected a decimal integer"))?,
        },
        RuleKind::AllowedDependencies => Rule::AllowedDependencies {
            resource_type,
            allowed: split_list(value),
        },
        RuleKind::ForbiddenDependencies => Rule::ForbiddenDependencies {
            resource_type,
            forbidden: split_list(value),
        },
        RuleKind::RequiresDependency => {
            if value.is_empty() {
                return Err(invalid("expected a dependency type name"));
            }
            Rule::RequiresDependency {
                resource_type,
                dependency_type: value.to_string(),
            }
        }
    };
    Ok(rule)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
