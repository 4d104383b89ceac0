//! The closed set of constraint rule families.

use serde::{Deserialize, Serialize};

/// Discriminant of a rule family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// The resource must sit under a given ancestor type.
    RequiresParent,
    /// Every ancestor must come from an allowed set.
    AllowedParent,
    /// The resource must (or must not) carry a region.
    RequiresRegion,
    /// Upper bound on direct children.
    MaxChildren,
    /// Lower bound on direct children.
    MinChildren,
    /// Every dependency must come from an allowed set.
    AllowedDependencies,
    /// No dependency may come from a forbidden set.
    ForbiddenDependencies,
    /// At least one dependency of a given type must exist.
    RequiresDependency,
}

impl RuleKind {
    /// Parse a constraint tag. Accepts PascalCase, snake_case and kebab-case.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let folded: String = tag.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        match folded.to_lowercase().as_str() {
            "requiresparent" => Some(Self::RequiresParent),
            "allowedparent" => Some(Self::AllowedParent),
            "requiresregion" => Some(Self::RequiresRegion),
            "maxchildren" => Some(Self::MaxChildren),
            "minchildren" => Some(Self::MinChildren),
            "alloweddependencies" => Some(Self::AllowedDependencies),
            "forbiddendependencies" => Some(Self::ForbiddenDependencies),
            "requiresdependency" => Some(Self::RequiresDependency),
            _ => None,
        }
    }

    /// The canonical PascalCase tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequiresParent => "RequiresParent",
            Self::AllowedParent => "AllowedParent",
            Self::RequiresRegion => "RequiresRegion",
            Self::MaxChildren => "MaxChildren",
            Self::MinChildren => "MinChildren",
            Self::AllowedDependencies => "AllowedDependencies",
            Self::ForbiddenDependencies => "ForbiddenDependencies",
            Self::RequiresDependency => "RequiresDependency",
        }
    }
}

/// Which default rule set a provider ships.
///
/// Providers carry two code-defined sets; which one seeds the registry is a
/// configuration knob rather than a compile-time constant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleProfile {
    /// Only the structural essentials.
    Minimal,
    /// The full networking constraint set.
    #[default]
    Expanded,
}

/// A constraint rule scoped to one resource type.
///
/// Type matching throughout is against a resource type's PascalCase name or
/// its kind, so a rule naming `Instance` scopes every instance-kinded type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum Rule {
    /// At least `min_count` ancestors of `parent_type`.
    RequiresParent {
        /// Scoped resource type name.
        resource_type: String,
        /// Required ancestor type name or kind.
        parent_type: String,
        /// Minimum number of matching ancestors.
        min_count: usize,
    },
    /// Every ancestor's name or kind must be in `allowed`.
    AllowedParent {
        /// Scoped resource type name.
        resource_type: String,
        /// Permitted ancestor type names or kinds.
        allowed: Vec<String>,
        /// Whether more than one ancestor is permitted.
        allow_multiple: bool,
    },
    /// Region presence must match `required`.
    RequiresRegion {
        /// Scoped resource type name.
        resource_type: String,
        /// Whether a region is required (true) or forbidden (false).
        required: bool,
    },
    /// No more than `max` direct children.
    MaxChildren {
        /// Scoped resource type name.
        resource_type: String,
        /// Upper bound.
        max: usize,
    },
    /// At least `min` direct children.
    MinChildren {
        /// Scoped resource type name.
        resource_type: String,
        /// Lower bound.
        min: usize,
    },
    /// Every dependency's name or kind must be in `allowed`. An empty set
    /// skips the rule.
    AllowedDependencies {
        /// Scoped resource type name.
        resource_type: String,
        /// Permitted dependency type names or kinds.
        allowed: Vec<String>,
    },
    /// No dependency's name or kind may be in `forbidden`.
    ForbiddenDependencies {
        /// Scoped resource type name.
        resource_type: String,
        /// Forbidden dependency type names or kinds.
        forbidden: Vec<String>,
    },
    /// At least one dependency whose name matches `dependency_type`.
    RequiresDependency {
        /// Scoped resource type name.
        resource_type: String,
        /// Required dependency type name.
        dependency_type: String,
    },
}

impl Rule {
    /// The rule's family discriminant.
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::RequiresParent { .. } => RuleKind::RequiresParent,
            Self::AllowedParent { .. } => RuleKind::AllowedParent,
            Self::RequiresRegion { .. } => RuleKind::RequiresRegion,
            Self::MaxChildren { .. } => RuleKind::MaxChildren,
            Self::MinChildren { .. } => RuleKind::MinChildren,
            Self::AllowedDependencies { .. } => RuleKind::AllowedDependencies,
            Self::ForbiddenDependencies { .. } => RuleKind::ForbiddenDependencies,
            Self::RequiresDependency { .. } => RuleKind::RequiresDependency,
        }
    }

    /// The resource type this rule scopes.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        match self {
            Self::RequiresParent { resource_type, .. }
            | Self::AllowedParent { resource_type, .. }
            | Self::RequiresRegion { resource_type, .. }
            | Self::MaxChildren { resource_type, .. }
            | Self::MinChildren { resource_type, .. }
            | Self::AllowedDependencies { resource_type, .. }
            | Self::ForbiddenDependencies { resource_type, .. }
            | Self::RequiresDependency { resource_type, .. } => resource_type,
        }
    }
}
