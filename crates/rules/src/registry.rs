//! Rule registry with default/override merging.

use indexmap::IndexMap;
use tracing::debug;

use crate::rule::{Rule, RuleKind};

/// Registry of constraint rules, keyed by `(resource type, rule kind)`.
///
/// Registering under an existing key replaces the earlier rule; payloads are
/// never merged. In particular two `AllowedDependencies` lists for the same
/// type are NOT additive — the later list wins outright.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: IndexMap<(String, RuleKind), Rule>,
}

impl RuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule, replacing any earlier rule under the same key.
    pub fn register(&mut self, rule: Rule) {
        let key = (rule.resource_type().to_string(), rule.kind());
        if self.rules.contains_key(&key) {
            debug!(
                resource_type = %key.0,
                rule = key.1.as_str(),
                "replacing previously registered rule"
            );
        }
        self.rules.insert(key, rule);
    }

    /// Load defaults and overrides in the documented order: every default
    /// whose key is not overridden first, then every override record.
    pub fn load(&mut self, defaults: Vec<Rule>, overrides: Vec<Rule>) {
        let overridden: Vec<(String, RuleKind)> = overrides
            .iter()
            .map(|r| (r.resource_type().to_string(), r.kind()))
            .collect();

        for rule in defaults {
            let key = (rule.resource_type().to_string(), rule.kind());
            if !overridden.contains(&key) {
                self.register(rule);
            }
        }
        for rule in overrides {
            self.register(rule);
        }
    }

    /// Every rule scoping `type_name`, in registration order.
    #[must_use]
    pub fn rules_for(&self, type_name: &str) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|((scoped, _), _)| scoped == type_name)
            .map(|(_, rule)| rule)
            .collect()
    }

    /// Iterate every registered rule.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
