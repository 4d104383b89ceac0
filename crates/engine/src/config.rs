//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use skyforge_rules::RuleProfile;

use crate::error::BuildError;

/// When the persistence gateway runs relative to emission.
///
/// Emission is a pure function of the architecture, so both orders produce
/// identical results; running after emission means a render failure never
/// costs a transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum PersistOrder {
    /// Persist before rendering IaC.
    BeforeEmission,
    /// Persist after rendering IaC.
    #[default]
    AfterEmission,
}

/// Tunable engine settings, loadable from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Provider tag compiles default to.
    pub provider: String,
    /// Which code-defined rule set seeds the registry.
    pub rule_profile: RuleProfile,
    /// When persistence runs relative to emission.
    pub persist_order: PersistOrder,
    /// The IaC target row ensured per compile.
    pub iac_target: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider: "aws".to_string(),
            rule_profile: RuleProfile::default(),
            persist_order: PersistOrder::default(),
            iac_target: "terraform".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Config`] when the file cannot be read or does
    /// not decode.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| BuildError::config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&text)
            .map_err(|e| BuildError::config(format!("failed to parse {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.provider, "aws");
        assert_eq!(config.rule_profile, RuleProfile::Expanded);
        assert_eq!(config.persist_order, PersistOrder::AfterEmission);
        assert_eq!(config.iac_target, "terraform");
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skyforge.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "ruleProfile = \"minimal\"").unwrap();
        writeln!(file, "persistOrder = \"beforeEmission\"").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.rule_profile, RuleProfile::Minimal);
        assert_eq!(config.persist_order, PersistOrder::BeforeEmission);
        assert_eq!(config.provider, "aws");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = EngineConfig::load("/nonexistent/skyforge.toml").unwrap_err();
        assert!(matches!(err, BuildError::Config { .. }));
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skyforge.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        let err = EngineConfig::load(&path).unwrap_err();
        assert!(matches!(err, BuildError::Config { .. }));
    }
}
