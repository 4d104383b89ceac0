//! Error types for IaC emission.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for emission operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the mapper registry and the emitter.
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum Error {
    /// A resource's metadata lacks fields its mapper needs.
    #[error("Resource '{resource_id}' ({resource_type}) is missing required config: {}", fields.join(", "))]
    #[diagnostic(
        code(skyforge::hcl::missing_required_config),
        help("Set the listed config keys on the diagram node")
    )]
    MissingRequiredConfig {
        /// The under-configured resource.
        resource_id: String,
        /// Its type name.
        resource_type: String,
        /// The missing config keys.
        fields: Vec<String>,
    },

    /// A config value is present but does not decode.
    #[error("Resource '{resource_id}' has invalid value '{value}' for '{field}'")]
    #[diagnostic(code(skyforge::hcl::invalid_field_value))]
    InvalidFieldValue {
        /// The offending resource.
        resource_id: String,
        /// The config key.
        field: String,
        /// The raw value.
        value: String,
    },

    /// The mapper for a provider does not support a resource type.
    #[error("Provider '{provider}' cannot emit resource '{resource_id}' of type '{resource_type}'")]
    #[diagnostic(code(skyforge::hcl::unsupported_resource))]
    UnsupportedResource {
        /// The unsupported resource.
        resource_id: String,
        /// Its type name.
        resource_type: String,
        /// The provider that lacks a mapping.
        provider: String,
    },

    /// No mapper registered for a provider tag.
    #[error("No resource mapper registered for provider '{provider}'")]
    #[diagnostic(code(skyforge::hcl::mapper_not_registered))]
    MapperNotRegistered {
        /// The provider tag.
        provider: String,
    },

    /// A mapper was registered under an empty provider tag.
    #[error("Resource mapper registered with an empty provider tag")]
    #[diagnostic(code(skyforge::hcl::empty_provider))]
    EmptyProvider,

    /// Two mappers were registered for the same provider.
    #[error("Resource mapper already registered for provider '{provider}'")]
    #[diagnostic(code(skyforge::hcl::duplicate_provider))]
    DuplicateProvider {
        /// The provider tag registered twice.
        provider: String,
    },

    /// The compile was cancelled during emission.
    #[error("Emission cancelled")]
    #[diagnostic(code(skyforge::hcl::cancelled))]
    Cancelled,
}

impl Error {
    /// Create a missing-required-config error.
    pub fn missing_config(
        resource_id: impl Into<String>,
        resource_type: impl Into<String>,
        fields: Vec<String>,
    ) -> Self {
        Self::MissingRequiredConfig {
            resource_id: resource_id.into(),
            resource_type: resource_type.into(),
            fields,
        }
    }

    /// Create an invalid-field-value error.
    pub fn invalid_value(
        resource_id: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidFieldValue {
            resource_id: resource_id.into(),
            field: field.into(),
            value: value.into(),
        }
    }
}
