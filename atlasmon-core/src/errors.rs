use std::io;

use thiserror::Error;

/// Result type used across the atlasmon core crate.
pub type Result<T> = std::result::Result<T, AtlasMonError>;

/// Canonical error representation shared by all crates of the workspace.
#[derive(Debug, Error)]
pub enum AtlasMonError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("deserialization error: {0}")]
    DeserializationError(String),

    #[error("invalid monitor configuration: {0}")]
    InvalidConfiguration(String),

    #[error("result source failure: {0}")]
    SourceError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("general error: {0}")]
    GeneralError(String),
}

impl From<serde_json::Error> for AtlasMonError {
    fn from(err: serde_json::Error) -> Self {
        AtlasMonError::DeserializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for AtlasMonError {
    fn from(err: serde_yaml::Error) -> Self {
        AtlasMonError::DeserializationError(err.to_string())
    }
}

impl From<anyhow::Error> for AtlasMonError {
    fn from(err: anyhow::Error) -> Self {
        AtlasMonError::GeneralError(err.to_string())
    }
}

/// Dedicated error used by the environment configuration module.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable is missing: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {key}: {value}")]
    InvalidEnvVar { key: &'static str, value: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ConfigError> for AtlasMonError {
    fn from(value: ConfigError) -> Self {
        AtlasMonError::ConfigError(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert_into_canonical_error() {
        let err: AtlasMonError = ConfigError::MissingEnvVar("ATLASMON_CONFIG".into()).into();
        assert!(matches!(err, AtlasMonError::ConfigError(_)));
        assert!(err.to_string().contains("ATLASMON_CONFIG"));
    }
}
