use std::env;
use std::path::PathBuf;

use crate::errors::{AtlasMonError, ConfigError};

/// Runtime environment used by the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    fn from_str(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

/// Process level settings read from the environment.
///
/// The monitor configuration itself (rules, actions, expected results) lives
/// in a YAML/JSON document; this only locates it and tunes the process.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub environment: Environment,
    pub log_level: Option<String>,
    pub config_path: Option<PathBuf>,
    pub measurement_id: Option<u64>,
}

impl CoreConfig {
    /// Loads configuration from `ATLASMON_*` variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env_with_prefix("ATLASMON_")
    }

    /// Loads configuration from env vars prefixed with the provided value.
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let key = |suffix: &str| format!("{}{}", prefix, suffix);

        let environment = env::var(key("ENV"))
            .map(|raw| Environment::from_str(&raw))
            .unwrap_or_default();

        let log_level = env::var(key("LOG")).ok().filter(|raw| !raw.trim().is_empty());
        let config_path = env::var(key("CONFIG")).ok().map(PathBuf::from);

        let measurement_id = match env::var(key("MSM_ID")) {
            Ok(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidEnvVar {
                    key: "MSM_ID",
                    value: raw.clone(),
                }
            })?),
            Err(_) => None,
        };

        Ok(Self {
            environment,
            log_level,
            config_path,
            measurement_id,
        })
    }

    /// Whether the process is running in production.
    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }

    /// Path of the monitor configuration, failing when none was provided.
    pub fn require_config_path(&self) -> Result<&PathBuf, ConfigError> {
        self.config_path
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("ATLASMON_CONFIG".into()))
    }
}

/// Helper that loads config and converts to the canonical error type.
pub fn load_core_config() -> Result<CoreConfig, AtlasMonError> {
    Ok(CoreConfig::from_env()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_prefixed_variables() {
        env::set_var("ATLASMON_TEST_A_ENV", "prod");
        env::set_var("ATLASMON_TEST_A_CONFIG", "/etc/atlasmon/monitor.yaml");
        env::set_var("ATLASMON_TEST_A_MSM_ID", "5001");

        let cfg = CoreConfig::from_env_with_prefix("ATLASMON_TEST_A_").expect("config should load");
        assert!(cfg.is_production());
        assert_eq!(cfg.measurement_id, Some(5001));
        assert_eq!(
            cfg.require_config_path().expect("path").to_str(),
            Some("/etc/atlasmon/monitor.yaml")
        );
    }

    #[test]
    fn rejects_non_numeric_measurement_id() {
        env::set_var("ATLASMON_TEST_B_MSM_ID", "latest");
        let err = CoreConfig::from_env_with_prefix("ATLASMON_TEST_B_").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { .. }));
    }

    #[test]
    fn defaults_to_development_without_config_path() {
        let cfg = CoreConfig::from_env_with_prefix("ATLASMON_TEST_UNSET_").expect("config");
        assert_eq!(cfg.environment, Environment::Development);
        assert!(cfg.require_config_path().is_err());
    }
}
