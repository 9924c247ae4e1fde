use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::action::ActionConfig;
use crate::error::RuleError;
use crate::expected::ExpectedResultConfig;
use crate::rule::RuleConfig;

/// Monitor configuration document (YAML or JSON).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    #[serde(default)]
    pub descr: Option<String>,
    #[serde(default)]
    pub matching_rules: Vec<RuleConfig>,
    #[serde(default)]
    pub actions: BTreeMap<String, ActionConfig>,
    #[serde(default)]
    pub expected_results: BTreeMap<String, ExpectedResultConfig>,
    #[serde(default, rename = "measurement-id")]
    pub measurement_id: Option<u64>,
}

/// Reads and parses a YAML or JSON monitor configuration.
pub fn load_config(path: impl AsRef<Path>) -> Result<MonitorConfig, RuleError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RuleError::MissingPath(path.display().to_string()));
    }

    let raw = fs::read_to_string(path).map_err(|err| RuleError::from_io(path, err))?;
    parse_config(&raw, path)
}

/// Parses a configuration document; YAML parsing also accepts JSON input.
pub fn parse_config(raw: &str, origin: &Path) -> Result<MonitorConfig, RuleError> {
    serde_yaml::from_str::<MonitorConfig>(raw)
        .map_err(|err| RuleError::parse_error(origin, err.to_string()))
}
