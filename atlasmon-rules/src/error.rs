use std::path::PathBuf;

use atlasmon_core::AtlasMonError;
use thiserror::Error;

/// Errors returned while loading and compiling a monitor configuration.
///
/// All of them are raised before the first result is evaluated.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("config path does not exist: {0}")]
    MissingPath(String),
    #[error("failed to read config from {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config from {path}: {message}")]
    Parse { path: String, message: String },
    #[error("no matching rules are configured")]
    NoRules,
    #[error("matching_rules[{rule}] references undefined action `{name}`")]
    UnknownAction { rule: usize, name: String },
    #[error("matching_rules[{rule}] references undefined expected result `{name}`")]
    UnknownExpectedResult { rule: usize, name: String },
    #[error("action `{action}` is missing required field `{field}`")]
    MissingActionField { action: String, field: &'static str },
    #[error("expected result `{name}` defines no criteria")]
    EmptyExpectedResult { name: String },
    #[error("expected result `{name}` has an invalid as_path pattern")]
    InvalidPattern {
        name: String,
        #[source]
        source: PatternError,
    },
}

impl RuleError {
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RuleError::Io {
            path: path.into().display().to_string(),
            source,
        }
    }

    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        RuleError::Parse {
            path: path.into().display().to_string(),
            message: message.into(),
        }
    }
}

impl From<RuleError> for AtlasMonError {
    fn from(err: RuleError) -> Self {
        AtlasMonError::InvalidConfiguration(err.to_string())
    }
}

/// Syntax errors in an AS-path pattern expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,
    #[error("unknown qualifier `{token}` at clause {clause}")]
    UnknownQualifier { token: String, clause: usize },
    #[error("qualifier `{qualifier}` is not followed by an AS number")]
    MissingAsn { qualifier: String },
    #[error("`{token}` is not a valid AS number")]
    InvalidAsn { token: String },
}
