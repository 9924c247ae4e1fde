use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RuleError;
use crate::outcome::RuleOutcome;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Label,
    Log,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LabelOp {
    Add,
    #[serde(alias = "del")]
    Remove,
}

/// Persistence domain of a label.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LabelScope {
    /// Kept for the whole run, keyed by probe id.
    Probe,
    /// Dropped once the current result has been evaluated.
    #[default]
    Result,
}

/// Outcomes an action fires on.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum When {
    #[default]
    OnMatch,
    OnMismatch,
    Always,
}

impl When {
    pub fn admits(self, outcome: RuleOutcome) -> bool {
        match self {
            When::Always => true,
            When::OnMatch => matches!(outcome, RuleOutcome::Matched | RuleOutcome::Ok),
            When::OnMismatch => outcome == RuleOutcome::Ko,
        }
    }
}

/// `actions` entry as written in the configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ActionConfig {
    pub kind: ActionType,
    #[serde(default)]
    pub descr: Option<String>,
    #[serde(default)]
    pub op: Option<LabelOp>,
    #[serde(default)]
    pub label_name: Option<String>,
    #[serde(default)]
    pub when: When,
    #[serde(default)]
    pub scope: Option<LabelScope>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Label {
        op: LabelOp,
        label: String,
        scope: LabelScope,
    },
    Log,
}

/// Compiled action, shared by every rule that references it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub descr: Option<String>,
    pub when: When,
    pub kind: ActionKind,
}

impl Action {
    /// Checks that label actions carry `op` and `label_name`.
    pub fn compile(name: &str, config: ActionConfig) -> Result<Self, RuleError> {
        let kind = match config.kind {
            ActionType::Label => {
                let op = config.op.ok_or_else(|| RuleError::MissingActionField {
                    action: name.to_string(),
                    field: "op",
                })?;
                let label = config
                    .label_name
                    .filter(|label| !label.trim().is_empty())
                    .ok_or_else(|| RuleError::MissingActionField {
                        action: name.to_string(),
                        field: "label_name",
                    })?;
                ActionKind::Label {
                    op,
                    label,
                    scope: config.scope.unwrap_or_default(),
                }
            }
            ActionType::Log => {
                if config.op.is_some() || config.label_name.is_some() || config.scope.is_some() {
                    warn!(action = %name, "label fields are ignored on log actions");
                }
                ActionKind::Log
            }
        };

        Ok(Self {
            name: name.to_string(),
            descr: config.descr,
            when: config.when,
            kind,
        })
    }
}
