use std::sync::Arc;

use atlasmon_core::serde_utils::one_or_many;
use atlasmon_protocol::measurement::{Asn, ProbeId};
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::condition::RuleCondition;
use crate::expected::ExpectedResult;

/// `matching_rules` entry as written in the configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Optional human readable description, copied into log records.
    #[serde(default)]
    pub descr: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub probe_id: Vec<ProbeId>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub src_as: Vec<Asn>,
    #[serde(default)]
    pub reverse: bool,
    #[serde(default, deserialize_with = "one_or_many")]
    pub internal_labels: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub expected_results: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub actions: Vec<String>,
    /// Keep walking the chain after this rule matched.
    #[serde(default = "RuleConfig::default_process_next")]
    pub process_next: bool,
}

impl RuleConfig {
    pub fn default_process_next() -> bool {
        false
    }
}

/// Rule with every name reference resolved.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Index in `matching_rules`.
    pub position: usize,
    pub descr: Option<String>,
    pub condition: RuleCondition,
    pub expected_results: Vec<Arc<ExpectedResult>>,
    pub actions: Vec<Arc<Action>>,
    pub process_next: bool,
}

impl Rule {
    pub fn has_expected_results(&self) -> bool {
        !self.expected_results.is_empty()
    }
}
