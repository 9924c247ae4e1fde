use std::collections::BTreeSet;

use atlasmon_core::serde_utils::one_or_many;
use atlasmon_protocol::measurement::{Asn, MeasurementResult};
use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::pattern::AsPathPattern;

/// `expected_results` entry as written in the configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExpectedResultConfig {
    #[serde(default)]
    pub descr: Option<String>,
    /// One pattern or a list of alternatives.
    #[serde(default, deserialize_with = "one_or_many")]
    pub as_path: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub upstream_as: Vec<Asn>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub dst_as: Vec<Asn>,
    #[serde(default)]
    pub dst_responded: Option<bool>,
}

/// Verdict of an expected-result evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch,
}

impl From<bool> for Verdict {
    fn from(matched: bool) -> Self {
        if matched {
            Verdict::Match
        } else {
            Verdict::Mismatch
        }
    }
}

/// Compiled expected result. Every configured criterion must hold.
#[derive(Debug, Clone)]
pub struct ExpectedResult {
    pub name: String,
    pub descr: Option<String>,
    as_path: Vec<AsPathPattern>,
    upstream_as: BTreeSet<Asn>,
    dst_as: BTreeSet<Asn>,
    dst_responded: Option<bool>,
}

impl ExpectedResult {
    /// Rejects empty definitions and malformed patterns.
    pub fn compile(name: &str, config: ExpectedResultConfig) -> Result<Self, RuleError> {
        let as_path = config
            .as_path
            .iter()
            .map(|raw| raw.parse::<AsPathPattern>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| RuleError::InvalidPattern {
                name: name.to_string(),
                source,
            })?;

        let compiled = Self {
            name: name.to_string(),
            descr: config.descr,
            as_path,
            upstream_as: config.upstream_as.into_iter().collect(),
            dst_as: config.dst_as.into_iter().collect(),
            dst_responded: config.dst_responded,
        };

        if compiled.has_no_criteria() {
            return Err(RuleError::EmptyExpectedResult {
                name: name.to_string(),
            });
        }
        Ok(compiled)
    }

    fn has_no_criteria(&self) -> bool {
        self.as_path.is_empty()
            && self.upstream_as.is_empty()
            && self.dst_as.is_empty()
            && self.dst_responded.is_none()
    }

    pub fn evaluate(&self, result: &MeasurementResult) -> Verdict {
        Verdict::from(
            self.as_path_holds(result)
                && self.upstream_holds(result)
                && self.dst_as_holds(result)
                && self.dst_responded_holds(result),
        )
    }

    fn as_path_holds(&self, result: &MeasurementResult) -> bool {
        if self.as_path.is_empty() {
            return true;
        }
        let traversals = result.as_path.traversals_after(result.src_as);
        self.as_path
            .iter()
            .any(|pattern| pattern.matches(&traversals))
    }

    fn upstream_holds(&self, result: &MeasurementResult) -> bool {
        self.upstream_as.is_empty()
            || result
                .upstream_as()
                .is_some_and(|asn| self.upstream_as.contains(&asn))
    }

    fn dst_as_holds(&self, result: &MeasurementResult) -> bool {
        self.dst_as.is_empty()
            || result
                .as_path
                .last_resolved()
                .is_some_and(|asn| self.dst_as.contains(&asn))
    }

    fn dst_responded_holds(&self, result: &MeasurementResult) -> bool {
        match self.dst_responded {
            Some(expected) => result.dst_responded == Some(expected),
            None => true,
        }
    }
}
