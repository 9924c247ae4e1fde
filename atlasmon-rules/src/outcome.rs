use std::collections::{BTreeMap, BTreeSet};

use atlasmon_protocol::measurement::{ProbeId, RunStats};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::expected::Verdict;

/// Per-rule evaluation outcome, used to gate actions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleOutcome {
    /// Structural conditions held and the rule has no expected result.
    Matched,
    /// The expected-result evaluation matched.
    Ok,
    /// The expected-result evaluation did not match.
    Ko,
}

impl From<Verdict> for RuleOutcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Match => RuleOutcome::Ok,
            Verdict::Mismatch => RuleOutcome::Ko,
        }
    }
}

/// What the chain does after a rule has been evaluated for a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStep {
    Continue,
    Stop,
}

/// Everything the caller gets back from a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub run_id: Uuid,
    pub results_processed: usize,
    pub stats: RunStats,
    /// Probe-scoped labels only; result-scoped labels never leave the run.
    pub probe_labels: BTreeMap<ProbeId, BTreeSet<String>>,
}

impl RunReport {
    /// `(match_count, ok_count, log_count)`.
    pub fn counters(&self) -> (u64, u64, u64) {
        self.stats.as_tuple()
    }

    /// Probe-scoped labels left on `probe` at the end of the run.
    pub fn labels_of(&self, probe: ProbeId) -> Option<&BTreeSet<String>> {
        self.probe_labels.get(&probe)
    }
}
