use std::collections::BTreeSet;

use atlasmon_protocol::measurement::{Asn, MeasurementResult, ProbeId};

use crate::store::LabelStore;

/// Restricts a rule to a subset of probes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeFilter {
    pub probe_ids: BTreeSet<ProbeId>,
    pub src_as: BTreeSet<Asn>,
    /// Select the probes that do *not* satisfy the filter.
    pub reverse: bool,
}

impl ProbeFilter {
    /// No probe id and no source AS configured.
    pub fn is_unrestricted(&self) -> bool {
        self.probe_ids.is_empty() && self.src_as.is_empty()
    }

    pub fn admits(&self, result: &MeasurementResult) -> bool {
        // `reverse` only inverts an actual restriction.
        if self.is_unrestricted() {
            return true;
        }

        let by_probe = self.probe_ids.is_empty() || self.probe_ids.contains(&result.probe_id);
        let by_src_as = self.src_as.is_empty()
            || result
                .src_as
                .is_some_and(|asn| self.src_as.contains(&asn));

        (by_probe && by_src_as) != self.reverse
    }
}

/// Structural conditions of a rule, checked before any expected result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleCondition {
    pub probes: ProbeFilter,
    /// Labels that must all be visible to the result, in either scope.
    pub required_labels: Vec<String>,
}

impl RuleCondition {
    /// Probe filter and required labels, both against the current run state.
    pub fn evaluate(&self, result: &MeasurementResult, labels: &LabelStore) -> bool {
        self.probes.admits(result)
            && self
                .required_labels
                .iter()
                .all(|label| labels.has_label(result.probe_id, label))
    }
}
