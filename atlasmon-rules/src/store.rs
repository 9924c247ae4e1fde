use std::collections::{BTreeMap, BTreeSet, HashMap};

use atlasmon_protocol::measurement::ProbeId;

use crate::action::LabelScope;

/// Label state of a single run.
///
/// Probe-scoped sets live for the whole run; the result-scoped set belongs to
/// the result currently being evaluated and is cleared by
/// [`LabelStore::begin_result`]. For result scope the `probe` argument of the
/// accessors is the probe of that current result.
#[derive(Debug, Default, Clone)]
pub struct LabelStore {
    probes: HashMap<ProbeId, BTreeSet<String>>,
    result: BTreeSet<String>,
}

impl LabelStore {
    /// Empty store for a new run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the previous result's labels.
    pub fn begin_result(&mut self) {
        self.result.clear();
    }

    /// Adds `label` in `scope`; adding an existing label is a no-op.
    pub fn add(&mut self, scope: LabelScope, probe: ProbeId, label: &str) {
        let set = match scope {
            LabelScope::Probe => self.probes.entry(probe).or_default(),
            LabelScope::Result => &mut self.result,
        };
        if !set.contains(label) {
            set.insert(label.to_string());
        }
    }

    /// Removes `label` from `scope`; missing labels are ignored.
    pub fn remove(&mut self, scope: LabelScope, probe: ProbeId, label: &str) {
        match scope {
            LabelScope::Probe => {
                if let Some(set) = self.probes.get_mut(&probe) {
                    set.remove(label);
                    if set.is_empty() {
                        self.probes.remove(&probe);
                    }
                }
            }
            LabelScope::Result => {
                self.result.remove(label);
            }
        }
    }

    /// Whether `label` is set in exactly this `scope`.
    pub fn contains(&self, scope: LabelScope, probe: ProbeId, label: &str) -> bool {
        match scope {
            LabelScope::Probe => self
                .probes
                .get(&probe)
                .is_some_and(|set| set.contains(label)),
            LabelScope::Result => self.result.contains(label),
        }
    }

    /// Whether the label is visible to the current result in either scope.
    pub fn has_label(&self, probe: ProbeId, label: &str) -> bool {
        self.contains(LabelScope::Result, probe, label)
            || self.contains(LabelScope::Probe, probe, label)
    }

    /// Probe-scoped labels, the only label state surfaced at the end of a run.
    pub fn snapshot(&self) -> BTreeMap<ProbeId, BTreeSet<String>> {
        self.probes
            .iter()
            .map(|(probe, labels)| (*probe, labels.clone()))
            .collect()
    }
}
