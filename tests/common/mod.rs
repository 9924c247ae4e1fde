// Shared fixture: one IPv4 traceroute measurement seen from eight probes.
#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use atlasmon::protocol::measurement::{MeasurementResult, ProbeId};
use atlasmon::rules::{MemorySink, MonitorConfig, RuleChain, RunReport};
use serde_json::{json, Value};

pub const MSM_TRACEROUTE_IPV4: u64 = 5004;

pub const ALL_PROBES: [ProbeId; 8] = [738, 12527, 713, 12120, 832, 24535, 24503, 11821];

pub fn traceroute_ipv4() -> Vec<MeasurementResult> {
    serde_json::from_str(include_str!("../fixtures/traceroute_ipv4.json")).expect("fixture")
}

/// One unconditional rule tagging every probe with `Test`.
pub fn base_config() -> Value {
    json!({
        "matching_rules": [
            {"actions": "SetLabelTest"}
        ],
        "actions": {
            "SetLabelTest": {
                "kind": "label",
                "op": "add",
                "label_name": "Test",
                "when": "on_match",
                "scope": "probe"
            },
            "Log": {"kind": "log"}
        },
        "measurement-id": MSM_TRACEROUTE_IPV4
    })
}

pub fn compile(config: Value) -> RuleChain {
    let config: MonitorConfig = serde_json::from_value(config).expect("config document");
    RuleChain::compile(config).expect("compile")
}

pub fn run(config: Value) -> (RunReport, MemorySink) {
    let mut sink = MemorySink::default();
    let report = compile(config).run(&traceroute_ipv4(), &mut sink);
    (report, sink)
}

pub fn labelled(probes: &[ProbeId], label: &str) -> BTreeMap<ProbeId, BTreeSet<String>> {
    probes
        .iter()
        .map(|probe| (*probe, BTreeSet::from([label.to_string()])))
        .collect()
}
