// Rule chain scenarios over the eight-probe traceroute fixture.
mod common;

use atlasmon::rules::RuleOutcome;
use common::{base_config, labelled, run, ALL_PROBES};
use serde_json::json;
use test_case::test_case;

#[test_case("on_match", true ; "on match")]
#[test_case("on_mismatch", false ; "on mismatch")]
#[test_case("always", true ; "always")]
fn unconditional_rule_without_expected_result(when: &str, tagged: bool) {
    let mut cfg = base_config();
    cfg["actions"]["SetLabelTest"]["when"] = json!(when);

    let (report, _) = run(cfg);

    assert_eq!(report.counters(), (8, 0, 0));
    if tagged {
        assert_eq!(report.probe_labels, labelled(&ALL_PROBES, "Test"));
    } else {
        // No expected result means no mismatch can ever happen.
        assert!(report.probe_labels.is_empty());
    }
}

#[test]
fn labels_then_expected_result() {
    let mut cfg = base_config();
    cfg["matching_rules"][0]["process_next"] = json!(true);
    cfg["matching_rules"]
        .as_array_mut()
        .expect("rules")
        .extend([
            json!({
                "probe_id": [713, 738],
                "actions": "SetLabelOK",
                "process_next": true
            }),
            json!({
                "internal_labels": "OK",
                "expected_results": "ASPath_1267"
            }),
        ]);
    cfg["actions"]["SetLabelOK"] = json!({
        "kind": "label",
        "op": "add",
        "label_name": "OK",
        "when": "on_match",
        "scope": "result"
    });
    cfg["expected_results"] = json!({"ASPath_1267": {"as_path": "S 1267"}});

    let (report, _) = run(cfg);

    // 8 from the first rule, 2 from the probe filter, 2 from the AS path check.
    assert_eq!(report.counters(), (12, 2, 0));
    // "OK" is result scoped and must not survive.
    assert_eq!(report.probe_labels, labelled(&ALL_PROBES, "Test"));
}

#[test]
fn exclude_then_tag() {
    let mut cfg = base_config();
    cfg["matching_rules"] = json!([
        {"probe_id": [713, 738, 12527]},
        {"process_next": true, "actions": ["Log", "SetLabelTest"]},
        {"internal_labels": "Test", "expected_results": "ASPath_1267", "actions": "Log"}
    ]);
    cfg["expected_results"] = json!({"ASPath_1267": {"as_path": "S 1267"}});

    let (report, sink) = run(cfg);

    // 3 excluded + 5 * (match + log record) + 5 AS path checks.
    assert_eq!(report.counters(), (18, 0, 5));
    assert_eq!(
        report.probe_labels,
        labelled(&[12120, 832, 24535, 24503, 11821], "Test")
    );
    assert!(sink.records.iter().all(|record| record.rule == 1));
    assert!(sink
        .records
        .iter()
        .all(|record| record.outcome == RuleOutcome::Matched));
}

#[test]
fn mismatch_branch_tags_detoured_probes() {
    let mut cfg = base_config();
    cfg["matching_rules"] = json!([
        {"expected_results": "ASPath_1267", "actions": ["SetLabelDetour", "Log"]}
    ]);
    cfg["actions"]["SetLabelDetour"] = json!({
        "kind": "label",
        "op": "add",
        "label_name": "Detour",
        "when": "on_mismatch",
        "scope": "probe"
    });
    cfg["actions"]["Log"]["when"] = json!("on_mismatch");
    cfg["expected_results"] = json!({"ASPath_1267": {"as_path": "S 1267"}});

    let (report, sink) = run(cfg);

    assert_eq!(report.counters(), (8 + 6, 2, 6));
    assert_eq!(
        report.probe_labels,
        labelled(&[12527, 12120, 832, 24535, 24503, 11821], "Detour")
    );
    assert!(sink
        .records
        .iter()
        .all(|record| record.outcome == RuleOutcome::Ko));
}

#[test]
fn reverse_filter_and_label_removal() {
    let mut cfg = base_config();
    cfg["matching_rules"] = json!([
        {"actions": "SetLabelTest", "process_next": true},
        {"probe_id": [713, 738], "reverse": true, "actions": "DelLabelTest"}
    ]);
    cfg["actions"]["DelLabelTest"] = json!({
        "kind": "label",
        "op": "remove",
        "label_name": "Test",
        "scope": "probe"
    });

    let (report, _) = run(cfg);

    assert_eq!(report.counters(), (14, 0, 0));
    assert_eq!(report.probe_labels, labelled(&[713, 738], "Test"));
}

#[test]
fn ok_count_is_bounded_by_evaluations() {
    let mut cfg = base_config();
    cfg["matching_rules"] = json!([
        {"probe_id": [713, 12120, 832], "expected_results": ["ASPath_1267", "Upstream_3356"]}
    ]);
    cfg["expected_results"] = json!({
        "ASPath_1267": {"as_path": "S 1267"},
        "Upstream_3356": {"upstream_as": 3356}
    });

    let (report, _) = run(cfg);
    let (matches, ok, _) = report.counters();

    assert_eq!(matches, 3);
    // 713 via 1267, 12120 via 3356, 832 via 174.
    assert_eq!(ok, 2);
    assert!(ok <= matches);
}
