use atlasmon_protocol::measurement::{AsPath, MeasurementResult, ProbeId, RunStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::action::{Action, ActionKind, LabelOp};
use crate::outcome::RuleOutcome;
use crate::rule::Rule;
use crate::store::LabelStore;

/// Record emitted by a `log` action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogRecord {
    pub run_id: Uuid,
    pub msm_id: u64,
    pub probe_id: ProbeId,
    pub rule: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_descr: Option<String>,
    pub action: String,
    pub outcome: RuleOutcome,
    pub as_path: AsPath,
    pub emitted_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("log sink rejected record: {0}")]
    Rejected(String),
    #[error("log sink is closed")]
    Closed,
}

/// Destination of log records.
pub trait LogSink {
    fn emit(&mut self, record: &LogRecord) -> Result<(), SinkError>;
}

/// Writes records through `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        info!(
            target: "atlasmon::log",
            run_id = %record.run_id,
            msm_id = record.msm_id,
            probe_id = record.probe_id,
            rule = record.rule,
            rule_descr = record.rule_descr.as_deref().unwrap_or(""),
            action = %record.action,
            outcome = ?record.outcome,
            as_path = ?record.as_path.hops(),
            "result matched rule"
        );
        Ok(())
    }
}

/// Keeps records in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub records: Vec<LogRecord>,
}

impl LogSink for MemorySink {
    fn emit(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// A rule that matched one result, with its outcome.
#[derive(Debug, Clone, Copy)]
pub struct Firing<'a> {
    pub run_id: Uuid,
    pub result: &'a MeasurementResult,
    pub rule: &'a Rule,
    pub outcome: RuleOutcome,
}

/// Executes actions against the capabilities of the current run.
pub struct Dispatcher<'a> {
    labels: &'a mut LabelStore,
    sink: &'a mut dyn LogSink,
    stats: &'a mut RunStats,
}

impl<'a> Dispatcher<'a> {
    /// Borrows the run's label store, sink and counters for one firing.
    pub fn new(labels: &'a mut LabelStore, sink: &'a mut dyn LogSink, stats: &'a mut RunStats) -> Self {
        Self {
            labels,
            sink,
            stats,
        }
    }

    /// Runs the action if its `when` admits the outcome; returns whether it ran.
    pub fn dispatch(&mut self, action: &Action, firing: &Firing<'_>) -> bool {
        if !action.when.admits(firing.outcome) {
            return false;
        }

        match &action.kind {
            ActionKind::Label { op, label, scope } => {
                let probe = firing.result.probe_id;
                match op {
                    LabelOp::Add => self.labels.add(*scope, probe, label),
                    LabelOp::Remove => self.labels.remove(*scope, probe, label),
                }
            }
            ActionKind::Log => self.emit_log(action, firing),
        }
        true
    }

    fn emit_log(&mut self, action: &Action, firing: &Firing<'_>) {
        let record = LogRecord {
            run_id: firing.run_id,
            msm_id: firing.result.msm_id,
            probe_id: firing.result.probe_id,
            rule: firing.rule.position,
            rule_descr: firing.rule.descr.clone(),
            action: action.name.clone(),
            outcome: firing.outcome,
            as_path: firing.result.as_path.clone(),
            emitted_at: Utc::now(),
        };

        match self.sink.emit(&record) {
            Ok(()) => {
                // Each record reports a match of its own.
                self.stats.log_count += 1;
                self.stats.match_count += 1;
            }
            Err(err) => {
                self.stats.log_failures += 1;
                warn!(
                    action = %action.name,
                    probe_id = record.probe_id,
                    rule = record.rule,
                    error = %err,
                    "failed to emit log record"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::action::{LabelScope, When};
    use crate::condition::RuleCondition;

    struct RejectingSink;

    impl LogSink for RejectingSink {
        fn emit(&mut self, _record: &LogRecord) -> Result<(), SinkError> {
            Err(SinkError::Rejected("quota exceeded".into()))
        }
    }

    fn rule() -> Rule {
        Rule {
            position: 2,
            descr: Some("upstream".into()),
            condition: RuleCondition::default(),
            expected_results: vec![],
            actions: vec![],
            process_next: false,
        }
    }

    fn log_action(when: When) -> Arc<Action> {
        Arc::new(Action {
            name: "Log".into(),
            descr: None,
            when,
            kind: ActionKind::Log,
        })
    }

    #[test]
    fn log_action_counts_and_records() {
        let result = MeasurementResult::new(5004, 713, vec![Some(1267)]);
        let rule = rule();
        let firing = Firing {
            run_id: Uuid::new_v4(),
            result: &result,
            rule: &rule,
            outcome: RuleOutcome::Ok,
        };
        let mut labels = LabelStore::new();
        let mut sink = MemorySink::default();
        let mut stats = RunStats::default();

        let ran = Dispatcher::new(&mut labels, &mut sink, &mut stats)
            .dispatch(&log_action(When::OnMatch), &firing);

        assert!(ran);
        assert_eq!(stats.as_tuple(), (1, 0, 1));
        assert_eq!(sink.records.len(), 1);
        assert_eq!(sink.records[0].rule, 2);
        assert_eq!(sink.records[0].rule_descr.as_deref(), Some("upstream"));
    }

    #[test]
    fn gated_actions_do_nothing() {
        let result = MeasurementResult::new(5004, 713, vec![]);
        let rule = rule();
        let firing = Firing {
            run_id: Uuid::new_v4(),
            result: &result,
            rule: &rule,
            outcome: RuleOutcome::Matched,
        };
        let label = Action {
            name: "SetLabelTest".into(),
            descr: None,
            when: When::OnMismatch,
            kind: ActionKind::Label {
                op: LabelOp::Add,
                label: "Test".into(),
                scope: LabelScope::Probe,
            },
        };
        let mut labels = LabelStore::new();
        let mut sink = MemorySink::default();
        let mut stats = RunStats::default();

        let mut dispatcher = Dispatcher::new(&mut labels, &mut sink, &mut stats);
        assert!(!dispatcher.dispatch(&label, &firing));
        assert!(!dispatcher.dispatch(&log_action(When::OnMismatch), &firing));

        assert!(labels.snapshot().is_empty());
        assert!(sink.records.is_empty());
        assert_eq!(stats, RunStats::default());
    }

    #[test]
    fn sink_failures_are_isolated() {
        let result = MeasurementResult::new(5004, 713, vec![]);
        let rule = rule();
        let firing = Firing {
            run_id: Uuid::new_v4(),
            result: &result,
            rule: &rule,
            outcome: RuleOutcome::Ko,
        };
        let mut labels = LabelStore::new();
        let mut sink = RejectingSink;
        let mut stats = RunStats::default();

        let ran = Dispatcher::new(&mut labels, &mut sink, &mut stats)
            .dispatch(&log_action(When::Always), &firing);

        assert!(ran);
        assert_eq!(stats.as_tuple(), (0, 0, 0));
        assert_eq!(stats.log_failures, 1);
    }
}
