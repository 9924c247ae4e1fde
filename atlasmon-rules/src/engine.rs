use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use atlasmon_protocol::measurement::{MeasurementResult, RunStats};
use tracing::{debug, info};
use uuid::Uuid;

use crate::action::Action;
use crate::condition::{ProbeFilter, RuleCondition};
use crate::dispatch::{Dispatcher, Firing, LogSink};
use crate::error::RuleError;
use crate::expected::{ExpectedResult, Verdict};
use crate::loader::{load_config, MonitorConfig};
use crate::outcome::{ChainStep, RuleOutcome, RunReport};
use crate::rule::{Rule, RuleConfig};
use crate::store::LabelStore;

/// Per-run state. A fresh context is created for every run and consumed by
/// [`RunContext::into_report`], so nothing leaks between runs.
#[derive(Debug)]
pub struct RunContext {
    pub run_id: Uuid,
    pub labels: LabelStore,
    pub stats: RunStats,
    pub results_processed: usize,
}

impl RunContext {
    /// Starts a run with empty labels, zeroed counters and a new run id.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            labels: LabelStore::new(),
            stats: RunStats::default(),
            results_processed: 0,
        }
    }

    /// Ends the run, keeping only the probe-scoped labels.
    pub fn into_report(self) -> RunReport {
        RunReport {
            run_id: self.run_id,
            results_processed: self.results_processed,
            stats: self.stats,
            probe_labels: self.labels.snapshot(),
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Compiled, immutable rule chain. Can be shared between concurrent runs.
#[derive(Debug, Clone)]
pub struct RuleChain {
    descr: Option<String>,
    measurement_id: Option<u64>,
    rules: Vec<Rule>,
    actions: usize,
    expected_results: usize,
}

impl RuleChain {
    /// Validates the configuration and resolves every name reference.
    pub fn compile(config: MonitorConfig) -> Result<Self, RuleError> {
        if config.matching_rules.is_empty() {
            return Err(RuleError::NoRules);
        }

        let actions = config
            .actions
            .into_iter()
            .map(|(name, action)| -> Result<_, RuleError> {
                let compiled = Action::compile(&name, action)?;
                Ok((name, Arc::new(compiled)))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        let expected_results = config
            .expected_results
            .into_iter()
            .map(|(name, expected)| -> Result<_, RuleError> {
                let compiled = ExpectedResult::compile(&name, expected)?;
                Ok((name, Arc::new(compiled)))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        let rules = config
            .matching_rules
            .into_iter()
            .enumerate()
            .map(|(position, rule)| compile_rule(position, rule, &actions, &expected_results))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            descr: config.descr,
            measurement_id: config.measurement_id,
            rules,
            actions: actions.len(),
            expected_results: expected_results.len(),
        })
    }

    /// Loads and compiles the configuration file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuleError> {
        Self::compile(load_config(path)?)
    }

    /// Description of the monitor, if the configuration has one.
    pub fn descr(&self) -> Option<&str> {
        self.descr.as_deref()
    }

    /// Measurement the configuration targets.
    pub fn measurement_id(&self) -> Option<u64> {
        self.measurement_id
    }

    /// Compiled rules, in configuration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of actions defined in the configuration.
    pub fn action_count(&self) -> usize {
        self.actions
    }

    /// Number of expected results defined in the configuration.
    pub fn expected_result_count(&self) -> usize {
        self.expected_results
    }

    /// Evaluates `results` in order with a fresh context, keeping only the
    /// configured measurement when one is set.
    pub fn run<'r, I>(&self, results: I, sink: &mut dyn LogSink) -> RunReport
    where
        I: IntoIterator<Item = &'r MeasurementResult>,
    {
        self.run_for(self.measurement_id, results, sink)
    }

    /// Like [`RuleChain::run`], with the measurement filter given by the caller.
    /// `None` evaluates every result.
    pub fn run_for<'r, I>(
        &self,
        measurement_id: Option<u64>,
        results: I,
        sink: &mut dyn LogSink,
    ) -> RunReport
    where
        I: IntoIterator<Item = &'r MeasurementResult>,
    {
        let mut ctx = RunContext::new();
        for result in results {
            if let Some(expected) = measurement_id {
                if result.msm_id != expected {
                    debug!(
                        msm_id = result.msm_id,
                        probe_id = result.probe_id,
                        "skipping result of another measurement"
                    );
                    continue;
                }
            }
            self.evaluate_result(&mut ctx, result, sink);
        }

        let (matches, ok, logs) = ctx.stats.as_tuple();
        info!(
            run_id = %ctx.run_id,
            results = ctx.results_processed,
            matches,
            ok,
            logs,
            log_failures = ctx.stats.log_failures,
            "rule chain run completed"
        );
        ctx.into_report()
    }

    /// Walks the chain for one result.
    pub fn evaluate_result(
        &self,
        ctx: &mut RunContext,
        result: &MeasurementResult,
        sink: &mut dyn LogSink,
    ) {
        ctx.labels.begin_result();
        ctx.results_processed += 1;

        for rule in &self.rules {
            if self.evaluate_rule(ctx, rule, result, sink) == ChainStep::Stop {
                break;
            }
        }
    }

    fn evaluate_rule(
        &self,
        ctx: &mut RunContext,
        rule: &Rule,
        result: &MeasurementResult,
        sink: &mut dyn LogSink,
    ) -> ChainStep {
        if !rule.condition.evaluate(result, &ctx.labels) {
            return ChainStep::Continue;
        }

        let outcome = if rule.has_expected_results() {
            let matched = rule
                .expected_results
                .iter()
                .any(|expected| expected.evaluate(result) == Verdict::Match);
            RuleOutcome::from(Verdict::from(matched))
        } else {
            RuleOutcome::Matched
        };

        ctx.stats.match_count += 1;
        if outcome == RuleOutcome::Ok {
            ctx.stats.ok_count += 1;
        }
        debug!(
            rule = rule.position,
            probe_id = result.probe_id,
            outcome = ?outcome,
            "result matched rule"
        );

        let firing = Firing {
            run_id: ctx.run_id,
            result,
            rule,
            outcome,
        };
        let mut dispatcher = Dispatcher::new(&mut ctx.labels, sink, &mut ctx.stats);
        for action in &rule.actions {
            dispatcher.dispatch(action, &firing);
        }

        if rule.process_next {
            ChainStep::Continue
        } else {
            ChainStep::Stop
        }
    }
}

fn compile_rule(
    position: usize,
    config: RuleConfig,
    actions: &HashMap<String, Arc<Action>>,
    expected_results: &HashMap<String, Arc<ExpectedResult>>,
) -> Result<Rule, RuleError> {
    let resolved_actions = config
        .actions
        .iter()
        .map(|name| {
            actions
                .get(name)
                .cloned()
                .ok_or_else(|| RuleError::UnknownAction {
                    rule: position,
                    name: name.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let resolved_expected = config
        .expected_results
        .iter()
        .map(|name| {
            expected_results
                .get(name)
                .cloned()
                .ok_or_else(|| RuleError::UnknownExpectedResult {
                    rule: position,
                    name: name.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Rule {
        position,
        descr: config.descr,
        condition: RuleCondition {
            probes: ProbeFilter {
                probe_ids: config.probe_id.into_iter().collect(),
                src_as: config.src_as.into_iter().collect(),
                reverse: config.reverse,
            },
            required_labels: config.internal_labels,
        },
        expected_results: resolved_expected,
        actions: resolved_actions,
        process_next: config.process_next,
    })
}
