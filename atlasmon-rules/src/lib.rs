//! Rule chain evaluation for scheduled path measurements.
//!
//! A monitor configuration lists ordered matching rules, named actions and
//! named expected results. [`RuleChain::compile`] validates it and resolves
//! every reference once; [`RuleChain::run`] then walks each measurement
//! result through the chain, applying label and log actions and counting
//! matches. Label state never outlives a run.

mod action;
mod condition;
mod dispatch;
mod engine;
mod error;
mod expected;
mod loader;
mod monitor;
mod outcome;
mod pattern;
mod rule;
mod store;

pub use action::{Action, ActionConfig, ActionKind, ActionType, LabelOp, LabelScope, When};
pub use condition::{ProbeFilter, RuleCondition};
pub use dispatch::{Dispatcher, Firing, LogRecord, LogSink, MemorySink, SinkError, TracingSink};
pub use engine::{RuleChain, RunContext};
pub use error::{PatternError, RuleError};
pub use expected::{ExpectedResult, ExpectedResultConfig, Verdict};
pub use loader::{load_config, parse_config, MonitorConfig};
pub use monitor::{ChannelSink, Monitor, MonitorError, ResultSource, SourceError, StaticSource};
pub use outcome::{ChainStep, RuleOutcome, RunReport};
pub use pattern::{AsPathPattern, Clause, Qualifier};
pub use rule::{Rule, RuleConfig};
pub use store::LabelStore;
