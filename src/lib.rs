//! atlasmon: rule chain evaluation for scheduled network path measurements.
//!
//! The workspace is split in several crates:
//!
//! * `atlasmon-core`: canonical errors, logging setup, environment config
//! * `atlasmon-protocol`: measurement results, AS paths and run statistics
//! * `atlasmon-rules`: configuration loading, AS-path matcher, label store,
//!   action dispatch, rule chain evaluator and poll cycles
//! * `atlasmon-cli`: the `atlasmon` binary
//!
//! This crate re-exports them under one roof.

pub use atlasmon_core::{config, errors, logging, serde_utils, AtlasMonError};
pub use atlasmon_protocol as protocol;
pub use atlasmon_rules as rules;
