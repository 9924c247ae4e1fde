//! Core shared library for the atlasmon workspace.
//!
//! This crate exposes the primitives every other crate depends on: the
//! canonical error type, environment configuration loading, logging setup
//! and serde helpers used by the configuration documents.

pub mod config;
pub mod errors;
pub mod logging;
pub mod serde_utils;

pub use errors::{AtlasMonError, Result as CoreResult};
