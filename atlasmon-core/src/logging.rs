use std::io;

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

use crate::errors::{AtlasMonError, Result};

/// Initializes the tracing subscriber used by the binaries.
///
/// Diagnostics go to stderr so that reports printed on stdout stay machine
/// readable. `RUST_LOG` wins over the provided level when it is set.
pub fn init_tracing(level: Option<&str>) -> Result<()> {
    let default_level = level.unwrap_or("info");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init()
        .map_err(|err| AtlasMonError::GeneralError(err.to_string()))?;

    Ok(())
}
