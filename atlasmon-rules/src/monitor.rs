use std::sync::Arc;

use async_trait::async_trait;
use atlasmon_core::AtlasMonError;
use atlasmon_protocol::measurement::MeasurementResult;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::dispatch::{LogRecord, LogSink, SinkError};
use crate::engine::RuleChain;
use crate::outcome::RunReport;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no results available for measurement {0}")]
    NotFound(u64),
    #[error("failed to fetch results for measurement {msm_id}: {message}")]
    Fetch { msm_id: u64, message: String },
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("no measurement id configured for this monitor")]
    NoMeasurement,
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl From<MonitorError> for AtlasMonError {
    fn from(err: MonitorError) -> Self {
        AtlasMonError::SourceError(err.to_string())
    }
}

/// Supplies the complete result batch of a measurement, or fails as a whole.
#[async_trait]
pub trait ResultSource: Send + Sync {
    async fn fetch(&self, msm_id: u64) -> Result<Vec<MeasurementResult>, SourceError>;
}

/// Source over an in-memory batch.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    results: Vec<MeasurementResult>,
}

impl StaticSource {
    /// Wraps a batch that may mix several measurements.
    pub fn new(results: Vec<MeasurementResult>) -> Self {
        Self { results }
    }
}

#[async_trait]
impl ResultSource for StaticSource {
    async fn fetch(&self, msm_id: u64) -> Result<Vec<MeasurementResult>, SourceError> {
        let batch: Vec<_> = self
            .results
            .iter()
            .filter(|result| result.msm_id == msm_id)
            .cloned()
            .collect();
        if batch.is_empty() {
            return Err(SourceError::NotFound(msm_id));
        }
        Ok(batch)
    }
}

/// Forwards records to an async consumer (alert delivery, for instance).
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<LogRecord>,
}

impl ChannelSink {
    /// Creates the sink and the receiving end the consumer drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LogRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl LogSink for ChannelSink {
    fn emit(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        self.tx.send(record.clone()).map_err(|_| SinkError::Closed)
    }
}

/// Runs poll cycles: one fetch, then one isolated evaluation of the batch.
#[derive(Clone)]
pub struct Monitor {
    chain: Arc<RuleChain>,
    source: Arc<dyn ResultSource>,
}

impl Monitor {
    /// Binds a compiled chain to the source it polls.
    pub fn new(chain: Arc<RuleChain>, source: Arc<dyn ResultSource>) -> Self {
        Self { chain, source }
    }

    /// Evaluates one cycle. `msm_id` overrides the configured measurement id.
    ///
    /// Nothing is evaluated when the fetch fails, so a failed cycle leaves no
    /// labels behind and can simply be retried.
    pub async fn poll_once(
        &self,
        msm_id: Option<u64>,
        sink: &mut dyn LogSink,
    ) -> Result<RunReport, MonitorError> {
        let msm_id = msm_id
            .or(self.chain.measurement_id())
            .ok_or(MonitorError::NoMeasurement)?;

        let batch = match self.source.fetch(msm_id).await {
            Ok(batch) => batch,
            Err(err) => {
                warn!(msm_id, error = %err, "abandoning poll cycle");
                return Err(err.into());
            }
        };

        info!(msm_id, results = batch.len(), "evaluating result batch");
        Ok(self.chain.run_for(Some(msm_id), &batch, sink))
    }
}
