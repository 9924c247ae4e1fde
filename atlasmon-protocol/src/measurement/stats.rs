use serde::{Deserialize, Serialize};

/// Counters accumulated over one evaluation run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunStats {
    /// Rule matches, plus one per emitted log record.
    pub match_count: u64,
    /// Rule matches whose expected-result evaluation succeeded.
    pub ok_count: u64,
    /// Log records accepted by the sink.
    pub log_count: u64,
    /// Log records the sink refused.
    #[serde(default)]
    pub log_failures: u64,
}

impl RunStats {
    pub fn as_tuple(&self) -> (u64, u64, u64) {
        (self.match_count, self.ok_count, self.log_count)
    }
}

impl From<RunStats> for (u64, u64, u64) {
    fn from(stats: RunStats) -> Self {
        stats.as_tuple()
    }
}
