mod path;
mod result;
mod stats;

pub use path::{AsPath, Asn};
pub use result::{MeasurementResult, ProbeId};
pub use stats::RunStats;
