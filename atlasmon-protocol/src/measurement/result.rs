use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::path::{AsPath, Asn};

/// Identifier of a measurement vantage point.
pub type ProbeId = u32;

/// One probe's outcome for a measurement, with hops already resolved to ASNs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasurementResult {
    pub msm_id: u64,
    #[serde(rename = "prb_id")]
    pub probe_id: ProbeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Network the probe itself sits in, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_as: Option<Asn>,
    #[serde(default)]
    pub as_path: AsPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_responded: Option<bool>,
}

impl MeasurementResult {
    pub fn new(msm_id: u64, probe_id: ProbeId, hops: Vec<Option<Asn>>) -> Self {
        Self {
            msm_id,
            probe_id,
            timestamp: None,
            src_as: None,
            as_path: AsPath::new(hops),
            dst_responded: None,
        }
    }

    pub fn with_src_as(mut self, asn: Asn) -> Self {
        self.src_as = Some(asn);
        self
    }

    pub fn with_dst_responded(mut self, responded: bool) -> Self {
        self.dst_responded = Some(responded);
        self
    }

    /// First network crossed after leaving the probe's own AS.
    pub fn upstream_as(&self) -> Option<Asn> {
        self.as_path
            .resolved()
            .find(|asn| Some(*asn) != self.src_as)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_atlas_style_payload() {
        let raw = r#"{
            "msm_id": 1000192,
            "prb_id": 713,
            "timestamp": "2015-11-25T15:00:00Z",
            "src_as": 3333,
            "as_path": [3333, null, 1267, 15169],
            "dst_responded": true
        }"#;

        let result: MeasurementResult = serde_json::from_str(raw).expect("result");
        assert_eq!(result.probe_id, 713);
        assert_eq!(result.upstream_as(), Some(1267));
        assert_eq!(result.dst_responded, Some(true));
    }

    #[test]
    fn upstream_without_source_is_first_resolved_hop() {
        let result = MeasurementResult::new(1, 2, vec![None, Some(174), Some(1267)]);
        assert_eq!(result.upstream_as(), Some(174));
    }
}
