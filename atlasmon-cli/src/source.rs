use std::path::PathBuf;

use async_trait::async_trait;
use atlasmon_protocol::measurement::MeasurementResult;
use atlasmon_rules::{ResultSource, SourceError};

/// Reads a JSON array of already-resolved results from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Source reading the JSON array at `path` on every fetch.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn failure(&self, msm_id: u64, reason: impl std::fmt::Display) -> SourceError {
        SourceError::Fetch {
            msm_id,
            message: format!("{}: {}", self.path.display(), reason),
        }
    }
}

#[async_trait]
impl ResultSource for FileSource {
    async fn fetch(&self, msm_id: u64) -> Result<Vec<MeasurementResult>, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| self.failure(msm_id, err))?;
        let results: Vec<MeasurementResult> =
            serde_json::from_str(&raw).map_err(|err| self.failure(msm_id, err))?;

        let batch: Vec<_> = results
            .into_iter()
            .filter(|result| result.msm_id == msm_id)
            .collect();
        if batch.is_empty() {
            return Err(SourceError::NotFound(msm_id));
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn reads_matching_measurement() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"[{{"msm_id": 7, "prb_id": 1, "as_path": [1267]}},
               {{"msm_id": 8, "prb_id": 2, "as_path": [null]}}]"#
        )
        .expect("write");

        let source = FileSource::new(file.path());
        let batch = source.fetch(7).await.expect("fetch");
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].probe_id, 1);

        assert!(matches!(
            source.fetch(9).await,
            Err(SourceError::NotFound(9))
        ));
    }

    #[tokio::test]
    async fn malformed_file_fails_the_whole_batch() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "[{{\"msm_id\": 7").expect("write");

        let err = FileSource::new(file.path()).fetch(7).await.unwrap_err();
        assert!(matches!(err, SourceError::Fetch { msm_id: 7, .. }));
    }
}
