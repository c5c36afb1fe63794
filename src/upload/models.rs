//! Upload batch data models

use crate::error::Error;
use futures::stream::{BoxStream, StreamExt};
use uuid::Uuid;

/// Outcome of a single file upload
#[derive(Debug)]
pub enum UploadOutcome {
    Success,
    Failure(Error),
}

/// Result for one file of a batch
#[derive(Debug)]
pub struct UploadResult {
    /// Position of the file in the submitted batch
    pub index: usize,
    pub filename: String,
    pub outcome: UploadOutcome,
}

impl UploadResult {
    pub fn success(index: usize, filename: impl Into<String>) -> Self {
        Self {
            index,
            filename: filename.into(),
            outcome: UploadOutcome::Success,
        }
    }

    pub fn failure(index: usize, filename: impl Into<String>, error: Error) -> Self {
        Self {
            index,
            filename: filename.into(),
            outcome: UploadOutcome::Failure(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, UploadOutcome::Success)
    }

    pub fn error(&self) -> Option<&Error> {
        match &self.outcome {
            UploadOutcome::Success => None,
            UploadOutcome::Failure(e) => Some(e),
        }
    }
}

/// Aggregate status of a finished batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_results(submitted: usize, results: &[UploadResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            submitted,
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.succeeded == self.submitted
    }
}

/// A dispatched batch of uploads.
///
/// Results arrive in completion order, not selection order.
pub struct UploadBatch {
    pub id: Uuid,
    /// Number of files dispatched
    pub submitted: usize,
    results: BoxStream<'static, UploadResult>,
}

impl UploadBatch {
    pub(crate) fn new(submitted: usize, results: BoxStream<'static, UploadResult>) -> Self {
        Self {
            id: Uuid::new_v4(),
            submitted,
            results,
        }
    }

    pub(crate) fn empty() -> Self {
        Self::new(0, futures::stream::empty().boxed())
    }

    /// Results as they complete
    pub fn into_stream(self) -> BoxStream<'static, UploadResult> {
        self.results
    }

    /// Wait for every upload; results are returned in selection order
    pub async fn collect(self) -> Vec<UploadResult> {
        let mut results: Vec<UploadResult> = self.results.collect().await;
        results.sort_by_key(|r| r.index);
        results
    }

    /// Wait for every upload and fold the outcomes
    pub async fn summary(self) -> BatchSummary {
        let submitted = self.submitted;
        let results = self.collect().await;
        BatchSummary::from_results(submitted, &results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let results = vec![
            UploadResult::success(0, "a.png"),
            UploadResult::failure(1, "b.png", Error::Credentials("expired".into())),
            UploadResult::success(2, "c.png"),
        ];
        let summary = BatchSummary::from_results(3, &results);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_succeeded());
        assert!(results[1].error().is_some());
    }

    #[tokio::test]
    async fn test_collect_restores_selection_order() {
        let stream = futures::stream::iter(vec![
            UploadResult::success(2, "c.png"),
            UploadResult::success(0, "a.png"),
            UploadResult::success(1, "b.png"),
        ])
        .boxed();
        let batch = UploadBatch::new(3, stream);
        let names: Vec<String> = batch.collect().await.into_iter().map(|r| r.filename).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let batch = UploadBatch::empty();
        assert_eq!(batch.submitted, 0);
        assert!(batch.summary().await.all_succeeded());
    }
}
