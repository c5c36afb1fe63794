//! Upload orchestration

use super::models::{UploadBatch, UploadResult};
use crate::encoding::{EncodedPayload, SelectedFile};
use crate::metrics::{Metrics, Operation};
use crate::network::PhotoApi;
use crate::view::{InputField, StatusMessage};
use futures::channel::mpsc;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Turns a file selection into one upload call per file
pub struct UploadOrchestrator {
    api: Arc<dyn PhotoApi>,
    metrics: Arc<Metrics>,
    /// Uploads in flight per batch (none = unbounded)
    max_concurrent: Option<usize>,
}

impl UploadOrchestrator {
    pub fn new(api: Arc<dyn PhotoApi>, metrics: Arc<Metrics>) -> Self {
        Self {
            api,
            metrics,
            max_concurrent: None,
        }
    }

    /// Cap concurrent uploads within a batch
    pub fn with_max_concurrent(mut self, limit: Option<usize>) -> Self {
        self.max_concurrent = limit.filter(|n| *n > 0);
        self
    }

    /// Dispatch a batch.
    ///
    /// The file input is cleared before anything is spawned so the same file
    /// can be selected again right away. Each file runs in its own task; a
    /// failure is reported for that file only. The status line is set once
    /// for the whole batch after dispatch, while uploads may still be running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(
        &self,
        files: Vec<SelectedFile>,
        file_input: &InputField,
        status: &StatusMessage,
    ) -> UploadBatch {
        if files.is_empty() {
            debug!("Empty file selection, nothing to upload");
            return UploadBatch::empty();
        }

        file_input.clear();

        let submitted = files.len();
        let limiter = self.max_concurrent.map(|n| Arc::new(Semaphore::new(n)));
        let (tx, rx) = mpsc::unbounded();

        for (index, file) in files.into_iter().enumerate() {
            let api = self.api.clone();
            let metrics = self.metrics.clone();
            let limiter = limiter.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };
                let result = upload_file(api.as_ref(), &metrics, index, file).await;
                // Receiver may be gone; the upload itself still happened
                let _ = tx.unbounded_send(result);
            });
        }
        drop(tx);

        self.metrics.record_upload_submitted(submitted);
        status.show(format!("Uploading {} image(s)", submitted));
        info!("Dispatched {} upload(s)", submitted);

        UploadBatch::new(submitted, rx.boxed())
    }
}

async fn upload_file(
    api: &dyn PhotoApi,
    metrics: &Metrics,
    index: usize,
    file: SelectedFile,
) -> UploadResult {
    let payload = match EncodedPayload::from_file(&file).await {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Failed to read {}: {}", file.name, e);
            metrics.record_upload_failure();
            return UploadResult::failure(index, file.name, e);
        }
    };
    debug!(
        "Encoded {} as {} ({} chars)",
        payload.filename,
        file.mime_type,
        payload.data.len()
    );

    let start = Instant::now();
    let result = api.upload(&payload.filename, &payload.data).await;
    metrics.record_response_time(Operation::Upload, start.elapsed());

    match result {
        Ok(response) => {
            info!("Uploaded {} (status {})", payload.filename, response.status);
            metrics.record_upload_success();
            UploadResult::success(index, payload.filename)
        }
        Err(e) => {
            error!(
                "An error occurred while uploading image {}: {}",
                payload.filename, e
            );
            metrics.record_upload_failure();
            UploadResult::failure(index, payload.filename, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_support::MockApi;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use std::time::Duration;

    fn setup(api: MockApi) -> (Arc<MockApi>, UploadOrchestrator, Arc<Metrics>) {
        let api = Arc::new(api);
        let metrics = Arc::new(Metrics::new());
        let orchestrator = UploadOrchestrator::new(api.clone(), metrics.clone());
        (api, orchestrator, metrics)
    }

    fn file(name: &str) -> SelectedFile {
        SelectedFile::from_bytes(name, name.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_one_call_per_file() {
        let (api, orchestrator, metrics) = setup(MockApi::new());
        let input = InputField::new();
        let status = StatusMessage::new();

        let batch = orchestrator.submit(
            vec![file("a.png"), file("b.jpg"), file("c.jpeg")],
            &input,
            &status,
        );
        assert_eq!(batch.submitted, 3);

        let results = batch.collect().await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(UploadResult::is_success));
        assert_eq!(api.uploads().len(), 3);

        for (name, body) in api.uploads() {
            assert!(!body.starts_with("data:"), "{} kept its prefix", name);
            assert_eq!(body, STANDARD.encode(name.as_bytes()));
        }
        assert_eq!(metrics.snapshot().uploads_succeeded, 3);
    }

    #[tokio::test]
    async fn test_partial_failure_does_not_stop_siblings() {
        let api = MockApi::new()
            .failing_upload("b.png")
            .delay("a.png", Duration::from_millis(30));
        let (api, orchestrator, metrics) = setup(api);

        let batch = orchestrator.submit(
            vec![file("a.png"), file("b.png"), file("c.png")],
            &InputField::new(),
            &StatusMessage::new(),
        );
        let results = batch.collect().await;

        assert_eq!(api.uploads().len(), 3);
        let outcomes: Vec<(&str, bool)> = results
            .iter()
            .map(|r| (r.filename.as_str(), r.is_success()))
            .collect();
        assert_eq!(
            outcomes,
            vec![("a.png", true), ("b.png", false), ("c.png", true)]
        );
        assert!(matches!(
            results[1].error(),
            Some(Error::RemoteStatus { status: 500, .. })
        ));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.uploads_submitted, 3);
        assert_eq!(snapshot.uploads_failed, 1);
    }

    #[tokio::test]
    async fn test_read_failure_is_per_file() {
        let (api, orchestrator, _) = setup(MockApi::new());
        let summary = orchestrator
            .submit(
                vec![
                    SelectedFile::from_path("/nonexistent/missing.png"),
                    file("ok.png"),
                ],
                &InputField::new(),
                &StatusMessage::new(),
            )
            .summary()
            .await;

        assert_eq!(summary.submitted, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(api.uploads().len(), 1);
    }

    #[tokio::test]
    async fn test_input_cleared_and_status_set_before_completion() {
        let (api, gate) = MockApi::new().gated();
        let (api, orchestrator, _) = setup(api);
        let input = InputField::new();
        input.set("/photos/a.png");
        let status = StatusMessage::new();

        let batch = orchestrator.submit(vec![file("a.png"), file("b.png")], &input, &status);

        // Nothing has completed yet: every upload is parked on the gate
        assert!(input.is_empty());
        assert_eq!(status.text().as_deref(), Some("Uploading 2 image(s)"));

        gate.add_permits(2);
        let results = batch.collect().await;
        assert_eq!(results.len(), 2);
        assert_eq!(api.uploads().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_selection_is_noop() {
        let (api, orchestrator, _) = setup(MockApi::new());
        let input = InputField::new();
        input.set("previous");
        let status = StatusMessage::new();

        let batch = orchestrator.submit(Vec::new(), &input, &status);
        assert_eq!(batch.submitted, 0);
        assert!(batch.collect().await.is_empty());
        assert_eq!(input.value(), "previous");
        assert!(status.text().is_none());
        assert!(api.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_concurrency_cap() {
        let (api, gate) = MockApi::new().gated();
        let (api, orchestrator, _) = setup(api);
        let orchestrator = orchestrator.with_max_concurrent(Some(1));

        let batch = orchestrator.submit(
            vec![file("a.png"), file("b.png"), file("c.png")],
            &InputField::new(),
            &StatusMessage::new(),
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(api.uploads().len(), 1);

        gate.add_permits(3);
        assert_eq!(batch.collect().await.len(), 3);
        assert_eq!(api.uploads().len(), 3);
    }

    #[tokio::test]
    async fn test_non_image_passes_through() {
        let (api, orchestrator, _) = setup(MockApi::new());
        orchestrator
            .submit(
                vec![file("notes.txt")],
                &InputField::new(),
                &StatusMessage::new(),
            )
            .collect()
            .await;

        let (_, body) = &api.uploads()[0];
        assert!(body.starts_with("data:application/octet-stream;base64,"));
    }
}
