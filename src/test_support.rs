//! In-process fake of the photo album API for orchestrator tests

use crate::error::{Error, Result};
use crate::network::{ApiResponse, PhotoApi};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

pub(crate) enum Reply {
    Data(Value),
    Status(u16),
}

#[derive(Default)]
pub(crate) struct MockApi {
    uploads: Mutex<Vec<(String, String)>>,
    searches: Mutex<Vec<String>>,
    failing_uploads: HashSet<String>,
    replies: HashMap<String, Reply>,
    delays: HashMap<String, Duration>,
    gate: Option<Arc<Semaphore>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads of `filename` answer 500
    pub fn failing_upload(mut self, filename: &str) -> Self {
        self.failing_uploads.insert(filename.to_string());
        self
    }

    /// Search response body for `query`, wrapped as `data`
    pub fn reply(mut self, query: &str, reply: Reply) -> Self {
        self.replies.insert(query.to_string(), reply);
        self
    }

    /// Delay the call for `key` (filename or query)
    pub fn delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    /// Hold every upload until a permit is released on the returned gate
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    async fn wait(&self, key: &str) {
        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }
    }
}

fn ok(data: Value) -> ApiResponse {
    ApiResponse {
        status: 200,
        headers: HashMap::new(),
        data,
    }
}

#[async_trait]
impl PhotoApi for MockApi {
    async fn upload(&self, filename: &str, body: &str) -> Result<ApiResponse> {
        self.uploads
            .lock()
            .unwrap()
            .push((filename.to_string(), body.to_string()));
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.wait(filename).await;

        if self.failing_uploads.contains(filename) {
            return Err(Error::RemoteStatus {
                status: 500,
                body: "upload failed".to_string(),
            });
        }
        Ok(ok(Value::Null))
    }

    async fn search(&self, query: &str) -> Result<ApiResponse> {
        self.searches.lock().unwrap().push(query.to_string());
        self.wait(query).await;

        match self.replies.get(query) {
            Some(Reply::Data(data)) => Ok(ok(data.clone())),
            Some(Reply::Status(status)) => Err(Error::RemoteStatus {
                status: *status,
                body: String::new(),
            }),
            None => Ok(ok(serde_json::json!({ "results": [] }))),
        }
    }
}
