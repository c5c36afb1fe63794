//! Session metrics
//!
//! Counts upload and search outcomes and keeps rolling call latencies.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

/// Latency samples kept per operation
const MAX_SAMPLES: usize = 100;

/// Remote operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Upload,
    Search,
}

/// Session metrics collector
#[derive(Debug, Default)]
pub struct Metrics {
    uploads_submitted: AtomicU64,
    uploads_succeeded: AtomicU64,
    uploads_failed: AtomicU64,
    searches_issued: AtomicU64,
    searches_skipped: AtomicU64,
    searches_failed: AtomicU64,
    searches_stale: AtomicU64,
    response_times: RwLock<HashMap<Operation, Vec<u64>>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_upload_submitted(&self, count: usize) {
        self.uploads_submitted
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_upload_success(&self) {
        self.uploads_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upload_failure(&self) {
        self.uploads_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search_issued(&self) {
        self.searches_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search_skipped(&self) {
        self.searches_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search_failure(&self) {
        self.searches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search_stale(&self) {
        self.searches_stale.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a remote call latency
    pub fn record_response_time(&self, operation: Operation, elapsed: Duration) {
        let mut times = self
            .response_times
            .write()
            .unwrap_or_else(|e| e.into_inner());
        let entry = times.entry(operation).or_default();

        if entry.len() >= MAX_SAMPLES {
            entry.remove(0);
        }
        entry.push(elapsed.as_millis() as u64);
    }

    /// Average latency in milliseconds
    pub fn avg_response_time(&self, operation: Operation) -> Option<u64> {
        let times = self.response_times.read().unwrap_or_else(|e| e.into_inner());
        times.get(&operation).and_then(|t| {
            if t.is_empty() {
                None
            } else {
                Some(t.iter().sum::<u64>() / t.len() as u64)
            }
        })
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uploads_submitted: self.uploads_submitted.load(Ordering::Relaxed),
            uploads_succeeded: self.uploads_succeeded.load(Ordering::Relaxed),
            uploads_failed: self.uploads_failed.load(Ordering::Relaxed),
            searches_issued: self.searches_issued.load(Ordering::Relaxed),
            searches_skipped: self.searches_skipped.load(Ordering::Relaxed),
            searches_failed: self.searches_failed.load(Ordering::Relaxed),
            searches_stale: self.searches_stale.load(Ordering::Relaxed),
            avg_upload_ms: self.avg_response_time(Operation::Upload),
            avg_search_ms: self.avg_response_time(Operation::Search),
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub uploads_submitted: u64,
    pub uploads_succeeded: u64,
    pub uploads_failed: u64,
    pub searches_issued: u64,
    pub searches_skipped: u64,
    pub searches_failed: u64,
    pub searches_stale: u64,
    pub avg_upload_ms: Option<u64>,
    pub avg_search_ms: Option<u64>,
}
