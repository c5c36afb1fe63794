//! Search orchestration

use super::models::{SearchOutcome, SearchResultSet};
use crate::error::Result;
use crate::metrics::{Metrics, Operation};
use crate::network::PhotoApi;
use crate::view::{Gallery, InputField};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error};

/// Runs queries and renders their results into the gallery
pub struct SearchOrchestrator {
    api: Arc<dyn PhotoApi>,
    metrics: Arc<Metrics>,
    gallery: Gallery,
    discard_stale: bool,
    issued: AtomicU64,
    last_rendered: Mutex<u64>,
}

impl SearchOrchestrator {
    pub fn new(api: Arc<dyn PhotoApi>, metrics: Arc<Metrics>, gallery: Gallery) -> Self {
        Self {
            api,
            metrics,
            gallery,
            discard_stale: true,
            issued: AtomicU64::new(0),
            last_rendered: Mutex::new(0),
        }
    }

    /// With `false`, whichever response resolves last is rendered, even if
    /// it belongs to an older query
    pub fn discard_stale_responses(mut self, discard: bool) -> Self {
        self.discard_stale = discard;
        self
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// Run one query without touching the view.
    ///
    /// Returns `Ok(None)` for a blank query, in which case no call is made.
    pub async fn search(&self, query: &str) -> Result<Option<SearchResultSet>> {
        if query.trim().is_empty() {
            self.metrics.record_search_skipped();
            return Ok(None);
        }

        self.metrics.record_search_issued();
        let start = Instant::now();
        let response = self.api.search(query).await;
        self.metrics
            .record_response_time(Operation::Search, start.elapsed());

        match response {
            Ok(response) => Ok(Some(SearchResultSet::from_response(query, &response))),
            Err(e) => {
                self.metrics.record_search_failure();
                Err(e)
            }
        }
    }

    /// Take the query from `input`, search, and render into the gallery.
    ///
    /// A blank query leaves the input as it is. Otherwise the input is cleared
    /// before the call goes out. The gallery is only replaced on success.
    pub async fn submit(&self, input: &InputField) -> SearchOutcome {
        let query = input.value();
        if query.trim().is_empty() {
            debug!("Ignoring blank search query");
            self.metrics.record_search_skipped();
            return SearchOutcome::Skipped;
        }

        input.clear();
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Search #{} for '{}'", sequence, query);

        match self.search(&query).await {
            Ok(Some(set)) => self.render(sequence, &set),
            Ok(None) => SearchOutcome::Skipped,
            Err(e) => {
                error!("An error occurred while searching images: {}", e);
                SearchOutcome::Failed(e)
            }
        }
    }

    fn render(&self, sequence: u64, set: &SearchResultSet) -> SearchOutcome {
        let mut last = self
            .last_rendered
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        if self.discard_stale && sequence < *last {
            debug!(
                "Dropping response #{} for '{}', #{} already rendered",
                sequence, set.query, *last
            );
            self.metrics.record_search_stale();
            return SearchOutcome::Stale { sequence };
        }

        self.gallery.replace(set.render_instructions());
        *last = (*last).max(sequence);

        SearchOutcome::Rendered {
            sequence,
            count: set.len(),
        }
    }
}
