//! Search data models

use crate::error::Error;
use crate::network::ApiResponse;
use crate::view::RenderInstruction;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A single stored image matching a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    /// Labels detected for the image, when the backend returns them
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Results of one query, in response order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResultSet {
    pub query: String,
    pub results: Vec<SearchResult>,
    /// The response carried no `results` field
    #[serde(skip)]
    pub missing_results: bool,
}

impl SearchResultSet {
    /// Pull `data.results` out of a search response.
    ///
    /// A missing or non-array `results` field yields an empty set rather than
    /// an error. Entries without a usable `url` are skipped.
    pub fn from_response(query: &str, response: &ApiResponse) -> Self {
        let Some(items) = response.data.get("results").and_then(|r| r.as_array()) else {
            info!("Search response for '{}' has no results field", query);
            return Self {
                query: query.to_string(),
                results: Vec::new(),
                missing_results: true,
            };
        };

        let results: Vec<SearchResult> = items
            .iter()
            .filter_map(|item| match serde_json::from_value(item.clone()) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Skipping malformed search result {}: {}", item, e);
                    None
                }
            })
            .collect();
        info!("{} images found for '{}'", results.len(), query);

        Self {
            query: query.to_string(),
            results,
            missing_results: false,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Summary line followed by one image per result; nothing when the
    /// response had no results field
    pub fn render_instructions(&self) -> Vec<RenderInstruction> {
        if self.missing_results {
            return Vec::new();
        }

        let mut instructions = Vec::with_capacity(self.results.len() + 1);
        instructions.push(RenderInstruction::Summary {
            count: self.results.len(),
            query: self.query.clone(),
        });
        instructions.extend(self.results.iter().map(|r| RenderInstruction::Image {
            url: r.url.clone(),
        }));
        instructions
    }
}

/// How one search submission ended
#[derive(Debug)]
pub enum SearchOutcome {
    /// Blank query, nothing was sent
    Skipped,
    /// The gallery now shows this response
    Rendered { sequence: u64, count: usize },
    /// A newer response was already rendered; this one was dropped
    Stale { sequence: u64 },
    /// The remote call failed; the gallery is unchanged
    Failed(Error),
}

impl SearchOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, SearchOutcome::Rendered { .. })
    }
}
