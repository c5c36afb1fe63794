//! photo-album: client-side upload and search for a photo album API
//!
//! Selected images are encoded and uploaded one call per file; free-text
//! queries are sent to the search endpoint and the results rendered into a
//! gallery. Remote calls are authorized with short-lived credentials from an
//! identity pool and signed with AWS Signature V4.

pub mod app;
pub mod auth;
pub mod config;
pub mod encoding;
pub mod error;
pub mod metrics;
pub mod network;
pub mod search;
pub mod upload;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub use app::AppState;
pub use config::Settings;
pub use error::{Error, Result};
pub use network::PhotoApi;
pub use search::{SearchOrchestrator, SearchOutcome, SearchResult, SearchResultSet};
pub use upload::{UploadBatch, UploadOrchestrator, UploadResult};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
