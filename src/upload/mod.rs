//! Upload orchestration module
//!
//! Encodes selected files and uploads each one independently, reporting a
//! per-file outcome for the batch.

mod models;
mod orchestrator;

pub use models::*;
pub use orchestrator::UploadOrchestrator;
