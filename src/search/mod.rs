//! Search orchestration module
//!
//! Issues a single search call per query and turns the response into render
//! instructions for the gallery.

mod models;
mod orchestrator;

pub use models::*;
pub use orchestrator::SearchOrchestrator;
