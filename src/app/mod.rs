//! Application wiring
//!
//! Builds the session objects from settings and hands them to the CLI.

mod state;

pub use state::AppState;
