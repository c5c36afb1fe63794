//! HTTP networking module
//!
//! Provides the HTTP client and the photo album API client built on it.

mod api;
mod client;
mod models;

pub use api::{ApiGatewayClient, PhotoApi};
pub use client::HttpClient;
pub use models::{ApiRequest, ApiResponse, HttpMethod, RawResponse};
