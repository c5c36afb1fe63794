//! HTTP client for talking to the photo album API and the identity service

use super::models::{ApiRequest, HttpMethod, RawResponse};
use crate::config::OutgoingSettings;
use crate::error::{Error, Result};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;

/// HTTP client wrapper with photo-album specific configuration
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
    user_agent: String,
    extra_headers: HashMap<String, String>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let timeout = request_timeout(settings.request_timeout)?;
        let mut builder = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(settings.pool_maxsize)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            default_timeout: timeout,
            user_agent: format!("photo-album/{}", crate::VERSION),
            extra_headers: settings.extra_headers.clone(),
        })
    }

    /// Execute a request
    pub async fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
        self.execute_with_timeout(request, self.default_timeout).await
    }

    /// Execute a request with custom timeout
    pub async fn execute_with_timeout(
        &self,
        request: ApiRequest,
        timeout: Duration,
    ) -> Result<RawResponse> {
        // The query is encoded exactly as the signer saw it
        let url = request.full_url();
        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Post => self.client.post(&url),
        };

        req_builder = req_builder.timeout(timeout);
        for (key, value) in self.merged_headers(&request.headers) {
            req_builder = req_builder.header(key, value);
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder.send().await?;

        Self::parse_response(response).await
    }

    /// Defaults, then configured extras, then request headers, one value per
    /// name; later layers replace earlier ones case-insensitively
    fn merged_headers(
        &self,
        request_headers: &HashMap<String, String>,
    ) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("user-agent".to_string(), self.user_agent.clone());
        headers.insert("accept".to_string(), "application/json".to_string());
        for (key, value) in self.extra_headers.iter().chain(request_headers) {
            headers.insert(key.to_ascii_lowercase(), value.clone());
        }
        headers
    }

    /// Parse response into RawResponse
    async fn parse_response(response: Response) -> Result<RawResponse> {
        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let text = response.text().await?;

        Ok(RawResponse {
            status,
            headers,
            text,
        })
    }

    /// Get current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

fn request_timeout(seconds: f64) -> Result<Duration> {
    if seconds <= 0.0 {
        return Err(Error::Config(format!(
            "outgoing.request_timeout must be positive, got {}",
            seconds
        )));
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| {
        Error::Config(format!(
            "outgoing.request_timeout {} is not a valid duration: {}",
            seconds, e
        ))
    })
}
