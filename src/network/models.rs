//! Request and response types for the HTTP layer

use crate::error::{Error, Result};
use std::collections::HashMap;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
        }
    }
}

/// Outgoing HTTP request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// URL to request; `params` are appended by `full_url`
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Query parameters, in insertion order
    pub params: Vec<(String, String)>,
    /// Request body bytes
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HashMap::new(),
            params: Vec::new(),
            body: None,
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Create a PUT request
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Set a JSON body
    pub fn json(self, value: &serde_json::Value) -> Result<Self> {
        let bytes = serde_json::to_vec(value)?;
        Ok(self.body(bytes, "application/json"))
    }

    /// Set a raw body with its content type
    pub fn body(mut self, bytes: Vec<u8>, content_type: &str) -> Self {
        self.headers
            .insert("content-type".to_string(), content_type.to_string());
        self.body = Some(bytes);
        self
    }

    /// Body bytes, empty when there is no body
    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }

    /// Query string as sent, RFC 3986 percent-encoded (a space is `%20`)
    pub fn query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// URL with the encoded query string appended
    pub fn full_url(&self) -> String {
        if self.params.is_empty() {
            return self.url.clone();
        }
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, self.query_string())
    }
}

/// Raw HTTP response
#[derive(Debug)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response body as text
    pub text: String,
}

impl RawResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into an error
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::RemoteStatus {
                status: self.status,
                body: self.text,
            })
        }
    }
}

/// Response handed back to orchestrators, shaped like the generated API client's
/// `{ status, headers, data }`
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    /// Parsed JSON body; non-JSON bodies become a string value
    pub data: serde_json::Value,
}

impl From<RawResponse> for ApiResponse {
    fn from(raw: RawResponse) -> Self {
        let data = if raw.text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&raw.text).unwrap_or(serde_json::Value::String(raw.text))
        };
        Self {
            status: raw.status,
            headers: raw.headers,
            data,
        }
    }
}
