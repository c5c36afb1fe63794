//! Photo album API client

use super::client::HttpClient;
use super::models::{ApiRequest, ApiResponse};
use crate::auth::{AuthContext, SigV4Signer};
use crate::config::ApiSettings;
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// The two remote calls the orchestrators depend on
#[async_trait]
pub trait PhotoApi: Send + Sync {
    /// Store one encoded image under `filename`
    async fn upload(&self, filename: &str, body: &str) -> Result<ApiResponse>;

    /// Search stored images with a free-text query
    async fn search(&self, query: &str) -> Result<ApiResponse>;
}

/// Client for the deployed API Gateway stage
pub struct ApiGatewayClient {
    http: HttpClient,
    auth: Arc<AuthContext>,
    signer: SigV4Signer,
    base_url: String,
    api_key: Option<String>,
    upload_path: String,
    search_path: String,
    upload_content_type: String,
}

impl ApiGatewayClient {
    pub fn new(
        http: HttpClient,
        auth: Arc<AuthContext>,
        settings: &ApiSettings,
        signing_service: &str,
    ) -> Self {
        let signer = SigV4Signer::new(auth.region(), signing_service);
        Self {
            http,
            auth,
            signer,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            upload_path: settings.upload_path.clone(),
            search_path: settings.search_path.clone(),
            upload_content_type: settings.upload_content_type.clone(),
        }
    }

    fn upload_url(&self, filename: &str) -> String {
        let path = self
            .upload_path
            .replace("{filename}", &urlencoding::encode(filename));
        format!("{}{}", self.base_url, path)
    }

    fn search_url(&self) -> String {
        format!("{}{}", self.base_url, self.search_path)
    }

    /// Add the api key, sign with the session credentials and send
    async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key.clone());
        }

        if let Some(token) = self.auth.credentials().await? {
            request = self.signer.sign(request, &token, Utc::now())?;
        }

        let method = request.method.as_str();
        let url = request.full_url();
        let start = Instant::now();
        let response = self.http.execute(request).await?;
        debug!(
            "{} {} -> {} in {:?}",
            method,
            url,
            response.status,
            start.elapsed()
        );

        Ok(response.error_for_status()?.into())
    }
}

#[async_trait]
impl PhotoApi for ApiGatewayClient {
    async fn upload(&self, filename: &str, body: &str) -> Result<ApiResponse> {
        let bytes = if self.upload_content_type == "application/json" {
            serde_json::to_vec(body)?
        } else {
            body.as_bytes().to_vec()
        };
        let request =
            ApiRequest::put(self.upload_url(filename)).body(bytes, &self.upload_content_type);
        self.send(request).await
    }

    async fn search(&self, query: &str) -> Result<ApiResponse> {
        let request = ApiRequest::get(self.search_url()).param("q", query);
        self.send(request).await
    }
}
