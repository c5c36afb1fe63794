//! Credentials providers

use super::token::CapabilityToken;
use crate::error::{Error, Result};
use crate::network::{ApiRequest, HttpClient};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Source of capability tokens
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Fetch a fresh token; `None` means requests go out unsigned
    async fn fetch(&self) -> Result<Option<CapabilityToken>>;
}

/// Fixed credentials from configuration
pub struct StaticCredentials {
    token: CapabilityToken,
}

impl StaticCredentials {
    pub fn new(token: CapabilityToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl CredentialsProvider for StaticCredentials {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> Result<Option<CapabilityToken>> {
        Ok(Some(self.token.clone()))
    }
}

/// No credentials at all
pub struct AnonymousCredentials;

#[async_trait]
impl CredentialsProvider for AnonymousCredentials {
    fn name(&self) -> &str {
        "anonymous"
    }

    async fn fetch(&self) -> Result<Option<CapabilityToken>> {
        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetIdResponse {
    identity_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetCredentialsResponse {
    identity_id: Option<String>,
    credentials: CognitoCredentials,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CognitoCredentials {
    access_key_id: String,
    secret_key: String,
    session_token: Option<String>,
    /// Seconds since the epoch
    expiration: Option<f64>,
}

/// Unauthenticated identity from a Cognito identity pool
pub struct CognitoIdentity {
    client: HttpClient,
    identity_pool_id: String,
    endpoint: String,
}

impl CognitoIdentity {
    pub fn new(client: HttpClient, identity_pool_id: impl Into<String>, region: &str) -> Self {
        Self {
            client,
            identity_pool_id: identity_pool_id.into(),
            endpoint: format!("https://cognito-identity.{}.amazonaws.com/", region),
        }
    }

    /// Point at a different identity endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        action: &str,
        payload: serde_json::Value,
    ) -> Result<T> {
        let request = ApiRequest::post(&self.endpoint)
            .header("X-Amz-Target", format!("AWSCognitoIdentityService.{}", action))
            .body(
                serde_json::to_vec(&payload)?,
                "application/x-amz-json-1.1",
            );

        let response = self.client.execute(request).await?;
        if !response.is_success() {
            return Err(Error::Credentials(format!(
                "{} returned status {}: {}",
                action, response.status, response.text
            )));
        }
        response.json()
    }
}

#[async_trait]
impl CredentialsProvider for CognitoIdentity {
    fn name(&self) -> &str {
        "cognito"
    }

    async fn fetch(&self) -> Result<Option<CapabilityToken>> {
        let id: GetIdResponse = self
            .call("GetId", json!({ "IdentityPoolId": self.identity_pool_id }))
            .await?;
        debug!("Resolved identity {}", id.identity_id);

        let creds: GetCredentialsResponse = self
            .call(
                "GetCredentialsForIdentity",
                json!({ "IdentityId": id.identity_id }),
            )
            .await?;

        let mut token = CapabilityToken::new(
            creds.credentials.access_key_id,
            creds.credentials.secret_key,
        );
        token.session_token = creds.credentials.session_token;
        token.identity_id = creds.identity_id.or(Some(id.identity_id));
        token.expiration = creds
            .credentials
            .expiration
            .and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single());

        Ok(Some(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticCredentials::new(CapabilityToken::new("AKID", "secret"));
        let token = provider.fetch().await.unwrap().unwrap();
        assert_eq!(token.access_key_id, "AKID");
        assert_eq!(provider.name(), "static");
    }

    #[tokio::test]
    async fn test_anonymous_provider() {
        assert!(AnonymousCredentials.fetch().await.unwrap().is_none());
    }

    #[test]
    fn test_cognito_endpoint() {
        let provider = CognitoIdentity::new(HttpClient::new().unwrap(), "pool", "eu-west-1");
        assert_eq!(
            provider.endpoint,
            "https://cognito-identity.eu-west-1.amazonaws.com/"
        );
    }

    #[test]
    fn test_credentials_response_shape() {
        let body = r#"{
            "IdentityId": "us-east-1:abc",
            "Credentials": {
                "AccessKeyId": "ASIA",
                "SecretKey": "secret",
                "SessionToken": "token",
                "Expiration": 1700000000.0
            }
        }"#;
        let parsed: GetCredentialsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.credentials.access_key_id, "ASIA");
        assert_eq!(parsed.credentials.expiration, Some(1700000000.0));
    }
}
