//! Settings structures for photo-album configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main settings structure matching settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub api: ApiSettings,
    pub auth: AuthSettings,
    pub outgoing: OutgoingSettings,
    pub upload: UploadSettings,
    pub search: SearchSettings,
    pub ui: UiSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (PHOTO_ALBUM_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    fn merge_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("PHOTO_ALBUM_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Some(val) = var("PHOTO_ALBUM_BASE_URL") {
            self.api.base_url = val;
        }
        if let Some(val) = var("PHOTO_ALBUM_API_KEY") {
            self.api.api_key = Some(val);
        }
        if let Some(val) = var("PHOTO_ALBUM_REGION") {
            self.auth.region = val;
        }
        if let Some(val) = var("PHOTO_ALBUM_IDENTITY_POOL_ID") {
            self.auth.identity_pool_id = Some(val);
        }
        if let Some(val) = var("PHOTO_ALBUM_ACCESS_KEY_ID") {
            self.auth.access_key_id = Some(val);
        }
        if let Some(val) = var("PHOTO_ALBUM_SECRET_ACCESS_KEY") {
            self.auth.secret_access_key = Some(val);
        }
        if let Some(val) = var("PHOTO_ALBUM_SESSION_TOKEN") {
            self.auth.session_token = Some(val);
        }
    }

    /// Reject settings that cannot produce a working client
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            bail!("api.base_url must be set");
        }
        url::Url::parse(&self.api.base_url)?;

        match self.auth.provider {
            AuthProvider::Cognito => {
                if self.auth.identity_pool_id.is_none() {
                    bail!("auth.identity_pool_id is required for the cognito provider");
                }
            }
            AuthProvider::Static => {
                if self.auth.access_key_id.is_none() || self.auth.secret_access_key.is_none() {
                    bail!("auth.access_key_id and auth.secret_access_key are required for the static provider");
                }
            }
            AuthProvider::Anonymous => {}
        }

        let timeout = self.outgoing.request_timeout;
        if !(timeout.is_finite() && timeout > 0.0) {
            bail!("outgoing.request_timeout must be a positive number of seconds");
        }

        if self.upload.max_concurrent == Some(0) {
            bail!("upload.max_concurrent must be greater than zero");
        }

        Ok(())
    }
}

/// General settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
}

/// Photo album API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Invoke URL of the deployed API stage
    pub base_url: String,
    /// Optional `x-api-key` value
    pub api_key: Option<String>,
    /// Upload route; `{filename}` is replaced by the encoded file name
    pub upload_path: String,
    /// Search route
    pub search_path: String,
    /// Content type sent with upload bodies
    pub upload_content_type: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            upload_path: "/upload/{filename}".to_string(),
            search_path: "/search".to_string(),
            upload_content_type: "application/json".to_string(),
        }
    }
}

/// Which credentials provider backs the auth context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    /// Unauthenticated Cognito identity pool
    #[default]
    Cognito,
    /// Fixed keys from configuration
    Static,
    /// No request signing
    Anonymous,
}

/// Identity settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub provider: AuthProvider,
    /// Identity pool id, e.g. `us-east-1:00000000-0000-0000-0000-000000000000`
    pub identity_pool_id: Option<String>,
    pub region: String,
    /// Override for the identity service endpoint
    pub cognito_endpoint: Option<String>,
    /// Service name used in the signature scope
    pub signing_service: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            provider: AuthProvider::default(),
            identity_pool_id: None,
            region: "us-east-1".to_string(),
            cognito_endpoint: None,
            signing_service: "execute-api".to_string(),
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 30.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Upload batch settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Maximum uploads in flight per batch (none = unbounded)
    pub max_concurrent: Option<usize>,
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Drop responses older than the last rendered one
    pub discard_stale_responses: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            discard_stale_responses: true,
        }
    }
}

/// Gallery rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub image_height: u32,
    pub image_width: u32,
    pub image_class: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            image_height: 200,
            image_width: 220,
            image_class: "p-2".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Settings {
        let mut settings = Settings::default();
        settings.api.base_url = "https://abc123.execute-api.us-east-1.amazonaws.com/v1".to_string();
        settings.auth.identity_pool_id = Some("us-east-1:pool".to_string());
        settings
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.auth.region, "us-east-1");
        assert_eq!(settings.auth.provider, AuthProvider::Cognito);
        assert!(settings.search.discard_stale_responses);
        assert!(settings.upload.max_concurrent.is_none());
        assert_eq!(settings.ui.image_width, 220);
    }

    #[test]
    fn test_validate() {
        assert!(valid().validate().is_ok());
        assert!(Settings::default().validate().is_err());

        let mut settings = valid();
        settings.auth.identity_pool_id = None;
        assert!(settings.validate().is_err());

        settings.auth.provider = AuthProvider::Anonymous;
        assert!(settings.validate().is_ok());

        settings.auth.provider = AuthProvider::Static;
        assert!(settings.validate().is_err());
        settings.auth.access_key_id = Some("AKID".to_string());
        settings.auth.secret_access_key = Some("secret".to_string());
        assert!(settings.validate().is_ok());

        settings.upload.max_concurrent = Some(0);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_request_timeout() {
        for timeout in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            let mut settings = valid();
            settings.outgoing.request_timeout = timeout;
            assert!(settings.validate().is_err(), "{} accepted", timeout);
        }

        let mut settings = valid();
        settings.outgoing.request_timeout = 0.5;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_sections() {
        let yaml = r#"
api:
  base_url: https://example.com/v1
auth:
  provider: anonymous
upload:
  max_concurrent: 4
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.api.base_url, "https://example.com/v1");
        assert_eq!(settings.api.search_path, "/search");
        assert_eq!(settings.auth.provider, AuthProvider::Anonymous);
        assert_eq!(settings.upload.max_concurrent, Some(4));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_merge_vars() {
        let mut settings = Settings::default();
        settings.merge_vars(|key| match key {
            "PHOTO_ALBUM_BASE_URL" => Some("https://example.com".to_string()),
            "PHOTO_ALBUM_REGION" => Some("eu-west-1".to_string()),
            "PHOTO_ALBUM_DEBUG" => Some("true".to_string()),
            _ => None,
        });
        assert_eq!(settings.api.base_url, "https://example.com");
        assert_eq!(settings.auth.region, "eu-west-1");
        assert!(settings.general.debug);
        assert!(settings.api.api_key.is_none());
    }
}
