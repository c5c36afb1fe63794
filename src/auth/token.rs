//! Capability token handed out by credentials providers

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Refresh this long before the provider-reported expiry
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Short-lived credential scoping what the client may do
#[derive(Clone, PartialEq, Eq)]
pub struct CapabilityToken {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    /// Identity the credentials were issued for, when the provider knows it
    pub identity_id: Option<String>,
    pub expiration: Option<DateTime<Utc>>,
}

impl CapabilityToken {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            identity_id: None,
            expiration: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Whether the token is expired (or about to be) at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiration {
            Some(expiration) => now + Duration::seconds(EXPIRY_MARGIN_SECS) >= expiration,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

// Keep secrets out of logs
impl fmt::Debug for CapabilityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityToken")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .field("identity_id", &self.identity_id)
            .field("expiration", &self.expiration)
            .finish()
    }
}
