//! Session-scoped auth context

use super::provider::CredentialsProvider;
use super::token::CapabilityToken;
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Clone)]
enum TokenState {
    Uninitialized,
    Ready(Option<CapabilityToken>),
}

/// Holds the credentials provider, the signing region and the cached token.
///
/// Constructed once per session and shared by reference with the API client.
/// The token is fetched lazily on first use and refetched only after it expires.
pub struct AuthContext {
    provider: Arc<dyn CredentialsProvider>,
    region: String,
    state: RwLock<TokenState>,
}

impl AuthContext {
    pub fn new(provider: Arc<dyn CredentialsProvider>, region: impl Into<String>) -> Self {
        Self {
            provider,
            region: region.into(),
            state: RwLock::new(TokenState::Uninitialized),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fetch the token up front so the first remote call does not pay for it
    pub async fn initialize(&self) -> Result<()> {
        self.credentials().await.map(|_| ())
    }

    pub async fn is_initialized(&self) -> bool {
        matches!(*self.state.read().await, TokenState::Ready(_))
    }

    /// Current token, fetching or refreshing it when needed
    pub async fn credentials(&self) -> Result<Option<CapabilityToken>> {
        {
            let state = self.state.read().await;
            if let TokenState::Ready(token) = &*state {
                if !token.as_ref().is_some_and(CapabilityToken::is_expired) {
                    return Ok(token.clone());
                }
            }
        }

        let mut state = self.state.write().await;
        // Another caller may have refreshed while we waited for the write lock
        if let TokenState::Ready(token) = &*state {
            if !token.as_ref().is_some_and(CapabilityToken::is_expired) {
                return Ok(token.clone());
            }
        }

        debug!("Fetching credentials from {} provider", self.provider.name());
        let token = self.provider.fetch().await?;
        match &token {
            Some(t) => info!(
                "Obtained credentials from {} provider (expires: {:?})",
                self.provider.name(),
                t.expiration
            ),
            None => info!("Using unsigned requests"),
        }
        *state = TokenState::Ready(token.clone());
        Ok(token)
    }
}
