//! Authorization for remote calls
//!
//! A [`CredentialsProvider`] hands out capability tokens, the [`AuthContext`]
//! caches them for the session, and [`SigV4Signer`] signs outgoing requests.

mod context;
mod provider;
mod sigv4;
mod token;

pub use context::AuthContext;
pub use provider::{AnonymousCredentials, CognitoIdentity, CredentialsProvider, StaticCredentials};
pub use sigv4::{signing_key, SigV4Signer};
pub use token::CapabilityToken;

use crate::config::{AuthProvider, AuthSettings};
use crate::error::{Error, Result};
use crate::network::HttpClient;
use std::sync::Arc;

/// Build the provider selected in settings
pub fn provider_from_settings(
    settings: &AuthSettings,
    client: &HttpClient,
) -> Result<Arc<dyn CredentialsProvider>> {
    let provider: Arc<dyn CredentialsProvider> = match settings.provider {
        AuthProvider::Cognito => {
            let pool_id = settings.identity_pool_id.as_ref().ok_or_else(|| {
                Error::Config("auth.identity_pool_id is required for the cognito provider".into())
            })?;
            let mut provider = CognitoIdentity::new(client.clone(), pool_id, &settings.region);
            if let Some(endpoint) = &settings.cognito_endpoint {
                provider = provider.with_endpoint(endpoint);
            }
            Arc::new(provider)
        }
        AuthProvider::Static => {
            let (Some(key), Some(secret)) = (&settings.access_key_id, &settings.secret_access_key)
            else {
                return Err(Error::Config(
                    "auth.access_key_id and auth.secret_access_key are required".into(),
                ));
            };
            let mut token = CapabilityToken::new(key, secret);
            token.session_token = settings.session_token.clone();
            Arc::new(StaticCredentials::new(token))
        }
        AuthProvider::Anonymous => Arc::new(AnonymousCredentials),
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_selection() {
        let client = HttpClient::new().unwrap();
        let mut settings = AuthSettings::default();

        assert!(provider_from_settings(&settings, &client).is_err());
        settings.identity_pool_id = Some("us-east-1:pool".to_string());
        assert_eq!(
            provider_from_settings(&settings, &client).unwrap().name(),
            "cognito"
        );

        settings.provider = AuthProvider::Static;
        assert!(provider_from_settings(&settings, &client).is_err());
        settings.access_key_id = Some("AKID".to_string());
        settings.secret_access_key = Some("secret".to_string());
        assert_eq!(
            provider_from_settings(&settings, &client).unwrap().name(),
            "static"
        );

        settings.provider = AuthProvider::Anonymous;
        assert_eq!(
            provider_from_settings(&settings, &client).unwrap().name(),
            "anonymous"
        );
    }
}
