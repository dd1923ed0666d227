//! API authentication backed by the Cognito token manager
//!
//! The vendor API authenticates every request with the Cognito id token.

use std::sync::Arc;

use async_trait::async_trait;
use emporia_common::auth::{IdentityProvider, TokenManager};
use emporia_domain::{Config, Result};

use crate::cognito::CognitoIdentityClient;
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Token manager talking to the real user pool
pub type CognitoTokenManager = TokenManager<CognitoIdentityClient>;

/// Trait for providing id tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait IdTokenProvider: Send + Sync {
    /// Get a valid id token, logging in or refreshing when needed
    async fn id_token(&self) -> Result<String>;

    /// Replace a token the API answered with 401
    async fn reauthenticate(&self, rejected_id_token: &str) -> Result<String>;
}

#[async_trait]
impl<P: IdentityProvider + 'static> IdTokenProvider for TokenManager<P> {
    async fn id_token(&self) -> Result<String> {
        TokenManager::id_token(self).await.map_err(|e| InfraError::from(e).into())
    }

    async fn reauthenticate(&self, rejected_id_token: &str) -> Result<String> {
        TokenManager::force_reauthenticate(self, rejected_id_token)
            .await
            .map_err(|e| InfraError::from(e).into())
    }
}

/// Build the token manager for the credentials and pool in `config`
pub fn cognito_token_manager(config: &Config, http: HttpClient) -> Arc<CognitoTokenManager> {
    let provider = Arc::new(CognitoIdentityClient::from_config(config, http));
    Arc::new(TokenManager::new(
        provider,
        config.emporia_username.clone(),
        config.emporia_password.clone(),
        config.auth.expiry_skew_seconds,
    ))
}
