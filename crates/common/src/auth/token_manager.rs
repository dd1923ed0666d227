//! Token manager with automatic re-authentication
//!
//! Manages the Cognito session lifecycle:
//! - First use runs the full SRP login
//! - Expired tokens are refreshed with the refresh token
//! - A failed refresh falls back to the SRP login
//! - A handshake lock keeps concurrent callers from logging in twice

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::traits::{IdentityError, IdentityProvider};
use super::types::TokenSet;
use crate::time::{format_duration, format_local_expiry};

/// Seconds before the real expiry at which tokens are renewed
pub const DEFAULT_EXPIRY_SKEW_SECS: i64 = 30;

/// Error type for token manager operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenManagerError {
    /// Password login failed
    AuthenticationFailed(IdentityError),

    /// Username or password missing
    MissingCredentials,
}

impl std::fmt::Display for TokenManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed(e) => write!(f, "Authentication failed: {e}"),
            Self::MissingCredentials => write!(f, "Username and password are required"),
        }
    }
}

impl std::error::Error for TokenManagerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AuthenticationFailed(e) => Some(e),
            Self::MissingCredentials => None,
        }
    }
}

impl From<IdentityError> for TokenManagerError {
    fn from(err: IdentityError) -> Self {
        Self::AuthenticationFailed(err)
    }
}

impl TokenManagerError {
    /// Whether retrying later may succeed (pool unreachable)
    pub fn is_transient(&self) -> bool {
        match self {
            Self::AuthenticationFailed(e) => e.is_transient(),
            Self::MissingCredentials => false,
        }
    }
}

/// Token manager for one Cognito user
///
/// Holds the credentials and the current [`TokenSet`]; every API call asks
/// [`TokenManager::id_token`] first.
pub struct TokenManager<P: IdentityProvider + 'static> {
    provider: Arc<P>,
    username: String,
    password: String,
    current_tokens: Arc<RwLock<Option<TokenSet>>>,
    handshake: Mutex<()>,
    expiry_skew_seconds: i64,
}

impl<P: IdentityProvider + 'static> TokenManager<P> {
    /// Create a new token manager
    ///
    /// # Arguments
    /// * `provider` - Identity provider used for login and refresh
    /// * `username` - Login name
    /// * `password` - Password, only handed to the SRP computation
    /// * `expiry_skew_seconds` - Renew this many seconds before expiry
    ///   (default: 30)
    #[must_use]
    pub fn new(
        provider: Arc<P>,
        username: impl Into<String>,
        password: impl Into<String>,
        expiry_skew_seconds: i64,
    ) -> Self {
        Self {
            provider,
            username: username.into(),
            password: password.into(),
            current_tokens: Arc::new(RwLock::new(None)),
            handshake: Mutex::new(()),
            expiry_skew_seconds,
        }
    }

    /// Get a valid id token, authenticating or refreshing when needed
    ///
    /// # Errors
    /// Returns error if both refresh and password login fail
    pub async fn id_token(&self) -> Result<String, TokenManagerError> {
        if let Some(token) = self.valid_id_token().await {
            return Ok(token);
        }

        let _guard = self.handshake.lock().await;
        // Another caller may have finished the handshake while we waited
        if let Some(token) = self.valid_id_token().await {
            return Ok(token);
        }
        self.authenticate_locked().await
    }

    /// Re-authenticate after the API rejected `rejected_id_token` with 401
    ///
    /// If the held token already differs from the rejected one, another
    /// caller has renewed it and that token is returned as is.
    ///
    /// # Errors
    /// Returns error if both refresh and password login fail
    pub async fn force_reauthenticate(
        &self,
        rejected_id_token: &str,
    ) -> Result<String, TokenManagerError> {
        let _guard = self.handshake.lock().await;
        {
            let tokens = self.current_tokens.read().await;
            if let Some(t) = tokens.as_ref() {
                if t.id_token != rejected_id_token && !t.is_expired(self.expiry_skew_seconds) {
                    debug!("Token already renewed by a concurrent caller");
                    return Ok(t.id_token.clone());
                }
            }
        }
        warn!("API rejected the id token, re-authenticating");
        self.authenticate_locked().await
    }

    /// Get current token set (without renewal)
    pub async fn tokens(&self) -> Option<TokenSet> {
        self.current_tokens.read().await.clone()
    }

    /// Check if a session is held
    pub async fn is_authenticated(&self) -> bool {
        self.current_tokens.read().await.is_some()
    }

    /// Effective expiry (real expiry minus skew)
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        let tokens = self.current_tokens.read().await;
        tokens.as_ref().map(|t| t.effective_expiry(self.expiry_skew_seconds))
    }

    /// Seconds until the effective expiry, or None if not authenticated
    pub async fn seconds_until_expiry(&self) -> Option<i64> {
        let tokens = self.current_tokens.read().await;
        tokens.as_ref().map(|t| t.seconds_until_expiry(self.expiry_skew_seconds))
    }

    /// Drop the held tokens (logout)
    pub async fn clear(&self) {
        *self.current_tokens.write().await = None;
        info!("Tokens cleared (logged out)");
    }

    pub fn expiry_skew_seconds(&self) -> i64 {
        self.expiry_skew_seconds
    }

    async fn valid_id_token(&self) -> Option<String> {
        let tokens = self.current_tokens.read().await;
        tokens
            .as_ref()
            .filter(|t| !t.is_expired(self.expiry_skew_seconds))
            .map(|t| t.id_token.clone())
    }

    /// Refresh when a refresh token is held, otherwise (or on failure) log in.
    /// Caller must hold the handshake lock.
    async fn authenticate_locked(&self) -> Result<String, TokenManagerError> {
        let previous_refresh =
            self.current_tokens.read().await.as_ref().and_then(|t| t.refresh_token.clone());

        if let Some(refresh_token) = previous_refresh.as_deref() {
            match self.provider.refresh(refresh_token).await {
                Ok(tokens) => {
                    let tokens = tokens.with_fallback_refresh_token(previous_refresh.clone());
                    return Ok(self.store(tokens, "refresh").await);
                }
                Err(e) => {
                    warn!(error = %e, "Token refresh failed, falling back to password login");
                }
            }
        }

        if self.username.is_empty() || self.password.is_empty() {
            return Err(TokenManagerError::MissingCredentials);
        }

        let tokens = self.provider.authenticate_srp(&self.username, &self.password).await?;
        Ok(self.store(tokens, "srp").await)
    }

    async fn store(&self, tokens: TokenSet, method: &'static str) -> String {
        let id_token = tokens.id_token.clone();
        let expiry = tokens.effective_expiry(self.expiry_skew_seconds);
        let remaining = Duration::from_secs(
            u64::try_from(tokens.seconds_until_expiry(self.expiry_skew_seconds)).unwrap_or(0),
        );

        *self.current_tokens.write().await = Some(tokens);

        info!(
            method,
            expires_at = %format_local_expiry(expiry),
            expires_in = %format_duration(remaining),
            "Authenticated with Emporia"
        );
        id_token
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct MockIdentityProvider {
        srp_calls: AtomicUsize,
        refresh_calls: AtomicUsize,
        fail_refresh: bool,
        fail_srp: bool,
        expires_in: i64,
        rotate_refresh_token: bool,
    }

    impl MockIdentityProvider {
        fn new(expires_in: i64) -> Self {
            Self { expires_in, ..Self::default() }
        }
    }

    #[async_trait]
    impl IdentityProvider for MockIdentityProvider {
        async fn authenticate_srp(
            &self,
            username: &str,
            _password: &str,
        ) -> Result<TokenSet, IdentityError> {
            let n = self.srp_calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(Duration::from_millis(10)).await;
            if self.fail_srp {
                return Err(IdentityError::Rejected {
                    kind: "NotAuthorizedException".to_string(),
                    message: "Incorrect username or password.".to_string(),
                });
            }
            Ok(TokenSet::new(
                format!("id-srp-{n}-{username}"),
                format!("access-srp-{n}"),
                Some(format!("refresh-srp-{n}")),
                self.expires_in,
            ))
        }

        async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, IdentityError> {
            let n = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_refresh {
                return Err(IdentityError::Rejected {
                    kind: "NotAuthorizedException".to_string(),
                    message: "Refresh Token has expired".to_string(),
                });
            }
            let rotated = self.rotate_refresh_token.then(|| format!("refresh-rotated-{n}"));
            Ok(TokenSet::new(
                format!("id-refresh-{n}-{refresh_token}"),
                format!("access-refresh-{n}"),
                rotated,
                self.expires_in,
            ))
        }
    }

    fn build_manager(
        provider: MockIdentityProvider,
    ) -> (Arc<MockIdentityProvider>, TokenManager<MockIdentityProvider>) {
        let provider = Arc::new(provider);
        let manager = TokenManager::new(
            Arc::clone(&provider),
            "user@example.com",
            "hunter2",
            DEFAULT_EXPIRY_SKEW_SECS,
        );
        (provider, manager)
    }

    #[tokio::test]
    async fn test_first_call_runs_srp_login() {
        let (provider, manager) = build_manager(MockIdentityProvider::new(3600));
        assert!(!manager.is_authenticated().await);

        let token = manager.id_token().await.unwrap();
        assert_eq!(token, "id-srp-1-user@example.com");
        assert_eq!(provider.srp_calls.load(Ordering::SeqCst), 1);
        assert!(manager.is_authenticated().await);

        // Cached while valid
        assert_eq!(manager.id_token().await.unwrap(), token);
        assert_eq!(provider.srp_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_tokens_are_refreshed() {
        // 10s lifetime is inside the 30s skew, so every call renews
        let (provider, manager) = build_manager(MockIdentityProvider::new(10));

        manager.id_token().await.unwrap();
        let refreshed = manager.id_token().await.unwrap();

        assert_eq!(refreshed, "id-refresh-1-refresh-srp-1");
        assert_eq!(provider.srp_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_keeps_previous_refresh_token() {
        let (_provider, manager) = build_manager(MockIdentityProvider::new(10));

        manager.id_token().await.unwrap();
        manager.id_token().await.unwrap();

        let tokens = manager.tokens().await.unwrap();
        assert_eq!(tokens.refresh_token.as_deref(), Some("refresh-srp-1"));
    }

    #[tokio::test]
    async fn test_rotated_refresh_token_replaces_previous() {
        let mut mock = MockIdentityProvider::new(10);
        mock.rotate_refresh_token = true;
        let (_provider, manager) = build_manager(mock);

        manager.id_token().await.unwrap();
        manager.id_token().await.unwrap();

        let tokens = manager.tokens().await.unwrap();
        assert_eq!(tokens.refresh_token.as_deref(), Some("refresh-rotated-1"));
    }

    #[tokio::test]
    async fn test_failed_refresh_falls_back_to_srp() {
        let mut mock = MockIdentityProvider::new(10);
        mock.fail_refresh = true;
        let (provider, manager) = build_manager(mock);

        manager.id_token().await.unwrap();
        let token = manager.id_token().await.unwrap();

        assert_eq!(token, "id-srp-2-user@example.com");
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.srp_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rejected_login_is_reported() {
        let mut mock = MockIdentityProvider::new(3600);
        mock.fail_srp = true;
        let (_provider, manager) = build_manager(mock);

        let err = manager.id_token().await.unwrap_err();
        assert!(matches!(err, TokenManagerError::AuthenticationFailed(IdentityError::Rejected { .. })));
        assert!(!err.is_transient());
        assert!(!manager.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let provider = Arc::new(MockIdentityProvider::new(3600));
        let manager = TokenManager::new(Arc::clone(&provider), "", "", DEFAULT_EXPIRY_SKEW_SECS);

        assert_eq!(manager.id_token().await.unwrap_err(), TokenManagerError::MissingCredentials);
        assert_eq!(provider.srp_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_force_reauthenticate_uses_refresh_token() {
        let (provider, manager) = build_manager(MockIdentityProvider::new(3600));
        let first = manager.id_token().await.unwrap();

        let renewed = manager.force_reauthenticate(&first).await.unwrap();

        assert_eq!(renewed, "id-refresh-1-refresh-srp-1");
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.id_token().await.unwrap(), renewed);
    }

    #[tokio::test]
    async fn test_force_reauthenticate_skips_already_renewed_token() {
        let (provider, manager) = build_manager(MockIdentityProvider::new(3600));
        let first = manager.id_token().await.unwrap();
        let second = manager.force_reauthenticate(&first).await.unwrap();

        // A second caller still holding the first token does not renew again
        let third = manager.force_reauthenticate(&first).await.unwrap();
        assert_eq!(third, second);
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_handshake() {
        let (provider, manager) = build_manager(MockIdentityProvider::new(3600));
        let manager = Arc::new(manager);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { manager.id_token().await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "id-srp-1-user@example.com");
        }
        assert_eq!(provider.srp_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expiry_inspection_and_clear() {
        let (_provider, manager) = build_manager(MockIdentityProvider::new(3600));
        assert!(manager.expires_at().await.is_none());
        assert!(manager.seconds_until_expiry().await.is_none());

        manager.id_token().await.unwrap();
        let remaining = manager.seconds_until_expiry().await.unwrap();
        assert!((3560..=3570).contains(&remaining), "remaining = {remaining}");
        assert!(manager.expires_at().await.unwrap() > Utc::now());

        manager.clear().await;
        assert!(!manager.is_authenticated().await);
    }
}
