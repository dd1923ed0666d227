//! Token types for the Cognito session
//!
//! Cognito issues three JWTs per login: the id token (sent to the vendor API
//! as `authToken`), the access token and a long-lived refresh token. Refresh
//! responses omit the refresh token, so the previous one is carried over.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tokens returned by one successful authentication
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// JWT presented to the vendor API
    pub id_token: String,

    pub access_token: String,

    /// Absent on refresh responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type (Cognito always reports "Bearer")
    pub token_type: String,

    /// Token lifetime in seconds as reported by the pool
    pub expires_in: i64,

    /// Absolute expiry (UTC), `issued_at + expires_in`
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// Create a new `TokenSet` issued now.
    ///
    /// # Arguments
    /// * `id_token` - Id token JWT
    /// * `access_token` - Access token JWT
    /// * `refresh_token` - Refresh token, `None` for refresh responses
    /// * `expires_in` - Token lifetime in seconds
    #[must_use]
    pub fn new(
        id_token: String,
        access_token: String,
        refresh_token: Option<String>,
        expires_in: i64,
    ) -> Self {
        Self::issued_at(id_token, access_token, refresh_token, expires_in, Utc::now())
    }

    /// Same as [`TokenSet::new`] with an explicit issue instant.
    #[must_use]
    pub fn issued_at(
        id_token: String,
        access_token: String,
        refresh_token: Option<String>,
        expires_in: i64,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id_token,
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
            expires_at: issued_at + Duration::seconds(expires_in.max(0)),
        }
    }

    /// Instant after which the tokens are treated as expired, `skew_seconds`
    /// ahead of the real expiry.
    #[must_use]
    pub fn effective_expiry(&self, skew_seconds: i64) -> DateTime<Utc> {
        self.expires_at - Duration::seconds(skew_seconds)
    }

    /// Check if the tokens are expired or will expire within `skew_seconds`
    #[must_use]
    pub fn is_expired(&self, skew_seconds: i64) -> bool {
        Utc::now() >= self.effective_expiry(skew_seconds)
    }

    /// Seconds until the effective expiry (negative once past it)
    #[must_use]
    pub fn seconds_until_expiry(&self, skew_seconds: i64) -> i64 {
        (self.effective_expiry(skew_seconds) - Utc::now()).num_seconds()
    }

    /// Keep `previous` as the refresh token when this set carries none.
    #[must_use]
    pub fn with_fallback_refresh_token(mut self, previous: Option<String>) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous;
        }
        self
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSet")
            .field("id_token", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
