//! Identity provider port
//!
//! Abstracts the Cognito round trips so the token manager can be driven by a
//! mock in tests.

use async_trait::async_trait;
use thiserror::Error;

use super::srp::SrpError;
use super::types::TokenSet;

/// Errors reported by an identity provider
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The pool rejected the credentials or token (`NotAuthorizedException`, ...)
    #[error("{kind}: {message}")]
    Rejected { kind: String, message: String },

    /// The pool asked for a challenge this client cannot answer
    #[error("Unsupported authentication challenge: {0}")]
    UnsupportedChallenge(String),

    /// Local SRP computation failed
    #[error("SRP error: {0}")]
    Srp(#[from] SrpError),

    /// Transport failure talking to the pool
    #[error("Identity provider unreachable: {0}")]
    Transport(String),

    /// The pool answered with something that does not parse
    #[error("Invalid identity provider response: {0}")]
    InvalidResponse(String),
}

impl IdentityError {
    /// Transport failures may succeed on a later attempt; everything else
    /// needs different credentials.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Trait for identity provider operations
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Full password login (`USER_SRP_AUTH` followed by `PASSWORD_VERIFIER`)
    ///
    /// # Errors
    /// Returns error if the pool rejects the credentials or is unreachable
    async fn authenticate_srp(&self, username: &str, password: &str)
        -> Result<TokenSet, IdentityError>;

    /// Exchange a refresh token for fresh id/access tokens
    ///
    /// The returned set may not carry a refresh token.
    ///
    /// # Errors
    /// Returns error if the refresh token is expired or revoked
    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, IdentityError>;
}
