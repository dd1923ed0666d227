//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the Emporia client
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum EmporiaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EmporiaError {
    /// Whether the error came from an HTTP 401 response or the identity
    /// provider rejecting the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Api { status: 401, .. })
    }
}

impl From<serde_json::Error> for EmporiaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for Emporia operations
pub type Result<T> = std::result::Result<T, EmporiaError>;
