//! API-specific error types
//!
//! Classifies non-success vendor responses before they are folded into the
//! domain error.

use emporia_domain::EmporiaError;
use reqwest::StatusCode;
use thiserror::Error;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Authentication errors (401, 403) - retry after re-authentication
    Authentication,
    /// Rate limiting errors (429) - retry with backoff
    RateLimit,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx except auth) - non-retryable
    Client,
    /// Unexpected non-error status (redirects) - retryable
    Network,
}

/// API operation errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),
}

impl ApiError {
    /// Classify a non-success response
    pub fn from_status(status: StatusCode, path: &str, body: &str) -> Self {
        let code = status.as_u16();
        let body = body.trim();
        let message = if body.is_empty() {
            format!("{} returned status {}", path, status)
        } else {
            format!("{} returned status {}: {}", path, status, body)
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Self::Auth { status: code, message }
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimit(message)
        } else if status.is_server_error() {
            Self::Server { status: code, message }
        } else if status.is_client_error() {
            Self::Client { status: code, message }
        } else {
            Self::Network(message)
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth { .. } => ApiErrorCategory::Authentication,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Client { .. } => ApiErrorCategory::Client,
            Self::Network(_) => ApiErrorCategory::Network,
        }
    }

    /// Check if this error should be retried
    pub fn should_retry(&self) -> bool {
        !matches!(self.category(), ApiErrorCategory::Client)
    }
}

impl From<ApiError> for EmporiaError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Auth { message, .. } => EmporiaError::Auth(message),
            ApiError::RateLimit(message) => EmporiaError::Api { status: 429, message },
            ApiError::Server { status, message } | ApiError::Client { status, message } => {
                EmporiaError::Api { status, message }
            }
            ApiError::Network(message) => EmporiaError::Network(message),
        }
    }
}
