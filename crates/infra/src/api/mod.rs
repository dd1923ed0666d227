//! Emporia cloud API
//!
//! Authenticated client for the legacy and c-api hosts, the endpoint
//! wrappers on top of it and the [`EmporiaApi`] facade tying them to the
//! core services.
//!
//! # Architecture
//!
//! - Uses the shared [`HttpClient`](crate::http::HttpClient) (timeouts, retries)
//! - Cognito id token on every request, one re-authentication on 401
//! - Endpoint wrappers grouped per area (devices, usage, preferences)

pub mod auth;
pub mod client;
pub mod devices;
pub mod errors;
pub mod preferences;
pub mod service;
pub mod usage;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{cognito_token_manager, CognitoTokenManager, IdTokenProvider};
pub use client::{ApiHost, EmporiaClient, EmporiaClientBuilder, AUTH_TOKEN_HEADER};
pub use errors::{ApiError, ApiErrorCategory};
pub use preferences::decode_preferences;
pub use service::EmporiaApi;
