//! # Emporia Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - HTTP client with timeouts and retries (reqwest)
//! - Cognito identity client (SRP login, token refresh)
//! - Emporia API client, endpoint wrappers and the [`EmporiaApi`] facade
//! - Device status stream consumer (server-sent events)
//! - Configuration loading from files and environment
//!
//! ## Architecture
//! - Implements traits defined in `emporia-core` and `emporia-common`
//! - Depends on `emporia-domain` for payloads and errors
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod cognito;
pub mod config;
pub mod errors;
pub mod http;
pub mod stream;

// Re-export commonly used items
pub use api::{EmporiaApi, EmporiaClient, IdTokenProvider};
pub use cognito::CognitoIdentityClient;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use stream::DeviceStatusStream;
