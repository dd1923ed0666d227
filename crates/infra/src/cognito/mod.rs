//! Cognito user pool access
//!
//! Implements the [`IdentityProvider`](emporia_common::auth::IdentityProvider)
//! port over HTTP. The SRP math itself lives in `emporia_common::auth::srp`.

pub mod client;
pub mod types;

pub use client::CognitoIdentityClient;
