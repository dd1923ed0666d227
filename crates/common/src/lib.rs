//! Common utilities shared across the Emporia client crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: time formatting and period parsing
//! - `runtime`: backoff strategies (tokio-based consumers)
//! - `platform`: Cognito authentication (SRP math, tokens, token manager)
//! - `observability`: tracing (pulled in by `runtime`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod time;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod auth;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "platform")]
pub use auth::{IdentityError, IdentityProvider, TokenManager, TokenManagerError, TokenSet};
#[cfg(feature = "runtime")]
pub use resilience::{Backoff, BackoffStrategy, Jitter};
