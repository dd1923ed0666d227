//! Cognito authentication primitives
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  TokenManager   │  Session lifecycle (login, refresh, fallback)
//! └────────┬────────┘
//!          │
//!          └──► IdentityProvider   (port, implemented over HTTP in infra)
//!                    │
//!                    └──► CognitoSrp   (SRP-6a math for USER_SRP_AUTH)
//! ```
//!
//! The SRP module is pure computation; it never touches the network.

pub mod srp;
pub mod token_manager;
pub mod traits;
pub mod types;

pub use srp::{
    format_timestamp, secret_hash, CognitoSrp, PasswordVerifierChallenge, SrpError,
    PASSWORD_VERIFIER_CHALLENGE,
};
pub use token_manager::{TokenManager, TokenManagerError, DEFAULT_EXPIRY_SKEW_SECS};
pub use traits::{IdentityError, IdentityProvider};
pub use types::TokenSet;
