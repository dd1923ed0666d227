//! Resilience helpers
//!
//! Backoff strategies shared by the HTTP retry loop and the device-status
//! stream reconnect loop.

pub mod backoff;

pub use backoff::{Backoff, BackoffStrategy, Jitter};
