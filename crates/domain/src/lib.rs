//! # Emporia Domain
//!
//! Vendor data types and models for the Emporia Energy client.
//!
//! This crate contains:
//! - Device, charger, usage and stream payload types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Vendor endpoint constants
//!
//! ## Architecture
//! - No dependencies on other Emporia crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
