//! Time utilities for vendor timestamps and relative periods
//!
//! - [`format`]: ISO-8601 `Z` timestamps as the vendor APIs expect them and
//!   human-readable durations for logs
//! - [`period`]: parsing of relative periods (`15M`, `1h30m`, `PT2H`)

pub mod format;
pub mod period;

pub use format::{format_duration, format_iso_millis_z, format_local_expiry, to_iso_z};
pub use period::{parse_relative_period, PeriodParseError};
