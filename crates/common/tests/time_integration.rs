//! Integration tests for the `time` module.
//!
//! Covers the helpers the CLI chains together: a relative period is parsed,
//! subtracted from "now" and both ends are rendered as vendor timestamps.

#![cfg(feature = "foundation")]

use std::time::Duration;

use chrono::{TimeZone, Utc};
use emporia_common::time::{
    format_duration, format_iso_millis_z, parse_relative_period, to_iso_z, PeriodParseError,
};

/// A `--period 1h30m` window ending at a fixed instant renders as the
/// `start`/`end` query parameters the chart endpoint expects.
#[test]
fn test_period_window_rendering() {
    let end = Utc.with_ymd_and_hms(2026, 1, 25, 17, 20, 20).single().expect("valid date")
        + chrono::Duration::milliseconds(388);
    let start = end - parse_relative_period("1h30m").expect("valid period");

    assert_eq!(to_iso_z(start), "2026-01-25T15:50:20.000Z");
    assert_eq!(format_iso_millis_z(end), "2026-01-25T17:20:20.388Z");
}

/// Equivalent spellings produce the same duration.
#[test]
fn test_equivalent_period_spellings() {
    let expected = chrono::Duration::minutes(120);
    for input in ["2H", "2h", "120M", "PT2H", "pt120m", "1h60m", "PT1H60M", "7200s"] {
        assert_eq!(parse_relative_period(input).expect(input), expected, "input {input}");
    }
}

/// Errors carry the original input for the CLI message.
#[test]
fn test_period_errors_render_input() {
    let err = parse_relative_period("PT0M").expect_err("zero period");
    assert_eq!(err, PeriodParseError::InvalidIso("PT0M".to_string()));
    assert_eq!(err.to_string(), "Invalid ISO-8601 period: PT0M");

    let err = parse_relative_period("fifteen").expect_err("no digits");
    assert!(err.to_string().contains("fifteen"));
}

/// Parsed periods render back through `format_duration` for log lines.
#[test]
fn test_period_round_trips_through_log_format() {
    let period = parse_relative_period("1d2h").expect("valid period");
    let std_period = period.to_std().expect("positive period");
    assert_eq!(format_duration(std_period), "1d 2h 0m 0s");
    assert_eq!(format_duration(Duration::from_secs(15 * 60)), "15m 0s");
}
