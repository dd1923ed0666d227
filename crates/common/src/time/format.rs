//! Timestamp and duration formatting
//!
//! The vendor APIs accept instants as ISO-8601 strings in UTC with a literal
//! `Z` suffix and millisecond precision.

use std::time::Duration;

use chrono::{DateTime, Local, SecondsFormat, Utc};

/// Format an instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`, keeping milliseconds.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use emporia_common::time::format_iso_millis_z;
///
/// let dt = Utc.timestamp_millis_opt(1_769_361_620_388).unwrap();
/// assert_eq!(format_iso_millis_z(dt), "2026-01-25T17:20:20.388Z");
/// ```
pub fn format_iso_millis_z(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format an instant as `YYYY-MM-DDTHH:MM:SS.000Z`, truncating to the second.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use emporia_common::time::to_iso_z;
///
/// let dt = Utc.timestamp_millis_opt(1_769_361_620_388).unwrap();
/// assert_eq!(to_iso_z(dt), "2026-01-25T17:20:20.000Z");
/// ```
pub fn to_iso_z(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S.000Z").to_string()
}

/// Render an expiry instant in local time for log lines.
pub fn format_local_expiry(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format a duration into a human-readable string
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use emporia_common::time::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(5)), "5s");
/// assert_eq!(format_duration(Duration::from_secs(3570)), "59m 30s");
/// assert_eq!(format_duration(Duration::from_secs(3665)), "1h 1m 5s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    if total_secs == 0 {
        return format!("{}ms", duration.as_millis());
    }

    let days = total_secs / 86400;
    let hours = (total_secs % 86400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let components = [(days, "d"), (hours, "h"), (minutes, "m"), (seconds, "s")];
    let start_index =
        components.iter().position(|(value, _)| *value > 0).unwrap_or(components.len() - 1);

    components[start_index..]
        .iter()
        .map(|(value, suffix)| format!("{value}{suffix}"))
        .collect::<Vec<_>>()
        .join(" ")
}
