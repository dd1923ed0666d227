//! Relative period parsing
//!
//! Accepts the short unit form used on the command line (`15M`, `2H`,
//! `1h30m`, `1W`) and the ISO-8601 time subset (`PT15M`, `PT1H30M`).
//! Units are case-insensitive.

use chrono::Duration;
use thiserror::Error;

/// Error type for period parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    #[error("Empty period")]
    EmptyString,

    #[error("Invalid period format: {0}")]
    InvalidFormat(String),

    #[error("Invalid ISO-8601 period: {0}")]
    InvalidIso(String),

    #[error("Unknown unit '{unit}' in period: {period}")]
    UnknownUnit { unit: char, period: String },

    #[error("Period too large: {0}")]
    Overflow(String),
}

/// Parse a relative period into a [`chrono::Duration`].
///
/// Short form units: `S`, `M` (minutes), `H`, `D`, `W`. The `PT` prefix
/// switches to the ISO-8601 subset, which only allows `H`, `M` and `S`.
/// Periods that add up to zero are rejected.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use emporia_common::time::parse_relative_period;
///
/// assert_eq!(parse_relative_period("15M").unwrap(), Duration::minutes(15));
/// assert_eq!(parse_relative_period("1h30m").unwrap(), Duration::minutes(90));
/// assert_eq!(parse_relative_period("PT2H").unwrap(), Duration::hours(2));
/// ```
///
/// # Errors
///
/// Returns [`PeriodParseError`] for empty input, dangling numbers, units
/// without a number, unknown units and zero-length periods.
pub fn parse_relative_period(period: &str) -> Result<Duration, PeriodParseError> {
    let normalized = period.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return Err(PeriodParseError::EmptyString);
    }

    let (body, iso) = match normalized.strip_prefix("PT") {
        Some(rest) => (rest, true),
        None => (normalized.as_str(), false),
    };

    let invalid = || {
        if iso {
            PeriodParseError::InvalidIso(period.to_string())
        } else {
            PeriodParseError::InvalidFormat(period.to_string())
        }
    };

    let mut total_secs: i64 = 0;
    let mut number = String::new();
    for ch in body.chars() {
        if ch.is_ascii_digit() {
            number.push(ch);
            continue;
        }
        if ch.is_whitespace() {
            continue;
        }

        if number.is_empty() {
            return Err(invalid());
        }
        let unit_secs = match (ch, iso) {
            ('S', _) => 1,
            ('M', _) => 60,
            ('H', _) => 3_600,
            ('D', false) => 86_400,
            ('W', false) => 604_800,
            _ => return Err(PeriodParseError::UnknownUnit { unit: ch, period: period.to_string() }),
        };
        let value: i64 =
            number.parse().map_err(|_| PeriodParseError::Overflow(period.to_string()))?;
        total_secs = value
            .checked_mul(unit_secs)
            .and_then(|secs| total_secs.checked_add(secs))
            .ok_or_else(|| PeriodParseError::Overflow(period.to_string()))?;
        number.clear();
    }

    if !number.is_empty() || total_secs == 0 {
        return Err(invalid());
    }

    Duration::try_seconds(total_secs).ok_or_else(|| PeriodParseError::Overflow(period.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_units() {
        assert_eq!(parse_relative_period("30S").unwrap(), Duration::seconds(30));
        assert_eq!(parse_relative_period("15M").unwrap(), Duration::minutes(15));
        assert_eq!(parse_relative_period("2H").unwrap(), Duration::hours(2));
        assert_eq!(parse_relative_period("1D").unwrap(), Duration::days(1));
        assert_eq!(parse_relative_period("1W").unwrap(), Duration::weeks(1));
    }

    #[test]
    fn test_combined_case_insensitive() {
        assert_eq!(parse_relative_period("1h30m").unwrap(), Duration::minutes(90));
        assert_eq!(
            parse_relative_period("2h15m10s").unwrap(),
            Duration::seconds(2 * 3600 + 15 * 60 + 10)
        );
        assert_eq!(parse_relative_period(" 1h 30m ").unwrap(), Duration::minutes(90));
    }

    #[test]
    fn test_iso_subset() {
        assert_eq!(parse_relative_period("PT15M").unwrap(), Duration::minutes(15));
        assert_eq!(parse_relative_period("pt1h30m").unwrap(), Duration::minutes(90));
        assert_eq!(parse_relative_period("PT45S").unwrap(), Duration::seconds(45));
    }

    #[test]
    fn test_iso_rejects_day_units() {
        assert!(matches!(
            parse_relative_period("PT1D"),
            Err(PeriodParseError::UnknownUnit { unit: 'D', .. })
        ));
    }

    #[test]
    fn test_zero_periods_rejected() {
        assert_eq!(
            parse_relative_period("PT0H"),
            Err(PeriodParseError::InvalidIso("PT0H".to_string()))
        );
        assert_eq!(parse_relative_period("PT"), Err(PeriodParseError::InvalidIso("PT".to_string())));
        assert_eq!(parse_relative_period("0M"), Err(PeriodParseError::InvalidFormat("0M".to_string())));
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(parse_relative_period(""), Err(PeriodParseError::EmptyString));
        assert_eq!(parse_relative_period("   "), Err(PeriodParseError::EmptyString));
        assert_eq!(parse_relative_period("15"), Err(PeriodParseError::InvalidFormat("15".to_string())));
        assert_eq!(parse_relative_period("M"), Err(PeriodParseError::InvalidFormat("M".to_string())));
        assert!(matches!(
            parse_relative_period("15X"),
            Err(PeriodParseError::UnknownUnit { unit: 'X', .. })
        ));
    }

    #[test]
    fn test_overflow_reported() {
        assert!(matches!(
            parse_relative_period("99999999999999999999W"),
            Err(PeriodParseError::Overflow(_))
        ));
    }
}
