//! Usage arithmetic on vendor payloads
//!
//! The vendor reports energy per bucket; these helpers turn it into the
//! instantaneous power figures callers want.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use emporia_common::time::parse_relative_period;
use emporia_domain::constants::{KWH_PER_SECOND_TO_WATTS, MAINS_CHANNEL};
use emporia_domain::{ChartUsage, DevicesUsages, EmporiaError, EnergyUnit, Result};

/// Seconds of 1S buckets sampled for the charging rate
pub const CHARGING_WINDOW_SECS: i64 = 5;
/// The newest second is often incomplete
pub const CHARGING_WINDOW_LAG_SECS: i64 = 1;

/// `(start, end)` of the charging-rate window ending one second before `now`
pub fn charging_rate_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = now - Duration::seconds(CHARGING_WINDOW_LAG_SECS);
    (end - Duration::seconds(CHARGING_WINDOW_SECS), end)
}

/// `(now - period, now)` for a relative period such as `15M` or `PT2H`
///
/// # Errors
/// Returns [`EmporiaError::InvalidInput`] when the period does not parse.
pub fn period_window(period: &str, now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let span = parse_relative_period(period).map_err(|e| EmporiaError::InvalidInput(e.to_string()))?;
    Ok((now - span, now))
}

/// Highest 1-second usage in watts, `0.0` when there is no data.
///
/// Each bucket holds the energy of one second, so kWh × 3 600 000 = W.
pub fn peak_watts(usage: &ChartUsage) -> f64 {
    usage
        .usage_list
        .iter()
        .flatten()
        .copied()
        .fold(None, |max: Option<f64>, value| Some(max.map_or(value, |m| m.max(value))))
        .map_or(0.0, |max| max * KWH_PER_SECOND_TO_WATTS)
}

/// Instantaneous usage per device from an `HOUR`-scale usages response.
///
/// Takes the `Mains` channel (kW converted to W when `unit` is kWh), else
/// the first channel as reported, else `0.0`. Devices without a gid never
/// make it past decoding.
pub fn instant_usage(usages: &DevicesUsages, unit: EnergyUnit) -> BTreeMap<u64, f64> {
    let mut map = BTreeMap::new();
    for device in &usages.device_usages {
        let mains = device.channel_usages.iter().find(|c| c.channel_id == MAINS_CHANNEL);
        let value = match mains {
            Some(channel) => {
                let usage = channel.usage.unwrap_or(0.0);
                if unit == EnergyUnit::KilowattHours {
                    usage * 1000.0
                } else {
                    usage
                }
            }
            None => device.channel_usages.first().and_then(|c| c.usage).unwrap_or(0.0),
        };
        map.insert(device.device_gid, value);
    }
    map
}
