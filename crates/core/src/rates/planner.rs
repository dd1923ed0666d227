//! Pure rate-update planning

use emporia_domain::{DeviceRate, LocationProperties};

const RATE_EPSILON: f64 = 1e-9;

/// What to do with one device's location properties
#[derive(Debug, Clone, PartialEq)]
pub enum RatePlan {
    /// Already at the target rate
    AlreadySet { device_gid: u64 },
    /// Send these properties (target rate applied)
    Patch { device_gid: u64, properties: LocationProperties },
}

/// Rates compare equal within floating point noise.
pub fn same_rate(a: f64, b: f64) -> bool {
    (a - b).abs() < RATE_EPSILON
}

/// `(device_gid, rate)` for every property set that carries a gid
pub fn rate_properties(properties: &[LocationProperties]) -> Vec<DeviceRate> {
    properties
        .iter()
        .filter_map(|p| {
            p.device_gid.map(|device_gid| DeviceRate {
                device_gid,
                usage_cent_per_kw_hour: p.usage_cent_per_kw_hour,
            })
        })
        .collect()
}

/// Plan the PATCH requests needed to bring every device to `rate`.
///
/// Properties without a device gid are dropped. Each patch carries the full
/// property object so unmodelled fields are sent back unchanged.
pub fn plan_rate_updates(properties: Vec<LocationProperties>, rate: f64) -> Vec<RatePlan> {
    properties
        .into_iter()
        .filter_map(|mut properties| {
            let device_gid = properties.device_gid?;
            if properties.usage_cent_per_kw_hour.is_some_and(|current| same_rate(current, rate)) {
                return Some(RatePlan::AlreadySet { device_gid });
            }
            properties.usage_cent_per_kw_hour = Some(rate);
            Some(RatePlan::Patch { device_gid, properties })
        })
        .collect()
}
