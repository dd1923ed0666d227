//! Tariff rate types

use serde::{Deserialize, Serialize};

use crate::impl_vendor_enum_conversions;

/// Named tariff tier mapped to a configured cents/kWh rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateTier {
    Low,
    High,
    Generac,
}

impl_vendor_enum_conversions!(RateTier {
    Low => "low",
    High => "high",
    Generac => "generac",
});

/// Current usage rate of one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRate {
    pub device_gid: u64,
    pub usage_cent_per_kw_hour: Option<f64>,
}

/// What happened to one device during a rate update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RateUpdateOutcome {
    Updated,
    AlreadySet,
    Failed { message: String },
}

/// Per-device summary of a rate update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateUpdateReport {
    pub rate: Option<f64>,
    /// `true` when the rate equalled the previously applied one and no
    /// device was contacted
    pub skipped: bool,
    pub devices: Vec<(u64, RateUpdateOutcome)>,
}

impl RateUpdateReport {
    pub fn updated_count(&self) -> usize {
        self.devices.iter().filter(|(_, o)| *o == RateUpdateOutcome::Updated).count()
    }

    pub fn failed_count(&self) -> usize {
        self.devices.iter().filter(|(_, o)| matches!(o, RateUpdateOutcome::Failed { .. })).count()
    }
}
