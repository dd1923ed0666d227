//! Usage and chart payloads plus the query enums that drive them

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::{entries_with_gid, null_as_default, ExtraFields};
use crate::impl_vendor_enum_conversions;

/// Unit in which the vendor reports usage
///
/// The legacy `AppAPI` host spells units in camel case, the c-api host in
/// screaming snake case. Both spellings parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnergyUnit {
    #[default]
    KilowattHours,
    AmpHours,
    Dollars,
}

impl EnergyUnit {
    /// Spelling used by the legacy `AppAPI` endpoints
    pub fn legacy_name(&self) -> &'static str {
        match self {
            Self::KilowattHours => "KilowattHours",
            Self::AmpHours => "AmpHours",
            Self::Dollars => "Dollars",
        }
    }

    /// Spelling used by the c-api endpoints
    pub fn c_api_name(&self) -> &'static str {
        match self {
            Self::KilowattHours => "KILOWATT_HOURS",
            Self::AmpHours => "AMP_HOURS",
            Self::Dollars => "DOLLARS",
        }
    }
}

impl fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.legacy_name())
    }
}

impl FromStr for EnergyUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String =
            s.trim().chars().filter(|c| *c != '_').collect::<String>().to_ascii_lowercase();
        match normalized.as_str() {
            "kilowatthours" | "kwh" => Ok(Self::KilowattHours),
            "amphours" | "ah" => Ok(Self::AmpHours),
            "dollars" | "usd" => Ok(Self::Dollars),
            _ => Err(format!("Invalid EnergyUnit: {s}")),
        }
    }
}

/// Bucket size of the chart usage endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartScale {
    Second,
    Minute,
    FifteenMinutes,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl_vendor_enum_conversions!(ChartScale {
    Second => "1S",
    Minute => "1MIN",
    FifteenMinutes => "15MIN",
    Hour => "1H",
    Day => "1D",
    Week => "1W",
    Month => "1MON",
    Year => "1Y",
});

/// Aggregation window of the c-api devices usages endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageScale {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl_vendor_enum_conversions!(UsageScale {
    Minute => "MINUTE",
    Hour => "HOUR",
    Day => "DAY",
    Week => "WEEK",
    Month => "MONTH",
    Year => "YEAR",
});

/// One or more device gids, sent comma separated
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceGids(pub Vec<u64>);

impl DeviceGids {
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `292237,280643,507958`
    pub fn joined(&self) -> String {
        self.0.iter().map(u64::to_string).collect::<Vec<_>>().join(",")
    }
}

impl From<u64> for DeviceGids {
    fn from(gid: u64) -> Self {
        Self(vec![gid])
    }
}

impl From<Vec<u64>> for DeviceGids {
    fn from(gids: Vec<u64>) -> Self {
        Self(gids)
    }
}

impl From<&[u64]> for DeviceGids {
    fn from(gids: &[u64]) -> Self {
        Self(gids.to_vec())
    }
}

impl FromStr for DeviceGids {
    type Err = String;

    /// Parses `"292237, 280643,507958"`; blank entries are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let gids = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<u64>().map_err(|_| format!("Invalid device gid: {part}")))
            .collect::<Result<Vec<_>, _>>()?;

        if gids.is_empty() {
            return Err(format!("No valid gids parsed from: {s}"));
        }
        Ok(Self(gids))
    }
}

/// Chart usage series (`firstUsageInstant` + one value per bucket)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_usage_instant: Option<String>,
    /// Buckets without data come back as `null`
    #[serde(default, deserialize_with = "null_as_default")]
    pub usage_list: Vec<Option<f64>>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// c-api devices usages response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevicesUsages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_unit: Option<String>,
    /// Devices without a gid are dropped
    #[serde(default, deserialize_with = "entries_with_gid")]
    pub device_usages: Vec<DeviceUsage>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Usage of one device, per channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceUsage {
    pub device_gid: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub channel_usages: Vec<ChannelUsage>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Usage of one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelUsage {
    #[serde(deserialize_with = "string_or_number")]
    pub channel_id: String,
    #[serde(default)]
    pub usage: Option<f64>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Channel ids are names (`Mains`) or channel numbers depending on device
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}
