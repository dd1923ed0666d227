//! Vendor payload types
//!
//! Objects the client sends back to the vendor keep every unknown field in
//! a flattened `extra` map so read-modify-write calls never drop data.

pub mod charger;
pub mod device;
pub mod event;
pub mod rate;
pub mod status;
pub mod usage;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub use charger::EvCharger;
pub use device::{Channel, Device, DevicesResponse, LocationProperties};
pub use event::{DeviceStatusEvent, StreamEvent};
pub use rate::{DeviceRate, RateTier, RateUpdateOutcome, RateUpdateReport};
pub use status::{CustomerDevicesStatus, DevicesStatus};
pub use usage::{
    ChannelUsage, ChartScale, ChartUsage, DeviceGids, DeviceUsage, DevicesUsages, EnergyUnit,
    UsageScale,
};

/// Unknown fields preserved across a round trip
pub type ExtraFields = serde_json::Map<String, serde_json::Value>;

/// Deserialize `null` the same way as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a list of per-device entries, dropping those without a usable
/// gid (missing, `null` or `0`) and anything that is not an object.
///
/// The remaining entries decode strictly.
pub(crate) fn entries_with_gid<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Option::<Vec<Value>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .filter(has_device_gid)
        .map(|entry| serde_json::from_value(entry).map_err(D::Error::custom))
        .collect()
}

fn has_device_gid(entry: &Value) -> bool {
    ["deviceGid", "device_gid"]
        .iter()
        .filter_map(|key| entry.get(key).and_then(Value::as_u64))
        .any(|gid| gid != 0)
}
