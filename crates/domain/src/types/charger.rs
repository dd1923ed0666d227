//! EV charger payload

use serde::{Deserialize, Serialize};

use super::ExtraFields;

/// EV charger as reported by the devices status endpoint
///
/// The same object is sent back verbatim (with `chargerOn` changed) to turn
/// the charger on or off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvCharger {
    pub device_gid: u64,
    #[serde(default)]
    pub charger_on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charging_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_charging_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault_text: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl EvCharger {
    /// Minimal charger, mostly useful in tests
    pub fn new(device_gid: u64, charger_on: bool) -> Self {
        Self {
            device_gid,
            charger_on,
            charging_rate: None,
            max_charging_rate: None,
            status: None,
            message: None,
            fault_text: None,
            extra: ExtraFields::new(),
        }
    }
}
