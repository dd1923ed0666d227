//! Device status payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{entries_with_gid, null_as_default, EvCharger, ExtraFields};

/// Legacy `GET /customers/devices/status` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicesStatus {
    /// Chargers without a device gid are dropped
    #[serde(default, deserialize_with = "entries_with_gid")]
    pub ev_chargers: Vec<EvCharger>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub outlets: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub devices_connected: Vec<Value>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// c-api `GET /v1/customers/devices/status` response
///
/// Also the payload of `DEVICE_STATUS` stream events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerDevicesStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub devices_connected: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub evses: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub batteries: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub outlets: Vec<Value>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn null_charger_list_is_empty() {
        let status: DevicesStatus =
            serde_json::from_value(json!({ "evChargers": null, "outlets": [] })).unwrap();
        assert!(status.ev_chargers.is_empty());
    }

    #[test]
    fn chargers_without_gid_are_dropped() {
        let status: DevicesStatus = serde_json::from_value(json!({
            "evChargers": [
                { "chargerOn": true },
                { "deviceGid": null, "chargerOn": true },
                { "deviceGid": 0 },
                "not a charger",
                { "deviceGid": 4242, "chargerOn": false }
            ]
        }))
        .unwrap();
        assert_eq!(status.ev_chargers.len(), 1);
        assert_eq!(status.ev_chargers[0].device_gid, 4242);
    }

    #[test]
    fn charger_with_malformed_gid_still_fails() {
        let result = serde_json::from_value::<DevicesStatus>(json!({
            "evChargers": [{ "deviceGid": 4242, "chargerOn": "yes" }]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn c_api_status_keeps_sections() {
        let status: CustomerDevicesStatus = serde_json::from_value(json!({
            "devices_connected": [{ "device_gid": 1, "connected": true }],
            "evses": [{ "device_gid": 2, "status": "CHARGING" }],
            "batteries": [],
            "outlets": [],
            "schema_version": 3
        }))
        .unwrap();
        assert_eq!(status.evses[0]["status"], "CHARGING");
        assert_eq!(status.extra["schema_version"], 3);
    }
}
