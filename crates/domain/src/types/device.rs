//! Device listing payloads (`GET /customers/devices`)

use serde::{Deserialize, Serialize};

use super::{null_as_default, ExtraFields};

/// Response body of the customer devices listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_gid: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub devices: Vec<Device>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Physical device: energy monitor, charger, outlet or battery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_gid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_properties: Option<LocationProperties>,
    /// Devices attached behind this one (e.g. a charger on a monitor)
    #[serde(default, deserialize_with = "null_as_default")]
    pub devices: Vec<Device>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub channels: Vec<Channel>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Measurement channel of a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_gid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub channel_num: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_multiplier: Option<f64>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Location and tariff properties of a device
///
/// Sent back whole on `PATCH /devices/{gid}/locationProperties`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_gid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_cent_per_kw_hour: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_demand_dollar_per_kw: Option<f64>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl DevicesResponse {
    /// Location properties of every top-level device, missing ones as default
    pub fn location_properties(&self) -> Vec<LocationProperties> {
        self.devices
            .iter()
            .map(|device| device.location_properties.clone().unwrap_or_default())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_nested_devices_and_tolerates_nulls() {
        let raw = json!({
            "customerGid": 77,
            "email": "someone@example.com",
            "devices": [{
                "deviceGid": 280643,
                "model": "VUE002",
                "devices": [{ "deviceGid": 507958, "model": "EVC", "devices": null, "channels": null }],
                "channels": [{ "deviceGid": 280643, "name": null, "channelNum": "1,2,3", "channelMultiplier": 1.0 }],
                "locationProperties": {
                    "deviceGid": 280643,
                    "deviceName": "Home",
                    "usageCentPerKwHour": 7.6,
                    "zipCode": "J0K"
                }
            }]
        });

        let response: DevicesResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(response.customer_gid, Some(77));
        assert_eq!(response.extra["email"], "someone@example.com");
        let device = &response.devices[0];
        assert_eq!(device.devices[0].device_gid, Some(507958));
        assert!(device.devices[0].channels.is_empty());
        assert_eq!(device.channels[0].channel_num, "1,2,3");

        let props = response.location_properties();
        assert_eq!(props[0].usage_cent_per_kw_hour, Some(7.6));
        assert_eq!(props[0].extra["zipCode"], "J0K");
    }

    #[test]
    fn device_without_gid_keeps_its_location_properties() {
        let response: DevicesResponse = serde_json::from_value(json!({
            "devices": [{
                "deviceGid": null,
                "locationProperties": { "deviceGid": 9, "usageCentPerKwHour": 8.7 }
            }]
        }))
        .unwrap();
        assert_eq!(response.devices[0].device_gid, None);
        assert_eq!(response.location_properties()[0].device_gid, Some(9));
    }

    #[test]
    fn missing_location_properties_become_default() {
        let response: DevicesResponse =
            serde_json::from_value(json!({ "devices": [{ "deviceGid": 1 }] })).unwrap();
        assert_eq!(response.location_properties(), vec![LocationProperties::default()]);
    }
}
