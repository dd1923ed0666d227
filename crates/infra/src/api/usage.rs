//! Usage, chart and peak demand endpoints

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use emporia_common::time::format_iso_millis_z;
use emporia_core::usage::{charging_rate_window, instant_usage, peak_watts};
use emporia_domain::constants::{
    ALL_PHASES_CHANNEL, APP_API_PATH, CHART_USAGE_PATH, DEVICES_USAGES_PATH,
};
use emporia_domain::{
    ChartScale, ChartUsage, DeviceGids, DevicesUsages, EmporiaError, EnergyUnit, Result,
    UsageScale,
};
use serde_json::Value;
use tracing::{debug, instrument};

use super::client::{ApiHost, EmporiaClient};

impl EmporiaClient {
    /// Historical usage list for one channel (c-api chart usage)
    ///
    /// # Errors
    /// Returns error if the request fails or the body does not decode
    #[instrument(skip(self))]
    pub async fn chart_usage(
        &self,
        device_gid: u64,
        channel: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        scale: ChartScale,
        energy_unit: EnergyUnit,
    ) -> Result<ChartUsage> {
        if end < start {
            return Err(EmporiaError::InvalidInput(format!(
                "Chart window ends before it starts: {start} > {end}"
            )));
        }

        let query = [
            ("deviceGid", device_gid.to_string()),
            ("channel", channel.to_string()),
            ("start", format_iso_millis_z(start)),
            ("end", format_iso_millis_z(end)),
            ("scale", scale.to_string()),
            ("energyUnit", energy_unit.legacy_name().to_string()),
        ];
        self.get_json(ApiHost::CApi, CHART_USAGE_PATH, &query).await
    }

    /// Peak demand of the current billing month, returned as sent
    #[instrument(skip(self))]
    pub async fn current_month_peak_demand(
        &self,
        device_gid: u64,
        channel: &str,
        energy_unit: EnergyUnit,
    ) -> Result<Value> {
        let query = [
            ("apiMethod", "getCurrentMonthPeakDemand".to_string()),
            ("deviceGid", device_gid.to_string()),
            ("channel", channel.to_string()),
            ("energyUnit", energy_unit.legacy_name().to_string()),
        ];
        self.get_json(ApiHost::Legacy, APP_API_PATH, &query).await
    }

    /// Usage of several devices at `instant` (c-api)
    ///
    /// # Errors
    /// Returns [`EmporiaError::InvalidInput`] when `device_gids` is empty.
    #[instrument(skip(self, device_gids), fields(device_gids = %device_gids.joined()))]
    pub async fn devices_usages(
        &self,
        device_gids: &DeviceGids,
        instant: DateTime<Utc>,
        scale: UsageScale,
        energy_unit: EnergyUnit,
    ) -> Result<DevicesUsages> {
        if device_gids.is_empty() {
            return Err(EmporiaError::InvalidInput("At least one device gid is required".into()));
        }

        let query = [
            ("device_gids", device_gids.joined()),
            ("instant", format_iso_millis_z(instant)),
            ("scale", scale.to_string()),
            ("energy_unit", energy_unit.c_api_name().to_string()),
        ];
        self.get_json(ApiHost::CApi, DEVICES_USAGES_PATH, &query).await
    }

    /// Instantaneous usage per device: the `HOUR` usages at now reduced to
    /// one value each (watts for kWh)
    pub async fn instant_usage(
        &self,
        device_gids: &DeviceGids,
        energy_unit: EnergyUnit,
    ) -> Result<BTreeMap<u64, f64>> {
        let usages =
            self.devices_usages(device_gids, Utc::now(), UsageScale::Hour, energy_unit).await?;
        Ok(instant_usage(&usages, energy_unit))
    }

    /// Highest 1-second draw of a charger over the few seconds before `now`
    ///
    /// Returns `0.0` when the vendor has no samples for the window.
    #[instrument(skip(self))]
    pub async fn charging_rate(
        &self,
        device_gid: u64,
        energy_unit: EnergyUnit,
        now: DateTime<Utc>,
    ) -> Result<f64> {
        let (start, end) = charging_rate_window(now);
        let query = [
            ("apiMethod", "getChartUsage".to_string()),
            ("deviceGid", device_gid.to_string()),
            ("channel", ALL_PHASES_CHANNEL.to_string()),
            ("start", format_iso_millis_z(start)),
            ("end", format_iso_millis_z(end)),
            ("scale", ChartScale::Second.to_string()),
            ("energyUnit", energy_unit.legacy_name().to_string()),
        ];
        let usage: ChartUsage = self.get_json(ApiHost::Legacy, APP_API_PATH, &query).await?;
        let watts = peak_watts(&usage);
        debug!(device_gid, watts, "Charging rate");
        Ok(watts)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::testing::client;

    fn at(h: u32, m: u32, s: u32, millis: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 25, h, m, s).single().unwrap() + Duration::milliseconds(millis)
    }

    #[tokio::test]
    async fn test_chart_usage_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/c/v1/migrated/app-api/chart-usage"))
            .and(header("Authorization", "Bearer token"))
            .and(query_param("deviceGid", "280643"))
            .and(query_param("channel", "Mains"))
            .and(query_param("start", "2026-01-25T10:13:00.000Z"))
            .and(query_param("end", "2026-01-25T10:28:00.250Z"))
            .and(query_param("scale", "1MIN"))
            .and(query_param("energyUnit", "AmpHours"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "firstUsageInstant": "2026-01-25T10:13:00Z",
                "usageList": [1.5, null, 1.8]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let usage = client(&server)
            .chart_usage(
                280643,
                "Mains",
                at(10, 13, 0, 0),
                at(10, 28, 0, 250),
                ChartScale::Minute,
                EnergyUnit::AmpHours,
            )
            .await
            .unwrap();

        assert_eq!(usage.first_usage_instant.as_deref(), Some("2026-01-25T10:13:00Z"));
        assert_eq!(usage.usage_list, vec![Some(1.5), None, Some(1.8)]);
    }

    #[tokio::test]
    async fn test_chart_usage_rejects_reversed_window() {
        let server = MockServer::start().await;

        let err = client(&server)
            .chart_usage(
                1,
                "Mains",
                at(11, 0, 0, 0),
                at(10, 0, 0, 0),
                ChartScale::Minute,
                EnergyUnit::KilowattHours,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, EmporiaError::InvalidInput(_)), "got {err:?}");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_peak_demand_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/AppAPI"))
            .and(header("authToken", "token"))
            .and(query_param("apiMethod", "getCurrentMonthPeakDemand"))
            .and(query_param("deviceGid", "280643"))
            .and(query_param("channel", "1,2,3"))
            .and(query_param("energyUnit", "KilowattHours"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "peakDemand": 4.2,
                "peakDemandInstant": "2026-01-12T18:04:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let peak = client(&server)
            .current_month_peak_demand(280643, "1,2,3", EnergyUnit::KilowattHours)
            .await
            .unwrap();

        assert_eq!(peak["peakDemand"], 4.2);
    }

    #[tokio::test]
    async fn test_devices_usages_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/c/v1/customers/devices/usages"))
            .and(header("Authorization", "Bearer token"))
            .and(query_param("device_gids", "292237,280643"))
            .and(query_param("instant", "2026-01-25T17:20:20.388Z"))
            .and(query_param("scale", "MONTH"))
            .and(query_param("energy_unit", "DOLLARS"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "instant": "2026-01-25T17:20:20.388Z",
                "scale": "MONTH",
                "energy_unit": "DOLLARS",
                "device_usages": [
                    {"device_gid": 292237, "channel_usages": [{"channel_id": "Mains", "usage": 41.7}]},
                    {"device_gid": 280643, "channel_usages": [{"channel_id": "Mains", "usage": 12.3}]}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gids: DeviceGids = vec![292237, 280643].into();
        let usages = client(&server)
            .devices_usages(&gids, at(17, 20, 20, 388), UsageScale::Month, EnergyUnit::Dollars)
            .await
            .unwrap();

        assert_eq!(usages.device_usages.len(), 2);
        assert_eq!(usages.device_usages[1].channel_usages[0].usage, Some(12.3));
    }

    #[tokio::test]
    async fn test_devices_usages_needs_a_gid() {
        let server = MockServer::start().await;

        let err = client(&server)
            .devices_usages(
                &DeviceGids::default(),
                Utc::now(),
                UsageScale::Hour,
                EnergyUnit::KilowattHours,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, EmporiaError::InvalidInput(_)), "got {err:?}");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_instant_usage_per_device() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/c/v1/customers/devices/usages"))
            .and(query_param("device_gids", "280643,507958"))
            .and(query_param("scale", "HOUR"))
            .and(query_param("energy_unit", "KILOWATT_HOURS"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "device_usages": [
                    {"device_gid": 280643, "channel_usages": [
                        {"channel_id": "1", "usage": 0.4},
                        {"channel_id": "Mains", "usage": 1.243}
                    ]},
                    {"device_gid": 507958, "channel_usages": [{"channel_id": 1, "usage": 0.5}]},
                    {"device_gid": null, "channel_usages": [{"channel_id": "Mains", "usage": 9.0}]}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gids: DeviceGids = "280643,507958".parse().unwrap();
        let map = client(&server).instant_usage(&gids, EnergyUnit::KilowattHours).await.unwrap();

        assert_eq!(map.len(), 2);
        assert!((map[&280643] - 1243.0).abs() < 1e-9);
        assert_eq!(map[&507958], 0.5);
    }
}
