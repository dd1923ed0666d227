//! Device listing, status and location property endpoints

use async_trait::async_trait;
use emporia_core::chargers::ChargerGateway;
use emporia_core::rates::LocationGateway;
use emporia_domain::constants::{
    location_properties_path, CUSTOMERS_DEVICES_PATH, C_API_DEVICES_STATUS_PATH,
    DEVICES_STATUS_PATH, EVCHARGER_PATH,
};
use emporia_domain::{
    CustomerDevicesStatus, DevicesResponse, DevicesStatus, EvCharger, LocationProperties, Result,
};
use tracing::instrument;

use super::client::{ApiHost, EmporiaClient};

impl EmporiaClient {
    /// All devices of the customer (`GET /customers/devices`)
    pub async fn devices(&self) -> Result<DevicesResponse> {
        self.get_json(ApiHost::Legacy, CUSTOMERS_DEVICES_PATH, &[]).await
    }

    /// Charger and outlet status (`GET /customers/devices/status`)
    pub async fn devices_status(&self) -> Result<DevicesStatus> {
        self.get_json(ApiHost::Legacy, DEVICES_STATUS_PATH, &[]).await
    }

    /// Connection, EVSE, battery and outlet status from the c-api host
    pub async fn devices_status_c_api(&self) -> Result<CustomerDevicesStatus> {
        self.get_json(ApiHost::CApi, C_API_DEVICES_STATUS_PATH, &[]).await
    }

    /// Send back a full charger record (`PUT /devices/evcharger`)
    #[instrument(skip(self, charger), fields(device_gid = charger.device_gid, charger_on = charger.charger_on))]
    pub async fn put_ev_charger(&self, charger: &EvCharger) -> Result<EvCharger> {
        self.put_json(ApiHost::Legacy, EVCHARGER_PATH, charger).await
    }

    /// Replace the location properties of one device
    pub async fn patch_location_properties(
        &self,
        device_gid: u64,
        properties: &LocationProperties,
    ) -> Result<()> {
        self.patch_json(ApiHost::Legacy, &location_properties_path(device_gid), properties).await
    }
}

#[async_trait]
impl ChargerGateway for EmporiaClient {
    async fn devices_status(&self) -> Result<DevicesStatus> {
        EmporiaClient::devices_status(self).await
    }

    async fn update_charger(&self, charger: &EvCharger) -> Result<EvCharger> {
        self.put_ev_charger(charger).await
    }
}

#[async_trait]
impl LocationGateway for EmporiaClient {
    async fn devices(&self) -> Result<DevicesResponse> {
        EmporiaClient::devices(self).await
    }

    async fn update_location_properties(
        &self,
        device_gid: u64,
        properties: &LocationProperties,
    ) -> Result<()> {
        self.patch_location_properties(device_gid, properties).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::testing::client;

    #[tokio::test]
    async fn test_devices_status_c_api_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/c/v1/customers/devices/status"))
            .and(header("authToken", "token"))
            .and(header("Authorization", "Bearer token"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "devices_connected": [{"device_gid": 280643, "connected": true}],
                "evses": [{"device_gid": 507958, "status": "CHARGING"}],
                "batteries": null,
                "outlets": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let status = client(&server).devices_status_c_api().await.unwrap();

        assert_eq!(status.evses[0]["status"], "CHARGING");
        assert!(status.batteries.is_empty());
    }

    #[tokio::test]
    async fn test_devices_status_skips_chargers_without_gid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customers/devices/status"))
            .and(header("authToken", "token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "evChargers": [
                    {"deviceGid": null, "chargerOn": true},
                    {"deviceGid": 507958, "chargerOn": false, "loadGid": 12}
                ],
                "outlets": []
            })))
            .mount(&server)
            .await;

        let status = client(&server).devices_status().await.unwrap();

        assert_eq!(status.ev_chargers.len(), 1);
        assert_eq!(status.ev_chargers[0].device_gid, 507958);
    }

    #[tokio::test]
    async fn test_patch_location_properties_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/devices/280643/locationProperties"))
            .and(header("authToken", "token"))
            .and(body_json(json!({
                "deviceGid": 280643,
                "usageCentPerKwHour": 8.7,
                "zipCode": "J0K"
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let properties: LocationProperties = serde_json::from_value(json!({
            "deviceGid": 280643,
            "usageCentPerKwHour": 8.7,
            "zipCode": "J0K"
        }))
        .unwrap();

        client(&server).patch_location_properties(280643, &properties).await.unwrap();
    }
}
