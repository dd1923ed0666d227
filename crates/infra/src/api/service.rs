//! High-level Emporia API
//!
//! Wires configuration, the Cognito token manager, the API client and the
//! core services into one object exposing every vendor operation.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use emporia_core::chargers::{ChargerService, ChargerUpdate};
use emporia_core::rates::RateService;
use emporia_core::stream::DeviceStatusSink;
use emporia_domain::{
    ChartScale, ChartUsage, Config, CustomerDevicesStatus, DeviceGids, DeviceRate,
    DevicesResponse, DevicesStatus, DevicesUsages, EnergyUnit, EvCharger, LocationProperties,
    RateTier, RateUpdateReport, Result, StreamConfig, UsageScale,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::auth::{cognito_token_manager, IdTokenProvider};
use super::client::EmporiaClient;
use crate::http::HttpClient;
use crate::stream::DeviceStatusStream;

/// Authenticated Emporia account
pub struct EmporiaApi {
    client: Arc<EmporiaClient>,
    chargers: ChargerService,
    rates: RateService,
    stream_config: StreamConfig,
}

impl EmporiaApi {
    /// Build the full client stack from configuration
    ///
    /// No request is sent; the first call logs in.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the HTTP client
    /// cannot be created
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let http = HttpClient::builder()
            .timeout(config.api.timeout())
            .max_attempts(config.api.max_attempts)
            .build()?;
        let auth: Arc<dyn IdTokenProvider> = cognito_token_manager(config, http.clone());
        let client = EmporiaClient::builder()
            .config(config.api.clone())
            .auth(auth)
            .http_client(http)
            .build()?;

        let api = Self::new(Arc::new(client))
            .with_tier_rate(RateTier::Low, config.hydro_rate_low)
            .with_tier_rate(RateTier::High, config.hydro_rate_high)
            .with_tier_rate(RateTier::Generac, config.hydro_rate_generac)
            .with_stream_config(config.stream.clone());
        info!(username = %config.emporia_username, "Emporia API ready");
        Ok(api)
    }

    /// Wrap an existing client with default stream settings and no tier rates
    pub fn new(client: Arc<EmporiaClient>) -> Self {
        Self {
            chargers: ChargerService::new(client.clone()),
            rates: RateService::new(client.clone()),
            client,
            stream_config: StreamConfig::default(),
        }
    }

    #[must_use]
    pub fn with_tier_rate(mut self, tier: RateTier, rate: Option<f64>) -> Self {
        self.rates = self.rates.with_tier_rate(tier, rate);
        self
    }

    #[must_use]
    pub fn with_stream_config(mut self, config: StreamConfig) -> Self {
        self.stream_config = config;
        self
    }

    pub fn client(&self) -> &Arc<EmporiaClient> {
        &self.client
    }

    /// Log in now instead of on the first request
    ///
    /// # Errors
    ///
    /// Returns error if the credentials are rejected
    pub async fn authenticate(&self) -> Result<()> {
        self.client.id_token().await.map(|_| ())
    }

    // Devices ---------------------------------------------------------

    pub async fn devices(&self) -> Result<DevicesResponse> {
        self.client.devices().await
    }

    pub async fn devices_status(&self) -> Result<DevicesStatus> {
        self.client.devices_status().await
    }

    pub async fn devices_status_c_api(&self) -> Result<CustomerDevicesStatus> {
        self.client.devices_status_c_api().await
    }

    // EV chargers -----------------------------------------------------

    pub async fn ev_chargers(&self) -> Result<Vec<EvCharger>> {
        self.chargers.ev_chargers().await
    }

    pub async fn ev_charger_ids(&self) -> Result<Vec<u64>> {
        self.chargers.ev_charger_ids().await
    }

    pub async fn ev_charger(&self, index: usize) -> Result<Option<EvCharger>> {
        self.chargers.ev_charger(index).await
    }

    pub async fn ev_charger_by_id(&self, device_gid: u64) -> Result<Option<EvCharger>> {
        self.chargers.ev_charger_by_id(device_gid).await
    }

    /// On/off state of the first charger, `None` without chargers
    pub async fn current_charger_state(&self) -> Result<Option<bool>> {
        self.chargers.current_charger_state().await
    }

    pub async fn set_ev_charger(&self, on: bool) -> Result<ChargerUpdate> {
        self.chargers.set_ev_charger(on).await
    }

    pub async fn set_ev_charger_by_id(&self, device_gid: u64, on: bool) -> Result<ChargerUpdate> {
        self.chargers.set_ev_charger_by_id(device_gid, on).await
    }

    /// Current draw in watts of the given charger, or of the first charger
    ///
    /// Returns `0.0` when the account has no such charger.
    #[instrument(skip(self))]
    pub async fn current_charging_rate(
        &self,
        energy_unit: EnergyUnit,
        device_gid: Option<u64>,
    ) -> Result<f64> {
        let charger = match device_gid {
            Some(gid) => self.chargers.ev_charger_by_id(gid).await?,
            None => self.chargers.ev_charger(0).await?,
        };
        let Some(charger) = charger else {
            warn!("No EV charger to read the charging rate from");
            return Ok(0.0);
        };
        self.client.charging_rate(charger.device_gid, energy_unit, Utc::now()).await
    }

    // Tariff rates ----------------------------------------------------

    pub async fn devices_location_properties(&self) -> Result<Vec<LocationProperties>> {
        self.rates.devices_location_properties().await
    }

    pub async fn devices_rate_properties(&self) -> Result<Vec<DeviceRate>> {
        self.rates.devices_rate_properties().await
    }

    pub async fn set_devices_rate_properties(&self, rate: f64) -> Result<RateUpdateReport> {
        self.rates.set_devices_rate_properties(rate).await
    }

    pub async fn apply_rate_tier(&self, tier: RateTier) -> Result<RateUpdateReport> {
        self.rates.apply_rate_tier(tier).await
    }

    pub async fn previous_rate(&self) -> Option<f64> {
        self.rates.previous_rate().await
    }

    // Usage -----------------------------------------------------------

    pub async fn chart_usage(
        &self,
        device_gid: u64,
        channel: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        scale: ChartScale,
        energy_unit: EnergyUnit,
    ) -> Result<ChartUsage> {
        self.client.chart_usage(device_gid, channel, start, end, scale, energy_unit).await
    }

    pub async fn current_month_peak_demand(
        &self,
        device_gid: u64,
        channel: &str,
        energy_unit: EnergyUnit,
    ) -> Result<Value> {
        self.client.current_month_peak_demand(device_gid, channel, energy_unit).await
    }

    pub async fn devices_usages(
        &self,
        device_gids: &DeviceGids,
        instant: DateTime<Utc>,
        scale: UsageScale,
        energy_unit: EnergyUnit,
    ) -> Result<DevicesUsages> {
        self.client.devices_usages(device_gids, instant, scale, energy_unit).await
    }

    pub async fn instant_usage(
        &self,
        device_gids: &DeviceGids,
        energy_unit: EnergyUnit,
    ) -> Result<BTreeMap<u64, f64>> {
        self.client.instant_usage(device_gids, energy_unit).await
    }

    pub async fn app_preferences(&self) -> Result<Value> {
        self.client.app_preferences().await
    }

    // Stream ----------------------------------------------------------

    /// Device status stream sharing this account's client and tokens
    pub fn device_status_stream(&self, sink: Arc<dyn DeviceStatusSink>) -> DeviceStatusStream {
        DeviceStatusStream::new(Arc::clone(&self.client), self.stream_config.clone(), sink)
    }
}
