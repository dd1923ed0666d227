//! Tariff rate service
//!
//! Pushes a cents/kWh rate to every device's location properties and
//! remembers the last rate applied so repeated requests for the same rate
//! cost no API calls.

use std::collections::HashMap;
use std::sync::Arc;

use emporia_domain::{
    DeviceRate, EmporiaError, LocationProperties, RateTier, RateUpdateOutcome, RateUpdateReport,
    Result,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::planner::{self, RatePlan};
use super::ports::LocationGateway;

/// Tariff rate service
pub struct RateService {
    gateway: Arc<dyn LocationGateway>,
    previous_rate: Mutex<Option<f64>>,
    tier_rates: HashMap<RateTier, f64>,
}

impl RateService {
    /// Create a new rate service with no rate applied yet
    pub fn new(gateway: Arc<dyn LocationGateway>) -> Self {
        Self { gateway, previous_rate: Mutex::new(None), tier_rates: HashMap::new() }
    }

    /// Register the rate used by [`RateService::apply_rate_tier`]
    #[must_use]
    pub fn with_tier_rate(mut self, tier: RateTier, rate: Option<f64>) -> Self {
        if let Some(rate) = rate {
            self.tier_rates.insert(tier, rate);
        }
        self
    }

    /// Location properties of every device (empty properties where missing)
    pub async fn devices_location_properties(&self) -> Result<Vec<LocationProperties>> {
        Ok(self.gateway.devices().await?.location_properties())
    }

    /// Current usage rate per device
    pub async fn devices_rate_properties(&self) -> Result<Vec<DeviceRate>> {
        Ok(planner::rate_properties(&self.devices_location_properties().await?))
    }

    /// Last rate applied, whether or not every device accepted it
    pub async fn previous_rate(&self) -> Option<f64> {
        *self.previous_rate.lock().await
    }

    /// Apply `rate` (cents/kWh) to every device whose rate differs.
    ///
    /// Skips all requests when `rate` equals the previously applied rate.
    /// Per-device failures are logged and reported, not fatal. The rate is
    /// remembered once the device list has been processed, so a partially
    /// applied rate is not retried until a different rate is requested.
    ///
    /// # Errors
    /// Returns error if the rate is not a finite non-negative number or the
    /// device list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn set_devices_rate_properties(&self, rate: f64) -> Result<RateUpdateReport> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(EmporiaError::InvalidInput(format!("Invalid rate: {rate}")));
        }

        let mut previous = self.previous_rate.lock().await;
        if previous.is_some_and(|p| planner::same_rate(p, rate)) {
            debug!(rate, "Rate already applied, skipping update");
            return Ok(RateUpdateReport { rate: Some(rate), skipped: true, devices: Vec::new() });
        }

        let properties = self.devices_location_properties().await?;
        let plans = planner::plan_rate_updates(properties, rate);
        if plans.is_empty() {
            warn!("No devices available to update rates");
            return Ok(RateUpdateReport { rate: Some(rate), skipped: false, devices: Vec::new() });
        }

        let mut devices = Vec::with_capacity(plans.len());
        for plan in plans {
            match plan {
                RatePlan::AlreadySet { device_gid } => {
                    debug!(device_gid, rate, "Device already at rate");
                    devices.push((device_gid, RateUpdateOutcome::AlreadySet));
                }
                RatePlan::Patch { device_gid, properties } => {
                    match self.gateway.update_location_properties(device_gid, &properties).await {
                        Ok(()) => {
                            info!(device_gid, rate, "Updated device rate");
                            devices.push((device_gid, RateUpdateOutcome::Updated));
                        }
                        Err(e) => {
                            error!(device_gid, rate, error = %e, "Failed to update device rate");
                            devices.push((
                                device_gid,
                                RateUpdateOutcome::Failed { message: e.to_string() },
                            ));
                        }
                    }
                }
            }
        }

        let report = RateUpdateReport { rate: Some(rate), skipped: false, devices };
        *previous = Some(rate);
        if report.failed_count() == 0 {
            info!(rate, "Rate applied to all devices");
        } else {
            warn!(rate, failed = report.failed_count(), "Rate applied partially");
        }
        Ok(report)
    }

    /// Apply the configured rate of `tier`
    ///
    /// # Errors
    /// Returns [`EmporiaError::Config`] when no rate is configured for `tier`.
    pub async fn apply_rate_tier(&self, tier: RateTier) -> Result<RateUpdateReport> {
        let rate = self
            .tier_rates
            .get(&tier)
            .copied()
            .ok_or_else(|| EmporiaError::Config(format!("No rate configured for tier '{tier}'")))?;
        self.set_devices_rate_properties(rate).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use emporia_domain::{Device, DevicesResponse};
    use serde_json::json;

    use super::*;

    struct FakeGateway {
        devices: DevicesResponse,
        fail_gid: Option<u64>,
        fetches: AtomicUsize,
        patches: StdMutex<Vec<(u64, LocationProperties)>>,
    }

    impl FakeGateway {
        fn new(rates: &[(u64, f64)]) -> Self {
            let devices = rates
                .iter()
                .map(|(gid, rate)| {
                    serde_json::from_value::<Device>(json!({
                        "deviceGid": gid,
                        "locationProperties": {"deviceGid": gid, "usageCentPerKwHour": rate}
                    }))
                    .unwrap()
                })
                .collect();
            Self {
                devices: DevicesResponse { devices, ..DevicesResponse::default() },
                fail_gid: None,
                fetches: AtomicUsize::new(0),
                patches: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LocationGateway for FakeGateway {
        async fn devices(&self) -> Result<DevicesResponse> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.devices.clone())
        }

        async fn update_location_properties(
            &self,
            device_gid: u64,
            properties: &LocationProperties,
        ) -> Result<()> {
            if self.fail_gid == Some(device_gid) {
                return Err(EmporiaError::Api { status: 500, message: "boom".to_string() });
            }
            self.patches.lock().unwrap().push((device_gid, properties.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_rate_properties() {
        let service = RateService::new(Arc::new(FakeGateway::new(&[(1, 7.6), (2, 15.8)])));
        let rates = service.devices_rate_properties().await.unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[1], DeviceRate { device_gid: 2, usage_cent_per_kw_hour: Some(15.8) });
    }

    #[tokio::test]
    async fn test_updates_only_differing_devices_and_remembers_rate() {
        let gateway = Arc::new(FakeGateway::new(&[(1, 7.6), (2, 15.8)]));
        let service = RateService::new(Arc::clone(&gateway) as Arc<dyn LocationGateway>);

        let report = service.set_devices_rate_properties(7.6).await.unwrap();

        assert_eq!(report.updated_count(), 1);
        assert_eq!(report.devices[0], (1, RateUpdateOutcome::AlreadySet));
        assert_eq!(report.devices[1], (2, RateUpdateOutcome::Updated));
        let patches = gateway.patches.lock().unwrap().clone();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].1.usage_cent_per_kw_hour, Some(7.6));
        assert_eq!(service.previous_rate().await, Some(7.6));
    }

    #[tokio::test]
    async fn test_same_rate_twice_skips_api() {
        let gateway = Arc::new(FakeGateway::new(&[(1, 5.0)]));
        let service = RateService::new(Arc::clone(&gateway) as Arc<dyn LocationGateway>);

        service.set_devices_rate_properties(9.0).await.unwrap();
        let second = service.set_devices_rate_properties(9.0).await.unwrap();

        assert!(second.skipped);
        assert_eq!(gateway.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_is_reported_and_remembered() {
        let mut fake = FakeGateway::new(&[(1, 5.0), (2, 5.0)]);
        fake.fail_gid = Some(1);
        let gateway = Arc::new(fake);
        let service = RateService::new(Arc::clone(&gateway) as Arc<dyn LocationGateway>);

        let report = service.set_devices_rate_properties(9.0).await.unwrap();

        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.updated_count(), 1);
        assert_eq!(service.previous_rate().await, Some(9.0));

        let again = service.set_devices_rate_properties(9.0).await.unwrap();
        assert!(again.skipped);
        assert_eq!(gateway.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_devices() {
        let service = RateService::new(Arc::new(FakeGateway::new(&[])));
        let report = service.set_devices_rate_properties(9.0).await.unwrap();
        assert!(report.devices.is_empty());
        assert!(service.previous_rate().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_rate_rejected() {
        let service = RateService::new(Arc::new(FakeGateway::new(&[(1, 5.0)])));
        assert!(matches!(
            service.set_devices_rate_properties(f64::NAN).await,
            Err(EmporiaError::InvalidInput(_))
        ));
        assert!(service.set_devices_rate_properties(-1.0).await.is_err());
    }

    #[tokio::test]
    async fn test_apply_rate_tier() {
        let gateway = Arc::new(FakeGateway::new(&[(1, 5.0)]));
        let service = RateService::new(Arc::clone(&gateway) as Arc<dyn LocationGateway>)
            .with_tier_rate(RateTier::Low, Some(7.6))
            .with_tier_rate(RateTier::High, None);

        let report = service.apply_rate_tier(RateTier::Low).await.unwrap();
        assert_eq!(report.rate, Some(7.6));

        let missing = service.apply_rate_tier(RateTier::High).await;
        assert!(matches!(missing, Err(EmporiaError::Config(_))));
    }
}
