//! Port interfaces for EV charger control
//!
//! These traits define the boundaries between core business logic
//! and the HTTP implementation in infra.

use async_trait::async_trait;
use emporia_domain::{DevicesStatus, EvCharger, Result};

/// Trait for reading and writing charger state on the vendor API
#[async_trait]
pub trait ChargerGateway: Send + Sync {
    /// Fetch the legacy devices status (chargers, outlets, connectivity)
    async fn devices_status(&self) -> Result<DevicesStatus>;

    /// Send the full charger object back to the API
    async fn update_charger(&self, charger: &EvCharger) -> Result<EvCharger>;
}
