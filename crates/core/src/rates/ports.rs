//! Port interfaces for tariff rate updates

use async_trait::async_trait;
use emporia_domain::{DevicesResponse, LocationProperties, Result};

/// Trait for reading devices and writing their location properties
#[async_trait]
pub trait LocationGateway: Send + Sync {
    /// Fetch all devices of the customer
    async fn devices(&self) -> Result<DevicesResponse>;

    /// Replace the location properties of one device
    async fn update_location_properties(
        &self,
        device_gid: u64,
        properties: &LocationProperties,
    ) -> Result<()>;
}
