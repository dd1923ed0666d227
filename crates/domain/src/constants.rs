//! Vendor constants
//!
//! Endpoints and identity-pool defaults used by the Emporia mobile app.

/// Legacy REST host (devices, charger control, `AppAPI` methods)
pub const API_URL: &str = "https://api.emporiaenergy.com";

/// Newer "c-api" host (usages, chart usage, preferences, status stream)
pub const C_API_URL: &str = "https://c-api.emporiaenergy.com";

// Identity pool used by the Emporia app
pub const DEFAULT_REGION: &str = "us-east-2";
pub const DEFAULT_USER_POOL_ID: &str = "us-east-2_ghlOXVLi1";
pub const DEFAULT_CLIENT_ID: &str = "4qte47jbstod8apnfic0bunmrq";

// Legacy API paths
pub const CUSTOMERS_DEVICES_PATH: &str = "/customers/devices";
pub const DEVICES_STATUS_PATH: &str = "/customers/devices/status";
pub const EVCHARGER_PATH: &str = "/devices/evcharger";
pub const APP_API_PATH: &str = "/AppAPI";

// c-api paths
pub const CHART_USAGE_PATH: &str = "/v1/migrated/app-api/chart-usage";
pub const DEVICES_USAGES_PATH: &str = "/v1/customers/devices/usages";
pub const APP_PREFERENCES_PATH: &str = "/v1/customers/app-preferences";
pub const C_API_DEVICES_STATUS_PATH: &str = "/v1/customers/devices/status";
pub const STREAM_PATH: &str = "/v1/customers/stream";

/// Event type pushed on the status stream
pub const DEVICE_STATUS_EVENT: &str = "DEVICE_STATUS";

/// Channel name of the whole-home measurement on a monitor
pub const MAINS_CHANNEL: &str = "Mains";

/// Channel list covering the three measurement legs of a charger or monitor
pub const ALL_PHASES_CHANNEL: &str = "1,2,3";

/// Seconds shaved off the vendor `ExpiresIn` so tokens are renewed early
pub const DEFAULT_EXPIRY_SKEW_SECS: i64 = 30;

/// One-second kWh samples times this factor gives watts
pub const KWH_PER_SECOND_TO_WATTS: f64 = 3_600_000.0;

/// Path on the legacy host that updates a device's location properties
pub fn location_properties_path(device_gid: u64) -> String {
    format!("/devices/{device_gid}/locationProperties")
}
