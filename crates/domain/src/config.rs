//! Client configuration structures
//!
//! The top-level keys keep the flat layout of the historical `config.json`
//! (`emporia_username`, `user_pool_id`, `hydro_rate_low`, ...). Tuning knobs
//! live in optional nested sections that fall back to defaults.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    API_URL, C_API_URL, DEFAULT_CLIENT_ID, DEFAULT_EXPIRY_SKEW_SECS, DEFAULT_REGION,
    DEFAULT_USER_POOL_ID, DEVICE_STATUS_EVENT,
};
use crate::errors::{EmporiaError, Result};
use crate::types::RateTier;

/// Complete client configuration
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub emporia_username: String,
    pub emporia_password: String,

    #[serde(default = "default_user_pool_id")]
    pub user_pool_id: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Only needed for app clients created with a secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Overrides the regional identity endpoint (tests, proxies)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognito_endpoint: Option<String>,

    /// Convenience tariff rates in cents/kWh
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hydro_rate_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hydro_rate_high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hydro_rate_generac: Option<f64>,

    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP settings for the vendor REST hosts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub c_api_base_url: String,
    pub timeout_seconds: u64,
    /// Total attempts per request for transport failures and 5xx responses
    pub max_attempts: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: API_URL.to_string(),
            c_api_base_url: C_API_URL.to_string(),
            timeout_seconds: 30,
            max_attempts: 3,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Reconnect behaviour of the device status event stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    pub reconnect_delay_seconds: u64,
    /// Upper bound for the reconnect delay. Equal to
    /// `reconnect_delay_seconds` means a fixed delay.
    pub max_reconnect_delay_seconds: u64,
    pub event_types: Vec<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_seconds: 5,
            max_reconnect_delay_seconds: 5,
            event_types: vec![DEVICE_STATUS_EVENT.to_string()],
        }
    }
}

/// Token lifecycle tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    pub expiry_skew_seconds: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { expiry_skew_seconds: DEFAULT_EXPIRY_SKEW_SECS }
    }
}

fn default_user_pool_id() -> String {
    DEFAULT_USER_POOL_ID.to_string()
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl Config {
    /// Configuration with the app's identity pool and default tuning
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            emporia_username: username.into(),
            emporia_password: password.into(),
            user_pool_id: default_user_pool_id(),
            client_id: default_client_id(),
            region: default_region(),
            client_secret: None,
            cognito_endpoint: None,
            hydro_rate_low: None,
            hydro_rate_high: None,
            hydro_rate_generac: None,
            api: ApiConfig::default(),
            stream: StreamConfig::default(),
            auth: AuthConfig::default(),
        }
    }

    /// Check that every required key carries a value
    ///
    /// # Errors
    /// Returns `EmporiaError::Config` naming the first missing key.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("emporia_username", &self.emporia_username),
            ("emporia_password", &self.emporia_password),
            ("user_pool_id", &self.user_pool_id),
            ("client_id", &self.client_id),
            ("region", &self.region),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(EmporiaError::Config(format!("Missing required key in config: {key}")));
            }
        }

        if !self.user_pool_id.contains('_') {
            return Err(EmporiaError::Config(format!(
                "user_pool_id must look like <region>_<pool>: {}",
                self.user_pool_id
            )));
        }

        if self.api.max_attempts == 0 {
            return Err(EmporiaError::Config("api.max_attempts must be at least 1".into()));
        }

        Ok(())
    }

    /// Identity provider endpoint for this pool's region
    pub fn cognito_endpoint(&self) -> String {
        self.cognito_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com/", self.region))
    }

    /// Configured rate for a tariff tier, if any
    pub fn rate_for_tier(&self, tier: RateTier) -> Option<f64> {
        match tier {
            RateTier::Low => self.hydro_rate_low,
            RateTier::High => self.hydro_rate_high,
            RateTier::Generac => self.hydro_rate_generac,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("emporia_username", &self.emporia_username)
            .field("emporia_password", &"<redacted>")
            .field("user_pool_id", &self.user_pool_id)
            .field("client_id", &self.client_id)
            .field("region", &self.region)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("cognito_endpoint", &self.cognito_endpoint)
            .field("hydro_rate_low", &self.hydro_rate_low)
            .field("hydro_rate_high", &self.hydro_rate_high)
            .field("hydro_rate_generac", &self.hydro_rate_generac)
            .field("api", &self.api)
            .field("stream", &self.stream)
            .field("auth", &self.auth)
            .finish()
    }
}
