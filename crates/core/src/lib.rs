//! # Emporia Core
//!
//! Pure client logic layer - no HTTP or identity-provider code.
//!
//! This crate contains:
//! - Charger selection and on/off planning
//! - Tariff rate planning with the last applied rate remembered
//! - Usage arithmetic (charging rate, instant usage)
//! - Incremental decoding of the device-status stream
//! - Port interfaces (traits) implemented by `emporia-infra`
//!
//! ## Architecture Principles
//! - Depends only on `emporia-common` and `emporia-domain`
//! - All vendor access via traits
//! - Pure, testable logic

pub mod chargers;
pub mod rates;
pub mod stream;
pub mod usage;

pub use chargers::{ChargerGateway, ChargerService, ChargerUpdate};
pub use rates::{LocationGateway, RateService};
pub use stream::{DeviceStatusSink, SseDecoder};
