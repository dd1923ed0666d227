//! Tariff rate planning and updates

pub mod planner;
pub mod ports;
pub mod service;

pub use planner::{plan_rate_updates, rate_properties, RatePlan};
pub use ports::LocationGateway;
pub use service::RateService;
