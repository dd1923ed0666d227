//! EV charger selection and on/off control

pub mod ports;
pub mod selection;
pub mod service;

pub use ports::ChargerGateway;
pub use service::{ChargerService, ChargerUpdate};
