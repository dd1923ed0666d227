//! Device status event stream

pub mod consumer;

pub use consumer::DeviceStatusStream;
