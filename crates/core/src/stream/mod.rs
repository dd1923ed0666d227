//! Device-status stream decoding

pub mod ports;
pub mod sse;

pub use ports::DeviceStatusSink;
pub use sse::SseDecoder;
