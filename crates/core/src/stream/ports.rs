//! Port interface for stream consumers

use emporia_domain::StreamEvent;

/// Receives `DEVICE_STATUS` events from the status stream
///
/// Called on the stream task; implementations should hand work off rather
/// than block. Any `Fn(StreamEvent)` closure is a sink.
pub trait DeviceStatusSink: Send + Sync {
    fn on_device_status(&self, event: StreamEvent);
}

impl<F> DeviceStatusSink for F
where
    F: Fn(StreamEvent) + Send + Sync,
{
    fn on_device_status(&self, event: StreamEvent) {
        self(event);
    }
}
