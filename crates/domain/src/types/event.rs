//! Server-sent event payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CustomerDevicesStatus;
use crate::constants::DEVICE_STATUS_EVENT;
use crate::errors::{EmporiaError, Result};

/// Raw event decoded from a `data:` line of the status stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

impl StreamEvent {
    pub fn is_device_status(&self) -> bool {
        self.event_type == DEVICE_STATUS_EVENT
    }
}

/// Typed `DEVICE_STATUS` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatusEvent {
    pub status: CustomerDevicesStatus,
}

impl TryFrom<StreamEvent> for DeviceStatusEvent {
    type Error = EmporiaError;

    fn try_from(event: StreamEvent) -> Result<Self> {
        if !event.is_device_status() {
            return Err(EmporiaError::InvalidInput(format!(
                "expected {DEVICE_STATUS_EVENT} event, got {}",
                event.event_type
            )));
        }
        let status = if event.data.is_null() {
            CustomerDevicesStatus::default()
        } else {
            serde_json::from_value(event.data)?
        };
        Ok(Self { status })
    }
}
