//! Device status stream consumer
//!
//! Holds a server-sent event connection to the c-api host and hands every
//! `DEVICE_STATUS` event to a [`DeviceStatusSink`]. The connection is
//! re-established forever until cancelled: immediately after a 401 (with a
//! fresh token), after the reconnect delay for anything else.

use std::sync::Arc;
use std::time::Duration;

use emporia_common::resilience::{Backoff, BackoffStrategy};
use emporia_core::stream::{DeviceStatusSink, SseDecoder};
use emporia_domain::constants::STREAM_PATH;
use emporia_domain::{EmporiaError, Result, StreamConfig, StreamEvent};
use futures::StreamExt;
use reqwest::StatusCode;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, EmporiaClient};
use crate::errors::InfraError;

const EVENT_STREAM: &str = "text/event-stream";

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// How one connection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Cancelled,
    /// Server closed the body
    Closed,
    /// Rejected with 401; a new token has been obtained
    Unauthorized,
}

/// Reconnecting consumer of the device status stream
pub struct DeviceStatusStream {
    client: Arc<EmporiaClient>,
    config: StreamConfig,
    sink: Arc<dyn DeviceStatusSink>,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl DeviceStatusStream {
    /// Create a new stream consumer
    ///
    /// # Arguments
    ///
    /// * `client` - API client used for tokens and the connection
    /// * `config` - Event types and reconnect delays
    /// * `sink` - Receiver of `DEVICE_STATUS` events
    pub fn new(
        client: Arc<EmporiaClient>,
        config: StreamConfig,
        sink: Arc<dyn DeviceStatusSink>,
    ) -> Self {
        Self {
            client,
            config,
            sink,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start consuming on a background task
    ///
    /// # Errors
    ///
    /// Returns error if the stream is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<()> {
        if self.is_running().await {
            return Err(EmporiaError::InvalidInput("Device status stream already running".into()));
        }

        // Fresh token so the stream can be restarted after stop
        self.cancellation_token = CancellationToken::new();

        let client = Arc::clone(&self.client);
        let config = self.config.clone();
        let sink = Arc::clone(&self.sink);
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            run_loop(&client, &config, sink.as_ref(), &cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);
        Ok(())
    }

    /// Stop the background task and wait for it to finish
    ///
    /// # Errors
    ///
    /// Returns error if the stream is not running or the task did not end
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<()> {
        if !self.is_running().await {
            return Err(EmporiaError::InvalidInput("Device status stream not running".into()));
        }

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            match tokio::time::timeout(Duration::from_secs(5), handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Stream task panicked: {}", e);
                    return Err(EmporiaError::Internal("Stream task panicked".into()));
                }
                Err(_) => {
                    warn!("Stream task did not complete within timeout");
                    return Err(EmporiaError::Internal("Stream task timeout".into()));
                }
            }
        }

        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.task_handle.lock().await.is_some()
    }

    /// Consume on the current task until `cancel` fires
    pub async fn run(&self, cancel: CancellationToken) {
        run_loop(&self.client, &self.config, self.sink.as_ref(), &cancel).await;
    }
}

impl Drop for DeviceStatusStream {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() {
            self.cancellation_token.cancel();
        }
    }
}

async fn run_loop(
    client: &EmporiaClient,
    config: &StreamConfig,
    sink: &dyn DeviceStatusSink,
    cancel: &CancellationToken,
) {
    let mut backoff = Backoff::new(BackoffStrategy::reconnect(
        Duration::from_secs(config.reconnect_delay_seconds),
        Duration::from_secs(config.max_reconnect_delay_seconds),
    ));
    let mut previous_unauthorized = false;

    info!("Device status stream started");
    while !cancel.is_cancelled() {
        let outcome = session(client, config, sink, cancel, &mut backoff).await;
        match &outcome {
            Ok(SessionEnd::Cancelled) => break,
            // A single 401 reconnects right away; a second in a row waits
            Ok(SessionEnd::Unauthorized) if !previous_unauthorized => {
                previous_unauthorized = true;
                continue;
            }
            Ok(SessionEnd::Unauthorized) => warn!("Stream rejected the renewed token"),
            Ok(SessionEnd::Closed) => warn!("Device status stream closed by server"),
            Err(e) => warn!(error = %e, "Device status stream disconnected"),
        }
        previous_unauthorized = matches!(outcome, Ok(SessionEnd::Unauthorized));

        let delay = backoff.next_delay();
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        info!(delay_ms, "Reconnecting to device status stream");
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }
    info!("Device status stream stopped");
}

async fn session(
    client: &EmporiaClient,
    config: &StreamConfig,
    sink: &dyn DeviceStatusSink,
    cancel: &CancellationToken,
    backoff: &mut Backoff,
) -> Result<SessionEnd> {
    let token = tokio::select! {
        _ = cancel.cancelled() => return Ok(SessionEnd::Cancelled),
        token = client.id_token() => token?,
    };

    let query = [("event_types", config.event_types.join(","))];
    debug!(event_types = %query[0].1, "Connecting to device status stream");
    let response = tokio::select! {
        _ = cancel.cancelled() => return Ok(SessionEnd::Cancelled),
        response = client.open_stream(STREAM_PATH, &query, EVENT_STREAM, &token) => response?,
    };

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        warn!("Device status stream rejected the id token, re-authenticating");
        client.reauthenticate(&token).await?;
        return Ok(SessionEnd::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::from_status(status, STREAM_PATH, &body).into());
    }

    info!("Connected to device status stream");
    backoff.reset();

    let mut decoder = SseDecoder::new();
    let mut body = response.bytes_stream();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Ok(SessionEnd::Cancelled),
            chunk = body.next() => match chunk {
                Some(Ok(bytes)) => {
                    for event in decoder.push(&bytes)? {
                        deliver(sink, event);
                    }
                }
                Some(Err(e)) => return Err(InfraError::from(e).into()),
                None => {
                    if let Some(event) = decoder.finish() {
                        deliver(sink, event);
                    }
                    return Ok(SessionEnd::Closed);
                }
            },
        }
    }
}

fn deliver(sink: &dyn DeviceStatusSink, event: StreamEvent) {
    if event.is_device_status() {
        debug!("Stream event received: DEVICE_STATUS");
        sink.on_device_status(event);
    } else {
        debug!(event_type = %event.event_type, "Ignoring stream event");
    }
}
