//! Incremental decoder for the device-status event stream
//!
//! The stream is newline delimited. Only `data:` lines carry events; each
//! holds one JSON object with `event_type` and `data`. Comment lines (`:`
//! keep-alives), blank separators and other SSE fields are skipped.

use emporia_domain::{EmporiaError, Result, StreamEvent};
use tracing::{debug, warn};

/// Longest unterminated line kept in memory (1 MiB)
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Buffers raw body chunks and yields complete events
#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    max_line_bytes: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_line_bytes(MAX_LINE_BYTES)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self { buffer: Vec::new(), max_line_bytes }
    }

    /// Feed one body chunk; returns the events completed by it.
    ///
    /// Chunks may split lines (and UTF-8 sequences) anywhere; the partial
    /// tail stays buffered until the next chunk.
    ///
    /// # Errors
    /// Returns [`EmporiaError::Decode`] when the buffered tail grows past the
    /// line limit without a newline. The buffer is dropped.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<StreamEvent>> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = parse_line(&String::from_utf8_lossy(&line)) {
                events.push(event);
            }
        }

        if self.buffer.len() > self.max_line_bytes {
            let pending = self.buffer.len();
            self.buffer = Vec::new();
            return Err(EmporiaError::Decode(format!(
                "Stream line exceeds {} bytes ({pending} buffered without a newline)",
                self.max_line_bytes
            )));
        }
        Ok(events)
    }

    /// Flush a final unterminated line at end of stream
    pub fn finish(&mut self) -> Option<StreamEvent> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        parse_line(&String::from_utf8_lossy(&line))
    }

    /// Bytes waiting for a newline
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

fn parse_line(raw: &str) -> Option<StreamEvent> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let Some(payload) = line.strip_prefix("data:") else {
        debug!(line, "Ignoring non-data stream line");
        return None;
    };

    match serde_json::from_str::<StreamEvent>(payload.trim()) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, payload = payload.trim(), "Skipping malformed stream event");
            None
        }
    }
}
