//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the
//! ESP-IDF logger (UART in production) as single-line tagged records.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Reading(r) => {
                info!(
                    "READ | Door Status: {} | Current Weight: {:.5} | light={}",
                    if r.door_open { "Open" } else { "Closed" },
                    r.weight,
                    r.light_raw,
                );
            }
            AppEvent::Telemetry(m) => {
                info!("TELEM | sent {}", m.to_payload());
            }
            AppEvent::TelemetryRejected(m) => {
                warn!("TELEM | rejected messageId={}", m.message_id);
            }
            AppEvent::Environment(env) => match serde_json::to_string(env) {
                Ok(json) => info!("ENV | {}", json),
                Err(e) => warn!("ENV | unserialisable snapshot: {}", e),
            },
            AppEvent::SendingChanged(enabled) => {
                info!("LINK | telemetry {}", if *enabled { "started" } else { "stopped" });
            }
            AppEvent::Started {
                has_wifi,
                has_iothub,
            } => {
                info!("START | wifi={} iothub={}", has_wifi, has_iothub);
            }
        }
    }
}
