//! Telemetry message and its wire payload.
//!
//! The payload is rendered field by field rather than through serde so
//! that the key names stay byte-identical to what the dashboards already
//! ingest, including the stray colon in `"OpenStatus:"`.

use core::fmt::Write;

/// Upper bound on a rendered payload.  The longest `f32` rendered with
/// six decimals is 47 characters, so this always fits.
pub const PAYLOAD_CAPACITY: usize = 128;

/// Rendered telemetry payload.
pub type Payload = heapless::String<PAYLOAD_CAPACITY>;

/// One telemetry message, built and discarded within a single loop
/// iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryMessage {
    pub message_id: u32,
    pub weight: f32,
    pub door_open: bool,
}

impl TelemetryMessage {
    pub fn new(message_id: u32, weight: f32, door_open: bool) -> Self {
        Self {
            message_id,
            weight,
            door_open,
        }
    }

    /// `{"messageId":<id>, "Weight":<weight %.6>, "OpenStatus:":<0|1>}`
    pub fn to_payload(&self) -> Payload {
        let mut out = Payload::new();
        // Cannot overflow: see PAYLOAD_CAPACITY.
        let _ = write!(
            out,
            "{{\"messageId\":{}, \"Weight\":{:.6}, \"OpenStatus:\":{}}}",
            self.message_id,
            self.weight,
            u8::from(self.door_open),
        );
        out
    }
}
