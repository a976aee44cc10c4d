//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, indicator LEDs, the broker transport, event
//! sinks) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware or the network directly.

use crate::sensors::SensorSnapshot;
use crate::sensors::kit::EnvironmentSnapshot;

use super::commands::MethodResponse;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per loop iteration.
pub trait SensorPort {
    /// Read the door light level and the averaged load-cell weight.
    fn poll(&mut self) -> SensorSnapshot;

    /// Read the optional environmental board.  `None` when no board is
    /// fitted or it is disabled in config.
    fn read_environment(&mut self) -> Option<EnvironmentSnapshot>;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LEDs)
// ───────────────────────────────────────────────────────────────

pub trait IndicatorPort {
    fn set_wifi_led(&mut self, on: bool);
    fn set_cloud_led(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Telemetry transport (driven adapter: domain ↔ IoT Hub)
// ───────────────────────────────────────────────────────────────

/// Errors from [`TelemetryTransport::send_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The client is not connected to the broker.
    NotConnected,
    /// The client refused to queue the message.
    Rejected,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::Rejected => write!(f, "message rejected"),
        }
    }
}

/// The managed messaging client, seen from the scheduler.
///
/// Both calls may block; callers assume they return promptly.
pub trait TelemetryTransport {
    /// Queue one device-to-cloud telemetry payload.  Delivery is
    /// confirmed later through [`CloudCallbacks::on_send_confirmation`].
    fn send_event(&mut self, payload: &str) -> Result<(), TransportError>;

    /// Keep-alive tick.  Services the connection and invokes `callbacks`
    /// synchronously, on the caller's thread, for every inbound event
    /// that arrived since the previous call.
    fn do_work(&mut self, callbacks: &mut dyn CloudCallbacks);
}

/// Stand-in when the IoT Hub client never came up.  The scheduler does
/// not call it while the link is down.
pub struct OfflineTransport;

impl TelemetryTransport for OfflineTransport {
    fn send_event(&mut self, _payload: &str) -> Result<(), TransportError> {
        Err(TransportError::NotConnected)
    }

    fn do_work(&mut self, _callbacks: &mut dyn CloudCallbacks) {}
}

// ───────────────────────────────────────────────────────────────
// Cloud callbacks (capability injected into the transport)
// ───────────────────────────────────────────────────────────────

/// Outcome of a device-to-cloud send, reported asynchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationResult {
    Ok,
    /// The client was torn down before the message was acknowledged.
    Destroyed,
    Timeout,
    Error,
}

/// Which kind of twin document arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwinUpdateKind {
    /// Full twin, in answer to a GET.
    Complete,
    /// Desired-properties patch pushed by the service.
    Partial,
}

/// One method per inbound event kind.  The transport calls these from
/// inside [`TelemetryTransport::do_work`].
pub trait CloudCallbacks {
    fn on_send_confirmation(&mut self, result: ConfirmationResult);

    fn on_cloud_message(&mut self, payload: &[u8]);

    fn on_twin_update(&mut self, kind: TwinUpdateKind, payload: &[u8]);

    fn on_device_method(&mut self, method_name: &str, payload: &[u8]) -> MethodResponse;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
