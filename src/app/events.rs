//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; in production they go to the serial
//! console.

use crate::sensors::SensorSnapshot;
use crate::sensors::kit::EnvironmentSnapshot;
use crate::telemetry::TelemetryMessage;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries the startup link state).
    Started { has_wifi: bool, has_iothub: bool },

    /// Sensors were polled this iteration.
    Reading(SensorSnapshot),

    /// A telemetry message was handed to the transport.
    Telemetry(TelemetryMessage),

    /// The transport refused a telemetry message.
    TelemetryRejected(TelemetryMessage),

    /// Environmental board snapshot, taken alongside a telemetry send.
    Environment(EnvironmentSnapshot),

    /// Telemetry was switched on or off by a device method.
    SendingChanged(bool),
}
