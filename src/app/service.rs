//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the telemetry scheduler and the loop-level
//! configuration.  It exposes a hardware-agnostic API.  All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────┐ ──▶ EventSink
//!                  │      AppService      │
//! IndicatorPort ◀──│  TelemetryScheduler  │◀──▶ TelemetryTransport
//!                  └──────────────────────┘
//! ```

use log::info;

use crate::config::SystemConfig;
use crate::scheduler::{SchedulerState, TelemetryScheduler, TickOutcome};

use super::events::AppEvent;
use super::ports::{EventSink, IndicatorPort, SensorPort, TelemetryTransport};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    scheduler: TelemetryScheduler,
    kit_board_enabled: bool,
    iterations: u64,
    /// Last `sending_enabled` seen, for change events.
    last_sending: bool,
}

impl AppService {
    /// Construct the service from configuration and the startup link
    /// state captured in `state`.
    pub fn new(config: &SystemConfig, state: SchedulerState) -> Self {
        Self {
            scheduler: TelemetryScheduler::new(state, config.send_interval_ms),
            kit_board_enabled: config.kit_board_enabled,
            iterations: 0,
            last_sending: state.sending_enabled,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        let state = self.scheduler.state();
        sink.emit(&AppEvent::Started {
            has_wifi: state.has_wifi,
            has_iothub: state.has_iothub,
        });
        info!(
            "AppService started (interval {} ms, kit board {})",
            self.scheduler.interval_ms(),
            if self.kit_board_enabled { "on" } else { "off" }
        );
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one loop iteration: sensors → scheduler → events → LEDs.
    ///
    /// `hw` satisfies both [`SensorPort`] and [`IndicatorPort`], avoiding
    /// a double mutable borrow while keeping the port boundary explicit.
    pub fn run_iteration(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + IndicatorPort),
        transport: &mut impl TelemetryTransport,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        self.iterations += 1;

        // 1. Sensors
        let reading = hw.poll();
        sink.emit(&AppEvent::Reading(reading));

        // 2. Scheduler (send or keep-alive, which delivers callbacks)
        let outcome = self
            .scheduler
            .tick(now_ms, reading.door_open, reading.weight, transport);

        // 3. Outbound events
        match outcome {
            TickOutcome::Sent(message) => {
                sink.emit(&AppEvent::Telemetry(message));
                if self.kit_board_enabled {
                    if let Some(env) = hw.read_environment() {
                        sink.emit(&AppEvent::Environment(env));
                    }
                }
            }
            TickOutcome::SendRejected(message) => {
                sink.emit(&AppEvent::TelemetryRejected(message));
            }
            TickOutcome::Offline | TickOutcome::KeepAlive => {}
        }

        let state = *self.scheduler.state();
        if state.sending_enabled != self.last_sending {
            self.last_sending = state.sending_enabled;
            sink.emit(&AppEvent::SendingChanged(state.sending_enabled));
        }

        // 4. Indicators
        hw.set_wifi_led(state.has_wifi);
        hw.set_cloud_led(state.has_iothub && state.sending_enabled);

        outcome
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn scheduler_state(&self) -> &SchedulerState {
        self.scheduler.state()
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}
