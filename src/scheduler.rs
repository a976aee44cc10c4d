//! Telemetry scheduler.
//!
//! Once per loop iteration the scheduler either publishes a telemetry
//! message (enough time has passed and sending is enabled) or gives the
//! transport a keep-alive tick.  Inbound broker events are delivered
//! during that keep-alive tick and land on [`SchedulerState`], which is
//! the only mutable state in the telemetry path.
//!
//! ```text
//!            ┌─────────────┐ elapsed ≥ interval ┌──────────────┐
//!  tick() ──▶│ link up?    │───────────────────▶│ send_event() │
//!            │ enabled?    │                    └──────────────┘
//!            └──────┬──────┘
//!                   │ otherwise
//!                   ▼
//!            ┌──────────────┐  callbacks   ┌────────────────┐
//!            │  do_work()   │─────────────▶│ SchedulerState │
//!            └──────────────┘              └────────────────┘
//! ```

use log::{info, warn};

use crate::app::commands::{DeviceMethod, MethodResponse};
use crate::app::ports::{
    CloudCallbacks, ConfirmationResult, TelemetryTransport, TwinUpdateKind,
};
use crate::telemetry::TelemetryMessage;

/// Sequence number of the first message after boot.
pub const FIRST_MESSAGE_ID: u32 = 1;

// ═══════════════════════════════════════════════════════════════
//  State
// ═══════════════════════════════════════════════════════════════

/// Everything the telemetry path remembers between iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerState {
    /// Uptime (ms) of the last scheduling decision that sent.
    pub last_send_ms: u64,
    /// Toggled by the `start` / `stop` device methods.
    pub sending_enabled: bool,
    /// Sequence number the next message will carry.
    pub message_count: u32,
    /// Wi-Fi came up at startup.
    pub has_wifi: bool,
    /// IoT Hub client came up at startup.
    pub has_iothub: bool,
}

impl SchedulerState {
    pub fn new(now_ms: u64, has_wifi: bool, has_iothub: bool) -> Self {
        Self {
            last_send_ms: now_ms,
            sending_enabled: true,
            message_count: FIRST_MESSAGE_ID,
            has_wifi,
            has_iothub,
        }
    }

    pub fn link_up(&self) -> bool {
        self.has_wifi && self.has_iothub
    }

    /// Restarts at [`FIRST_MESSAGE_ID`] after `u32::MAX`.
    fn advance_sequence(&mut self) {
        self.message_count = match self.message_count {
            u32::MAX => FIRST_MESSAGE_ID,
            n => n + 1,
        };
    }
}

// ═══════════════════════════════════════════════════════════════
//  Inbound callbacks
// ═══════════════════════════════════════════════════════════════

impl CloudCallbacks for SchedulerState {
    fn on_send_confirmation(&mut self, result: ConfirmationResult) {
        if result == ConfirmationResult::Ok {
            info!("IoT Hub: send confirmed");
        }
    }

    fn on_cloud_message(&mut self, payload: &[u8]) {
        info!(
            "IoT Hub: cloud message received: {}",
            String::from_utf8_lossy(payload)
        );
    }

    fn on_twin_update(&mut self, kind: TwinUpdateKind, payload: &[u8]) {
        let text = String::from_utf8_lossy(payload);
        info!("IoT Hub: twin update ({:?}): {}", kind, text);
    }

    fn on_device_method(&mut self, method_name: &str, payload: &[u8]) -> MethodResponse {
        info!("IoT Hub: device method '{}' invoked", method_name);
        match DeviceMethod::parse(method_name) {
            DeviceMethod::Start => {
                info!("Telemetry: start sending");
                self.sending_enabled = true;
                MethodResponse::ok()
            }
            DeviceMethod::Stop => {
                info!("Telemetry: stop sending");
                self.sending_enabled = false;
                MethodResponse::ok()
            }
            DeviceMethod::Echo => {
                info!("Echo: {}", String::from_utf8_lossy(payload));
                MethodResponse::ok()
            }
            DeviceMethod::Unknown => {
                warn!("IoT Hub: no method '{}'", method_name);
                MethodResponse::not_found()
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

/// What one [`TelemetryScheduler::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Link never came up; the transport was not touched.
    Offline,
    /// Transport got a keep-alive tick.
    KeepAlive,
    /// A message was handed to the transport.
    Sent(TelemetryMessage),
    /// The transport refused the message.  Not retried.
    SendRejected(TelemetryMessage),
}

pub struct TelemetryScheduler {
    state: SchedulerState,
    interval_ms: u64,
}

impl TelemetryScheduler {
    pub fn new(state: SchedulerState, interval_ms: u32) -> Self {
        Self {
            state,
            interval_ms: u64::from(interval_ms),
        }
    }

    /// Run one scheduling decision at uptime `now_ms`.
    pub fn tick(
        &mut self,
        now_ms: u64,
        door_open: bool,
        weight: f32,
        transport: &mut impl TelemetryTransport,
    ) -> TickOutcome {
        if !self.state.link_up() {
            return TickOutcome::Offline;
        }

        let elapsed = now_ms.saturating_sub(self.state.last_send_ms);
        if !self.state.sending_enabled || elapsed < self.interval_ms {
            transport.do_work(&mut self.state);
            return TickOutcome::KeepAlive;
        }

        let message = TelemetryMessage::new(self.state.message_count, weight, door_open);
        let payload = message.to_payload();
        info!("Telemetry: sending {}", payload);
        let result = transport.send_event(&payload);

        self.state.advance_sequence();
        self.state.last_send_ms = now_ms;

        match result {
            Ok(()) => TickOutcome::Sent(message),
            Err(e) => {
                warn!("Telemetry: message {} not queued ({})", message.message_id, e);
                TickOutcome::SendRejected(message)
            }
        }
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    /// Direct access for callers that deliver callbacks themselves.
    pub fn state_mut(&mut self) -> &mut SchedulerState {
        &mut self.state
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::TransportError;

    /// Transport double that records calls.
    #[derive(Default)]
    struct RecordingTransport {
        sent: Vec<String>,
        keep_alives: usize,
        refuse: bool,
    }

    impl TelemetryTransport for RecordingTransport {
        fn send_event(&mut self, payload: &str) -> Result<(), TransportError> {
            self.sent.push(payload.to_string());
            if self.refuse {
                Err(TransportError::Rejected)
            } else {
                Ok(())
            }
        }

        fn do_work(&mut self, _callbacks: &mut dyn CloudCallbacks) {
            self.keep_alives += 1;
        }
    }

    fn online(now: u64) -> TelemetryScheduler {
        TelemetryScheduler::new(SchedulerState::new(now, true, true), 10_000)
    }

    #[test]
    fn sends_once_interval_elapsed() {
        let mut sched = online(0);
        let mut t = RecordingTransport::default();

        let out = sched.tick(10_000, true, 1.5, &mut t);
        assert!(matches!(out, TickOutcome::Sent(m) if m.message_id == 1));
        assert_eq!(t.sent.len(), 1);
        assert_eq!(t.keep_alives, 0);
        assert_eq!(sched.state().message_count, 2);
        assert_eq!(sched.state().last_send_ms, 10_000);
    }

    #[test]
    fn keep_alive_before_interval() {
        let mut sched = online(0);
        let mut t = RecordingTransport::default();

        let out = sched.tick(9_999, true, 1.5, &mut t);
        assert_eq!(out, TickOutcome::KeepAlive);
        assert!(t.sent.is_empty());
        assert_eq!(t.keep_alives, 1);
        assert_eq!(sched.state().message_count, 1);
        assert_eq!(sched.state().last_send_ms, 0);
    }

    #[test]
    fn disabled_only_keeps_alive() {
        let mut sched = online(0);
        sched.state_mut().sending_enabled = false;
        let mut t = RecordingTransport::default();

        assert_eq!(sched.tick(60_000, false, 0.0, &mut t), TickOutcome::KeepAlive);
        assert!(t.sent.is_empty());
        assert_eq!(t.keep_alives, 1);
    }

    #[test]
    fn offline_never_touches_transport() {
        let mut sched = TelemetryScheduler::new(SchedulerState::new(0, true, false), 10_000);
        let mut t = RecordingTransport::default();

        for now in [0, 10_000, 20_000] {
            assert_eq!(sched.tick(now, true, 1.0, &mut t), TickOutcome::Offline);
        }
        assert!(t.sent.is_empty());
        assert_eq!(t.keep_alives, 0);
    }

    #[test]
    fn rejected_send_still_advances() {
        let mut sched = online(0);
        let mut t = RecordingTransport {
            refuse: true,
            ..Default::default()
        };

        let out = sched.tick(10_000, false, 2.0, &mut t);
        assert!(matches!(out, TickOutcome::SendRejected(m) if m.message_id == 1));
        assert_eq!(sched.state().message_count, 2);
        assert_eq!(sched.state().last_send_ms, 10_000);
    }

    #[test]
    fn clock_going_backwards_does_not_send() {
        let mut sched = online(50_000);
        let mut t = RecordingTransport::default();
        assert_eq!(sched.tick(1_000, true, 0.0, &mut t), TickOutcome::KeepAlive);
    }

    #[test]
    fn sequence_restarts_after_max() {
        let mut state = SchedulerState::new(0, true, true);
        state.message_count = u32::MAX;
        state.advance_sequence();
        assert_eq!(state.message_count, FIRST_MESSAGE_ID);
    }

    #[test]
    fn stop_and_start_toggle_sending() {
        let mut state = SchedulerState::new(0, true, true);
        assert_eq!(state.on_device_method("stop", b""), MethodResponse::ok());
        assert!(!state.sending_enabled);
        assert_eq!(state.on_device_method("start", b""), MethodResponse::ok());
        assert!(state.sending_enabled);
    }

    #[test]
    fn unknown_method_leaves_state_alone() {
        let mut state = SchedulerState::new(0, true, true);
        state.sending_enabled = false;
        let before = state;
        assert_eq!(state.on_device_method("reboot", b"{}"), MethodResponse::not_found());
        assert_eq!(state, before);
    }

    #[test]
    fn echo_does_not_change_state() {
        let mut state = SchedulerState::new(0, true, true);
        let before = state;
        assert_eq!(state.on_device_method("echo", b"hello"), MethodResponse::ok());
        assert_eq!(state, before);
    }
}
