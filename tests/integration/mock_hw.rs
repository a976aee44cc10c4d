//! Mock adapters for integration tests.
//!
//! Record every indicator and transport call so tests can assert on the
//! full history without touching real GPIO or a broker.

use std::collections::VecDeque;

use doorscale::app::commands::MethodResponse;
use doorscale::app::events::AppEvent;
use doorscale::app::ports::{
    CloudCallbacks, ConfirmationResult, EventSink, IndicatorPort, SensorPort, TelemetryTransport,
    TransportError, TwinUpdateKind,
};
use doorscale::sensors::SensorSnapshot;
use doorscale::sensors::kit::EnvironmentSnapshot;

// ── Hardware ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCall {
    Wifi(bool),
    Cloud(bool),
}

pub struct MockHardware {
    pub reading: SensorSnapshot,
    pub environment: Option<EnvironmentSnapshot>,
    pub polls: usize,
    pub environment_reads: usize,
    pub leds: Vec<LedCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            reading: SensorSnapshot::default(),
            environment: None,
            polls: 0,
            environment_reads: 0,
            leds: Vec::new(),
        }
    }

    pub fn with_reading(door_open: bool, weight: f32) -> Self {
        let mut hw = Self::new();
        hw.reading = SensorSnapshot {
            door_open,
            weight,
            light_raw: i32::from(door_open) * 800,
        };
        hw
    }

    pub fn wifi_led(&self) -> Option<bool> {
        self.leds.iter().rev().find_map(|c| match c {
            LedCall::Wifi(on) => Some(*on),
            LedCall::Cloud(_) => None,
        })
    }

    pub fn cloud_led(&self) -> Option<bool> {
        self.leds.iter().rev().find_map(|c| match c {
            LedCall::Cloud(on) => Some(*on),
            LedCall::Wifi(_) => None,
        })
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn poll(&mut self) -> SensorSnapshot {
        self.polls += 1;
        self.reading
    }

    fn read_environment(&mut self) -> Option<EnvironmentSnapshot> {
        self.environment_reads += 1;
        self.environment
    }
}

impl IndicatorPort for MockHardware {
    fn set_wifi_led(&mut self, on: bool) {
        self.leds.push(LedCall::Wifi(on));
    }

    fn set_cloud_led(&mut self, on: bool) {
        self.leds.push(LedCall::Cloud(on));
    }
}

// ── Transport ─────────────────────────────────────────────────

/// An inbound event delivered on the next keep-alive.
#[derive(Debug, Clone)]
pub enum Scripted {
    Method(&'static str, &'static [u8]),
    CloudMessage(&'static [u8]),
    Twin(TwinUpdateKind, &'static [u8]),
    Confirmation(ConfirmationResult),
}

#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Vec<String>,
    pub keep_alives: usize,
    pub refuse: bool,
    pub inbound: VecDeque<Scripted>,
    pub method_responses: Vec<MethodResponse>,
}

#[allow(dead_code)]
impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&mut self, event: Scripted) {
        self.inbound.push_back(event);
    }
}

impl TelemetryTransport for RecordingTransport {
    fn send_event(&mut self, payload: &str) -> Result<(), TransportError> {
        if self.refuse {
            return Err(TransportError::Rejected);
        }
        self.sent.push(payload.to_string());
        Ok(())
    }

    fn do_work(&mut self, callbacks: &mut dyn CloudCallbacks) {
        self.keep_alives += 1;
        while let Some(event) = self.inbound.pop_front() {
            match event {
                Scripted::Method(name, payload) => {
                    let response = callbacks.on_device_method(name, payload);
                    self.method_responses.push(response);
                }
                Scripted::CloudMessage(payload) => callbacks.on_cloud_message(payload),
                Scripted::Twin(kind, payload) => callbacks.on_twin_update(kind, payload),
                Scripted::Confirmation(result) => callbacks.on_send_confirmation(result),
            }
        }
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct CollectingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
