//! Integration tests for the AppService → scheduler → indicators pipeline.

use doorscale::app::events::AppEvent;
use doorscale::app::service::AppService;
use doorscale::config::SystemConfig;
use doorscale::scheduler::{SchedulerState, TickOutcome};
use doorscale::sensors::kit::EnvironmentSnapshot;

use crate::mock_hw::{CollectingSink, MockHardware, RecordingTransport, Scripted};

fn make_app(config: &SystemConfig, has_wifi: bool, has_iothub: bool) -> (AppService, CollectingSink) {
    let mut app = AppService::new(config, SchedulerState::new(0, has_wifi, has_iothub));
    let mut sink = CollectingSink::new();
    app.start(&mut sink);
    (app, sink)
}

#[test]
fn start_reports_link_state() {
    let (_, sink) = make_app(&SystemConfig::default(), true, false);
    assert_eq!(
        sink.events,
        vec![AppEvent::Started {
            has_wifi: true,
            has_iothub: false
        }]
    );
}

#[test]
fn every_iteration_polls_and_logs_reading() {
    let (mut app, mut sink) = make_app(&SystemConfig::default(), true, true);
    let mut hw = MockHardware::with_reading(true, 4.5);
    let mut t = RecordingTransport::new();

    for i in 1..=3 {
        app.run_iteration(i * 1_000, &mut hw, &mut t, &mut sink);
    }
    assert_eq!(hw.polls, 3);
    assert_eq!(app.iterations(), 3);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Reading(_))), 3);
}

#[test]
fn telemetry_event_follows_send() {
    let (mut app, mut sink) = make_app(&SystemConfig::default(), true, true);
    let mut hw = MockHardware::with_reading(false, 7.0);
    let mut t = RecordingTransport::new();

    let out = app.run_iteration(10_000, &mut hw, &mut t, &mut sink);
    let TickOutcome::Sent(message) = out else {
        panic!("expected a send, got {:?}", out);
    };
    assert!(sink.events.contains(&AppEvent::Telemetry(message)));
    assert_eq!(hw.environment_reads, 0, "kit board disabled by default");
}

#[test]
fn environment_read_only_with_kit_enabled_and_on_send() {
    let config = SystemConfig {
        kit_board_enabled: true,
        ..SystemConfig::default()
    };
    let (mut app, mut sink) = make_app(&config, true, true);
    let mut hw = MockHardware::with_reading(false, 0.0);
    hw.environment = Some(EnvironmentSnapshot {
        ambient_light_lux: 120.0,
        accel_z: 9,
        ..EnvironmentSnapshot::default()
    });
    let mut t = RecordingTransport::new();

    app.run_iteration(1_000, &mut hw, &mut t, &mut sink);
    assert_eq!(hw.environment_reads, 0);

    app.run_iteration(10_000, &mut hw, &mut t, &mut sink);
    assert_eq!(hw.environment_reads, 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Environment(_))), 1);
}

#[test]
fn leds_track_link_and_sending() {
    let (mut app, mut sink) = make_app(&SystemConfig::default(), true, true);
    let mut hw = MockHardware::new();
    let mut t = RecordingTransport::new();

    app.run_iteration(1_000, &mut hw, &mut t, &mut sink);
    assert_eq!(hw.wifi_led(), Some(true));
    assert_eq!(hw.cloud_led(), Some(true));

    t.script(Scripted::Method("stop", b""));
    app.run_iteration(2_000, &mut hw, &mut t, &mut sink);
    assert_eq!(hw.cloud_led(), Some(false));
    assert!(sink.events.contains(&AppEvent::SendingChanged(false)));

    t.script(Scripted::Method("start", b""));
    app.run_iteration(3_000, &mut hw, &mut t, &mut sink);
    assert_eq!(hw.cloud_led(), Some(true));
    assert!(sink.events.contains(&AppEvent::SendingChanged(true)));
}

#[test]
fn offline_device_keeps_polling_but_never_sends() {
    let (mut app, mut sink) = make_app(&SystemConfig::default(), false, false);
    let mut hw = MockHardware::with_reading(true, 1.0);
    let mut t = RecordingTransport::new();

    for now in (1_000..=30_000).step_by(1_000) {
        assert_eq!(
            app.run_iteration(now, &mut hw, &mut t, &mut sink),
            TickOutcome::Offline
        );
    }
    assert_eq!(hw.polls, 30);
    assert!(t.sent.is_empty());
    assert_eq!(t.keep_alives, 0);
    assert_eq!(hw.wifi_led(), Some(false));
    assert_eq!(hw.cloud_led(), Some(false));
}

#[test]
fn rejected_send_is_surfaced() {
    let (mut app, mut sink) = make_app(&SystemConfig::default(), true, true);
    let mut hw = MockHardware::new();
    let mut t = RecordingTransport {
        refuse: true,
        ..RecordingTransport::default()
    };

    app.run_iteration(10_000, &mut hw, &mut t, &mut sink);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::TelemetryRejected(_))), 1);
    assert_eq!(app.scheduler_state().message_count, 2);
}
