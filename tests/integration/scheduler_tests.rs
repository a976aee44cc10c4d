//! Scheduler behaviour driven through the transport's keep-alive path:
//! inbound methods arrive only during `do_work`, exactly as on the device.

use doorscale::app::commands::MethodResponse;
use doorscale::app::ports::{ConfirmationResult, TwinUpdateKind};
use doorscale::scheduler::{SchedulerState, TelemetryScheduler, TickOutcome};

use crate::mock_hw::{RecordingTransport, Scripted};

const INTERVAL: u32 = 10_000;

fn online_at(now: u64) -> TelemetryScheduler {
    TelemetryScheduler::new(SchedulerState::new(now, true, true), INTERVAL)
}

#[test]
fn send_updates_sequence_and_timestamp() {
    let mut sched = online_at(0);
    let mut t = RecordingTransport::new();

    let out = sched.tick(12_000, true, 12.345, &mut t);

    assert!(matches!(out, TickOutcome::Sent(m) if m.message_id == 1));
    assert_eq!(
        t.sent,
        vec![r#"{"messageId":1, "Weight":12.345000, "OpenStatus:":1}"#.to_string()]
    );
    assert_eq!(sched.state().message_count, 2);
    assert_eq!(sched.state().last_send_ms, 12_000);
    assert_eq!(t.keep_alives, 0);
}

#[test]
fn keep_alive_leaves_counters_alone() {
    let mut sched = online_at(5_000);
    let mut t = RecordingTransport::new();

    for now in [5_000, 7_000, 14_999] {
        assert_eq!(sched.tick(now, false, 1.0, &mut t), TickOutcome::KeepAlive);
    }
    assert!(t.sent.is_empty());
    assert_eq!(t.keep_alives, 3);
    assert_eq!(sched.state().message_count, 1);
    assert_eq!(sched.state().last_send_ms, 5_000);
}

#[test]
fn stop_then_start_via_keep_alive() {
    let mut sched = online_at(0);
    let mut t = RecordingTransport::new();

    // "stop" arrives on a keep-alive tick
    t.script(Scripted::Method("stop", b""));
    assert_eq!(sched.tick(1_000, true, 0.0, &mut t), TickOutcome::KeepAlive);
    assert!(!sched.state().sending_enabled);

    // interval long past, but sending is off
    assert_eq!(sched.tick(30_000, true, 0.0, &mut t), TickOutcome::KeepAlive);
    assert!(t.sent.is_empty());

    // "start" restores sending on the next qualifying tick
    t.script(Scripted::Method("start", b""));
    assert_eq!(sched.tick(31_000, true, 0.0, &mut t), TickOutcome::KeepAlive);
    assert!(sched.state().sending_enabled);
    assert!(matches!(
        sched.tick(32_000, true, 0.0, &mut t),
        TickOutcome::Sent(_)
    ));
    assert_eq!(t.sent.len(), 1);
    assert_eq!(
        t.method_responses,
        vec![MethodResponse::ok(), MethodResponse::ok()]
    );
}

#[test]
fn unknown_method_answers_404() {
    let mut sched = online_at(0);
    let mut t = RecordingTransport::new();

    t.script(Scripted::Method("Stop", b"")); // case-sensitive
    sched.tick(1_000, true, 0.0, &mut t);

    assert_eq!(t.method_responses, vec![MethodResponse::not_found()]);
    assert_eq!(t.method_responses[0].status, 404);
    assert_eq!(t.method_responses[0].body, "\"No method found\"");
    assert!(sched.state().sending_enabled);
}

#[test]
fn passive_callbacks_do_not_change_state() {
    let mut sched = online_at(0);
    let mut t = RecordingTransport::new();
    let before = *sched.state();

    t.script(Scripted::Confirmation(ConfirmationResult::Ok));
    t.script(Scripted::Confirmation(ConfirmationResult::Timeout));
    t.script(Scripted::CloudMessage(b"hello device"));
    t.script(Scripted::Twin(TwinUpdateKind::Complete, b"{\"desired\":{}}"));
    t.script(Scripted::Twin(TwinUpdateKind::Partial, &[0xff, 0xfe]));
    sched.tick(1_000, true, 0.0, &mut t);

    assert_eq!(*sched.state(), before);
    assert!(t.inbound.is_empty());
}

#[test]
fn sends_are_spaced_by_interval() {
    let mut sched = online_at(0);
    let mut t = RecordingTransport::new();

    // one iteration per second for a minute
    for now in (1_000..=60_000).step_by(1_000) {
        sched.tick(now, false, 0.0, &mut t);
    }
    assert_eq!(t.sent.len(), 6);
    assert!(t.sent[5].starts_with(r#"{"messageId":6,"#));
}
