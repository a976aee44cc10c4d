//! End-to-end device-method flow through the IoT Hub client's simulated
//! broker: an inbound method publish, dispatched during the keep-alive,
//! answered on the response topic, and the scheduler state updated.

use doorscale::adapters::iothub_mqtt::{InboundEvent, IotHubClient};
use doorscale::iothub::ConnectionString;
use doorscale::scheduler::{SchedulerState, TelemetryScheduler, TickOutcome};

const CONN: &str =
    "HostName=doorhub.azure-devices.net;DeviceId=door-01;SharedAccessKey=c2VjcmV0a2V5MTIzNA==";

fn connected_client() -> IotHubClient {
    let conn = ConnectionString::parse(CONN).unwrap();
    let mut client = IotHubClient::connect(&conn, 3_600).unwrap();
    client.sim_push_inbound(InboundEvent::Connected);
    client
}

fn method(name: &str, rid: &str, body: &[u8]) -> InboundEvent {
    InboundEvent::Received {
        topic: format!("$iothub/methods/POST/{}/?$rid={}", name, rid),
        data: body.to_vec(),
    }
}

#[test]
fn stop_method_is_answered_and_disables_sending() {
    let mut client = connected_client();
    let mut sched = TelemetryScheduler::new(SchedulerState::new(0, true, true), 10_000);

    client.sim_push_inbound(method("stop", "11", b"null"));
    assert_eq!(sched.tick(500, true, 1.0, &mut client), TickOutcome::KeepAlive);

    assert!(!sched.state().sending_enabled);
    let (topic, body) = client.sim().published.last().unwrap().clone();
    assert_eq!(topic, "$iothub/methods/res/200/?$rid=11");
    assert_eq!(body, b"\"Successfully invoke device method\"".to_vec());

    // past the interval, still only keep-alive
    assert_eq!(sched.tick(20_000, true, 1.0, &mut client), TickOutcome::KeepAlive);
    assert!(
        !client
            .sim()
            .published
            .iter()
            .any(|(t, _)| t == "devices/door-01/messages/events/")
    );
}

#[test]
fn unknown_method_gets_404_on_response_topic() {
    let mut client = connected_client();
    let mut sched = TelemetryScheduler::new(SchedulerState::new(0, true, true), 10_000);

    client.sim_push_inbound(method("reboot", "ff", b"{}"));
    sched.tick(500, true, 1.0, &mut client);

    let (topic, body) = client.sim().published.last().unwrap().clone();
    assert_eq!(topic, "$iothub/methods/res/404/?$rid=ff");
    assert_eq!(body, b"\"No method found\"".to_vec());
    assert!(sched.state().sending_enabled);
}

#[test]
fn telemetry_reaches_events_topic() {
    let mut client = connected_client();
    let mut sched = TelemetryScheduler::new(SchedulerState::new(0, true, true), 10_000);

    // first tick services the connection (subscriptions + twin GET)
    sched.tick(1_000, false, 0.0, &mut client);
    assert_eq!(client.sim().subscriptions.len(), 4);

    let out = sched.tick(10_000, true, 3.25, &mut client);
    assert!(matches!(out, TickOutcome::Sent(_)));
    let (topic, body) = client.sim().published.last().unwrap().clone();
    assert_eq!(topic, "devices/door-01/messages/events/");
    assert_eq!(
        String::from_utf8(body).unwrap(),
        r#"{"messageId":1, "Weight":3.250000, "OpenStatus:":1}"#
    );
}

#[test]
fn broker_refusal_is_reported_as_rejected() {
    let mut client = connected_client();
    let mut sched = TelemetryScheduler::new(SchedulerState::new(0, true, true), 10_000);
    client.sim().reject_publish = true;

    let out = sched.tick(10_000, false, 0.0, &mut client);
    assert!(matches!(out, TickOutcome::SendRejected(m) if m.message_id == 1));
    assert_eq!(sched.state().message_count, 2);
}
