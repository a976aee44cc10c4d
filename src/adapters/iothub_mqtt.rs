//! IoT Hub MQTT adapter.
//!
//! Implements [`TelemetryTransport`] on top of the ESP-IDF MQTT client.
//!
//! ```text
//!  ┌───────────────┐ InboundEvent ┌──────────────┐  do_work()   ┌────────────────┐
//!  │  mqtt-rx      │─────────────▶│ INBOUND      │─────────────▶│ CloudCallbacks │
//!  │  (thread)     │  try_send    │ (depth 8)    │  try_receive │ (control loop) │
//!  └───────────────┘              └──────────────┘              └────────────────┘
//! ```
//!
//! The connection thread only forwards; every callback runs on the
//! control-loop thread inside [`TelemetryTransport::do_work`].
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspMqttClient` over TLS, CA bundle from
//!   ESP-IDF, SAS token as password, token re-issued before expiry.
//! - **all other targets**: an in-memory broker.  Tests inject inbound
//!   events and inspect what was published or subscribed.

use log::{info, warn};

use crate::app::ports::{
    CloudCallbacks, ConfirmationResult, TelemetryTransport, TransportError, TwinUpdateKind,
};
use crate::error::CommsError;
use crate::iothub::ConnectionString;
use crate::iothub::topics::{self, InboundTopic};

/// Telemetry messages awaiting PUBACK.  Older ids are forgotten.
const MAX_OUTSTANDING: usize = 16;

// ───────────────────────────────────────────────────────────────
// Inbound events
// ───────────────────────────────────────────────────────────────

/// Broker event, owned so it can cross threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Connected,
    Disconnected,
    /// PUBACK for the given packet id.
    Published(u32),
    /// Packet id dropped from the client outbox without an ack.
    Expired(u32),
    Received { topic: String, data: Vec<u8> },
    Error,
}

#[cfg(target_os = "espidf")]
mod channel {
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_sync::channel::Channel;

    use super::InboundEvent;

    /// Depth of the connection-thread → control-loop queue.
    pub const INBOUND_DEPTH: usize = 8;

    pub static INBOUND: Channel<CriticalSectionRawMutex, InboundEvent, INBOUND_DEPTH> =
        Channel::new();
}

// ───────────────────────────────────────────────────────────────
// Client
// ───────────────────────────────────────────────────────────────

pub struct IotHubClient {
    device_id: String,
    telemetry_topic: String,
    connected: bool,
    next_twin_rid: u32,
    outstanding: heapless::Vec<u32, MAX_OUTSTANDING>,
    #[cfg(target_os = "espidf")]
    esp: esp::EspLink,
    #[cfg(not(target_os = "espidf"))]
    sim: SimBroker,
}

impl IotHubClient {
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn on_connected(&mut self) {
        info!("IoT Hub: connected as '{}'", self.device_id);
        self.connected = true;

        let c2d = topics::cloud_to_device_subscribe(&self.device_id);
        for topic in [
            topics::METHODS_SUBSCRIBE,
            topics::TWIN_RESPONSE_SUBSCRIBE,
            topics::TWIN_DESIRED_SUBSCRIBE,
            c2d.as_str(),
        ] {
            if let Err(e) = self.platform_subscribe(topic) {
                warn!("IoT Hub: subscribe to '{}' failed ({})", topic, e);
            }
        }

        let rid = self.next_twin_rid;
        self.next_twin_rid = self.next_twin_rid.wrapping_add(1);
        if let Err(e) = self.platform_publish(&topics::twin_get(rid), b"") {
            warn!("IoT Hub: twin request failed ({})", e);
        }
    }

    fn confirm(&mut self, packet_id: u32, result: ConfirmationResult, callbacks: &mut dyn CloudCallbacks) {
        let Some(pos) = self.outstanding.iter().position(|&id| id == packet_id) else {
            return;
        };
        self.outstanding.remove(pos);
        callbacks.on_send_confirmation(result);
    }

    fn dispatch(&mut self, event: InboundEvent, callbacks: &mut dyn CloudCallbacks) {
        match event {
            InboundEvent::Connected => self.on_connected(),
            InboundEvent::Disconnected => {
                warn!("IoT Hub: disconnected");
                self.connected = false;
            }
            InboundEvent::Published(id) => self.confirm(id, ConfirmationResult::Ok, callbacks),
            InboundEvent::Expired(id) => self.confirm(id, ConfirmationResult::Timeout, callbacks),
            InboundEvent::Error => warn!("IoT Hub: MQTT error reported"),
            InboundEvent::Received { topic, data } => {
                match topics::classify(&topic, &self.device_id) {
                    InboundTopic::DeviceMethod { name, rid } => {
                        let response = callbacks.on_device_method(name, &data);
                        let reply = topics::method_response(response.status, rid);
                        if let Err(e) = self.platform_publish(&reply, response.body.as_bytes()) {
                            warn!("IoT Hub: method response for '{}' failed ({})", name, e);
                        }
                    }
                    InboundTopic::TwinResponse { status: 200, .. } => {
                        callbacks.on_twin_update(TwinUpdateKind::Complete, &data);
                    }
                    InboundTopic::TwinResponse { status, rid } => {
                        // 204 answers a reported-properties patch
                        if status != 204 {
                            warn!("IoT Hub: twin request {} returned {}", rid, status);
                        }
                    }
                    InboundTopic::TwinDesiredPatch => {
                        callbacks.on_twin_update(TwinUpdateKind::Partial, &data);
                    }
                    InboundTopic::CloudToDevice => callbacks.on_cloud_message(&data),
                    InboundTopic::Unknown => warn!("IoT Hub: unhandled topic '{}'", topic),
                }
            }
        }
    }
}

impl TelemetryTransport for IotHubClient {
    fn send_event(&mut self, payload: &str) -> Result<(), TransportError> {
        let topic = self.telemetry_topic.clone();
        let id = self.platform_publish(&topic, payload.as_bytes())?;
        if self.outstanding.is_full() {
            self.outstanding.remove(0);
        }
        let _ = self.outstanding.push(id);
        Ok(())
    }

    fn do_work(&mut self, callbacks: &mut dyn CloudCallbacks) {
        self.platform_maintain();
        while let Some(event) = self.next_inbound() {
            self.dispatch(event, callbacks);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp {
    use core::time::Duration;

    use esp_idf_svc::mqtt::client::{
        Details, EspMqttClient, EventPayload, MqttClientConfiguration, MqttProtocolVersion, QoS,
    };
    use log::{info, warn};

    use super::channel::INBOUND;
    use super::InboundEvent;
    use crate::adapters::time::Esp32TimeAdapter;
    use crate::error::CommsError;
    use crate::iothub::{ConnectionString, sas, topics};

    const KEEP_ALIVE: Duration = Duration::from_secs(240);
    const RX_STACK_SIZE: usize = 6 * 1024;
    /// Re-issue the token this long before it expires.
    const RENEW_MARGIN_SECS: u64 = 300;

    /// Owned copy of the credentials, kept for token renewal.
    pub struct EspLink {
        pub client: EspMqttClient<'static>,
        host_name: String,
        device_id: String,
        shared_access_key: String,
        token_ttl_secs: u32,
        token_expiry: u64,
        clock: Esp32TimeAdapter,
    }

    impl EspLink {
        pub fn open(conn: &ConnectionString<'_>, token_ttl_secs: u32) -> Result<Self, CommsError> {
            let clock = Esp32TimeAdapter::new();
            let (client, token_expiry) = start_client(conn, token_ttl_secs, &clock)?;
            Ok(Self {
                client,
                host_name: conn.host_name.into(),
                device_id: conn.device_id.into(),
                shared_access_key: conn.shared_access_key.into(),
                token_ttl_secs,
                token_expiry,
                clock,
            })
        }

        /// Reconnect with a fresh token once the current one is close to
        /// expiry.  The hub drops the session when it lapses.
        pub fn renew_if_due(&mut self) {
            let Some(now) = self.clock.unix_time_secs() else {
                return;
            };
            if now + RENEW_MARGIN_SECS < self.token_expiry {
                return;
            }
            info!("IoT Hub: renewing SAS token");
            let conn = ConnectionString {
                host_name: &self.host_name,
                device_id: &self.device_id,
                shared_access_key: &self.shared_access_key,
            };
            match start_client(&conn, self.token_ttl_secs, &self.clock) {
                Ok((client, expiry)) => {
                    self.client = client;
                    self.token_expiry = expiry;
                }
                Err(e) => warn!("IoT Hub: token renewal failed ({}), keeping old session", e),
            }
        }

        pub fn publish(&mut self, topic: &str, payload: &[u8]) -> Option<u32> {
            match self.client.enqueue(topic, QoS::AtLeastOnce, false, payload) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!("IoT Hub: enqueue on '{}' failed: {}", topic, e);
                    None
                }
            }
        }

        pub fn subscribe(&mut self, topic: &str) -> bool {
            self.client.subscribe(topic, QoS::AtLeastOnce).is_ok()
        }
    }

    fn start_client(
        conn: &ConnectionString<'_>,
        token_ttl_secs: u32,
        clock: &Esp32TimeAdapter,
    ) -> Result<(EspMqttClient<'static>, u64), CommsError> {
        let expiry = clock.expiry_after(token_ttl_secs)?;
        let token = sas::generate_sas_token(conn, expiry)?;
        let url = topics::broker_url(conn.host_name);
        let username = topics::username(conn.host_name, conn.device_id);

        let conf = MqttClientConfiguration {
            client_id: Some(conn.device_id),
            username: Some(&username),
            password: Some(&token),
            protocol_version: Some(MqttProtocolVersion::V3_1_1),
            keep_alive_interval: Some(KEEP_ALIVE),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };

        let (client, mut connection) = EspMqttClient::new(&url, &conf).map_err(|e| {
            warn!("IoT Hub: MQTT client creation failed: {}", e);
            CommsError::MqttConnectFailed
        })?;

        std::thread::Builder::new()
            .name("mqtt-rx".into())
            .stack_size(RX_STACK_SIZE)
            .spawn(move || {
                while let Ok(event) = connection.next() {
                    if let Some(inbound) = to_inbound(event.payload()) {
                        if INBOUND.try_send(inbound).is_err() {
                            warn!("IoT Hub: inbound queue full, event dropped");
                        }
                    }
                }
                info!("IoT Hub: connection closed");
            })
            .map_err(|_| CommsError::MqttConnectFailed)?;

        info!("IoT Hub: client started for {}", url);
        Ok((client, expiry))
    }

    fn to_inbound(payload: EventPayload<'_, esp_idf_svc::sys::EspError>) -> Option<InboundEvent> {
        match payload {
            EventPayload::Connected(_) => Some(InboundEvent::Connected),
            EventPayload::Disconnected => Some(InboundEvent::Disconnected),
            EventPayload::Published(id) => Some(InboundEvent::Published(id)),
            EventPayload::Deleted(id) => Some(InboundEvent::Expired(id)),
            EventPayload::Received {
                topic,
                data,
                details: Details::Complete,
                ..
            } => Some(InboundEvent::Received {
                topic: topic.unwrap_or_default().into(),
                data: data.to_vec(),
            }),
            EventPayload::Received { topic, .. } => {
                warn!("IoT Hub: chunked message on {:?} ignored", topic);
                None
            }
            EventPayload::Error(e) => {
                warn!("IoT Hub: {:?}", e);
                Some(InboundEvent::Error)
            }
            _ => None,
        }
    }
}

#[cfg(target_os = "espidf")]
impl IotHubClient {
    /// Start the MQTT client.  Returns before the broker has accepted the
    /// session; [`is_connected`](Self::is_connected) flips once it has.
    pub fn connect(conn: &ConnectionString<'_>, token_ttl_secs: u32) -> Result<Self, CommsError> {
        let esp = esp::EspLink::open(conn, token_ttl_secs)?;
        Ok(Self::with_link(conn, esp))
    }

    fn with_link(conn: &ConnectionString<'_>, esp: esp::EspLink) -> Self {
        Self {
            device_id: conn.device_id.into(),
            telemetry_topic: topics::telemetry(conn.device_id),
            connected: false,
            next_twin_rid: 1,
            outstanding: heapless::Vec::new(),
            esp,
        }
    }

    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<u32, TransportError> {
        self.esp.publish(topic, payload).ok_or(TransportError::Rejected)
    }

    fn platform_subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        if self.esp.subscribe(topic) {
            Ok(())
        } else if self.connected {
            Err(TransportError::Rejected)
        } else {
            Err(TransportError::NotConnected)
        }
    }

    fn platform_maintain(&mut self) {
        self.esp.renew_if_due();
    }

    fn next_inbound(&mut self) -> Option<InboundEvent> {
        channel::INBOUND.try_receive().ok()
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

/// In-memory broker standing in for the MQTT session.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct SimBroker {
    pub inbound: std::collections::VecDeque<InboundEvent>,
    /// Every publish, in order: (topic, payload).
    pub published: Vec<(String, Vec<u8>)>,
    pub subscriptions: Vec<String>,
    /// Refuse every publish while set.
    pub reject_publish: bool,
    next_packet_id: u32,
}

#[cfg(not(target_os = "espidf"))]
impl IotHubClient {
    pub fn connect(conn: &ConnectionString<'_>, token_ttl_secs: u32) -> Result<Self, CommsError> {
        // Only the key check matters here; the token itself is discarded.
        crate::iothub::sas::generate_sas_token(conn, u64::from(token_ttl_secs))?;
        Ok(Self {
            device_id: conn.device_id.into(),
            telemetry_topic: topics::telemetry(conn.device_id),
            connected: false,
            next_twin_rid: 1,
            outstanding: heapless::Vec::new(),
            sim: SimBroker::default(),
        })
    }

    pub fn sim(&mut self) -> &mut SimBroker {
        &mut self.sim
    }

    /// Queue an event as if the connection thread had forwarded it.
    pub fn sim_push_inbound(&mut self, event: InboundEvent) {
        self.sim.inbound.push_back(event);
    }

    /// Packet id the next publish will get.
    pub fn sim_next_packet_id(&self) -> u32 {
        self.sim.next_packet_id + 1
    }

    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<u32, TransportError> {
        if self.sim.reject_publish {
            return Err(TransportError::Rejected);
        }
        self.sim.next_packet_id += 1;
        self.sim.published.push((topic.into(), payload.to_vec()));
        Ok(self.sim.next_packet_id)
    }

    fn platform_subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.sim.subscriptions.push(topic.into());
        Ok(())
    }

    fn platform_maintain(&mut self) {}

    fn next_inbound(&mut self) -> Option<InboundEvent> {
        self.sim.inbound.pop_front()
    }
}
