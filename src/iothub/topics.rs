//! IoT Hub MQTT topic names and inbound topic classification.

pub const API_VERSION: &str = "2021-04-12";
pub const MQTT_PORT: u16 = 8883;

pub const METHODS_SUBSCRIBE: &str = "$iothub/methods/POST/#";
pub const TWIN_RESPONSE_SUBSCRIBE: &str = "$iothub/twin/res/#";
pub const TWIN_DESIRED_SUBSCRIBE: &str = "$iothub/twin/PATCH/properties/desired/#";

const METHODS_PREFIX: &str = "$iothub/methods/POST/";
const TWIN_RESPONSE_PREFIX: &str = "$iothub/twin/res/";
const TWIN_DESIRED_PREFIX: &str = "$iothub/twin/PATCH/properties/desired/";
const RID_PARAM: &str = "$rid=";

pub fn broker_url(host_name: &str) -> String {
    format!("mqtts://{}:{}", host_name, MQTT_PORT)
}

pub fn username(host_name: &str, device_id: &str) -> String {
    format!("{}/{}/?api-version={}", host_name, device_id, API_VERSION)
}

pub fn telemetry(device_id: &str) -> String {
    format!("devices/{}/messages/events/", device_id)
}

pub fn cloud_to_device_subscribe(device_id: &str) -> String {
    format!("devices/{}/messages/devicebound/#", device_id)
}

pub fn method_response(status: u16, rid: &str) -> String {
    format!("$iothub/methods/res/{}/?$rid={}", status, rid)
}

pub fn twin_get(rid: u32) -> String {
    format!("$iothub/twin/GET/?$rid={}", rid)
}

/// What an inbound publish is, judged by its topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundTopic<'a> {
    DeviceMethod { name: &'a str, rid: &'a str },
    TwinResponse { status: u16, rid: &'a str },
    TwinDesiredPatch,
    CloudToDevice,
    Unknown,
}

/// Value of `$rid` in the property bag after `?`.
fn request_id(properties: &str) -> Option<&str> {
    properties
        .split('&')
        .find_map(|kv| kv.strip_prefix(RID_PARAM))
}

pub fn classify<'a>(topic: &'a str, device_id: &str) -> InboundTopic<'a> {
    if let Some(rest) = topic.strip_prefix(METHODS_PREFIX) {
        // {name}/?$rid={rid}
        let Some((name, props)) = rest.split_once("/?") else {
            return InboundTopic::Unknown;
        };
        return match request_id(props) {
            Some(rid) if !name.is_empty() => InboundTopic::DeviceMethod { name, rid },
            _ => InboundTopic::Unknown,
        };
    }

    if let Some(rest) = topic.strip_prefix(TWIN_RESPONSE_PREFIX) {
        // {status}/?$rid={rid}
        let Some((status, props)) = rest.split_once("/?") else {
            return InboundTopic::Unknown;
        };
        return match (status.parse(), request_id(props)) {
            (Ok(status), Some(rid)) => InboundTopic::TwinResponse { status, rid },
            _ => InboundTopic::Unknown,
        };
    }

    if topic.starts_with(TWIN_DESIRED_PREFIX) {
        return InboundTopic::TwinDesiredPatch;
    }

    let c2d = format!("devices/{}/messages/devicebound/", device_id);
    if topic.starts_with(&c2d) {
        return InboundTopic::CloudToDevice;
    }

    InboundTopic::Unknown
}
