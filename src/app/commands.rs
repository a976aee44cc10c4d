//! Inbound device methods.
//!
//! The broker invokes methods by name with an opaque payload.  Each
//! invocation is answered with a JSON-quoted message and an HTTP-style
//! status code.

/// Body returned for every recognised method.
pub const METHOD_OK_BODY: &str = "\"Successfully invoke device method\"";
/// Body returned for unknown method names.
pub const METHOD_NOT_FOUND_BODY: &str = "\"No method found\"";

pub const STATUS_OK: u16 = 200;
pub const STATUS_NOT_FOUND: u16 = 404;

/// Methods the device understands.  Names are matched exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMethod {
    /// Enable periodic telemetry.
    Start,
    /// Disable periodic telemetry; keep-alive continues.
    Stop,
    /// Log the payload; no state change.
    Echo,
    /// Anything else.
    Unknown,
}

impl DeviceMethod {
    pub fn parse(name: &str) -> Self {
        match name {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "echo" => Self::Echo,
            _ => Self::Unknown,
        }
    }
}

/// Answer to one device-method invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodResponse {
    pub status: u16,
    /// Already JSON-encoded.
    pub body: &'static str,
}

impl MethodResponse {
    pub const fn ok() -> Self {
        Self {
            status: STATUS_OK,
            body: METHOD_OK_BODY,
        }
    }

    pub const fn not_found() -> Self {
        Self {
            status: STATUS_NOT_FOUND,
            body: METHOD_NOT_FOUND_BODY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_parse() {
        assert_eq!(DeviceMethod::parse("start"), DeviceMethod::Start);
        assert_eq!(DeviceMethod::parse("stop"), DeviceMethod::Stop);
        assert_eq!(DeviceMethod::parse("echo"), DeviceMethod::Echo);
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(DeviceMethod::parse("Start"), DeviceMethod::Unknown);
        assert_eq!(DeviceMethod::parse(""), DeviceMethod::Unknown);
    }

    #[test]
    fn bodies_are_json_strings() {
        let ok: String = serde_json::from_str(MethodResponse::ok().body).unwrap();
        assert_eq!(ok, "Successfully invoke device method");
        let nf: String = serde_json::from_str(MethodResponse::not_found().body).unwrap();
        assert_eq!(nf, "No method found");
    }
}
