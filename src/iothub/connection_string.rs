//! Device connection string parsing.
//!
//! `HostName=<hub>.azure-devices.net;DeviceId=<id>;SharedAccessKey=<b64>`
//!
//! Fields may come in any order.  Each segment is split on its first `=`
//! so base64 padding in the key survives.  Empty segments and unknown
//! keys (e.g. `GatewayHostName`) are skipped.

use crate::error::CommsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionString<'a> {
    pub host_name: &'a str,
    pub device_id: &'a str,
    pub shared_access_key: &'a str,
}

impl<'a> ConnectionString<'a> {
    pub fn parse(raw: &'a str) -> Result<Self, CommsError> {
        let mut host_name = None;
        let mut device_id = None;
        let mut shared_access_key = None;

        for segment in raw.trim().split(';').filter(|s| !s.is_empty()) {
            let Some((key, value)) = segment.split_once('=') else {
                continue;
            };
            match key.trim() {
                "HostName" => host_name = Some(value),
                "DeviceId" => device_id = Some(value),
                "SharedAccessKey" => shared_access_key = Some(value),
                _ => {}
            }
        }

        match (host_name, device_id, shared_access_key) {
            (Some(h), Some(d), Some(k)) if !h.is_empty() && !d.is_empty() && !k.is_empty() => {
                Ok(Self {
                    host_name: h,
                    device_id: d,
                    shared_access_key: k,
                })
            }
            _ => Err(CommsError::InvalidConnectionString),
        }
    }
}
