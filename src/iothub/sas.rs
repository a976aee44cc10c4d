//! Shared-access-signature tokens for the MQTT password.
//!
//! ```text
//! sr  = urlencode("{host}/devices/{device_id}")
//! sig = urlencode(base64(HMAC-SHA256(base64decode(key), "{sr}\n{expiry}")))
//! SharedAccessSignature sr={sr}&sig={sig}&se={expiry}
//! ```

use core::fmt::Write as _;

use base64::{Engine as _, engine::general_purpose};

use crate::error::CommsError;

use super::connection_string::ConnectionString;

/// Percent-encode everything except RFC 3986 unreserved characters.
pub fn url_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for b in input.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "%{:02X}", b);
        }
    }
    out
}

pub fn resource_uri(host_name: &str, device_id: &str) -> String {
    url_encode(&format!("{}/devices/{}", host_name, device_id))
}

/// Token valid until `expiry_unix_secs`.
pub fn generate_sas_token(
    conn: &ConnectionString<'_>,
    expiry_unix_secs: u64,
) -> Result<String, CommsError> {
    let key = general_purpose::STANDARD
        .decode(conn.shared_access_key)
        .map_err(|_| CommsError::InvalidSharedKey)?;

    let resource = resource_uri(conn.host_name, conn.device_id);
    let to_sign = format!("{}\n{}", resource, expiry_unix_secs);
    let mac = hmac_sha256::HMAC::mac(to_sign.as_bytes(), &key);
    let signature = url_encode(&general_purpose::STANDARD.encode(mac));

    Ok(format!(
        "SharedAccessSignature sr={}&sig={}&se={}",
        resource, signature, expiry_unix_secs
    ))
}
