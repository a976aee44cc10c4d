//! WiFi station-mode adapter.
//!
//! Brings the station up once at startup with a bounded number of
//! association attempts.  There is no reconnect loop: if the link never
//! comes up, telemetry stays off for the life of the process.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi<EspWifi>` from `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.

use log::{error, info, warn};

use crate::error::CommsError;

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting { attempt: u8 },
    Connected,
    Failed,
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), CommsError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CommsError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), CommsError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(CommsError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    #[cfg(target_os = "espidf")]
    wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
    /// Simulation: remaining attempts that will fail before one succeeds.
    #[cfg(not(target_os = "espidf"))]
    sim_failures_left: u8,
    #[cfg(not(target_os = "espidf"))]
    sim_attempts: u8,
}

impl WifiAdapter {
    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), CommsError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| CommsError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|_| CommsError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    /// Try to associate up to `attempts` times.
    pub fn connect(&mut self, attempts: u8) -> Result<(), CommsError> {
        if self.ssid.is_empty() {
            return Err(CommsError::NoCredentials);
        }
        if self.state == WifiState::Connected {
            return Ok(());
        }

        let attempts = attempts.max(1);
        for attempt in 1..=attempts {
            self.state = WifiState::Connecting { attempt };
            info!("WiFi: connecting to '{}' ({}/{})", self.ssid, attempt, attempts);
            match self.platform_connect() {
                Ok(()) => {
                    self.state = WifiState::Connected;
                    info!("WiFi: connected");
                    return Ok(());
                }
                Err(e) => warn!("WiFi: attempt {} failed ({})", attempt, e),
            }
        }

        error!("WiFi: giving up after {} attempts", attempts);
        self.state = WifiState::Failed;
        Err(CommsError::WifiConnectFailed)
    }
}

// ── Platform-specific ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl WifiAdapter {
    pub fn new(
        modem: esp_idf_svc::hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: Option<esp_idf_svc::nvs::EspDefaultNvsPartition>,
    ) -> Result<Self, CommsError> {
        use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

        let esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs).map_err(|e| {
            error!("WiFi: driver init failed: {}", e);
            CommsError::WifiConnectFailed
        })?;
        let wifi = BlockingWifi::wrap(esp_wifi, sysloop).map_err(|e| {
            error!("WiFi: driver init failed: {}", e);
            CommsError::WifiConnectFailed
        })?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            wifi,
        })
    }

    fn platform_connect(&mut self) -> Result<(), CommsError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|()| CommsError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|()| CommsError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        let fail = |e: esp_idf_svc::sys::EspError| {
            warn!("WiFi: {}", e);
            CommsError::WifiConnectFailed
        };
        self.wifi.set_configuration(&config).map_err(fail)?;
        if !self.wifi.is_started().map_err(fail)? {
            self.wifi.start().map_err(fail)?;
        }
        self.wifi.connect().map_err(fail)?;
        self.wifi.wait_netif_up().map_err(fail)?;
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    pub fn new() -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            sim_failures_left: 0,
            sim_attempts: 0,
        }
    }

    /// Make the next `n` association attempts fail.
    pub fn sim_fail_next(&mut self, n: u8) {
        self.sim_failures_left = n;
    }

    pub fn sim_attempts(&self) -> u8 {
        self.sim_attempts
    }

    fn platform_connect(&mut self) -> Result<(), CommsError> {
        self.sim_attempts = self.sim_attempts.saturating_add(1);
        if self.sim_failures_left > 0 {
            self.sim_failures_left -= 1;
            return Err(CommsError::WifiConnectFailed);
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_ssid() {
        let mut a = WifiAdapter::new();
        assert_eq!(a.set_credentials("", "password123"), Err(CommsError::InvalidSsid));
    }

    #[test]
    fn rejects_short_password() {
        let mut a = WifiAdapter::new();
        assert_eq!(a.set_credentials("MyNet", "short"), Err(CommsError::InvalidPassword));
    }

    #[test]
    fn accepts_open_network() {
        let mut a = WifiAdapter::new();
        assert!(a.set_credentials("OpenCafe", "").is_ok());
    }

    #[test]
    fn connect_without_credentials_fails() {
        let mut a = WifiAdapter::new();
        assert_eq!(a.connect(5), Err(CommsError::NoCredentials));
    }

    #[test]
    fn retries_until_success() {
        let mut a = WifiAdapter::new();
        a.set_credentials("HomeWiFi", "mysecret8").unwrap();
        a.sim_fail_next(2);
        assert!(a.connect(5).is_ok());
        assert!(a.is_connected());
        assert_eq!(a.sim_attempts(), 3);
    }

    #[test]
    fn gives_up_after_bounded_attempts() {
        let mut a = WifiAdapter::new();
        a.set_credentials("HomeWiFi", "mysecret8").unwrap();
        a.sim_fail_next(10);
        assert_eq!(a.connect(5), Err(CommsError::WifiConnectFailed));
        assert_eq!(a.state(), WifiState::Failed);
        assert_eq!(a.sim_attempts(), 5);
    }
}
