//! System configuration parameters
//!
//! Tunable parameters for the DoorScale device plus the compile-time
//! credentials.  There is no runtime reconfiguration: the config is
//! built once in `main`, validated, and then owned by the service.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Minimum time between two telemetry messages (milliseconds)
    pub send_interval_ms: u32,
    /// Blocking delay after every loop iteration (milliseconds)
    pub loop_delay_ms: u32,

    // --- Door sensor ---
    /// Light readings strictly above this value mean "door open"
    pub door_light_threshold: i32,

    // --- Load cell ---
    /// Raw samples averaged per weight reading
    pub weight_samples: u8,
    /// Raw samples averaged when taring at startup
    pub tare_samples: u8,
    /// Calibration factor (raw counts per unit)
    pub load_cell_scale: f32,

    // --- Platform ---
    /// CPU clock set at boot (MHz)
    pub cpu_freq_mhz: u16,
    /// Wi-Fi association attempts at startup before giving up
    pub wifi_connect_attempts: u8,
    /// Lifetime of the IoT Hub SAS token (seconds)
    pub sas_token_ttl_secs: u32,
    /// Poll the I²C environmental board (ambient light + accelerometer)
    pub kit_board_enabled: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            send_interval_ms: 10_000,
            loop_delay_ms: 1_000,

            // Door
            door_light_threshold: 0,

            // Load cell
            weight_samples: 10,
            tare_samples: 10,
            load_cell_scale: 217.396, // obtained by calibrating with known weights

            // Platform
            cpu_freq_mhz: 80,
            wifi_connect_attempts: 5,
            sas_token_ttl_secs: 3_600,
            kit_board_enabled: false,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Called once at startup.
    pub fn validate(&self) -> Result<()> {
        if self.send_interval_ms < 1_000 {
            return Err(Error::Config("send_interval_ms must be >= 1000"));
        }
        if !(10..=60_000).contains(&self.loop_delay_ms) {
            return Err(Error::Config("loop_delay_ms must be 10-60000"));
        }
        if !(1..=64).contains(&self.weight_samples) {
            return Err(Error::Config("weight_samples must be 1-64"));
        }
        if !(1..=64).contains(&self.tare_samples) {
            return Err(Error::Config("tare_samples must be 1-64"));
        }
        if !self.load_cell_scale.is_finite() || self.load_cell_scale == 0.0 {
            return Err(Error::Config("load_cell_scale must be finite and non-zero"));
        }
        if !matches!(self.cpu_freq_mhz, 80 | 160 | 240) {
            return Err(Error::Config("cpu_freq_mhz must be 80, 160 or 240"));
        }
        if self.wifi_connect_attempts == 0 {
            return Err(Error::Config("wifi_connect_attempts must be >= 1"));
        }
        if !(60..=31_536_000).contains(&self.sas_token_ttl_secs) {
            return Err(Error::Config("sas_token_ttl_secs must be 60-31536000"));
        }
        Ok(())
    }
}

/// Credentials compiled into the image.
///
/// Set `DOORSCALE_WIFI_SSID`, `DOORSCALE_WIFI_PASSWORD` and
/// `DOORSCALE_CONNECTION_STRING` in the build environment.  Unset values
/// come through as empty strings and make the matching link fail at
/// startup, which leaves telemetry disabled.
#[derive(Debug, Clone, Copy)]
pub struct DeviceSecrets {
    pub wifi_ssid: &'static str,
    pub wifi_password: &'static str,
    /// `HostName=...;DeviceId=...;SharedAccessKey=...`
    pub connection_string: &'static str,
}

impl DeviceSecrets {
    pub const fn from_build_env() -> Self {
        Self {
            wifi_ssid: match option_env!("DOORSCALE_WIFI_SSID") {
                Some(s) => s,
                None => "",
            },
            wifi_password: match option_env!("DOORSCALE_WIFI_PASSWORD") {
                Some(s) => s,
                None => "",
            },
            connection_string: match option_env!("DOORSCALE_CONNECTION_STRING") {
                Some(s) => s,
                None => "",
            },
        }
    }
}
