//! Unified error types for the DoorScale firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! startup path and the adapters report failures uniformly.  All
//! variants are `Copy` and carry no heap data.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read.
    Sensor(SensorError),
    /// Wi-Fi, MQTT or IoT Hub failure.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Load cell never signalled data-ready.
    NotReady,
    /// GPIO read returned an error.
    GpioReadFailed,
    /// GPIO write returned an error.
    GpioWriteFailed,
    /// I²C transaction was not acknowledged.
    I2cFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "sensor not ready"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::I2cFailed => write!(f, "I2C transaction failed"),
        }
    }
}

impl core::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    WifiConnectFailed,
    InvalidConnectionString,
    InvalidSharedKey,
    ClockNotSynced,
    MqttConnectFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::WifiConnectFailed => write!(f, "WiFi connection failed"),
            Self::InvalidConnectionString => write!(f, "device connection string malformed"),
            Self::InvalidSharedKey => write!(f, "shared access key is not valid base64"),
            Self::ClockNotSynced => write!(f, "wall clock not synchronised"),
            Self::MqttConnectFailed => write!(f, "MQTT connect failed"),
        }
    }
}

impl core::error::Error for CommsError {}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
