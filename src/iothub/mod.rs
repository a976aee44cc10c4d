//! Azure IoT Hub device protocol over MQTT 3.1.1.
//!
//! Pure string and crypto helpers.  The MQTT client itself lives in
//! [`crate::adapters::iothub_mqtt`].

pub mod connection_string;
pub mod sas;
pub mod topics;

pub use connection_string::ConnectionString;
