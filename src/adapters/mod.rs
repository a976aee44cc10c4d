//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements                  | Connects to                  |
//! |---------------|-----------------------------|------------------------------|
//! | `hardware`    | SensorPort, IndicatorPort   | ADC, HX711, I²C kit, LEDs    |
//! | `iothub_mqtt` | TelemetryTransport          | Azure IoT Hub over MQTT/TLS  |
//! | `log_sink`    | EventSink                   | Serial log output            |
//! | `time`        | —                           | ESP32 timer, SNTP            |
//! | `wifi`        | —                           | ESP-IDF WiFi STA             |

pub mod hardware;
pub mod iothub_mqtt;
pub mod log_sink;
pub mod time;
pub mod wifi;
