//! GPIO / peripheral pin assignments for the DoorScale board (ESP32-DevKit).
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Door light sensor (photo-resistor divider)
// ---------------------------------------------------------------------------

/// Analog input behind the door; any light means the door is open.
pub const LIGHT_SENSOR_GPIO: i32 = 33;
/// GPIO33 is ADC1 channel 5 on the ESP32.
pub const LIGHT_SENSOR_ADC_CHANNEL: u32 = 5;

// ---------------------------------------------------------------------------
// Load cell amplifier (HX711)
// ---------------------------------------------------------------------------

/// HX711 data out (input on our side).
pub const LOADCELL_DOUT_GPIO: i32 = 15;
/// HX711 serial clock (output on our side).
pub const LOADCELL_SCK_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// I²C bus (environmental kit board)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 25;
pub const I2C_SCL_GPIO: i32 = 26;
pub const I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Indicator LEDs
// ---------------------------------------------------------------------------

/// Lit while the Wi-Fi station is associated.
pub const WIFI_LED_GPIO: i32 = 2;
/// Lit while the IoT Hub link is up and telemetry is enabled.
pub const CLOUD_LED_GPIO: i32 = 4;
