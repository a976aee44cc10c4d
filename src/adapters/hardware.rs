//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`], the optional kit board and the two indicator
//! LEDs, exposing them through [`SensorPort`] and [`IndicatorPort`].
//! This is the only module in the system that touches actual hardware.
//! On non-espidf targets, the underlying drivers use cfg-gated
//! simulation stubs.

use embedded_hal::i2c::I2c;

use crate::app::ports::{IndicatorPort, SensorPort};
use crate::drivers::status_led::StatusLed;
use crate::sensors::kit::{EnvironmentSnapshot, KitBoard};
use crate::sensors::load_cell::LoadCellDriver;
use crate::sensors::{SensorHub, SensorSnapshot};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<D, I> {
    sensor_hub: SensorHub<D>,
    kit: Option<KitBoard<I>>,
    wifi_led: StatusLed,
    cloud_led: StatusLed,
}

impl<D, I> HardwareAdapter<D, I>
where
    D: LoadCellDriver,
    I: I2c,
{
    pub fn new(
        sensor_hub: SensorHub<D>,
        kit: Option<KitBoard<I>>,
        wifi_led: StatusLed,
        cloud_led: StatusLed,
    ) -> Self {
        Self {
            sensor_hub,
            kit,
            wifi_led,
            cloud_led,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<D, I> SensorPort for HardwareAdapter<D, I>
where
    D: LoadCellDriver,
    I: I2c,
{
    fn poll(&mut self) -> SensorSnapshot {
        self.sensor_hub.poll()
    }

    fn read_environment(&mut self) -> Option<EnvironmentSnapshot> {
        self.kit.as_mut()?.try_read()
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<D, I> IndicatorPort for HardwareAdapter<D, I>
where
    D: LoadCellDriver,
    I: I2c,
{
    fn set_wifi_led(&mut self, on: bool) {
        self.wifi_led.set(on);
    }

    fn set_cloud_led(&mut self, on: bool) {
        self.cloud_led.set(on);
    }
}
