//! Door light sensor.
//!
//! A photo-resistor sits inside the enclosure; when the door opens,
//! light reaches it.  Any reading above the threshold counts as open.
//! There is no debounce or hysteresis, so a reading hovering around the
//! threshold will chatter.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 channel 5 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicI32` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicI32, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(not(target_os = "espidf"))]
static SIM_LIGHT: AtomicI32 = AtomicI32::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_light(raw: i32) {
    SIM_LIGHT.store(raw, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorReading {
    pub light_raw: i32,
    pub open: bool,
}

pub struct DoorSensor {
    threshold: i32,
}

impl DoorSensor {
    pub fn new(threshold: i32) -> Self {
        Self { threshold }
    }

    pub fn read(&mut self) -> DoorReading {
        let light_raw = self.read_adc();
        DoorReading {
            light_raw,
            open: is_open(light_raw, self.threshold),
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> i32 {
        i32::from(hw_init::adc1_read(pins::LIGHT_SENSOR_ADC_CHANNEL))
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> i32 {
        SIM_LIGHT.load(Ordering::Relaxed)
    }
}

/// `true` iff `light_raw` is strictly above `threshold`.
pub fn is_open(light_raw: i32, threshold: i32) -> bool {
    light_raw > threshold
}
