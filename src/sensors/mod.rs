//! Sensor subsystem: the door light sensor, the load-cell scale, the
//! optional kit board, and the aggregating [`SensorHub`].
//!
//! The hub owns the door sensor and the scale and produces a
//! [`SensorSnapshot`] once per loop iteration.

pub mod door;
pub mod kit;
pub mod load_cell;

use door::DoorSensor;
use load_cell::{LoadCellDriver, Scale};

/// One poll of the primary sensors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorSnapshot {
    pub door_open: bool,
    /// Calibrated, tared weight.  `0.0` when the scale could not be read.
    pub weight: f32,
    pub light_raw: i32,
}

pub struct SensorHub<D> {
    door: DoorSensor,
    scale: Scale<D>,
    weight_samples: u8,
}

impl<D: LoadCellDriver> SensorHub<D> {
    pub fn new(door: DoorSensor, scale: Scale<D>, weight_samples: u8) -> Self {
        Self {
            door,
            scale,
            weight_samples,
        }
    }

    /// Read the door first, then the averaged weight.
    pub fn poll(&mut self) -> SensorSnapshot {
        let door = self.door.read();
        let weight = self.scale.get_units(self.weight_samples);
        SensorSnapshot {
            door_open: door.open,
            weight,
            light_raw: door.light_raw,
        }
    }

    pub fn scale_mut(&mut self) -> &mut Scale<D> {
        &mut self.scale
    }
}
