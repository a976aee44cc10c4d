//! Optional IoT-kit environment sensors on the shared I²C bus.
//!
//! The kit board carries a BH1750 light sensor and an MPU6050
//! accelerometer.  Readings are converted here into the units published
//! in the environment log line: lux, m/s² truncated to integers, and
//! whole-degree pitch/roll.

use embedded_hal::i2c::I2c;
use log::{info, warn};
use serde::Serialize;

use crate::drivers::bh1750::{BH1750_I2C_ADDRESS, Bh1750};
use crate::drivers::mpu6050::{MPU6050_I2C_ADDRESS, Mpu6050, RawAccel};
use crate::error::SensorError;

const STANDARD_GRAVITY: f32 = 9.806_65;
/// Pi as the board firmware has always approximated it; changing it
/// shifts published angles by up to a degree.
const KIT_PI: f32 = 3.1415;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EnvironmentSnapshot {
    pub ambient_light_lux: f32,
    pub accel_x: i16,
    pub accel_y: i16,
    pub accel_z: i16,
    pub pitch_deg: i16,
    pub roll_deg: i16,
}

/// g per LSB for the ACCEL_CONFIG range selector.
pub fn range_per_digit(range_bits: u8) -> f32 {
    match range_bits {
        1 => 0.000_122,
        2 => 0.000_244,
        3 => 0.000_488_2,
        _ => 0.000_061,
    }
}

/// Raw counts to m/s², truncated toward zero.
pub fn normalise_accel(raw: i16, per_digit: f32) -> i16 {
    (f32::from(raw) * per_digit * STANDARD_GRAVITY) as i16
}

/// Whole-degree (pitch, roll) from normalised acceleration.
pub fn tilt_degrees(x: f32, y: f32, z: f32) -> (i16, i16) {
    let pitch = -(x.atan2((y * y + z * z).sqrt()) * 180.0) / KIT_PI;
    let roll = (y.atan2(z) * 180.0) / KIT_PI;
    (pitch as i16, roll as i16)
}

pub fn environment_from_raw(lux: f32, accel: RawAccel, range_bits: u8) -> EnvironmentSnapshot {
    let per_digit = range_per_digit(range_bits);
    let ax = normalise_accel(accel.x, per_digit);
    let ay = normalise_accel(accel.y, per_digit);
    let az = normalise_accel(accel.z, per_digit);
    let (pitch_deg, roll_deg) = tilt_degrees(f32::from(ax), f32::from(ay), f32::from(az));
    EnvironmentSnapshot {
        ambient_light_lux: lux,
        accel_x: ax,
        accel_y: ay,
        accel_z: az,
        pitch_deg,
        roll_deg,
    }
}

/// Owns the kit I²C bus and its two sensors.
pub struct KitBoard<I> {
    i2c: I,
    light: Bh1750,
    motion: Mpu6050,
    range_bits: u8,
}

impl<I: I2c> KitBoard<I> {
    /// Probe and initialise both sensors.
    pub fn init(mut i2c: I) -> Result<Self, SensorError> {
        let light = Bh1750::new(BH1750_I2C_ADDRESS);
        let motion = Mpu6050::new(MPU6050_I2C_ADDRESS);
        light.init(&mut i2c)?;
        motion.init(&mut i2c)?;
        let range_bits = motion.accel_range(&mut i2c)?;
        info!(
            "Kit: BH1750 + MPU6050 ready ({} g/digit)",
            range_per_digit(range_bits)
        );
        Ok(Self {
            i2c,
            light,
            motion,
            range_bits,
        })
    }

    /// A light-sensor failure reads as `0.0` lux; only an accelerometer
    /// failure fails the whole snapshot.
    pub fn read(&mut self) -> Result<EnvironmentSnapshot, SensorError> {
        let lux = match self.light.read_lux(&mut self.i2c) {
            Ok(lux) => lux,
            Err(e) => {
                warn!("Kit: BH1750 read failed ({}), reporting 0 lux", e);
                0.0
            }
        };
        let accel = self.motion.read_accel(&mut self.i2c)?;
        Ok(environment_from_raw(lux, accel, self.range_bits))
    }

    /// Like [`read`](Self::read) but logs and swallows bus errors.
    pub fn try_read(&mut self) -> Option<EnvironmentSnapshot> {
        match self.read() {
            Ok(env) => Some(env),
            Err(e) => {
                warn!("Kit: read failed: {}", e);
                None
            }
        }
    }
}
