//! MPU6050 accelerometer (I²C).  Only the accelerometer is used.

use embedded_hal::i2c::I2c;

use crate::error::SensorError;

pub const MPU6050_I2C_ADDRESS: u8 = 0x68;

const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_PWR_MGMT_1: u8 = 0x6B;

/// Raw accelerometer counts, device axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawAccel {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

pub struct Mpu6050 {
    address: u8,
}

impl Mpu6050 {
    pub fn new(address: u8) -> Self {
        Self { address }
    }

    /// Leave sleep mode (internal oscillator).
    pub fn init<I: I2c>(&self, i2c: &mut I) -> Result<(), SensorError> {
        i2c.write(self.address, &[REG_PWR_MGMT_1, 0x00])
            .map_err(|_| SensorError::I2cFailed)
    }

    /// Full-scale range selector, 0 (±2 g) through 3 (±16 g).
    pub fn accel_range<I: I2c>(&self, i2c: &mut I) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        i2c.write_read(self.address, &[REG_ACCEL_CONFIG], &mut buf)
            .map_err(|_| SensorError::I2cFailed)?;
        Ok((buf[0] >> 3) & 0x03)
    }

    pub fn read_accel<I: I2c>(&self, i2c: &mut I) -> Result<RawAccel, SensorError> {
        let mut buf = [0u8; 6];
        i2c.write_read(self.address, &[REG_ACCEL_XOUT_H], &mut buf)
            .map_err(|_| SensorError::I2cFailed)?;
        Ok(RawAccel {
            x: i16::from_be_bytes([buf[0], buf[1]]),
            y: i16::from_be_bytes([buf[2], buf[3]]),
            z: i16::from_be_bytes([buf[4], buf[5]]),
        })
    }
}
