//! BH1750 ambient light sensor (I²C).

use embedded_hal::i2c::I2c;

use crate::error::SensorError;

pub const BH1750_I2C_ADDRESS: u8 = 0x23;

const CMD_POWER_ON: u8 = 0x01;
/// Continuous measurement, 4 lx resolution, 16 ms conversion.
const CMD_CONTINUE_4LX_RES: u8 = 0x13;

/// Counts per lux in the default measurement-time register setting.
const COUNTS_PER_LUX: f32 = 1.2;

pub struct Bh1750 {
    address: u8,
}

impl Bh1750 {
    pub fn new(address: u8) -> Self {
        Self { address }
    }

    /// Power on and start continuous low-resolution measurement.
    pub fn init<I: I2c>(&self, i2c: &mut I) -> Result<(), SensorError> {
        i2c.write(self.address, &[CMD_POWER_ON])
            .map_err(|_| SensorError::I2cFailed)?;
        i2c.write(self.address, &[CMD_CONTINUE_4LX_RES])
            .map_err(|_| SensorError::I2cFailed)
    }

    pub fn read_lux<I: I2c>(&self, i2c: &mut I) -> Result<f32, SensorError> {
        let mut buf = [0u8; 2];
        i2c.read(self.address, &mut buf)
            .map_err(|_| SensorError::I2cFailed)?;
        Ok(raw_to_lux(u16::from_be_bytes(buf)))
    }
}

pub fn raw_to_lux(raw: u16) -> f32 {
    f32::from(raw) / COUNTS_PER_LUX
}
