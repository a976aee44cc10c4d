//! HX711 24-bit load-cell amplifier, bit-banged over two GPIOs.
//!
//! Generic over the `embedded-hal` 1.0 pin and delay traits so the same
//! code drives ESP-IDF `PinDriver`s on hardware and recorded mocks on
//! the host.
//!
//! Protocol: DOUT low means a conversion is ready.  Each of the 24 data
//! bits is clocked out MSB first on a SCK pulse; 1 extra pulse selects
//! channel A at gain 128 for the next conversion.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::SensorError;
use crate::sensors::load_cell::LoadCellDriver;

/// Extra SCK pulses after the data bits: 1 = channel A, gain 128.
const GAIN_128_PULSES: u8 = 1;

/// Readiness polls before giving up on a read.
pub const DEFAULT_READY_POLLS: u32 = 1_000;
const READY_POLL_INTERVAL_US: u32 = 100;

pub struct Hx711<SCK, DT, D> {
    sck: SCK,
    dout: DT,
    delay: D,
    ready_polls: u32,
}

impl<SCK, DT, D> Hx711<SCK, DT, D>
where
    SCK: OutputPin,
    DT: InputPin,
    D: DelayNs,
{
    pub fn new(sck: SCK, dout: DT, delay: D) -> Self {
        Self {
            sck,
            dout,
            delay,
            ready_polls: DEFAULT_READY_POLLS,
        }
    }

    pub fn with_ready_polls(mut self, polls: u32) -> Self {
        self.ready_polls = polls.max(1);
        self
    }

    /// Hold SCK low so the chip leaves power-down.
    pub fn power_up(&mut self) -> Result<(), SensorError> {
        self.sck.set_low().map_err(|_| SensorError::GpioWriteFailed)
    }

    fn wait_ready(&mut self) -> Result<(), SensorError> {
        for _ in 0..self.ready_polls {
            if self.dout.is_low().map_err(|_| SensorError::GpioReadFailed)? {
                return Ok(());
            }
            self.delay.delay_us(READY_POLL_INTERVAL_US);
        }
        Err(SensorError::NotReady)
    }

    fn pulse(&mut self) -> Result<bool, SensorError> {
        self.sck.set_high().map_err(|_| SensorError::GpioWriteFailed)?;
        self.delay.delay_us(1);
        let bit = self.dout.is_high().map_err(|_| SensorError::GpioReadFailed)?;
        self.sck.set_low().map_err(|_| SensorError::GpioWriteFailed)?;
        self.delay.delay_us(1);
        Ok(bit)
    }
}

impl<SCK, DT, D> LoadCellDriver for Hx711<SCK, DT, D>
where
    SCK: OutputPin,
    DT: InputPin,
    D: DelayNs,
{
    fn is_ready(&mut self) -> bool {
        self.dout.is_low().unwrap_or(false)
    }

    fn read_raw(&mut self) -> Result<i32, SensorError> {
        self.wait_ready()?;

        let mut raw: u32 = 0;
        for _ in 0..24 {
            raw = (raw << 1) | u32::from(self.pulse()?);
        }
        for _ in 0..GAIN_128_PULSES {
            self.pulse()?;
        }
        Ok(sign_extend_24(raw))
    }
}

/// Interpret the low 24 bits of `raw` as two's complement.
pub fn sign_extend_24(raw: u32) -> i32 {
    ((raw << 8) as i32) >> 8
}
