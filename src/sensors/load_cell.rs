//! Load-cell scale: averaging, calibration and tare on top of a raw
//! amplifier driver.
//!
//! `weight = average(raw samples) / scale - tare_offset`, where the tare
//! offset is kept in calibrated units.  Call [`Scale::set_scale`] before
//! [`Scale::tare`], the offset is captured with the scale in force at
//! the time.

use embedded_hal::delay::DelayNs;
use log::warn;

use crate::error::{Error, SensorError};

/// Raw 24-bit amplifier (HX711 or a test double).
pub trait LoadCellDriver {
    /// `true` when a conversion is waiting to be clocked out.
    fn is_ready(&mut self) -> bool;

    /// Block until a conversion is available and return it.
    fn read_raw(&mut self) -> Result<i32, SensorError>;
}

pub struct Scale<D> {
    driver: D,
    scale: f32,
    tare_offset: f32,
}

impl<D: LoadCellDriver> Scale<D> {
    /// Unity scale, zero offset.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            scale: 1.0,
            tare_offset: 0.0,
        }
    }

    pub fn set_scale(&mut self, scale: f32) -> Result<(), Error> {
        if !scale.is_finite() || scale == 0.0 {
            return Err(Error::Config("load cell scale must be finite and non-zero"));
        }
        self.scale = scale;
        Ok(())
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Offset subtracted from every reading, in calibrated units.
    pub fn tare_offset(&self) -> f32 {
        self.tare_offset
    }

    pub fn set_tare_offset(&mut self, offset: f32) {
        self.tare_offset = offset;
    }

    /// Zero the scale at the current load.
    pub fn tare(&mut self, times: u8) -> Result<(), Error> {
        let avg = self.read_average(times)?;
        self.tare_offset = avg / self.scale;
        log::info!("Scale: tared at {:.5} units", self.tare_offset);
        Ok(())
    }

    /// Mean of `times` raw samples (at least one).
    pub fn read_average(&mut self, times: u8) -> Result<f32, Error> {
        let times = times.max(1);
        let mut sum: i64 = 0;
        for _ in 0..times {
            sum += i64::from(self.driver.read_raw()?);
        }
        Ok(sum as f32 / f32::from(times))
    }

    /// Calibrated weight averaged over `times` samples.
    ///
    /// A failing driver yields `0.0`; the failure is only logged.
    pub fn get_units(&mut self, times: u8) -> f32 {
        match self.read_average(times) {
            Ok(avg) => avg / self.scale - self.tare_offset,
            Err(e) => {
                warn!("Scale: read failed ({}), reporting 0", e);
                0.0
            }
        }
    }

    pub fn is_ready(&mut self) -> bool {
        self.driver.is_ready()
    }

    /// Poll for a pending conversion once per millisecond for up to
    /// `timeout_ms`.  `false` means no amplifier is answering.
    pub fn wait_ready_timeout(&mut self, timeout_ms: u32, delay: &mut impl DelayNs) -> bool {
        for _ in 0..=timeout_ms {
            if self.driver.is_ready() {
                return true;
            }
            delay.delay_ms(1);
        }
        false
    }
}
