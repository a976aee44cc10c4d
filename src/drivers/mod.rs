//! Peripheral drivers and one-shot hardware initialisation.

pub mod bh1750;
pub mod hw_init;
pub mod hx711;
pub mod mpu6050;
pub mod status_led;
