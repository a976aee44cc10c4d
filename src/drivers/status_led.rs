//! Single-colour status LED on a plain GPIO output.
//!
//! Two of these are fitted: one for Wi-Fi association, one for the
//! cloud link.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO configured by hw_init.
//! On host/test: hw_init records the level in a simulated register.

use crate::drivers::hw_init;

pub struct StatusLed {
    gpio: i32,
    on: bool,
}

impl StatusLed {
    /// Starts off; the pin is driven low by hw_init.
    pub fn new(gpio: i32) -> Self {
        Self { gpio, on: false }
    }

    /// Drive the pin.  Writes only on change.
    pub fn set(&mut self, on: bool) {
        if on != self.on {
            hw_init::gpio_write(self.gpio, on);
            self.on = on;
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
