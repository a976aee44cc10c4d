//! Application core — pure domain logic, zero I/O.
//!
//! Sensor polling, telemetry scheduling and device-method handling for
//! the DoorScale device.  All interaction with hardware and the broker
//! happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
