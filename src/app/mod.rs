//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the tripwire rules: calibrate once, count
//! consecutive close readings, fire on a streak or a button press.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
