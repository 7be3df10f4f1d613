//! Tripwire firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection.  Drivers are generic over `embedded-hal` traits; the only
//! ESP-IDF-specific code is the clock adapter, guarded by
//! `#[cfg(target_os = "espidf")]`, and the binary in `main.rs`.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod pins;

pub mod adapters;
pub mod drivers;
pub mod sensors;

#[cfg(not(target_os = "espidf"))]
pub mod sim;

pub use error::{Error, Result};
