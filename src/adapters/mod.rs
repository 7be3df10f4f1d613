//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements | Connects to                      |
//! |------------|------------|----------------------------------|
//! | `log_sink` | EventSink  | Serial log output                |
//! | `time`     | Clock      | ESP32 system timer / std Instant |
//!
//! The pin-level ports (`PushButton`, `Indicator`, `RangeSensor`,
//! `Launcher`) are implemented directly by the drivers.

pub mod log_sink;
pub mod time;
