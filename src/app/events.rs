//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port.

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Startup calibration finished.
    Calibrated { rest_distance_mm: f32 },

    /// The button was seen pressed at the top of an iteration.  Diagnostic
    /// only; firing re-reads the button on its own.
    ButtonPressed,

    /// The firing condition held this iteration.
    Triggered {
        hits: u32,
        button: bool,
        distance_mm: f32,
        /// `false` when the servo was still cooling down.
        fired: bool,
    },
}
