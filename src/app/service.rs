//! Control loop: the hexagonal core.
//!
//! [`ControlLoop`] owns the peripherals behind port traits and runs the
//! tripwire logic.  It never touches hardware directly, so the whole loop
//! is testable with mock ports.
//!
//! ```text
//!  PushButton  ──▶ ┌─────────────────────┐ ──▶ Launcher
//!  RangeSensor ──▶ │     ControlLoop     │ ──▶ Indicator (alert)
//!                  └─────────────────────┘ ──▶ EventSink
//! ```
//!
//! ## Iteration
//!
//! 1. Button pressed → emit a diagnostic event (nothing else).
//! 2. Measure.  Below `rest × proximity_ratio` → one more hit; otherwise
//!    the hit counter resets.
//! 3. `hits >= hits_to_fire` **or** button pressed (re-read) → alert on and
//!    fire (which may be a cooldown no-op).  Otherwise alert off.
//!
//! There is no pacing delay: cadence is set by ping time and by the
//! 650 ms fire hold.

use core::convert::Infallible;

use log::info;

use crate::config::SystemConfig;
use crate::error::Result;

use super::events::AppEvent;
use super::ports::{EventSink, Indicator, Launcher, PushButton, RangeSensor};

/// What a single [`ControlLoop::step`] observed and did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub distance_mm: f32,
    pub hits: u32,
    /// The firing condition held and the alert was lit.
    pub triggered: bool,
    /// The launcher actually moved (not cooling down).
    pub fired: bool,
}

pub struct ControlLoop<B, R, L, I> {
    button: B,
    sensor: R,
    launcher: L,
    alert: I,
    calibration_secs: u32,
    proximity_ratio: f32,
    hits_to_fire: u32,
    rest_distance_mm: f32,
    consecutive_hits: u32,
    /// Set on every miss, cleared on every trigger.  Nothing reads it to
    /// make a decision; it is exposed for diagnostics only.
    ready: bool,
}

impl<B, R, L, I> ControlLoop<B, R, L, I>
where
    B: PushButton,
    R: RangeSensor,
    L: Launcher,
    I: Indicator,
{
    pub fn new(button: B, sensor: R, launcher: L, alert: I, config: &SystemConfig) -> Self {
        Self {
            button,
            sensor,
            launcher,
            alert,
            calibration_secs: config.calibration_secs,
            proximity_ratio: config.proximity_ratio,
            hits_to_fire: config.hits_to_fire,
            rest_distance_mm: 0.0,
            consecutive_hits: 0,
            ready: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Rearm the launcher, then calibrate the rest distance.
    pub fn start(&mut self, sink: &mut impl EventSink) -> Result<f32> {
        self.launcher.reset()?;
        self.rest_distance_mm = self.sensor.calibrate(self.calibration_secs)?;
        sink.emit(&AppEvent::Calibrated {
            rest_distance_mm: self.rest_distance_mm,
        });
        info!(
            "ControlLoop armed: rest={:.1}mm, threshold={:.1}mm",
            self.rest_distance_mm,
            self.threshold_mm()
        );
        Ok(self.rest_distance_mm)
    }

    /// Run [`step`](Self::step) forever.  Only a hardware error returns.
    pub fn run(&mut self, sink: &mut impl EventSink) -> Result<Infallible> {
        loop {
            self.step(sink)?;
        }
    }

    // ── Per-iteration logic ───────────────────────────────────

    pub fn step(&mut self, sink: &mut impl EventSink) -> Result<StepOutcome> {
        if self.button.pressed()? {
            sink.emit(&AppEvent::ButtonPressed);
        }

        let distance_mm = self.sensor.measure()?;
        if distance_mm < self.threshold_mm() {
            self.consecutive_hits = self.consecutive_hits.saturating_add(1);
        } else {
            self.consecutive_hits = 0;
            self.ready = true;
        }

        let button = self.button.pressed()?;
        let triggered = self.consecutive_hits >= self.hits_to_fire || button;
        let mut fired = false;

        if triggered {
            self.alert.on()?;
            fired = self.launcher.fire()?;
            self.ready = false;
            sink.emit(&AppEvent::Triggered {
                hits: self.consecutive_hits,
                button,
                distance_mm,
                fired,
            });
        } else {
            self.alert.off()?;
        }

        Ok(StepOutcome {
            distance_mm,
            hits: self.consecutive_hits,
            triggered,
            fired,
        })
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn rest_distance_mm(&self) -> f32 {
        self.rest_distance_mm
    }

    /// Readings strictly below this count as hits.
    pub fn threshold_mm(&self) -> f32 {
        self.rest_distance_mm * self.proximity_ratio
    }

    pub fn consecutive_hits(&self) -> u32 {
        self.consecutive_hits
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Set the rest distance without a calibration pass.
    pub fn set_rest_distance_mm(&mut self, rest_distance_mm: f32) {
        self.rest_distance_mm = rest_distance_mm;
    }
}
