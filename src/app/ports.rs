//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Driver ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! The drivers in [`crate::drivers`] and [`crate::sensors`] implement these
//! traits over `embedded-hal` pins.  The [`ControlLoop`](super::service::ControlLoop)
//! consumes them via generics, so the domain core never touches hardware
//! directly and runs unchanged against mocks on the host.

use crate::error::Result;

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Input ports (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Instantaneous push-button level.  No debouncing.
pub trait PushButton {
    fn pressed(&mut self) -> Result<bool>;
}

/// Distance source with a startup baseline.
pub trait RangeSensor {
    /// One ping.  `0.0` means no echo was observed.
    fn measure(&mut self) -> Result<f32>;

    /// Sample for `duration_secs` and return the rest (no-target) distance.
    fn calibrate(&mut self, duration_secs: u32) -> Result<f32>;
}

// ───────────────────────────────────────────────────────────────
// Output ports (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// A binary indicator such as an LED.
pub trait Indicator {
    fn on(&mut self) -> Result<()>;
    fn off(&mut self) -> Result<()>;
}

/// The firing mechanism.
pub trait Launcher {
    /// Move to the rearmed position regardless of cooldown.
    fn reset(&mut self) -> Result<()>;

    /// Fire if the cooldown has elapsed.  `Ok(false)` means the request
    /// was ignored; it is not an error.
    fn fire(&mut self) -> Result<bool>;
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic time since boot.  Must not follow wall-clock adjustments.
pub trait Clock {
    fn now_us(&self) -> u64;

    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.  Adapters
/// decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
