//! System configuration parameters
//!
//! All tunable parameters for the Tripwire gadget.  Values are compiled in;
//! nothing is persisted and every boot recalibrates from scratch.

use serde::{Deserialize, Serialize};

use crate::drivers::button::Pull;
use crate::error::{Error, Result};
use crate::sensors::ultrasonic::{MAX_CALIBRATION_SAMPLES, SAMPLES_PER_SEC};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Button ---
    /// Internal pull resistor for the button input
    pub button_pull: Pull,

    // --- Servo ---
    /// Minimum time between two fires (milliseconds)
    pub min_fire_delay_ms: u32,

    // --- Ultrasonic ---
    /// Length of the startup rest-distance calibration (seconds)
    pub calibration_secs: u32,
    /// Echo busy-poll iteration cap shared by both edges of one ping
    pub echo_poll_limit: u32,
    /// Speed of sound in millimetres per microsecond
    pub speed_of_sound_mm_per_us: f32,

    // --- Trigger ---
    /// Fraction of the rest distance below which a reading counts as a hit
    pub proximity_ratio: f32,
    /// Consecutive hits needed to fire
    pub hits_to_fire: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            button_pull: Pull::Down,

            min_fire_delay_ms: 1000,

            calibration_secs: 2,
            echo_poll_limit: 3000,
            speed_of_sound_mm_per_us: 0.344, // 344 m/s

            proximity_ratio: 0.2,
            hits_to_fire: 3,
        }
    }
}

impl SystemConfig {
    /// Reject values that would stall or short-circuit the control loop.
    pub fn validate(&self) -> Result<()> {
        if self.echo_poll_limit == 0 {
            return Err(Error::Config("echo_poll_limit must be non-zero"));
        }
        if self.calibration_secs == 0 {
            return Err(Error::Config("calibration_secs must be non-zero"));
        }
        if self.calibration_secs as usize * SAMPLES_PER_SEC > MAX_CALIBRATION_SAMPLES {
            return Err(Error::Config("calibration_secs exceeds sample buffer"));
        }
        if self.speed_of_sound_mm_per_us.is_nan() || self.speed_of_sound_mm_per_us <= 0.0 {
            return Err(Error::Config("speed_of_sound_mm_per_us must be positive"));
        }
        if !(0.0..=1.0).contains(&self.proximity_ratio) || self.proximity_ratio <= 0.0 {
            return Err(Error::Config("proximity_ratio must be in (0, 1]"));
        }
        if self.hits_to_fire == 0 {
            return Err(Error::Config("hits_to_fire must be non-zero"));
        }
        Ok(())
    }
}
