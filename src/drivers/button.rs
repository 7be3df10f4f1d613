//! Push-button input.
//!
//! A momentary switch on a GPIO with the internal pull resistor chosen at
//! construction.  `pressed()` reports the raw logic level: no debouncing,
//! no edge detection.  Callers must tolerate bouncy reads.

use core::str::FromStr;

use embedded_hal::digital::InputPin;
use serde::{Deserialize, Serialize};

use crate::app::ports::PushButton;
use crate::error::{Error, Result, SensorError};

/// Internal pull resistor for the button input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pull {
    /// Idle low; the switch pulls the line to 3V3.
    Down,
    /// Idle high; the switch pulls the line to ground.
    Up,
}

impl FromStr for Pull {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("down") {
            Ok(Self::Down)
        } else if s.eq_ignore_ascii_case("up") {
            Ok(Self::Up)
        } else {
            Err(Error::Config("pull mode must be \"down\" or \"up\""))
        }
    }
}

pub struct Button<P> {
    pin: P,
    pull: Pull,
}

impl<P: InputPin> Button<P> {
    /// The pin must already be configured as an input with `pull` applied;
    /// the HAL owns that register write.
    pub fn new(pin: P, pull: Pull) -> Self {
        Self { pin, pull }
    }

    /// Parse `mode` first; an unknown mode fails here, not on first read.
    pub fn from_mode(pin: P, mode: &str) -> Result<Self> {
        Ok(Self::new(pin, mode.parse()?))
    }

    pub fn pull(&self) -> Pull {
        self.pull
    }
}

impl<P: InputPin> PushButton for Button<P> {
    fn pressed(&mut self) -> Result<bool> {
        self.pin
            .is_high()
            .map_err(|_| SensorError::GpioReadFailed.into())
    }
}
