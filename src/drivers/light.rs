//! Single-colour indicator LED on a GPIO output.
//!
//! The pin is driven low during construction, so a light always starts off
//! regardless of the pin's power-on level.

use embedded_hal::digital::OutputPin;

use crate::app::ports::Indicator;
use crate::error::{ActuatorError, Result};

pub struct Light<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> Light<P> {
    pub fn new(pin: P) -> Result<Self> {
        let mut light = Self { pin, on: false };
        light.off()?;
        Ok(light)
    }

    /// Level of the last successful write.
    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl<P: OutputPin> Indicator for Light<P> {
    fn on(&mut self) -> Result<()> {
        self.pin
            .set_high()
            .map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.on = true;
        Ok(())
    }

    fn off(&mut self) -> Result<()> {
        self.pin
            .set_low()
            .map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.on = false;
        Ok(())
    }
}

/// Stand-in for an indicator that is not fitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIndicator;

impl Indicator for NoIndicator {
    fn on(&mut self) -> Result<()> {
        Ok(())
    }

    fn off(&mut self) -> Result<()> {
        Ok(())
    }
}
