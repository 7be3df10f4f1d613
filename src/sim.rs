//! Host-side simulation of the board's peripherals.
//!
//! Implements the `embedded-hal` traits over shared in-memory state so the
//! drivers can be exercised on x86_64 without real GPIO/PWM registers.
//! Handles are cheap `Rc` clones: a test keeps one copy to inspect while
//! the driver owns the other.
//!
//! Time only moves when something moves it.  [`SimDelay`] advances the
//! shared [`SimClock`] by the requested amount, and a [`ScriptedInput`]
//! can advance it by a fixed step on every read to model busy-polling.

use core::convert::Infallible;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};

use crate::app::ports::Clock;

// ── Clock ─────────────────────────────────────────────────────

/// Simulated monotonic clock with nanosecond resolution.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    ns: Rc<Cell<u64>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ns(&self, ns: u64) {
        self.ns.set(self.ns.get() + ns);
    }

    pub fn advance_us(&self, us: u64) {
        self.advance_ns(us * 1_000);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance_ns(ms * 1_000_000);
    }
}

impl Clock for SimClock {
    fn now_us(&self) -> u64 {
        self.ns.get() / 1_000
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Delay provider that returns immediately after advancing the clock.
#[derive(Debug, Clone)]
pub struct SimDelay {
    clock: SimClock,
}

impl SimDelay {
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
        }
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance_ns(u64::from(ns));
    }
}

// ── Output pin ────────────────────────────────────────────────

/// Output pin that records every level written to it.
#[derive(Debug, Clone, Default)]
pub struct SimOutput {
    level: Rc<Cell<bool>>,
    writes: Rc<RefCell<Vec<bool>>>,
}

impl SimOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set_high(&self) -> bool {
        self.level.get()
    }

    /// Every level written, oldest first.
    pub fn writes(&self) -> Vec<bool> {
        self.writes.borrow().clone()
    }

    fn write(&self, high: bool) {
        self.level.set(high);
        self.writes.borrow_mut().push(high);
    }
}

impl digital::ErrorType for SimOutput {
    type Error = Infallible;
}

impl OutputPin for SimOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

// ── Input pin ─────────────────────────────────────────────────

/// Input pin that plays back a queue of levels, then holds an idle level.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    levels: Rc<RefCell<VecDeque<bool>>>,
    idle: Rc<Cell<bool>>,
    reads: Rc<Cell<usize>>,
    clock: Option<SimClock>,
    step_ns: u64,
}

impl ScriptedInput {
    /// A pin that always reads `level`.
    pub fn constant(level: bool) -> Self {
        let pin = Self::default();
        pin.idle.set(level);
        pin
    }

    /// Advance `clock` by `step_us` on every read.
    #[must_use]
    pub fn with_clock(mut self, clock: &SimClock, step_us: u64) -> Self {
        self.clock = Some(clock.clone());
        self.step_ns = step_us * 1_000;
        self
    }

    /// Change the level held once the script runs out.
    pub fn set_idle(&self, level: bool) {
        self.idle.set(level);
    }

    pub fn push(&self, level: bool) {
        self.levels.borrow_mut().push_back(level);
    }

    /// Queue one HC-SR04 echo: `lead` low reads, `high` high reads, then a
    /// low read that ends the pulse.
    ///
    /// With a clock step of `s` µs the measured pulse is `high * s` µs.
    pub fn push_echo(&self, lead: usize, high: usize) {
        let mut levels = self.levels.borrow_mut();
        levels.extend(core::iter::repeat_n(false, lead));
        levels.extend(core::iter::repeat_n(true, high));
        levels.push_back(false);
    }

    /// Levels still queued.
    pub fn remaining(&self) -> usize {
        self.levels.borrow().len()
    }

    /// Total reads so far.
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    fn read(&self) -> bool {
        self.reads.set(self.reads.get() + 1);
        if let Some(clock) = &self.clock {
            clock.advance_ns(self.step_ns);
        }
        self.levels
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| self.idle.get())
    }
}

impl digital::ErrorType for ScriptedInput {
    type Error = Infallible;
}

impl InputPin for ScriptedInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.read())
    }
}

// ── Broken pin ────────────────────────────────────────────────

/// Error reported by [`FaultyPin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinFault;

impl digital::Error for PinFault {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl pwm::Error for PinFault {
    fn kind(&self) -> pwm::ErrorKind {
        pwm::ErrorKind::Other
    }
}

/// A pin whose every operation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultyPin;

impl digital::ErrorType for FaultyPin {
    type Error = PinFault;
}

impl InputPin for FaultyPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Err(PinFault)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Err(PinFault)
    }
}

impl OutputPin for FaultyPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Err(PinFault)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Err(PinFault)
    }
}

impl pwm::ErrorType for FaultyPin {
    type Error = PinFault;
}

impl SetDutyCycle for FaultyPin {
    fn max_duty_cycle(&self) -> u16 {
        u16::MAX
    }

    fn set_duty_cycle(&mut self, _duty: u16) -> Result<(), Self::Error> {
        Err(PinFault)
    }
}

// ── PWM channel ───────────────────────────────────────────────

/// PWM channel that records every duty written to it.
#[derive(Debug, Clone)]
pub struct SimPwm {
    max_duty: u16,
    duties: Rc<RefCell<Vec<u16>>>,
}

impl SimPwm {
    /// With `max_duty = 20_000` one duty step is exactly 1 µs of a 50 Hz frame.
    pub fn new(max_duty: u16) -> Self {
        Self {
            max_duty,
            duties: Rc::default(),
        }
    }

    /// Every duty written, oldest first.
    pub fn history(&self) -> Vec<u16> {
        self.duties.borrow().clone()
    }

    pub fn last_duty(&self) -> Option<u16> {
        self.duties.borrow().last().copied()
    }
}

impl pwm::ErrorType for SimPwm {
    type Error = Infallible;
}

impl SetDutyCycle for SimPwm {
    fn max_duty_cycle(&self) -> u16 {
        self.max_duty
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duties.borrow_mut().push(duty);
        Ok(())
    }
}
