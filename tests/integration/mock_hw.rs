//! Mock port implementations for integration tests.
//!
//! One shared [`MockHw`] state backs all four ports, so tests can script
//! inputs and assert on the full command history after the mocks have
//! been moved into a `ControlLoop`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tripwire::app::events::AppEvent;
use tripwire::app::ports::{EventSink, Indicator, Launcher, PushButton, RangeSensor};
use tripwire::app::service::ControlLoop;
use tripwire::config::SystemConfig;
use tripwire::error::{Error, Result, SensorError};

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    Calibrate(u32),
    Reset,
    Fire { fired: bool },
    AlertOn,
    AlertOff,
}

#[derive(Default)]
struct HwState {
    calls: Vec<HwCall>,
    button: VecDeque<bool>,
    button_held: bool,
    readings: VecDeque<f32>,
    rest_mm: f32,
    cooling_down: bool,
}

// ── MockHw ────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockHw(Rc<RefCell<HwState>>);

#[allow(dead_code)]
impl MockHw {
    /// Calibration will report `rest_mm`.
    pub fn new(rest_mm: f32) -> Self {
        let hw = Self::default();
        hw.0.borrow_mut().rest_mm = rest_mm;
        hw
    }

    /// Queue sensor readings.  Once they run out, `measure` fails.
    pub fn push_readings(&self, readings: &[f32]) {
        self.0.borrow_mut().readings.extend(readings);
    }

    /// Queue individual button reads (two per step).
    pub fn push_button(&self, levels: &[bool]) {
        self.0.borrow_mut().button.extend(levels);
    }

    /// Level reported once the queued button reads run out.
    pub fn hold_button(&self, held: bool) {
        self.0.borrow_mut().button_held = held;
    }

    pub fn set_cooling_down(&self, cooling_down: bool) {
        self.0.borrow_mut().cooling_down = cooling_down;
    }

    pub fn calls(&self) -> Vec<HwCall> {
        self.0.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.0.borrow_mut().calls.clear();
    }

    /// Fires that actually moved the launcher.
    pub fn shots(&self) -> usize {
        self.0
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, HwCall::Fire { fired: true }))
            .count()
    }

    pub fn alert_on(&self) -> bool {
        self.0
            .borrow()
            .calls
            .iter()
            .rev()
            .find_map(|c| match c {
                HwCall::AlertOn => Some(true),
                HwCall::AlertOff => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    fn record(&self, call: HwCall) {
        self.0.borrow_mut().calls.push(call);
    }
}

// ── Port newtypes ─────────────────────────────────────────────

pub struct MockButton(pub MockHw);
pub struct MockSensor(pub MockHw);
pub struct MockLauncher(pub MockHw);
pub struct MockAlert(pub MockHw);

impl PushButton for MockButton {
    fn pressed(&mut self) -> Result<bool> {
        let mut state = self.0.0.borrow_mut();
        let held = state.button_held;
        Ok(state.button.pop_front().unwrap_or(held))
    }
}

impl RangeSensor for MockSensor {
    fn measure(&mut self) -> Result<f32> {
        self.0
            .0
            .borrow_mut()
            .readings
            .pop_front()
            .ok_or(Error::Sensor(SensorError::GpioReadFailed))
    }

    fn calibrate(&mut self, duration_secs: u32) -> Result<f32> {
        self.0.record(HwCall::Calibrate(duration_secs));
        Ok(self.0.0.borrow().rest_mm)
    }
}

impl Launcher for MockLauncher {
    fn reset(&mut self) -> Result<()> {
        self.0.record(HwCall::Reset);
        Ok(())
    }

    fn fire(&mut self) -> Result<bool> {
        let fired = !self.0.0.borrow().cooling_down;
        self.0.record(HwCall::Fire { fired });
        Ok(fired)
    }
}

impl Indicator for MockAlert {
    fn on(&mut self) -> Result<()> {
        self.0.record(HwCall::AlertOn);
        Ok(())
    }

    fn off(&mut self) -> Result<()> {
        self.0.record(HwCall::AlertOff);
        Ok(())
    }
}

pub type MockLoop = ControlLoop<MockButton, MockSensor, MockLauncher, MockAlert>;

/// A loop over `hw` with the default config.  Not started.
pub fn control_loop(hw: &MockHw) -> MockLoop {
    ControlLoop::new(
        MockButton(hw.clone()),
        MockSensor(hw.clone()),
        MockLauncher(hw.clone()),
        MockAlert(hw.clone()),
        &SystemConfig::default(),
    )
}

// ── Event recorder ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
