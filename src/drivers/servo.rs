//! Hobby-servo firing mechanism.
//!
//! A standard 50 Hz servo whose arm strikes the trigger when swung to its
//! end-stop, then returns to a rearmed position.
//!
//! ## Pulse mapping
//!
//! 0–180° maps linearly onto 500–2500 µs of high time.  Angles are not
//! clamped: anything past 180° yields a pulse above `MAX_PULSE_NS`, and the
//! fired position (200°) relies on that to overdrive the servo to its
//! mechanical end-stop.  The angle is unsigned, so a pulse can never fall
//! below `MIN_PULSE_NS`.
//!
//! ## Cooldown
//!
//! [`Launcher::fire`] is a silent no-op until `min_delay_ms` has passed
//! since the previous fire, measured on the monotonic [`Clock`].  A fire is
//! stamped when it starts, so the 650 ms hold counts toward the next
//! cooldown.  The construction time counts as a fire, so the first shot
//! also waits out one cooldown.

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;
use log::{debug, info};

use crate::app::ports::{Clock, Launcher};
use crate::error::{ActuatorError, Result};

pub const PWM_FREQ_HZ: u32 = 50;
/// One PWM frame (20 ms).
pub const PERIOD_NS: u32 = 1_000_000_000 / PWM_FREQ_HZ;

pub const MIN_PULSE_NS: u32 = 500_000;
pub const MAX_PULSE_NS: u32 = 2_500_000;
const ANGLE_SPAN: u64 = 180;

/// Arm at the end-stop: trigger struck.
pub const FIRED_ANGLE: u16 = 200;
/// Arm clear of the trigger.
pub const READY_ANGLE: u16 = 160;
/// Time for the arm to reach the end-stop before it is pulled back.
pub const FIRE_HOLD_MS: u32 = 650;

/// High time for `angle` degrees, truncated to whole nanoseconds.
pub const fn angle_to_pulse(angle: u16) -> u32 {
    let span = (MAX_PULSE_NS - MIN_PULSE_NS) as u64;
    MIN_PULSE_NS + (span * angle as u64 / ANGLE_SPAN) as u32
}

/// Duty value for a `pulse_ns` high time on a channel whose full frame is
/// `max_duty`.  Saturates at a full frame.
pub fn pulse_to_duty(pulse_ns: u32, max_duty: u16) -> u16 {
    let duty = u64::from(pulse_ns) * u64::from(max_duty) / u64::from(PERIOD_NS);
    duty.min(u64::from(max_duty)) as u16
}

pub struct Servo<P, D, C> {
    pwm: P,
    delay: D,
    clock: C,
    min_delay_ms: u64,
    last_fire_ms: u64,
    angle: Option<u16>,
}

impl<P, D, C> Servo<P, D, C>
where
    P: SetDutyCycle,
    D: DelayNs,
    C: Clock,
{
    /// `pwm` must already run at [`PWM_FREQ_HZ`].  The arm is not moved
    /// until the first [`turn_to`](Self::turn_to) or `reset`.
    pub fn new(pwm: P, delay: D, clock: C, min_delay_ms: u32) -> Self {
        let last_fire_ms = clock.now_ms();
        Self {
            pwm,
            delay,
            clock,
            min_delay_ms: u64::from(min_delay_ms),
            last_fire_ms,
            angle: None,
        }
    }

    /// Command the arm to `angle`.  Returns as soon as the duty is written;
    /// the arm is still travelling.
    pub fn turn_to(&mut self, angle: u16) -> Result<()> {
        let pulse = angle_to_pulse(angle);
        let duty = pulse_to_duty(pulse, self.pwm.max_duty_cycle());
        self.pwm
            .set_duty_cycle(duty)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.angle = Some(angle);
        debug!("servo: {}° ({} ns, duty {})", angle, pulse, duty);
        Ok(())
    }

    /// Last commanded angle, `None` before the first command.
    pub fn angle(&self) -> Option<u16> {
        self.angle
    }

    pub fn last_fire_ms(&self) -> u64 {
        self.last_fire_ms
    }

    fn cooled_down(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_fire_ms) >= self.min_delay_ms
    }
}

impl<P, D, C> Launcher for Servo<P, D, C>
where
    P: SetDutyCycle,
    D: DelayNs,
    C: Clock,
{
    fn reset(&mut self) -> Result<()> {
        self.turn_to(READY_ANGLE)
    }

    fn fire(&mut self) -> Result<bool> {
        let now_ms = self.clock.now_ms();
        if !self.cooled_down(now_ms) {
            debug!("servo: fire ignored, cooling down");
            return Ok(false);
        }

        self.turn_to(FIRED_ANGLE)?;
        self.delay.delay_ms(FIRE_HOLD_MS);
        self.turn_to(READY_ANGLE)?;
        self.last_fire_ms = now_ms;

        info!("servo: fired at t={}ms", self.last_fire_ms);
        Ok(true)
    }
}
