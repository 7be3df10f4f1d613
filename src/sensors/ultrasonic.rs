//! HC-SR04 ultrasonic rangefinder.
//!
//! ## Ping
//!
//! A 10 µs trigger pulse (after 20 µs of settle-low) makes the sensor emit
//! a burst and raise ECHO for the round-trip time.  Both edges of ECHO are
//! busy-polled; every poll timestamps against the monotonic clock.
//!
//! ## Timeout
//!
//! The wait is bounded by an iteration count, not a timer: a single counter
//! spans both edges and the ping is abandoned once it exceeds
//! `echo_poll_limit`.  The cap is therefore sensitive to CPU speed.  A
//! timed-out ping reads `0.0`, which callers must treat as "no echo" rather
//! than a near-field object.
//!
//! ## Units
//!
//! Microseconds × mm/µs, halved for the round trip: millimetres.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, info};

use crate::app::ports::{Clock, Indicator, RangeSensor};
use crate::config::SystemConfig;
use crate::drivers::light::NoIndicator;
use crate::error::{Error, Result, SensorError};

const TRIGGER_SETTLE_US: u32 = 20;
const TRIGGER_PULSE_US: u32 = 10;

/// Calibration cadence: one ping every 250 ms.
pub const SAMPLES_PER_SEC: usize = 4;
pub const SAMPLE_INTERVAL_MS: u32 = 250;
/// Sample buffer capacity (16 s of calibration).
pub const MAX_CALIBRATION_SAMPLES: usize = 64;

/// Pick the rest distance from raw calibration samples.
///
/// Drops the last sample if the count is odd, sorts ascending and takes
/// index `(n + 1) / 2`.  For even `n` that is one above the lower median;
/// the rule is kept as-is so baselines match earlier firmware.  Returns
/// `None` with fewer than two samples.
pub fn rest_distance(samples: &mut [f32]) -> Option<f32> {
    let n = samples.len() & !1;
    let samples = &mut samples[..n];
    samples.sort_unstable_by(f32::total_cmp);
    samples.get((n + 1) / 2).copied()
}

pub struct Rangefinder<T, E, D, C, I = NoIndicator> {
    trig: T,
    echo: E,
    delay: D,
    clock: C,
    /// Lit for the whole calibration pass.
    prep: Option<I>,
    /// Lit for the duration of each ping.
    active: Option<I>,
    speed_of_sound_mm_per_us: f32,
    poll_limit: u32,
}

impl<T, E, D, C> Rangefinder<T, E, D, C, NoIndicator>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: Clock,
{
    /// Drives the trigger low so the sensor starts idle.
    pub fn new(trig: T, echo: E, delay: D, clock: C, config: &SystemConfig) -> Result<Self> {
        let mut uss = Self {
            trig,
            echo,
            delay,
            clock,
            prep: None,
            active: None,
            speed_of_sound_mm_per_us: config.speed_of_sound_mm_per_us,
            poll_limit: config.echo_poll_limit,
        };
        uss.set_trigger(false)?;
        Ok(uss)
    }

    /// Attach status indicators.  Either may be absent.
    pub fn with_indicators<J: Indicator>(
        self,
        prep: Option<J>,
        active: Option<J>,
    ) -> Rangefinder<T, E, D, C, J> {
        Rangefinder {
            trig: self.trig,
            echo: self.echo,
            delay: self.delay,
            clock: self.clock,
            prep,
            active,
            speed_of_sound_mm_per_us: self.speed_of_sound_mm_per_us,
            poll_limit: self.poll_limit,
        }
    }
}

impl<T, E, D, C, I> Rangefinder<T, E, D, C, I>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: Clock,
    I: Indicator,
{
    pub fn poll_limit(&self) -> u32 {
        self.poll_limit
    }

    pub fn prep(&self) -> Option<&I> {
        self.prep.as_ref()
    }

    fn set_trigger(&mut self, high: bool) -> Result<()> {
        let res = if high {
            self.trig.set_high()
        } else {
            self.trig.set_low()
        };
        res.map_err(|_| SensorError::TriggerFailed.into())
    }

    /// `count` pings, one every [`SAMPLE_INTERVAL_MS`].
    fn sample(&mut self, count: usize) -> Result<heapless::Vec<f32, MAX_CALIBRATION_SAMPLES>> {
        let mut samples = heapless::Vec::new();
        for _ in 0..count {
            let distance = self.measure()?;
            samples
                .push(distance)
                .map_err(|_| SensorError::CalibrationFailed)?;
            self.delay.delay_ms(SAMPLE_INTERVAL_MS);
        }
        Ok(samples)
    }

    fn echo_high(&mut self) -> Result<bool> {
        self.echo
            .is_high()
            .map_err(|_| Error::from(SensorError::GpioReadFailed))
    }

    fn ping(&mut self) -> Result<f32> {
        self.set_trigger(false)?;
        self.delay.delay_us(TRIGGER_SETTLE_US);
        self.set_trigger(true)?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.set_trigger(false)?;

        let mut polls: u32 = 0;
        let mut timed_out = false;
        let mut sent_us = self.clock.now_us();
        let mut received_us = sent_us;

        while !timed_out && !self.echo_high()? {
            polls += 1;
            sent_us = self.clock.now_us();
            timed_out = polls > self.poll_limit;
        }
        while !timed_out && self.echo_high()? {
            polls += 1;
            received_us = self.clock.now_us();
            timed_out = polls > self.poll_limit;
        }

        if timed_out {
            debug!("uss: no echo after {} polls", polls);
            return Ok(0.0);
        }

        // A pulse too short to see in the second loop leaves `received_us`
        // behind `sent_us`.
        let elapsed_us = received_us.saturating_sub(sent_us);
        let distance = elapsed_us as f32 * self.speed_of_sound_mm_per_us / 2.0;
        debug!("uss: echo {}us -> {:.1}mm", elapsed_us, distance);
        Ok(distance)
    }
}

impl<T, E, D, C, I> RangeSensor for Rangefinder<T, E, D, C, I>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: Clock,
    I: Indicator,
{
    fn measure(&mut self) -> Result<f32> {
        if let Some(active) = self.active.as_mut() {
            active.on()?;
        }
        let reading = self.ping();
        if let Some(active) = self.active.as_mut() {
            active.off()?;
        }
        reading
    }

    fn calibrate(&mut self, duration_secs: u32) -> Result<f32> {
        let count = (duration_secs as usize).saturating_mul(SAMPLES_PER_SEC);
        if count == 0 || count > MAX_CALIBRATION_SAMPLES {
            return Err(SensorError::CalibrationFailed.into());
        }

        if let Some(prep) = self.prep.as_mut() {
            prep.on()?;
        }

        let sampled = self.sample(count);

        // Prep goes dark even when a ping failed part-way through.
        if let Some(prep) = self.prep.as_mut() {
            prep.off()?;
        }
        let mut samples = sampled?;

        let timeouts = samples.iter().filter(|d| **d == 0.0).count();
        let rest = rest_distance(&mut samples).ok_or(SensorError::CalibrationFailed)?;

        info!(
            "uss: rest distance {:.1}mm from {} samples ({} timeouts)",
            rest, count, timeouts
        );
        Ok(rest)
    }
}
