//! Tripwire Firmware: Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Drivers (outer ring)                     │
//! │                                                              │
//! │  Button        Rangefinder      Servo          Light ×2      │
//! │  (PushButton)  (RangeSensor)    (Launcher)     (Indicator)   │
//! │  LogEventSink  MonotonicClock                                │
//! │  (EventSink)   (Clock)                                       │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐    │
//! │  │             ControlLoop (pure logic)                 │    │
//! │  │  calibrate · hit streak · fire / alert               │    │
//! │  └──────────────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Boot: log the pin map, claim peripherals, rearm the servo, calibrate
//! for two seconds, then poll forever.  Nothing is persisted; every boot
//! recalibrates from scratch.
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info};

use esp_idf_hal::delay::Delay;
use esp_idf_hal::gpio::{PinDriver, Pull as GpioPull};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;

use tripwire::adapters::log_sink::LogEventSink;
use tripwire::adapters::time::MonotonicClock;
use tripwire::app::service::ControlLoop;
use tripwire::config::SystemConfig;
use tripwire::drivers::button::{Button, Pull};
use tripwire::drivers::light::Light;
use tripwire::drivers::servo::{self, Servo};
use tripwire::pins;
use tripwire::sensors::ultrasonic::Rangefinder;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Tripwire v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    for (name, gpio) in pins::ALL {
        info!("pin {:<10} GPIO{}", name, gpio);
    }

    // ── 2. Config (compiled in) ───────────────────────────────
    let config = SystemConfig::default();
    config.validate()?;

    // ── 3. Claim peripherals ──────────────────────────────────
    // GPIO numbers here must match `pins.rs`.
    let p = Peripherals::take()?;
    let clock = MonotonicClock::new();

    let mut button_pin = PinDriver::input(p.pins.gpio1)?;
    button_pin.set_pull(match config.button_pull {
        Pull::Down => GpioPull::Down,
        Pull::Up => GpioPull::Up,
    })?;
    let button = Button::new(button_pin, config.button_pull);

    // Never lit; claimed so it sits at a known level.
    let _status_led = Light::new(PinDriver::output(p.pins.gpio21)?)?;
    let alert_led = Light::new(PinDriver::output(p.pins.gpio16)?)?;
    let prep_led = Light::new(PinDriver::output(p.pins.gpio17)?)?;

    let uss = Rangefinder::new(
        PinDriver::output(p.pins.gpio14)?,
        PinDriver::input(p.pins.gpio15)?,
        Delay::new_default(),
        clock,
        &config,
    )?
    .with_indicators(Some(prep_led), None);

    let servo_timer = LedcTimerDriver::new(
        p.ledc.timer0,
        &TimerConfig::new()
            .frequency(servo::PWM_FREQ_HZ.Hz().into())
            // 14-bit keeps the max duty inside the u16 SetDutyCycle range.
            .resolution(Resolution::Bits14),
    )?;
    let servo_pwm = LedcDriver::new(p.ledc.channel0, servo_timer, p.pins.gpio2)?;
    let servo = Servo::new(servo_pwm, Delay::new_default(), clock, config.min_fire_delay_ms);

    // ── 4. Rearm + calibrate ──────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut control = ControlLoop::new(button, uss, servo, alert_led, &config);
    control.start(&mut sink)?;

    info!("System ready. Entering control loop.");

    // ── 5. Control loop (returns only on a hardware error) ────
    let Err(e) = control.run(&mut sink);
    error!("Control loop halted: {} ({} triggers)", e, sink.triggers());
    Err(e.into())
}
