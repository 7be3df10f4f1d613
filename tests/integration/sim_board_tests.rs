//! End-to-end: real drivers on the simulated board, driven by ControlLoop.

use tripwire::app::events::AppEvent;
use tripwire::app::ports::Clock;
use tripwire::app::service::ControlLoop;
use tripwire::config::SystemConfig;
use tripwire::drivers::button::{Button, Pull};
use tripwire::drivers::light::Light;
use tripwire::drivers::servo::{FIRED_ANGLE, READY_ANGLE, Servo, angle_to_pulse, pulse_to_duty};
use tripwire::sensors::ultrasonic::Rangefinder;
use tripwire::sim::{ScriptedInput, SimClock, SimDelay, SimOutput, SimPwm};

use super::mock_hw::RecordingSink;

const STEP_US: u64 = 10;
const MAX_DUTY: u16 = 20_000;

struct Board {
    clock: SimClock,
    button: ScriptedInput,
    echo: ScriptedInput,
    pwm: SimPwm,
    alert: SimOutput,
    prep: SimOutput,
}

impl Board {
    fn new() -> Self {
        let clock = SimClock::new();
        Self {
            echo: ScriptedInput::constant(false).with_clock(&clock, STEP_US),
            button: ScriptedInput::constant(false),
            pwm: SimPwm::new(MAX_DUTY),
            alert: SimOutput::new(),
            prep: SimOutput::new(),
            clock,
        }
    }
}

fn duty(angle: u16) -> u16 {
    pulse_to_duty(angle_to_pulse(angle), MAX_DUTY)
}

#[test]
fn calibrate_then_fire_on_approach() {
    let b = Board::new();
    let config = SystemConfig::default();

    let uss = Rangefinder::new(
        SimOutput::new(),
        b.echo.clone(),
        SimDelay::new(&b.clock),
        b.clock.clone(),
        &config,
    )
    .unwrap()
    .with_indicators(Some(Light::new(b.prep.clone()).unwrap()), None);
    let servo = Servo::new(
        b.pwm.clone(),
        SimDelay::new(&b.clock),
        b.clock.clone(),
        config.min_fire_delay_ms,
    );
    let button = Button::new(b.button.clone(), Pull::Down);
    let alert = Light::new(b.alert.clone()).unwrap();
    let mut cl = ControlLoop::new(button, uss, servo, alert, &config);
    let mut sink = RecordingSink::new();

    // Wall 1000 µs away (172 mm) for the whole calibration pass.
    for _ in 0..8 {
        b.echo.push_echo(1, 100);
    }
    let rest = cl.start(&mut sink).unwrap();
    assert!((rest - 172.0).abs() < 0.01, "rest {rest}");
    assert_eq!(b.pwm.history(), [duty(READY_ANGLE)]);
    assert_eq!(b.prep.writes(), [false, true, false]);
    assert!(b.clock.now_ms() >= 2_000);

    // Hand at 17.2 mm: under the 34.4 mm threshold.
    for _ in 0..4 {
        b.echo.push_echo(1, 10);
    }
    let fired: Vec<bool> = (0..3).map(|_| cl.step(&mut sink).unwrap().fired).collect();
    assert_eq!(fired, [false, false, true]);
    assert_eq!(
        b.pwm.history(),
        [duty(READY_ANGLE), duty(FIRED_ANGLE), duty(READY_ANGLE)]
    );
    assert!(b.alert.is_set_high());

    // Still close immediately afterwards: cooldown swallows the fire.
    let out = cl.step(&mut sink).unwrap();
    assert!(out.triggered);
    assert!(!out.fired);
    assert_eq!(b.pwm.history().len(), 3);

    // Hand gone.
    b.echo.push_echo(1, 100);
    let out = cl.step(&mut sink).unwrap();
    assert!(!out.triggered);
    assert!(!b.alert.is_set_high());

    assert_eq!(
        sink.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Triggered { fired: true, .. }))
            .count(),
        1
    );
}

#[test]
fn button_fires_even_when_the_sensor_sees_nothing() {
    let b = Board::new();
    let config = SystemConfig::default();

    let uss = Rangefinder::new(
        SimOutput::new(),
        b.echo.clone(),
        SimDelay::new(&b.clock),
        b.clock.clone(),
        &config,
    )
    .unwrap();
    let servo = Servo::new(
        b.pwm.clone(),
        SimDelay::new(&b.clock),
        b.clock.clone(),
        config.min_fire_delay_ms,
    );
    let button = Button::from_mode(b.button.clone(), "down").unwrap();
    let alert = Light::new(b.alert.clone()).unwrap();
    let mut cl = ControlLoop::new(button, uss, servo, alert, &config);
    let mut sink = RecordingSink::new();

    for _ in 0..8 {
        b.echo.push_echo(1, 100);
    }
    cl.start(&mut sink).unwrap();

    b.echo.push_echo(1, 100);
    b.button.set_idle(true);
    let out = cl.step(&mut sink).unwrap();

    assert!(out.triggered);
    assert!(out.fired);
    assert_eq!(out.hits, 0);
    assert!(sink.events.contains(&AppEvent::ButtonPressed));
}
