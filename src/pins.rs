//! GPIO / peripheral pin assignments for the Tripwire board.
//!
//! Single source of truth for the wiring.  Every peripheral wrapper takes
//! exclusive ownership of its pin, so no number may appear twice here.

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Momentary push-button, wired to 3V3 with the internal pull-down enabled.
pub const BUTTON_GPIO: i32 = 1;

/// HC-SR04 echo line (5 V sensor, level-shifted to 3V3).
pub const USS_ECHO_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Servo signal, driven by LEDC channel 0 at 50 Hz.
pub const SERVO_PWM_GPIO: i32 = 2;

/// HC-SR04 trigger line.
pub const USS_TRIG_GPIO: i32 = 14;

/// Red alert LED: lit while the firing condition holds.
pub const ALERT_LED_GPIO: i32 = 16;

/// Green LED: lit while the rest distance is being calibrated.
pub const PREP_LED_GPIO: i32 = 17;

/// On-board status LED.  Held off.
pub const STATUS_LED_GPIO: i32 = 21;

/// Every assigned pin, with a label for boot logging.
pub const ALL: [(&str, i32); 7] = [
    ("button", BUTTON_GPIO),
    ("uss_echo", USS_ECHO_GPIO),
    ("servo", SERVO_PWM_GPIO),
    ("uss_trig", USS_TRIG_GPIO),
    ("alert_led", ALERT_LED_GPIO),
    ("prep_led", PREP_LED_GPIO),
    ("status_led", STATUS_LED_GPIO),
];
