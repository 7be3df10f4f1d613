//! Actuator and input drivers over `embedded-hal` pins.

pub mod button;
pub mod light;
pub mod servo;
