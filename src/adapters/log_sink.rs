//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the `log`
//! facade (UART console on the ESP32 via `esp_idf_logger`).

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink {
    triggers: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Triggered events seen so far.
    pub fn triggers(&self) -> u32 {
        self.triggers
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Calibrated { rest_distance_mm } => {
                info!("CAL   | rest={:.1}mm", rest_distance_mm);
            }
            AppEvent::ButtonPressed => {
                info!(".");
            }
            AppEvent::Triggered {
                hits,
                button,
                distance_mm,
                fired,
            } => {
                self.triggers += 1;
                info!(
                    "TRIG  | #{} hits={} button={} d={:.1}mm {}",
                    self.triggers,
                    hits,
                    button,
                    distance_mm,
                    if *fired { "FIRED" } else { "cooldown" },
                );
            }
        }
    }
}
