//! Sensor subsystem.
//!
//! Flame sensing is per burner and goes through [`flame::FlameFilter`].
//! Board-level readings (supply voltage, temperature) are reported as a
//! [`BoardSnapshot`] and only feed telemetry.

pub mod flame;

pub use flame::{FlameFilter, FlameReading};

/// Board health readings for the telemetry frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// Supply / battery voltage (mV).
    pub battery_mv: u16,
    /// Board temperature (centi-°C).
    pub temperature_centi_c: i16,
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self {
            battery_mv: 3_800,
            temperature_centi_c: 2_500,
        }
    }
}
