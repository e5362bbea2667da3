//! GPIO / peripheral pin assignments for the FlameWerks ESP32-C6 board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Burner 0 outputs (relay driver board, active HIGH)
// ---------------------------------------------------------------------------

/// Pilot gas solenoid.
pub const PILOT_VALVE_GPIO: i32 = 2;
/// Main gas solenoid.
pub const MAIN_VALVE_GPIO: i32 = 4;
/// Hot-surface / glow igniter.
pub const IGNITER_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Flame sense (ADC1)
// ---------------------------------------------------------------------------

/// Flame rod / photodiode front end.  ADC1 channel 1 is GPIO 1 on ESP32-C6.
pub const FLAME_ADC1_CHANNEL: u32 = 1;

// ---------------------------------------------------------------------------
// Safety inputs
// ---------------------------------------------------------------------------

/// Normally-closed e-stop loop to GND with internal pull-up.
/// LOW = loop closed (run), HIGH = loop open (stop).
pub const ESTOP_GPIO: i32 = 9;
