//! Per-burner context threaded through every FSM handler.
//!
//! `BurnerContext` is the blackboard the state handlers read and write:
//! the latest flame decision, time in state, the retry counter, and the
//! sequence parameters.  Actuator intents are *not* stored here; they are
//! derived from the state by [`ActuatorIntents::for_state`].

use crate::config::ControllerConfig;

use super::BurnerState;

// ---------------------------------------------------------------------------
// Sequence parameters (copied out of ControllerConfig once at startup)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurnerParams {
    pub ignition_timeout_ms: u32,
    pub cooldown_ms: u32,
    pub max_attempts: u8,
    /// Stop at PilotEstablished after ignition instead of going straight
    /// to MainOn.
    pub pilot_stage: bool,
}

impl From<&ControllerConfig> for BurnerParams {
    fn from(c: &ControllerConfig) -> Self {
        Self {
            ignition_timeout_ms: c.ignition_timeout_ms,
            cooldown_ms: c.cooldown_ms,
            max_attempts: c.max_attempts,
            pilot_stage: c.pilot_stage,
        }
    }
}

// ---------------------------------------------------------------------------
// Fault codes
// ---------------------------------------------------------------------------

/// Code reported in byte 7 of the status frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    None = 0,
    /// Flame lost with the main valve open.
    FlameLost = 1,
    /// Ignition attempts exhausted; unit latched in Fault.
    RetriesExhausted = 2,
}

impl FaultCode {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

// ---------------------------------------------------------------------------
// Actuator intents (pure function of state)
// ---------------------------------------------------------------------------

/// What the valves and igniter of one burner should be doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorIntents {
    pub pilot_open: bool,
    pub main_open: bool,
    pub ignition_active: bool,
}

impl ActuatorIntents {
    /// Everything closed and de-energised.
    pub const fn all_off() -> Self {
        Self {
            pilot_open: false,
            main_open: false,
            ignition_active: false,
        }
    }

    pub const fn for_state(state: BurnerState) -> Self {
        match state {
            BurnerState::PilotIgniting => Self {
                pilot_open: true,
                main_open: false,
                ignition_active: true,
            },
            BurnerState::PilotEstablished => Self {
                pilot_open: true,
                main_open: false,
                ignition_active: false,
            },
            BurnerState::MainOn => Self {
                pilot_open: true,
                main_open: true,
                ignition_active: false,
            },
            BurnerState::Off | BurnerState::Flameout | BurnerState::Fault => Self::all_off(),
        }
    }
}

// ---------------------------------------------------------------------------
// BurnerContext
// ---------------------------------------------------------------------------

pub struct BurnerContext {
    // -- Identity --
    pub burner: u8,

    // -- Timing --
    /// Milliseconds since the current state was entered.  Refreshed before
    /// every `on_update`.
    pub elapsed_ms: u32,

    // -- Flame --
    pub flame_present: bool,
    /// Smoothed flame magnitude from the last filter burst.
    pub last_flame_reading: u16,

    // -- Sequence --
    /// Failed ignitions / flame losses since the last good light-off.
    pub retry_count: u8,
    pub params: BurnerParams,

    // -- Fault reporting --
    /// Raised by handlers, drained by the supervisor into the system-wide
    /// fault code.
    pub raised_fault: Option<FaultCode>,
}

impl BurnerContext {
    pub fn new(burner: u8, params: BurnerParams) -> Self {
        Self {
            burner,
            elapsed_ms: 0,
            flame_present: false,
            last_flame_reading: 0,
            retry_count: 0,
            params,
            raised_fault: None,
        }
    }

    /// True once no further ignition attempts are allowed.
    pub fn retries_exhausted(&self) -> bool {
        self.retry_count >= self.params.max_attempts
    }

    pub fn raise(&mut self, fault: FaultCode) {
        self.raised_fault = Some(fault);
    }
}
