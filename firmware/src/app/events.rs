//! Structured controller events.
//!
//! Emitted through the [`EventSink`](super::ports::EventSink) port.  These
//! are for operators and logs; the wire protocol only sees frames.

use crate::error::RejectReason;
use crate::fsm::context::FaultCode;
use crate::fsm::{BurnerState, BurnerUnit, Transition};
use crate::protocol::router::BoundaryCounters;

/// One live burner as shown in the periodic operator summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurnerSnapshot {
    pub burner: u8,
    pub state: BurnerState,
    pub flame_present: bool,
    pub reading: u16,
    pub pilot_open: bool,
    pub main_open: bool,
    pub retry_count: u8,
}

impl From<&BurnerUnit> for BurnerSnapshot {
    fn from(unit: &BurnerUnit) -> Self {
        let intents = unit.intents();
        Self {
            burner: unit.index(),
            state: unit.state(),
            flame_present: unit.flame_present(),
            reading: unit.last_flame_reading(),
            pilot_open: intents.pilot_open,
            main_open: intents.main_open,
            retry_count: unit.retry_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// Controller constructed; carries the arena size.
    Started { capacity: u8 },

    /// The live burner count changed.
    Activated { burners: u8 },

    /// A burner moved between states.
    StateChanged {
        burner: u8,
        from: BurnerState,
        to: BurnerState,
    },

    /// A burner raised a fault code.
    FaultRaised { burner: u8, code: FaultCode },

    /// A command was refused.  Counters are the running totals.
    CommandRejected {
        reason: RejectReason,
        counters: BoundaryCounters,
    },

    /// E-stop input asserted; every live burner forced off.
    EmergencyStop { burners_stopped: u8 },

    /// E-stop input released.  Nothing restarts on its own.
    EstopReleased,

    /// Transport client went away.
    LinkLost,

    /// Periodic summary header.  `active == 0` until the registry is
    /// activated; one [`BurnerSummary`](Self::BurnerSummary) per live
    /// burner follows.
    Summary {
        active: u8,
        armed: bool,
        estop: bool,
        last_fault_code: u8,
        inbound_dropped: u32,
    },

    BurnerSummary(BurnerSnapshot),
}

impl From<Transition> for ControllerEvent {
    fn from(t: Transition) -> Self {
        Self::StateChanged {
            burner: t.burner,
            from: t.from,
            to: t.to,
        }
    }
}
