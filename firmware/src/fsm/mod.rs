//! Per-burner flame-safety state machine.
//!
//! Function-pointer FSM, one row per state:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  STATE_TABLE                                                  │
//! │  ┌──────────────────┬──────────┬──────────┬────────────────┐  │
//! │  │ BurnerState      │ on_enter │ on_exit  │ on_update      │  │
//! │  ├──────────────────┼──────────┼──────────┼────────────────┤  │
//! │  │ Off              │ fn(ctx)  │ -        │ fn(ctx)->Opt<> │  │
//! │  │ PilotIgniting    │ fn(ctx)  │ -        │ fn(ctx)->Opt<> │  │
//! │  │ PilotEstablished │ fn(ctx)  │ -        │ fn(ctx)->Opt<> │  │
//! │  │ MainOn           │ fn(ctx)  │ fn(ctx)  │ fn(ctx)->Opt<> │  │
//! │  │ Flameout         │ fn(ctx)  │ -        │ fn(ctx)->Opt<> │  │
//! │  │ Fault            │ fn(ctx)  │ fn(ctx)  │ fn(ctx)->Opt<> │  │
//! │  └──────────────────┴──────────┴──────────┴────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every [`BurnerUnit`] shares the one static table and owns its own
//! [`BurnerContext`].  Each tick runs `on_update` for the current state
//! exactly once; a `Some(next)` runs `on_exit`, moves the pointer and
//! timestamps, then runs `on_enter`.  Stop and e-stop bypass the table.
//!
//! Actuator intents are never stored: [`BurnerUnit::intents`] derives them
//! from the state on every call.

pub mod context;
pub mod states;

use log::{info, warn};

use crate::config::ControllerConfig;
use crate::error::RejectReason;
use crate::sensors::FlameReading;
use crate::time::Millis;
use context::{ActuatorIntents, BurnerContext, BurnerParams, FaultCode};
use states::STATE_TABLE;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Must stay in sync with [`states::STATE_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BurnerState {
    Off = 0,
    PilotIgniting = 1,
    PilotEstablished = 2,
    MainOn = 3,
    Flameout = 4,
    Fault = 5,
}

impl BurnerState {
    pub const COUNT: usize = 6;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Off,
        Self::PilotIgniting,
        Self::PilotEstablished,
        Self::MainOn,
        Self::Flameout,
        Self::Fault,
    ];

    pub fn name(self) -> &'static str {
        STATE_TABLE[self as usize].name
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// `on_enter` / `on_exit`: run exactly once per transition.
pub type StateActionFn = fn(&mut BurnerContext);

/// Per-tick handler.  `Some(next)` requests a transition.
pub type StateUpdateFn = fn(&mut BurnerContext) -> Option<BurnerState>;

/// One row of the state table.
pub struct StateDescriptor {
    pub id: BurnerState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

/// A state change, reported back to the caller for event emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub burner: u8,
    pub from: BurnerState,
    pub to: BurnerState,
}

// ---------------------------------------------------------------------------
// BurnerUnit
// ---------------------------------------------------------------------------

/// One independently supervised burner.
pub struct BurnerUnit {
    index: u8,
    state: BurnerState,
    state_entered_at: Millis,
    selected: bool,
    ctx: BurnerContext,
}

impl BurnerUnit {
    pub fn new(index: u8, config: &ControllerConfig) -> Self {
        Self {
            index,
            state: BurnerState::Off,
            state_entered_at: Millis::ZERO,
            selected: false,
            ctx: BurnerContext::new(index, BurnerParams::from(config)),
        }
    }

    // ── Tick ──────────────────────────────────────────────────

    /// Evaluate the transition table once for the current state.
    pub fn tick(&mut self, now: Millis, flame: FlameReading) -> Option<Transition> {
        self.ctx.flame_present = flame.present;
        self.ctx.last_flame_reading = flame.filtered;
        self.ctx.elapsed_ms = now.since(self.state_entered_at);

        let next = (STATE_TABLE[self.state as usize].on_update)(&mut self.ctx)?;
        Some(self.transition(next, now))
    }

    // ── Commands ──────────────────────────────────────────────

    /// Start an ignition sequence.  Only a unit at rest may light.
    pub fn ignite(&mut self, now: Millis) -> Result<Transition, RejectReason> {
        match self.state {
            BurnerState::Off => {
                self.ctx.retry_count = 0;
                Ok(self.transition(BurnerState::PilotIgniting, now))
            }
            BurnerState::Fault => Err(RejectReason::FaultLatched),
            _ => Err(RejectReason::AlreadyActive),
        }
    }

    pub fn open_main(&mut self, now: Millis) -> Result<Transition, RejectReason> {
        if self.state != BurnerState::PilotEstablished {
            return Err(RejectReason::PilotNotEstablished);
        }
        Ok(self.transition(BurnerState::MainOn, now))
    }

    /// Drop back from MainOn to the pilot.
    pub fn close_main(&mut self, now: Millis) -> Result<Transition, RejectReason> {
        if !self.ctx.params.pilot_stage {
            return Err(RejectReason::NoPilotStage);
        }
        if self.state != BurnerState::MainOn {
            return Err(RejectReason::MainNotOpen);
        }
        Ok(self.transition(BurnerState::PilotEstablished, now))
    }

    /// Acknowledge a latched fault.
    pub fn reset(&mut self, now: Millis) -> Result<Transition, RejectReason> {
        if self.state != BurnerState::Fault {
            return Err(RejectReason::NotInFault);
        }
        Ok(self.transition(BurnerState::Off, now))
    }

    /// Arming clears leftover retries on a unit at rest.
    pub fn arm(&mut self) {
        if self.state == BurnerState::Off {
            self.ctx.retry_count = 0;
        }
    }

    /// Immediate shutdown for Stop and e-stop.  Skips exit/enter actions so
    /// nothing else can run before the valves close.
    pub fn force_off(&mut self, now: Millis) -> Option<Transition> {
        self.ctx.retry_count = 0;
        self.ctx.raised_fault = None;
        if self.state == BurnerState::Off {
            return None;
        }
        let from = self.state;
        warn!("burner {}: forced OFF from {}", self.index, from.name());
        self.state = BurnerState::Off;
        self.state_entered_at = now;
        self.ctx.elapsed_ms = 0;
        Some(Transition {
            burner: self.index,
            from,
            to: BurnerState::Off,
        })
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn state(&self) -> BurnerState {
        self.state
    }

    pub fn state_entered_at(&self) -> Millis {
        self.state_entered_at
    }

    pub fn retry_count(&self) -> u8 {
        self.ctx.retry_count
    }

    pub fn flame_present(&self) -> bool {
        self.ctx.flame_present
    }

    pub fn last_flame_reading(&self) -> u16 {
        self.ctx.last_flame_reading
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn intents(&self) -> ActuatorIntents {
        ActuatorIntents::for_state(self.state)
    }

    /// Fault raised by a handler since the last call.
    pub fn take_fault(&mut self) -> Option<FaultCode> {
        self.ctx.raised_fault.take()
    }

    // ── Internal ──────────────────────────────────────────────

    fn transition(&mut self, next: BurnerState, now: Millis) -> Transition {
        let from = self.state;
        info!(
            "burner {}: {} -> {}",
            self.index,
            STATE_TABLE[from as usize].name,
            STATE_TABLE[next as usize].name
        );

        if let Some(exit) = STATE_TABLE[from as usize].on_exit {
            exit(&mut self.ctx);
        }

        self.state = next;
        self.state_entered_at = now;
        self.ctx.elapsed_ms = 0;

        if let Some(enter) = STATE_TABLE[next as usize].on_enter {
            enter(&mut self.ctx);
        }

        Transition {
            burner: self.index,
            from,
            to: next,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Tick { dt: u32, flame: bool },
        Ignite,
        MainOn,
        MainOff,
        Reset,
        Stop,
    }

    fn arb_step() -> impl Strategy<Value = Step> {
        prop_oneof![
            6 => (1u32..7_000, any::<bool>()).prop_map(|(dt, flame)| Step::Tick { dt, flame }),
            1 => Just(Step::Ignite),
            1 => Just(Step::MainOn),
            1 => Just(Step::MainOff),
            1 => Just(Step::Reset),
            1 => Just(Step::Stop),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_on_every_path(
            pilot_stage in any::<bool>(),
            steps in proptest::collection::vec(arb_step(), 1..200),
        ) {
            let config = ControllerConfig { pilot_stage, ..ControllerConfig::default() };
            let max = config.max_attempts;
            let mut u = BurnerUnit::new(0, &config);
            let mut now = Millis::ZERO;

            for step in steps {
                let before = u.state();
                let retries_before = u.retry_count();
                match step {
                    Step::Tick { dt, flame } => {
                        now = now.offset(dt);
                        let reading = FlameReading { present: flame, filtered: if flame { 400 } else { 0 } };
                        u.tick(now, reading);
                    }
                    Step::Ignite => { let _ = u.ignite(now); }
                    Step::MainOn => { let _ = u.open_main(now); }
                    Step::MainOff => { let _ = u.close_main(now); }
                    Step::Reset => { let _ = u.reset(now); }
                    Step::Stop => { u.force_off(now); }
                }

                let state = u.state();
                let intents = u.intents();
                prop_assert!(!intents.main_open || state == BurnerState::MainOn);
                prop_assert!(!intents.ignition_active || state == BurnerState::PilotIgniting);
                prop_assert!(u.retry_count() <= max);
                if retries_before >= max && before != BurnerState::Off {
                    prop_assert!(
                        state != BurnerState::PilotIgniting,
                        "exhausted unit relit from {:?}", before
                    );
                }
                if !pilot_stage {
                    prop_assert!(state != BurnerState::PilotEstablished);
                }
                if before == BurnerState::Fault {
                    prop_assert!(matches!(state, BurnerState::Fault | BurnerState::Off));
                }
            }
        }
    }
}
