//! Concrete state handler functions and the state table.
//!
//! Each state is three plain `fn` pointers.  Handlers only look at the
//! [`BurnerContext`]; commands and the e-stop are applied by the caller
//! through [`BurnerUnit`](super::BurnerUnit) methods.
//!
//! ```text
//!  OFF ──[Ignite]──▶ PILOT_IGNITING ──[flame]──▶ PILOT_ESTABLISHED ──[MainOn]──▶ MAIN_ON
//!                      │     ▲                       │      ▲                     │
//!            [timeout] │     │ [cooldown,            │      └─────[MainOff]───────┤
//!                      ▼     │  retries left]        │                            │
//!                   FLAMEOUT ┴◀─────[flame lost]─────┴◀────────[flame lost]────────┘
//!                      │
//!          [cooldown, retries exhausted]
//!                      ▼
//!                    FAULT ──[Reset]──▶ OFF
//!
//!  Any state ──[Stop / e-stop]──▶ OFF
//! ```
//!
//! Without the pilot stage, a lit pilot goes straight to MAIN_ON.

use super::context::{BurnerContext, FaultCode};
use super::{BurnerState, StateDescriptor};
use log::{error, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table
// ═══════════════════════════════════════════════════════════════════════════

/// Indexed by `BurnerState as usize`.  Shared by every burner.
pub static STATE_TABLE: [StateDescriptor; BurnerState::COUNT] = [
    // Index 0: Off
    StateDescriptor {
        id: BurnerState::Off,
        name: "Off",
        on_enter: Some(off_enter),
        on_exit: None,
        on_update: off_update,
    },
    // Index 1: PilotIgniting
    StateDescriptor {
        id: BurnerState::PilotIgniting,
        name: "PilotIgniting",
        on_enter: Some(igniting_enter),
        on_exit: None,
        on_update: igniting_update,
    },
    // Index 2: PilotEstablished
    StateDescriptor {
        id: BurnerState::PilotEstablished,
        name: "PilotEstablished",
        on_enter: Some(established_enter),
        on_exit: None,
        on_update: established_update,
    },
    // Index 3: MainOn
    StateDescriptor {
        id: BurnerState::MainOn,
        name: "MainOn",
        on_enter: Some(main_on_enter),
        on_exit: Some(main_on_exit),
        on_update: main_on_update,
    },
    // Index 4: Flameout
    StateDescriptor {
        id: BurnerState::Flameout,
        name: "Flameout",
        on_enter: Some(flameout_enter),
        on_exit: None,
        on_update: flameout_update,
    },
    // Index 5: Fault
    StateDescriptor {
        id: BurnerState::Fault,
        name: "Fault",
        on_enter: Some(fault_enter),
        on_exit: Some(fault_exit),
        on_update: fault_update,
    },
];

// ═══════════════════════════════════════════════════════════════════════════
//  OFF: safe resting state
// ═══════════════════════════════════════════════════════════════════════════

fn off_enter(ctx: &mut BurnerContext) {
    ctx.retry_count = 0;
    info!("burner {}: OFF, valves closed", ctx.burner);
}

fn off_update(_ctx: &mut BurnerContext) -> Option<BurnerState> {
    // Leaves only on an Ignite command.
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  PILOT_IGNITING: pilot valve open, igniter energised
// ═══════════════════════════════════════════════════════════════════════════

fn igniting_enter(ctx: &mut BurnerContext) {
    info!(
        "burner {}: igniting pilot (attempt {}/{}, timeout {}ms)",
        ctx.burner,
        ctx.retry_count + 1,
        ctx.params.max_attempts,
        ctx.params.ignition_timeout_ms
    );
}

fn igniting_update(ctx: &mut BurnerContext) -> Option<BurnerState> {
    if ctx.flame_present {
        info!(
            "burner {}: flame proven after {}ms (signal {})",
            ctx.burner, ctx.elapsed_ms, ctx.last_flame_reading
        );
        return Some(if ctx.params.pilot_stage {
            BurnerState::PilotEstablished
        } else {
            BurnerState::MainOn
        });
    }

    if ctx.elapsed_ms > ctx.params.ignition_timeout_ms {
        warn!("burner {}: no flame within ignition timeout", ctx.burner);
        if ctx.retries_exhausted() {
            return Some(BurnerState::Fault);
        }
        return Some(BurnerState::Flameout);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  PILOT_ESTABLISHED: pilot burning, waiting for MainOn
// ═══════════════════════════════════════════════════════════════════════════

fn established_enter(ctx: &mut BurnerContext) {
    ctx.retry_count = 0;
    info!("burner {}: pilot established", ctx.burner);
}

fn established_update(ctx: &mut BurnerContext) -> Option<BurnerState> {
    if !ctx.flame_present {
        warn!("burner {}: pilot flame lost", ctx.burner);
        return Some(BurnerState::Flameout);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  MAIN_ON: main valve open
// ═══════════════════════════════════════════════════════════════════════════

fn main_on_enter(ctx: &mut BurnerContext) {
    ctx.retry_count = 0;
    info!("burner {}: main valve open", ctx.burner);
}

fn main_on_exit(ctx: &mut BurnerContext) {
    info!("burner {}: main valve closed", ctx.burner);
}

fn main_on_update(ctx: &mut BurnerContext) -> Option<BurnerState> {
    if !ctx.flame_present {
        warn!(
            "burner {}: FLAME LOST on main (signal {})",
            ctx.burner, ctx.last_flame_reading
        );
        ctx.raise(FaultCode::FlameLost);
        return Some(BurnerState::Flameout);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  FLAMEOUT: everything shut, mandatory cooldown
// ═══════════════════════════════════════════════════════════════════════════

fn flameout_enter(ctx: &mut BurnerContext) {
    ctx.retry_count = ctx.retry_count.saturating_add(1);
    warn!(
        "burner {}: FLAMEOUT, retry {}/{}, cooling down {}ms",
        ctx.burner, ctx.retry_count, ctx.params.max_attempts, ctx.params.cooldown_ms
    );
}

fn flameout_update(ctx: &mut BurnerContext) -> Option<BurnerState> {
    if ctx.elapsed_ms <= ctx.params.cooldown_ms {
        return None;
    }
    if ctx.retries_exhausted() {
        return Some(BurnerState::Fault);
    }
    Some(BurnerState::PilotIgniting)
}

// ═══════════════════════════════════════════════════════════════════════════
//  FAULT: latched until an operator Reset
// ═══════════════════════════════════════════════════════════════════════════

fn fault_enter(ctx: &mut BurnerContext) {
    ctx.raise(FaultCode::RetriesExhausted);
    error!(
        "burner {}: FAULT after {} attempts, reset required",
        ctx.burner, ctx.retry_count
    );
}

fn fault_exit(ctx: &mut BurnerContext) {
    info!("burner {}: fault acknowledged", ctx.burner);
}

fn fault_update(_ctx: &mut BurnerContext) -> Option<BurnerState> {
    None
}
