//! Command router: decode, validate, apply.
//!
//! The router is the only place commands touch the registry.  It runs on
//! the control loop between ticks, so a command is always applied in full
//! before the next transition evaluation.  Every failure path is a
//! [`RejectReason`]; nothing here can panic or stop the loop.
//!
//! While the e-stop loop is open, commands that arm or admit gas are
//! refused outright instead of being accepted and then undone by the
//! supervisor.  Stop, Reset, config and queries still go through.

use log::{info, warn};

use crate::error::{DecodeError, RejectReason};
use crate::fsm::Transition;
use crate::registry::BurnerRegistry;
use crate::time::Millis;

use super::command::{Command, ConfigKey};

/// Result of an accepted command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Accepted, no burner changed state.
    Ack,
    /// Accepted and moved a burner.
    Transition(Transition),
    /// Caller should publish the config frame.
    ConfigRequested,
}

/// Counts of frames refused at the boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundaryCounters {
    pub unknown_opcode: u32,
    /// Empty or truncated frames.
    pub malformed: u32,
    /// Burner index outside the live range (including before activation).
    pub out_of_range: u32,
    /// Well-formed commands refused by the current state or value checks.
    pub rejected: u32,
}

impl BoundaryCounters {
    pub fn total(&self) -> u32 {
        self.unknown_opcode
            .saturating_add(self.malformed)
            .saturating_add(self.out_of_range)
            .saturating_add(self.rejected)
    }
}

#[derive(Default)]
pub struct CommandRouter {
    counters: BoundaryCounters,
    /// E-stop level for the cycle being drained.
    estop: bool,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counters(&self) -> BoundaryCounters {
        self.counters
    }

    /// Latch the e-stop level sampled at the start of the cycle.
    pub fn set_estop(&mut self, asserted: bool) {
        self.estop = asserted;
    }

    /// Decode a raw frame and apply it.
    pub fn route(
        &mut self,
        frame: &[u8],
        registry: &mut BurnerRegistry,
        now: Millis,
    ) -> Result<Outcome, RejectReason> {
        match Command::decode(frame) {
            Ok(cmd) => self.dispatch(cmd, registry, now),
            Err(e) => {
                warn!("router: dropped frame ({} bytes): {}", frame.len(), e);
                let reason = RejectReason::from(e);
                self.count(&reason);
                Err(reason)
            }
        }
    }

    /// Apply an already-decoded command.
    pub fn dispatch(
        &mut self,
        cmd: Command,
        registry: &mut BurnerRegistry,
        now: Millis,
    ) -> Result<Outcome, RejectReason> {
        let result = self
            .lockout(&cmd, registry)
            .and_then(|()| apply(cmd, registry, now));
        if let Err(reason) = &result {
            warn!("router: {:?} rejected: {}", cmd.opcode(), reason);
            self.count(reason);
        }
        result
    }

    /// Range errors take precedence so traffic is classified the same way
    /// with the e-stop open or closed.
    fn lockout(&self, cmd: &Command, registry: &BurnerRegistry) -> Result<(), RejectReason> {
        if !self.estop || !cmd.energizes() {
            return Ok(());
        }
        if let Some(burner) = cmd.burner() {
            registry.check(burner)?;
        }
        Err(RejectReason::EstopActive)
    }

    fn count(&mut self, reason: &RejectReason) {
        let slot = match reason {
            RejectReason::Decode(DecodeError::UnknownOpcode(_)) => {
                &mut self.counters.unknown_opcode
            }
            RejectReason::Decode(_) => &mut self.counters.malformed,
            RejectReason::NotActivated | RejectReason::OutOfRange { .. } => {
                &mut self.counters.out_of_range
            }
            _ => &mut self.counters.rejected,
        };
        *slot = slot.saturating_add(1);
    }
}

fn apply(cmd: Command, registry: &mut BurnerRegistry, now: Millis) -> Result<Outcome, RejectReason> {
    match cmd {
        Command::Arm { burner } => {
            registry.arm(burner)?;
            info!("router: system armed via burner {}", burner);
            Ok(Outcome::Ack)
        }
        Command::Ignite { burner } => {
            let t = registry.get_mut(burner)?.ignite(now)?;
            Ok(Outcome::Transition(t))
        }
        Command::MainOn { burner } => {
            let t = registry.get_mut(burner)?.open_main(now)?;
            Ok(Outcome::Transition(t))
        }
        Command::MainOff { burner } => {
            let t = registry.get_mut(burner)?.close_main(now)?;
            Ok(Outcome::Transition(t))
        }
        Command::Stop { burner } => {
            let t = registry.get_mut(burner)?.force_off(now);
            registry.disarm();
            Ok(t.map_or(Outcome::Ack, Outcome::Transition))
        }
        Command::Reset { burner } => {
            let t = registry.get_mut(burner)?.reset(now)?;
            registry.clear_fault_code();
            Ok(Outcome::Transition(t))
        }
        Command::SetConfig { key, value } => {
            match ConfigKey::from_byte(key) {
                Some(ConfigKey::BurnerCount) => registry.configure(value)?,
                Some(ConfigKey::GroupCount) => registry.set_group_count(value),
                Some(ConfigKey::DeviceIndex) => registry.set_device_index(value),
                None => return Err(RejectReason::UnknownConfigKey(key)),
            }
            info!("router: config key 0x{:02X} = {}", key, value);
            Ok(Outcome::Ack)
        }
        Command::GetConfig => Ok(Outcome::ConfigRequested),
        Command::SelectBurner { burner } => {
            registry.select(burner)?;
            Ok(Outcome::Ack)
        }
    }
}
