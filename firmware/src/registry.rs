//! Burner registry: fixed-capacity arena plus the system-wide settings.
//!
//! All `MAX_BURNERS` units are built once at startup.  Only the first
//! `active_burner_count` are ever addressed or ticked; the rest stay `Off`
//! and inert.  The active count is fixed at activation time.  Later
//! `configure` calls only stage a count for the next activation, and that
//! activation resizes only while every live unit is at rest.

use log::{info, warn};

use crate::config::{ControllerConfig, MAX_BURNERS};
use crate::error::RejectReason;
use crate::fsm::context::FaultCode;
use crate::fsm::{BurnerState, BurnerUnit};

/// Runtime system settings.  Volatile: rebuilt from defaults on boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemConfig {
    /// Count applied at the next activation (1..=MAX_BURNERS).
    pub configured_burner_count: u8,
    /// Live count; 0 until the first activation.
    pub active_burner_count: u8,
    /// This device's display label (1-based, informational).
    pub device_burner_index: u8,
    /// Devices-in-group counter (display only).
    pub group_count: u8,
    /// Operator intent flag; affects status reporting only.
    pub armed: bool,
    /// Last fault code, system-wide, last writer wins.
    pub last_fault_code: u8,
}

impl SystemConfig {
    fn new(config: &ControllerConfig) -> Self {
        Self {
            configured_burner_count: config.default_burner_count.clamp(1, MAX_BURNERS as u8),
            active_burner_count: 0,
            device_burner_index: 1,
            group_count: 1,
            armed: false,
            last_fault_code: FaultCode::None.code(),
        }
    }
}

pub struct BurnerRegistry {
    units: [BurnerUnit; MAX_BURNERS],
    system: SystemConfig,
}

impl BurnerRegistry {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            units: core::array::from_fn(|i| BurnerUnit::new(i as u8, config)),
            system: SystemConfig::new(config),
        }
    }

    pub fn system(&self) -> &SystemConfig {
        &self.system
    }

    pub fn active_count(&self) -> u8 {
        self.system.active_burner_count
    }

    pub fn is_activated(&self) -> bool {
        self.system.active_burner_count > 0
    }

    // ── Addressing ────────────────────────────────────────────

    /// Validate a burner index against the live range.
    pub fn check(&self, id: u8) -> Result<usize, RejectReason> {
        let active = self.system.active_burner_count;
        if active == 0 {
            return Err(RejectReason::NotActivated);
        }
        if id >= active {
            return Err(RejectReason::OutOfRange { burner: id, active });
        }
        Ok(usize::from(id))
    }

    pub fn get(&self, id: u8) -> Result<&BurnerUnit, RejectReason> {
        let idx = self.check(id)?;
        Ok(&self.units[idx])
    }

    pub fn get_mut(&mut self, id: u8) -> Result<&mut BurnerUnit, RejectReason> {
        let idx = self.check(id)?;
        Ok(&mut self.units[idx])
    }

    /// Live units, in index order.
    pub fn active(&self) -> &[BurnerUnit] {
        &self.units[..usize::from(self.system.active_burner_count)]
    }

    pub fn active_mut(&mut self) -> &mut [BurnerUnit] {
        &mut self.units[..usize::from(self.system.active_burner_count)]
    }

    /// Move the selection marker to `id`.
    pub fn select(&mut self, id: u8) -> Result<(), RejectReason> {
        let idx = self.check(id)?;
        for unit in &mut self.units {
            unit.set_selected(false);
        }
        self.units[idx].set_selected(true);
        Ok(())
    }

    pub fn selected(&self) -> Option<u8> {
        self.active().iter().find(|u| u.selected()).map(BurnerUnit::index)
    }

    /// Burner that status frames describe: the selected one, else burner 0.
    pub fn addressed(&self) -> Option<&BurnerUnit> {
        let active = self.active();
        active.iter().find(|u| u.selected()).or_else(|| active.first())
    }

    // ── Configuration ─────────────────────────────────────────

    /// Stage the burner count for the next activation.
    pub fn configure(&mut self, count: u8) -> Result<(), RejectReason> {
        if count == 0 || usize::from(count) > MAX_BURNERS {
            return Err(RejectReason::InvalidConfigValue {
                key: 0x01,
                value: count,
            });
        }
        self.system.configured_burner_count = count;
        if self.is_activated() && count != self.system.active_burner_count {
            info!(
                "registry: {} burners staged, {} live until next activation",
                count, self.system.active_burner_count
            );
        }
        Ok(())
    }

    /// 0 is treated as 1; values above the arena size are capped.
    pub fn set_device_index(&mut self, value: u8) {
        self.system.device_burner_index = value.clamp(1, MAX_BURNERS as u8);
    }

    pub fn set_group_count(&mut self, value: u8) {
        self.system.group_count = value;
    }

    /// Bring the configured count live.  The first activation always
    /// applies; later ones only while every live unit is `Off` and the
    /// system is disarmed.  Returns `true` if the live count changed.
    pub fn activate(&mut self) -> bool {
        let configured = self.system.configured_burner_count;
        let active = self.system.active_burner_count;

        if active == configured {
            return false;
        }
        if active != 0 {
            let at_rest = self.active().iter().all(|u| u.state() == BurnerState::Off);
            if !at_rest || self.system.armed {
                warn!(
                    "registry: resize to {} deferred, burners in use (live={})",
                    configured, active
                );
                return false;
            }
        }

        self.system.active_burner_count = configured;
        for unit in &mut self.units[usize::from(configured)..] {
            unit.set_selected(false);
        }
        info!("registry: {} burner(s) active", configured);
        true
    }

    // ── System flags ──────────────────────────────────────────

    pub fn arm(&mut self, id: u8) -> Result<(), RejectReason> {
        self.get_mut(id)?.arm();
        self.system.armed = true;
        Ok(())
    }

    pub fn disarm(&mut self) {
        self.system.armed = false;
    }

    pub fn record_fault(&mut self, code: FaultCode) {
        self.system.last_fault_code = code.code();
    }

    pub fn clear_fault_code(&mut self) {
        self.system.last_fault_code = FaultCode::None.code();
    }
}
