//! Outbound frame encoding.
//!
//! Status frame (8 bytes):
//! ```text
//! ┌───────┬──────────────────┬───────┬───────┬───────┐
//! │ state │ uptime_ms u32 LE │ retry │ flame │ fault │
//! └───────┴──────────────────┴───────┴───────┴───────┘
//! ```
//!
//! Telemetry frame (8 bytes, all LE):
//! ```text
//! ┌─────────────────┬─────────────┬──────────────┬──────────────────┐
//! │ flame_q10 u16   │ adc_raw u16 │ battery_mv   │ temp_centi_c i16 │
//! └─────────────────┴─────────────┴──────────────┴──────────────────┘
//! ```
//!
//! The config frame is a postcard-encoded [`ConfigSnapshot`].  Encoding is
//! pure; callers only encode between ticks.

use core::fmt::Write as _;

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::config::MAX_BURNERS;
use crate::error::RejectReason;
use crate::fsm::{BurnerState, BurnerUnit};
use crate::registry::SystemConfig;
use crate::sensors::BoardSnapshot;
use crate::time::Millis;

pub const STATUS_FRAME_LEN: usize = 8;
pub const TELEMETRY_FRAME_LEN: usize = 8;
pub const CONFIG_FRAME_CAPACITY: usize = 16;
pub const RESPONSE_CAPACITY: usize = 64;

/// Flame readings at or above this clamp to full scale in telemetry.
const FLAME_Q10_CLAMP: u16 = 60;
const ADC_RAW_MAX: u16 = 1023;
const ADC_RAW_SCALE: u16 = 10;

/// Byte 0 of the status frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StatusCode {
    Unarmed = 0,
    ArmedIdle = 1,
    Igniting = 2,
    MainOn = 3,
    Fault = 4,
}

/// Config read-back.  Field order is the wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub configured_burner_count: u8,
    pub active_burner_count: u8,
    pub group_count: u8,
    pub device_burner_index: u8,
    pub armed: bool,
    pub pilot_stage: bool,
    pub max_burners: u8,
}

/// Everything the controller pushes to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Status {
        burner: u8,
        frame: [u8; STATUS_FRAME_LEN],
    },
    Telemetry {
        burner: u8,
        frame: [u8; TELEMETRY_FRAME_LEN],
    },
    Config(Vec<u8, CONFIG_FRAME_CAPACITY>),
    /// One per command: "ok" or the rejection reason.
    Response {
        accepted: bool,
        message: String<RESPONSE_CAPACITY>,
    },
}

pub struct StatusEncoder;

impl StatusEncoder {
    pub fn state_code(state: BurnerState, armed: bool) -> StatusCode {
        match state {
            BurnerState::Fault => StatusCode::Fault,
            BurnerState::MainOn => StatusCode::MainOn,
            BurnerState::PilotIgniting => StatusCode::Igniting,
            BurnerState::Off | BurnerState::PilotEstablished | BurnerState::Flameout => {
                if armed {
                    StatusCode::ArmedIdle
                } else {
                    StatusCode::Unarmed
                }
            }
        }
    }

    pub fn status(
        unit: &BurnerUnit,
        system: &SystemConfig,
        uptime: Millis,
    ) -> [u8; STATUS_FRAME_LEN] {
        let mut frame = [0u8; STATUS_FRAME_LEN];
        frame[0] = Self::state_code(unit.state(), system.armed) as u8;
        frame[1..5].copy_from_slice(&uptime.as_u32().to_le_bytes());
        frame[5] = unit.retry_count();
        frame[6] = u8::from(unit.flame_present());
        frame[7] = system.last_fault_code;
        frame
    }

    pub fn telemetry(unit: &BurnerUnit, board: &BoardSnapshot) -> [u8; TELEMETRY_FRAME_LEN] {
        let reading = unit.last_flame_reading();
        let flame_q10 = reading.min(FLAME_Q10_CLAMP) * 1024;
        let adc_raw = reading.saturating_mul(ADC_RAW_SCALE).min(ADC_RAW_MAX);

        let mut frame = [0u8; TELEMETRY_FRAME_LEN];
        frame[0..2].copy_from_slice(&flame_q10.to_le_bytes());
        frame[2..4].copy_from_slice(&adc_raw.to_le_bytes());
        frame[4..6].copy_from_slice(&board.battery_mv.to_le_bytes());
        frame[6..8].copy_from_slice(&board.temperature_centi_c.to_le_bytes());
        frame
    }

    pub fn snapshot(system: &SystemConfig, pilot_stage: bool) -> ConfigSnapshot {
        ConfigSnapshot {
            configured_burner_count: system.configured_burner_count,
            active_burner_count: system.active_burner_count,
            group_count: system.group_count,
            device_burner_index: system.device_burner_index,
            armed: system.armed,
            pilot_stage,
            max_burners: MAX_BURNERS as u8,
        }
    }

    pub fn config(
        system: &SystemConfig,
        pilot_stage: bool,
    ) -> Result<Vec<u8, CONFIG_FRAME_CAPACITY>, postcard::Error> {
        let mut buf = [0u8; CONFIG_FRAME_CAPACITY];
        let used = postcard::to_slice(&Self::snapshot(system, pilot_stage), &mut buf)?;
        Vec::from_slice(used).map_err(|()| postcard::Error::SerializeBufferFull)
    }

    pub fn response(result: Result<(), RejectReason>) -> Outbound {
        let mut message = String::new();
        let accepted = result.is_ok();
        // Overflow truncates the text; the accepted flag is what matters.
        let _ = match result {
            Ok(()) => message.push_str("ok").map_err(|()| core::fmt::Error),
            Err(reason) => write!(message, "{reason}"),
        };
        Outbound::Response { accepted, message }
    }
}
