//! Error types for the burner controller.
//!
//! Every variant is `Copy` so rejections can be handed back through the
//! command path and logged without allocation.  None of these ever cross
//! the tick loop as a panic: a bad frame becomes a [`RejectReason`], a
//! burner failure becomes a state.

use core::fmt;

// ---------------------------------------------------------------------------
// Frame decoding
// ---------------------------------------------------------------------------

/// Why an inbound frame could not be turned into a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Zero-length frame.
    Empty,
    /// Opcode byte not in the command table.
    UnknownOpcode(u8),
    /// Frame shorter than the opcode's fixed payload.
    Truncated { opcode: u8, len: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty frame"),
            Self::UnknownOpcode(op) => write!(f, "unknown opcode 0x{op:02X}"),
            Self::Truncated { opcode, len } => {
                write!(f, "opcode 0x{opcode:02X}: payload too short ({len} bytes)")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Command rejection
// ---------------------------------------------------------------------------

/// Reason a command was refused.  Rendered verbatim into the response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The frame never decoded.
    Decode(DecodeError),
    /// Burner commands arrive before the first activation.
    NotActivated,
    /// Target index is at or beyond the active count.
    OutOfRange { burner: u8, active: u8 },
    /// Ignite while the unit is already running a sequence.
    AlreadyActive,
    /// Ignite while the unit is latched in Fault.
    FaultLatched,
    /// MainOn without an established pilot.
    PilotNotEstablished,
    /// MainOff while the main valve is closed.
    MainNotOpen,
    /// MainOff on a single-stage deployment.
    NoPilotStage,
    /// Reset outside Fault.
    NotInFault,
    /// Arm, Ignite or MainOn while the e-stop loop is open.
    EstopActive,
    /// SetConfig with an unrecognised key.
    UnknownConfigKey(u8),
    /// SetConfig value outside the accepted range for its key.
    InvalidConfigValue { key: u8, value: u8 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "{e}"),
            Self::NotActivated => write!(f, "burners not activated"),
            Self::OutOfRange { burner, active } => {
                write!(f, "burner {burner} out of range (active={active})")
            }
            Self::AlreadyActive => write!(f, "already active"),
            Self::FaultLatched => write!(f, "fault latched, reset required"),
            Self::PilotNotEstablished => write!(f, "pilot not established"),
            Self::MainNotOpen => write!(f, "main valve not open"),
            Self::NoPilotStage => write!(f, "no pilot stage"),
            Self::NotInFault => write!(f, "reset only available in fault"),
            Self::EstopActive => write!(f, "e-stop active"),
            Self::UnknownConfigKey(key) => write!(f, "unknown config key 0x{key:02X}"),
            Self::InvalidConfigValue { key, value } => {
                write!(f, "invalid value {value} for key 0x{key:02X}")
            }
        }
    }
}

impl From<DecodeError> for RejectReason {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// A [`ControllerConfig`](crate::config::ControllerConfig) field failed
/// validation.  The `&'static str` names the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroDuration(&'static str),
    OutOfRange(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDuration(field) => write!(f, "{field} must be non-zero"),
            Self::OutOfRange(field) => write!(f, "{field} out of range"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_reasons_render_for_operators() {
        assert_eq!(RejectReason::AlreadyActive.to_string(), "already active");
        assert_eq!(RejectReason::EstopActive.to_string(), "e-stop active");
        assert_eq!(
            RejectReason::OutOfRange { burner: 7, active: 2 }.to_string(),
            "burner 7 out of range (active=2)"
        );
        assert_eq!(
            RejectReason::from(DecodeError::UnknownOpcode(0x7F)).to_string(),
            "unknown opcode 0x7F"
        );
    }

    #[test]
    fn longest_reason_fits_response_buffer() {
        let worst = RejectReason::Decode(DecodeError::Truncated {
            opcode: 0xFF,
            len: usize::MAX,
        });
        assert!(worst.to_string().len() <= 64);
    }
}
