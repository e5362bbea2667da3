//! Inbound command frame decoding.
//!
//! Wire format:
//! ```text
//! ┌──────────┬──────────────┬──────────────────┐
//! │ opcode 1B│ burner_id 1B │ payload (opcode) │
//! └──────────┴──────────────┴──────────────────┘
//! ```
//!
//! `burner_id` may be omitted, meaning burner 0.  Only `SetConfig` has a
//! payload (`[key][value]`), so a SetConfig frame is always 4 bytes.
//! Trailing bytes on other opcodes are ignored.

use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Arm = 0x01,
    Ignite = 0x02,
    MainOn = 0x03,
    MainOff = 0x04,
    Stop = 0x05,
    Reset = 0x06,
    SetConfig = 0x10,
    GetConfig = 0x11,
    SelectBurner = 0x20,
}

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Ok(match byte {
            0x01 => Self::Arm,
            0x02 => Self::Ignite,
            0x03 => Self::MainOn,
            0x04 => Self::MainOff,
            0x05 => Self::Stop,
            0x06 => Self::Reset,
            0x10 => Self::SetConfig,
            0x11 => Self::GetConfig,
            0x20 => Self::SelectBurner,
            other => return Err(DecodeError::UnknownOpcode(other)),
        })
    }
}

/// SetConfig keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConfigKey {
    /// Burner count for the next activation (1..=MAX_BURNERS).
    BurnerCount = 0x01,
    /// Devices-in-group display counter.
    GroupCount = 0x02,
    /// This device's display index (clamped).
    DeviceIndex = 0x03,
}

impl ConfigKey {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::BurnerCount),
            0x02 => Some(Self::GroupCount),
            0x03 => Some(Self::DeviceIndex),
            _ => None,
        }
    }
}

/// A decoded command.  Burner-addressed variants carry the raw index; bounds
/// are checked by the router against the live registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Arm { burner: u8 },
    Ignite { burner: u8 },
    MainOn { burner: u8 },
    MainOff { burner: u8 },
    Stop { burner: u8 },
    Reset { burner: u8 },
    /// System-scoped; the burner byte is ignored.
    SetConfig { key: u8, value: u8 },
    GetConfig,
    SelectBurner { burner: u8 },
}

impl Command {
    pub fn decode(frame: &[u8]) -> Result<Self, DecodeError> {
        let (&op, rest) = frame.split_first().ok_or(DecodeError::Empty)?;
        let opcode = Opcode::try_from(op)?;
        let burner = rest.first().copied().unwrap_or(0);

        Ok(match opcode {
            Opcode::Arm => Self::Arm { burner },
            Opcode::Ignite => Self::Ignite { burner },
            Opcode::MainOn => Self::MainOn { burner },
            Opcode::MainOff => Self::MainOff { burner },
            Opcode::Stop => Self::Stop { burner },
            Opcode::Reset => Self::Reset { burner },
            Opcode::GetConfig => Self::GetConfig,
            Opcode::SelectBurner => Self::SelectBurner { burner },
            Opcode::SetConfig => match frame {
                [_, _, key, value, ..] => Self::SetConfig {
                    key: *key,
                    value: *value,
                },
                _ => {
                    return Err(DecodeError::Truncated {
                        opcode: op,
                        len: frame.len(),
                    });
                }
            },
        })
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Arm { .. } => Opcode::Arm,
            Self::Ignite { .. } => Opcode::Ignite,
            Self::MainOn { .. } => Opcode::MainOn,
            Self::MainOff { .. } => Opcode::MainOff,
            Self::Stop { .. } => Opcode::Stop,
            Self::Reset { .. } => Opcode::Reset,
            Self::SetConfig { .. } => Opcode::SetConfig,
            Self::GetConfig => Opcode::GetConfig,
            Self::SelectBurner { .. } => Opcode::SelectBurner,
        }
    }

    /// Target burner for commands that address one.
    pub fn burner(&self) -> Option<u8> {
        match *self {
            Self::Arm { burner }
            | Self::Ignite { burner }
            | Self::MainOn { burner }
            | Self::MainOff { burner }
            | Self::Stop { burner }
            | Self::Reset { burner }
            | Self::SelectBurner { burner } => Some(burner),
            Self::SetConfig { .. } | Self::GetConfig => None,
        }
    }

    /// Commands that arm the system or admit gas.
    pub fn energizes(&self) -> bool {
        matches!(
            self,
            Self::Arm { .. } | Self::Ignite { .. } | Self::MainOn { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_burner_defaults_to_zero() {
        assert_eq!(Command::decode(&[0x02]), Ok(Command::Ignite { burner: 0 }));
        assert_eq!(
            Command::decode(&[0x02, 7]),
            Ok(Command::Ignite { burner: 7 })
        );
    }

    #[test]
    fn every_opcode_decodes() {
        let cases = [
            (0x01, Opcode::Arm),
            (0x02, Opcode::Ignite),
            (0x03, Opcode::MainOn),
            (0x04, Opcode::MainOff),
            (0x05, Opcode::Stop),
            (0x06, Opcode::Reset),
            (0x11, Opcode::GetConfig),
            (0x20, Opcode::SelectBurner),
        ];
        for (byte, opcode) in cases {
            assert_eq!(Command::decode(&[byte, 1]).unwrap().opcode(), opcode);
        }
    }

    #[test]
    fn set_config_reads_key_value_after_burner() {
        assert_eq!(
            Command::decode(&[0x10, 0, 0x01, 12]),
            Ok(Command::SetConfig { key: 0x01, value: 12 })
        );
    }

    #[test]
    fn short_set_config_is_truncated() {
        assert_eq!(
            Command::decode(&[0x10, 0, 0x01]),
            Err(DecodeError::Truncated { opcode: 0x10, len: 3 })
        );
        assert!(Command::decode(&[0x10]).is_err());
    }

    #[test]
    fn unknown_and_empty_frames() {
        assert_eq!(Command::decode(&[]), Err(DecodeError::Empty));
        assert_eq!(
            Command::decode(&[0x99, 0]),
            Err(DecodeError::UnknownOpcode(0x99))
        );
    }

    #[test]
    fn trailing_bytes_ignored() {
        assert_eq!(
            Command::decode(&[0x05, 2, 0xAA, 0xBB]),
            Ok(Command::Stop { burner: 2 })
        );
    }

    #[test]
    fn system_commands_have_no_target() {
        assert_eq!(Command::GetConfig.burner(), None);
        assert_eq!(Command::SetConfig { key: 1, value: 1 }.burner(), None);
        assert_eq!(Command::Reset { burner: 3 }.burner(), Some(3));
    }
}
