//! Controller configuration parameters
//!
//! All tunable timing, threshold and retry parameters for the burner
//! controller.  Defaults match the shipped ESP32-C6 firmware.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fixed capacity of the burner arena.  Units beyond the active count are
/// inert and never ticked.
pub const MAX_BURNERS: usize = 40;

/// Longest busy-wait one control cycle may spend inside a flame burst (µs).
/// With one shared flame input this bounds the whole cycle, not one burner.
pub const MAX_SAMPLE_BUSY_WAIT_US: u32 = 1_600;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Ignition sequence ---
    /// Time allowed in PilotIgniting before the attempt counts as failed (ms)
    pub ignition_timeout_ms: u32,
    /// Mandatory wait in Flameout before the next attempt (ms)
    pub cooldown_ms: u32,
    /// Ignition attempts before the unit latches Fault
    pub max_attempts: u8,
    /// Include the PilotEstablished stage (multi-burner variant)
    pub pilot_stage: bool,

    // --- Flame sensing ---
    /// Filtered ADC count at or above which flame is present
    pub flame_threshold: u16,
    /// Minimum interval between flame sample bursts (ms)
    pub sample_interval_ms: u32,
    /// Raw readings averaged per burst
    pub samples_per_read: u8,
    /// Busy-wait between readings inside a burst (µs)
    pub sample_spacing_us: u32,

    // --- Scheduling ---
    /// Control loop period (ms)
    pub tick_period_ms: u32,
    /// Status / telemetry push interval (ms)
    pub status_interval_ms: u32,
    /// Operator summary interval (ms)
    pub summary_interval_ms: u32,
    /// Burner count applied at the first activation unless reconfigured
    pub default_burner_count: u8,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Ignition
            ignition_timeout_ms: 5_000,
            cooldown_ms: 3_000,
            max_attempts: 3,
            pilot_stage: true,

            // Flame sensing
            flame_threshold: 150,
            sample_interval_ms: 100, // 10 Hz
            samples_per_read: 8,
            sample_spacing_us: 200, // 8 × 200 µs ≈ 1.6 ms burst

            // Scheduling
            tick_period_ms: 10,       // 100 Hz
            status_interval_ms: 100, // 10 Hz
            summary_interval_ms: 15_000,
            default_burner_count: 1,
        }
    }
}

impl ControllerConfig {
    /// Reject parameter sets that would break the safety sequence.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ignition_timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration("ignition_timeout_ms"));
        }
        if self.cooldown_ms == 0 {
            return Err(ConfigError::ZeroDuration("cooldown_ms"));
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ZeroDuration("tick_period_ms"));
        }
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("sample_interval_ms"));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::OutOfRange("max_attempts"));
        }
        if self.samples_per_read == 0 {
            return Err(ConfigError::OutOfRange("samples_per_read"));
        }
        if self.burst_busy_wait_us() > MAX_SAMPLE_BUSY_WAIT_US {
            return Err(ConfigError::OutOfRange("sample_spacing_us"));
        }
        if self.status_interval_ms < self.tick_period_ms {
            return Err(ConfigError::OutOfRange("status_interval_ms"));
        }
        if self.summary_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("summary_interval_ms"));
        }
        if self.default_burner_count == 0 || usize::from(self.default_burner_count) > MAX_BURNERS
        {
            return Err(ConfigError::OutOfRange("default_burner_count"));
        }
        Ok(())
    }

    /// Busy-wait inside one burst: the gaps between its samples.
    pub fn burst_busy_wait_us(&self) -> u32 {
        u32::from(self.samples_per_read.saturating_sub(1)).saturating_mul(self.sample_spacing_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = ControllerConfig::default();
        assert!(c.validate().is_ok());
        assert!(c.ignition_timeout_ms > c.sample_interval_ms);
        assert!(c.cooldown_ms > 0);
        assert!(c.max_attempts > 0);
    }

    #[test]
    fn default_burst_within_cycle_budget() {
        let c = ControllerConfig::default();
        assert_eq!(c.burst_busy_wait_us(), 1_400);
        assert!(c.burst_busy_wait_us() <= MAX_SAMPLE_BUSY_WAIT_US);
        assert!(MAX_SAMPLE_BUSY_WAIT_US < c.tick_period_ms * 1_000);
    }

    #[test]
    fn oversized_burst_rejected() {
        let c = ControllerConfig {
            samples_per_read: 32,
            ..ControllerConfig::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::OutOfRange("sample_spacing_us"))
        );
    }

    #[test]
    fn zero_timeout_rejected() {
        let c = ControllerConfig {
            ignition_timeout_ms: 0,
            ..ControllerConfig::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::ZeroDuration("ignition_timeout_ms"))
        );
    }

    #[test]
    fn burner_count_bounds() {
        let mut c = ControllerConfig::default();
        c.default_burner_count = 0;
        assert!(c.validate().is_err());
        c.default_burner_count = MAX_BURNERS as u8;
        assert!(c.validate().is_ok());
        c.default_burner_count = MAX_BURNERS as u8 + 1;
        assert!(c.validate().is_err());
    }

    #[test]
    fn status_faster_than_tick_rejected() {
        let c = ControllerConfig {
            status_interval_ms: 5,
            ..ControllerConfig::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::OutOfRange("status_interval_ms"))
        );
    }

    #[test]
    fn serde_roundtrip() {
        let c = ControllerConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: ControllerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = ControllerConfig {
            pilot_stage: false,
            max_attempts: 5,
            ..ControllerConfig::default()
        };
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: ControllerConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c, c2);
    }
}
