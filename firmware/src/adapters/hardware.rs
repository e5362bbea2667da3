//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the three burner-0 relays and exposes them, together with the
//! flame ADC and the e-stop input, through [`SensorPort`] and
//! [`ActuatorPort`].  This is the only module in the system that touches
//! actual hardware.  On non-espidf targets the underlying helpers use
//! cfg-gated simulation atomics.
//!
//! The board has one set of relays and one flame input.  Burners other
//! than 0 are virtual: their outputs are tracked in memory and they all map
//! to flame channel 0, so the ADC is burst-sampled once per interval no
//! matter how many burners are live.

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::config::MAX_BURNERS;
use crate::drivers::hw_init;
use crate::drivers::relay::RelayDriver;
use crate::fsm::context::ActuatorIntents;
use crate::pins;
use crate::sensors::BoardSnapshot;

/// Burner whose outputs are wired to the physical relays.
pub const PHYSICAL_BURNER: u8 = 0;

/// The only flame-sense input on the board.
pub const FLAME_CHANNEL: u8 = 0;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    pilot: RelayDriver,
    main: RelayDriver,
    igniter: RelayDriver,
    virtual_outputs: [ActuatorIntents; MAX_BURNERS],
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareAdapter {
    /// Requires `hw_init::init_peripherals()` to have run on target.
    pub fn new() -> Self {
        Self {
            pilot: RelayDriver::new(pins::PILOT_VALVE_GPIO),
            main: RelayDriver::new(pins::MAIN_VALVE_GPIO),
            igniter: RelayDriver::new(pins::IGNITER_GPIO),
            virtual_outputs: [ActuatorIntents::all_off(); MAX_BURNERS],
        }
    }

    /// Last commanded outputs for `burner`.
    pub fn outputs(&self, burner: u8) -> ActuatorIntents {
        if burner == PHYSICAL_BURNER {
            return ActuatorIntents {
                pilot_open: self.pilot.is_on(),
                main_open: self.main.is_on(),
                ignition_active: self.igniter.is_on(),
            };
        }
        self.virtual_outputs
            .get(burner as usize)
            .copied()
            .unwrap_or_default()
    }

    fn virtual_slot(&mut self, burner: u8) -> Option<&mut ActuatorIntents> {
        self.virtual_outputs.get_mut(burner as usize)
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn flame_channel(&self, _burner: u8) -> u8 {
        FLAME_CHANNEL
    }

    fn read_flame_raw(&mut self, _channel: u8) -> u16 {
        hw_init::adc1_read(pins::FLAME_ADC1_CHANNEL)
    }

    fn estop_asserted(&mut self) -> bool {
        // NC loop with pull-up: HIGH means the loop is open.
        hw_init::gpio_read(pins::ESTOP_GPIO)
    }

    fn board(&mut self) -> BoardSnapshot {
        BoardSnapshot::default()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_pilot_valve(&mut self, burner: u8, open: bool) {
        if burner == PHYSICAL_BURNER {
            self.pilot.set(open);
        } else if let Some(slot) = self.virtual_slot(burner) {
            slot.pilot_open = open;
        }
    }

    fn set_main_valve(&mut self, burner: u8, open: bool) {
        if burner == PHYSICAL_BURNER {
            self.main.set(open);
        } else if let Some(slot) = self.virtual_slot(burner) {
            slot.main_open = open;
        }
    }

    fn set_ignition(&mut self, burner: u8, active: bool) {
        if burner == PHYSICAL_BURNER {
            self.igniter.set(active);
        } else if let Some(slot) = self.virtual_slot(burner) {
            slot.ignition_active = active;
        }
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;
    use crate::drivers::hw_init::sim;
    use crate::fsm::BurnerState;

    // Single test: the sim register is process-global.
    #[test]
    fn physical_and_virtual_outputs_follow_intents() {
        let mut hw = HardwareAdapter::new();

        hw.apply(0, ActuatorIntents::for_state(BurnerState::PilotIgniting));
        assert!(sim::output_level(pins::PILOT_VALVE_GPIO));
        assert!(sim::output_level(pins::IGNITER_GPIO));
        assert!(!sim::output_level(pins::MAIN_VALVE_GPIO));

        hw.apply(0, ActuatorIntents::for_state(BurnerState::MainOn));
        assert!(sim::output_level(pins::MAIN_VALVE_GPIO));
        assert!(!sim::output_level(pins::IGNITER_GPIO));

        hw.apply(7, ActuatorIntents::for_state(BurnerState::PilotIgniting));
        assert!(hw.outputs(7).ignition_active);
        // Virtual burners never touch the physical relays.
        assert!(!sim::output_level(pins::IGNITER_GPIO));

        // Out-of-range burner is ignored.
        hw.set_pilot_valve(200, true);
        assert_eq!(hw.outputs(200), ActuatorIntents::all_off());

        sim::set_flame_adc(321);
        assert_eq!(hw.flame_channel(0), FLAME_CHANNEL);
        assert_eq!(hw.flame_channel(39), FLAME_CHANNEL);
        assert_eq!(hw.read_flame_raw(FLAME_CHANNEL), 321);
        sim::set_estop_open(true);
        assert!(hw.estop_asserted());
        sim::set_estop_open(false);
        assert!(!hw.estop_asserted());

        hw.apply(0, ActuatorIntents::all_off());
        hw.apply(7, ActuatorIntents::all_off());
        assert!(!sim::output_level(pins::PILOT_VALVE_GPIO));
        assert!(!sim::output_level(pins::MAIN_VALVE_GPIO));
        assert_eq!(hw.outputs(7), ActuatorIntents::all_off());
    }
}
