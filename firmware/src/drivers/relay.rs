//! Relay output driver for the pilot valve, main valve and igniter.
//!
//! Each relay is a plain active-HIGH GPIO on the driver board.  The driver
//! remembers the last commanded level so repeated writes of the same level
//! are skipped and callers can query what the hardware was told.
//!
//! ## Safety contract
//!
//! Sequencing (igniter cut first, main closes before pilot) is owned by
//! `ActuatorPort::apply`; this driver is a dumb actuator.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real GPIO via hw_init helpers.
//! On host/test: writes the simulated output register.

use log::debug;

use crate::drivers::hw_init;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelayState {
    Open,
    Energised,
}

pub struct RelayDriver {
    pin: i32,
    state: RelayState,
    switch_count: u32,
}

impl RelayDriver {
    /// Take ownership of `pin` and drive it LOW.
    pub fn new(pin: i32) -> Self {
        hw_init::gpio_write(pin, false);
        Self {
            pin,
            state: RelayState::Open,
            switch_count: 0,
        }
    }

    pub fn set(&mut self, on: bool) {
        let next = if on {
            RelayState::Energised
        } else {
            RelayState::Open
        };
        if next == self.state {
            return;
        }
        hw_init::gpio_write(self.pin, on);
        self.state = next;
        // Contact wear.
        self.switch_count = self.switch_count.wrapping_add(1);
        debug!("relay GPIO{} -> {:?} (switch #{})", self.pin, next, self.switch_count);
    }

    pub fn is_on(&self) -> bool {
        self.state == RelayState::Energised
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;
    use crate::drivers::hw_init::sim;

    // Pin 20 is unused by the board map, so this test doesn't race the
    // adapter tests that drive the real relay pins.
    const TEST_PIN: i32 = 20;

    #[test]
    fn repeated_level_is_not_rewritten() {
        let mut relay = RelayDriver::new(TEST_PIN);
        assert!(!relay.is_on());
        assert!(!sim::output_level(TEST_PIN));

        relay.set(true);
        relay.set(true);
        assert!(relay.is_on());
        assert!(sim::output_level(TEST_PIN));
        assert_eq!(relay.switch_count, 1);

        relay.set(false);
        assert_eq!(relay.state, RelayState::Open);
        assert!(!sim::output_level(TEST_PIN));
        assert_eq!(relay.switch_count, 2);
    }
}
