//! Fuzz target: `CommandRouter::route` against a live registry.
//!
//! Splits the input into frames (first byte of each chunk is its length)
//! and routes them in order, ticking every burner between frames.  Asserts
//! that nothing panics and the registry invariants hold after every step:
//! live burners stay within the arena, and outputs never open main gas
//! without the pilot.
//!
//! cargo fuzz run fuzz_command_router

#![no_main]

use flamewerks::config::{ControllerConfig, MAX_BURNERS};
use flamewerks::fsm::context::ActuatorIntents;
use flamewerks::protocol::router::CommandRouter;
use flamewerks::registry::BurnerRegistry;
use flamewerks::sensors::FlameReading;
use flamewerks::time::Millis;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut registry = BurnerRegistry::new(&ControllerConfig::default());
    let mut router = CommandRouter::new();
    let mut now = Millis::ZERO;
    let mut rest = data;

    while let Some((&len, tail)) = rest.split_first() {
        let take = usize::from(len % 8).min(tail.len());
        let (frame, next) = tail.split_at(take);
        rest = next;

        // High bit of the length byte doubles as a link-up event.
        if len & 0x80 != 0 {
            registry.activate();
        }
        // Bit 5 holds the e-stop open for this frame.
        router.set_estop(len & 0x20 != 0);
        let _ = router.route(frame, &mut registry, now);

        now = now.offset(u32::from(len) * 10);
        let flame = FlameReading {
            present: len & 0x40 != 0,
            filtered: u16::from(len),
        };
        for unit in registry.active_mut() {
            let _ = unit.tick(now, flame);
        }

        assert!(usize::from(registry.active_count()) <= MAX_BURNERS);
        for unit in registry.active() {
            let out: ActuatorIntents = unit.intents();
            assert!(!out.main_open || out.pilot_open);
            assert!(unit.retry_count() <= ControllerConfig::default().max_attempts);
        }
    }
});
