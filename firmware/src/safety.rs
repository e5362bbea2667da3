//! Safety supervisor: the per-cycle tick driver.
//!
//! Runs once per scheduling period, after pending commands are applied:
//!
//! 1. Act on the e-stop level sampled at the start of the cycle.  If
//!    asserted, every live burner is forced `Off` (retries cleared, valves
//!    closed), the system is disarmed, and nothing else runs this cycle.
//! 2. Otherwise each live burner, in index order, takes the reading of the
//!    flame channel it is mapped to and evaluates its transition table
//!    exactly once.
//! 3. Fault codes raised by handlers are copied into the system-wide
//!    `last_fault_code`.
//!
//! Filters belong to physical channels, not burners.  On a board with one
//! flame input every burner maps to channel 0, so a cycle costs at most one
//! burst of busy-wait regardless of the live count.
//!
//! Burners are independent; the fixed order only makes runs reproducible.

use embedded_hal::delay::DelayNs;
use log::{error, info};

use crate::app::events::ControllerEvent;
use crate::app::ports::{EventSink, SensorPort};
use crate::config::{ControllerConfig, MAX_BURNERS};
use crate::registry::BurnerRegistry;
use crate::sensors::{FlameFilter, FlameReading};
use crate::time::Millis;

pub struct SafetySupervisor {
    /// E-stop level seen on the previous cycle, for edge reporting.
    estop_active: bool,
    /// One filter per physical flame channel.
    filters: [FlameFilter; MAX_BURNERS],
}

impl SafetySupervisor {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            estop_active: false,
            filters: core::array::from_fn(|_| FlameFilter::new(config)),
        }
    }

    pub fn estop_active(&self) -> bool {
        self.estop_active
    }

    pub fn tick(
        &mut self,
        now: Millis,
        estop: bool,
        registry: &mut BurnerRegistry,
        hw: &mut impl SensorPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) {
        if estop {
            self.emergency_shutdown(now, registry, sink);
            return;
        }
        if self.estop_active {
            self.estop_active = false;
            info!("E-STOP released, burners remain off until commanded");
            sink.emit(&ControllerEvent::EstopReleased);
        }

        for idx in 0..registry.active().len() {
            let fault = {
                let unit = &mut registry.active_mut()[idx];
                let burner = unit.index();
                let channel = hw.flame_channel(burner);
                let reading = match self.filters.get_mut(usize::from(channel)) {
                    Some(filter) => filter.poll(now, || hw.read_flame_raw(channel), delay),
                    None => {
                        error!("burner {}: flame channel {} unmapped, reading dark", burner, channel);
                        FlameReading::default()
                    }
                };
                if let Some(t) = unit.tick(now, reading) {
                    sink.emit(&t.into());
                }
                unit.take_fault().map(|code| (burner, code))
            };
            if let Some((burner, code)) = fault {
                registry.record_fault(code);
                sink.emit(&ControllerEvent::FaultRaised { burner, code });
            }
        }
    }

    fn emergency_shutdown(
        &mut self,
        now: Millis,
        registry: &mut BurnerRegistry,
        sink: &mut impl EventSink,
    ) {
        let mut stopped = 0u8;
        for unit in registry.active_mut() {
            if let Some(t) = unit.force_off(now) {
                stopped += 1;
                sink.emit(&t.into());
            }
        }
        registry.disarm();

        if !self.estop_active {
            self.estop_active = true;
            error!("E-STOP asserted, {} burner(s) shut down", stopped);
            sink.emit(&ControllerEvent::EmergencyStop {
                burners_stopped: stopped,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_SAMPLE_BUSY_WAIT_US;
    use crate::fsm::BurnerState;
    use crate::fsm::context::FaultCode;
    use crate::sensors::BoardSnapshot;

    struct Bench {
        flame: u16,
        /// Every burner sensed on channel 0, like the single-input board.
        shared_input: bool,
        reads: Vec<u8>,
    }

    impl SensorPort for Bench {
        fn flame_channel(&self, burner: u8) -> u8 {
            if self.shared_input { 0 } else { burner }
        }
        fn read_flame_raw(&mut self, channel: u8) -> u16 {
            self.reads.push(channel);
            self.flame
        }
        fn estop_asserted(&mut self) -> bool {
            false
        }
        fn board(&mut self) -> BoardSnapshot {
            BoardSnapshot::default()
        }
    }

    struct NoDelay;
    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Accumulates requested busy-wait.
    #[derive(Default)]
    struct BusyWait {
        total_ns: u64,
    }
    impl DelayNs for BusyWait {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    #[derive(Default)]
    struct Events(Vec<ControllerEvent>);
    impl EventSink for Events {
        fn emit(&mut self, event: &ControllerEvent) {
            self.0.push(event.clone());
        }
    }

    fn live(count: u8) -> BurnerRegistry {
        let mut r = BurnerRegistry::new(&ControllerConfig::default());
        r.configure(count).unwrap();
        r.activate();
        r
    }

    fn bench(flame: u16) -> Bench {
        Bench {
            flame,
            shared_input: false,
            reads: Vec::new(),
        }
    }

    fn supervisor() -> SafetySupervisor {
        SafetySupervisor::new(&ControllerConfig::default())
    }

    #[test]
    fn ticks_units_in_index_order() {
        let mut r = live(3);
        let mut hw = bench(0);
        let mut sup = supervisor();
        sup.tick(Millis(0), false, &mut r, &mut hw, &mut NoDelay, &mut Events::default());
        let expected: Vec<u8> = [0u8, 1, 2]
            .iter()
            .flat_map(|&b| std::iter::repeat_n(b, 8))
            .collect();
        assert_eq!(hw.reads, expected);
    }

    #[test]
    fn inactive_units_never_sampled() {
        let mut r = BurnerRegistry::new(&ControllerConfig::default());
        let mut hw = bench(0);
        supervisor().tick(Millis(0), false, &mut r, &mut hw, &mut NoDelay, &mut Events::default());
        assert!(hw.reads.is_empty());
    }

    #[test]
    fn full_arena_on_one_input_costs_one_burst() {
        let mut r = live(MAX_BURNERS as u8);
        let mut hw = bench(400);
        hw.shared_input = true;
        let mut sup = supervisor();

        for now in [0u32, 10, 100, 250] {
            let mut wait = BusyWait::default();
            hw.reads.clear();
            sup.tick(Millis(now), false, &mut r, &mut hw, &mut wait, &mut Events::default());
            assert!(
                wait.total_ns <= u64::from(MAX_SAMPLE_BUSY_WAIT_US) * 1_000,
                "t={now}: {} ns of busy-wait with {} burners",
                wait.total_ns,
                MAX_BURNERS
            );
            assert!(hw.reads.len() <= 8, "t={now}: {} ADC reads", hw.reads.len());
        }

        // The shared reading reaches every unit.
        assert!(r.active().iter().all(|u| u.flame_present()));
        assert!(r.active().iter().all(|u| u.last_flame_reading() == 400));
    }

    #[test]
    fn shared_channel_sampled_once_per_interval() {
        let mut r = live(4);
        let mut hw = bench(400);
        hw.shared_input = true;
        let mut sup = supervisor();
        let mut events = Events::default();

        sup.tick(Millis(0), false, &mut r, &mut hw, &mut NoDelay, &mut events);
        sup.tick(Millis(50), false, &mut r, &mut hw, &mut NoDelay, &mut events);
        assert_eq!(hw.reads.len(), 8);
        sup.tick(Millis(100), false, &mut r, &mut hw, &mut NoDelay, &mut events);
        assert_eq!(hw.reads.len(), 16);
        assert!(hw.reads.iter().all(|&ch| ch == 0));
    }

    #[test]
    fn estop_forces_every_unit_off_once() {
        let mut r = live(2);
        r.arm(0).unwrap();
        r.get_mut(0).unwrap().ignite(Millis(0)).unwrap();
        r.get_mut(1).unwrap().ignite(Millis(0)).unwrap();

        let mut hw = bench(500);
        let mut sup = supervisor();
        let mut events = Events::default();
        sup.tick(Millis(10), true, &mut r, &mut hw, &mut NoDelay, &mut events);

        assert!(r.active().iter().all(|u| u.state() == BurnerState::Off));
        assert!(!r.system().armed);
        assert!(hw.reads.is_empty(), "no sampling while e-stop asserted");
        assert!(events.0.contains(&ControllerEvent::EmergencyStop { burners_stopped: 2 }));

        let mut events = Events::default();
        sup.tick(Millis(20), true, &mut r, &mut hw, &mut NoDelay, &mut events);
        assert!(events.0.is_empty(), "e-stop reported on the edge only");

        sup.tick(Millis(30), false, &mut r, &mut hw, &mut NoDelay, &mut events);
        assert_eq!(events.0, vec![ControllerEvent::EstopReleased]);
        assert_eq!(r.get(0).unwrap().state(), BurnerState::Off);
    }

    #[test]
    fn fault_code_propagates_to_system() {
        let mut r = live(1);
        let mut hw = bench(400);
        let mut sup = supervisor();
        let mut events = Events::default();

        r.get_mut(0).unwrap().ignite(Millis(0)).unwrap();
        sup.tick(Millis(10), false, &mut r, &mut hw, &mut NoDelay, &mut events);
        r.get_mut(0).unwrap().open_main(Millis(10)).unwrap();

        // Three dark bursts pull the filter under threshold.
        hw.flame = 0;
        let mut now = 10;
        while r.get(0).unwrap().state() == BurnerState::MainOn {
            now += 100;
            sup.tick(Millis(now), false, &mut r, &mut hw, &mut NoDelay, &mut events);
        }
        assert_eq!(r.get(0).unwrap().state(), BurnerState::Flameout);
        assert_eq!(r.system().last_fault_code, FaultCode::FlameLost.code());
        assert!(events.0.contains(&ControllerEvent::FaultRaised {
            burner: 0,
            code: FaultCode::FlameLost
        }));
    }
}
