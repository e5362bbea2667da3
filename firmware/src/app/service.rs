//! Burner controller: the hexagonal core.
//!
//! [`BurnerController`] owns the registry, router and safety supervisor and
//! runs them on one sequential path.  Each call to [`run_cycle`] is one
//! scheduling period:
//!
//! ```text
//!   e-stop sample ──▶ drain + route ──▶ supervisor tick ──▶ actuators
//!                                                               │
//!   FramePublisher ◀── status / telemetry (every status_interval)┤
//!   EventSink      ◀── operator summary  (every summary_interval)┘
//! ```
//!
//! Because commands are drained before the tick, a `Stop` received between
//! two cycles always takes effect before any further automatic transition.
//! The e-stop input is read once per cycle and the same level gates both
//! the router and the supervisor.
//!
//! [`run_cycle`]: BurnerController::run_cycle

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::{ControllerConfig, MAX_BURNERS};
use crate::error::RejectReason;
use crate::protocol::channels::{Inbound, InboundChannel};
use crate::protocol::router::{BoundaryCounters, CommandRouter, Outcome};
use crate::protocol::status::{Outbound, StatusEncoder};
use crate::registry::BurnerRegistry;
use crate::safety::SafetySupervisor;
use crate::time::Millis;

use super::events::{BurnerSnapshot, ControllerEvent};
use super::ports::{ActuatorPort, EventSink, FramePublisher, SensorPort};

pub struct BurnerController {
    config: ControllerConfig,
    registry: BurnerRegistry,
    router: CommandRouter,
    supervisor: SafetySupervisor,
    last_status: Option<Millis>,
    last_summary: Option<Millis>,
}

impl BurnerController {
    pub fn new(config: ControllerConfig) -> Self {
        let registry = BurnerRegistry::new(&config);
        let supervisor = SafetySupervisor::new(&config);
        Self {
            config,
            registry,
            router: CommandRouter::new(),
            supervisor,
            last_status: None,
            last_summary: None,
        }
    }

    pub fn start(&mut self, sink: &mut impl EventSink) {
        info!(
            "controller started: capacity={}, pilot_stage={}, tick={}ms",
            MAX_BURNERS, self.config.pilot_stage, self.config.tick_period_ms
        );
        sink.emit(&ControllerEvent::Started {
            capacity: MAX_BURNERS as u8,
        });
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// One scheduling period: commands, tick, actuators, status, summary.
    ///
    /// `hw` satisfies both [`SensorPort`] and [`ActuatorPort`] so the
    /// hardware adapter is borrowed once.
    pub fn run_cycle(
        &mut self,
        now: Millis,
        inbound: &InboundChannel,
        hw: &mut (impl SensorPort + ActuatorPort),
        delay: &mut impl DelayNs,
        publisher: &mut impl FramePublisher,
        sink: &mut impl EventSink,
    ) {
        let estop = hw.estop_asserted();

        // 1. Commands first, in arrival order.
        self.router.set_estop(estop);
        while let Some(msg) = inbound.try_receive() {
            self.handle_inbound(msg, now, publisher, sink);
        }

        // 2. E-stop + burner ticks.
        self.supervisor
            .tick(now, estop, &mut self.registry, hw, delay, sink);

        // 3. Outputs follow state.
        self.apply_actuators(hw);

        // 4. Periodic status push.
        if due(self.last_status, now, self.config.status_interval_ms) {
            self.last_status = Some(now);
            self.publish_status(now, hw, publisher);
        }

        // 5. Operator summary.
        if due(self.last_summary, now, self.config.summary_interval_ms) {
            self.last_summary = Some(now);
            self.emit_summary(inbound.dropped(), sink);
        }
    }

    /// Apply one inbound message.  Replies go out immediately.
    pub fn handle_inbound(
        &mut self,
        msg: Inbound,
        now: Millis,
        publisher: &mut impl FramePublisher,
        sink: &mut impl EventSink,
    ) {
        match msg {
            Inbound::Frame(frame) => {
                let result = self.router.route(&frame, &mut self.registry, now);
                self.report(result, publisher, sink);
            }
            Inbound::LinkUp => {
                if self.registry.activate() {
                    sink.emit(&ControllerEvent::Activated {
                        burners: self.registry.active_count(),
                    });
                }
            }
            Inbound::LinkDown => {
                warn!("link lost, burners continue under local supervision");
                sink.emit(&ControllerEvent::LinkLost);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn registry(&self) -> &BurnerRegistry {
        &self.registry
    }

    pub fn counters(&self) -> BoundaryCounters {
        self.router.counters()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn estop_active(&self) -> bool {
        self.supervisor.estop_active()
    }

    // ── Internal ──────────────────────────────────────────────

    fn report(
        &mut self,
        result: Result<Outcome, RejectReason>,
        publisher: &mut impl FramePublisher,
        sink: &mut impl EventSink,
    ) {
        match result {
            Ok(outcome) => {
                publisher.publish(&StatusEncoder::response(Ok(())));
                match outcome {
                    Outcome::Ack => {}
                    Outcome::Transition(t) => sink.emit(&t.into()),
                    Outcome::ConfigRequested => self.publish_config(publisher),
                }
            }
            Err(reason) => {
                publisher.publish(&StatusEncoder::response(Err(reason)));
                sink.emit(&ControllerEvent::CommandRejected {
                    reason,
                    counters: self.router.counters(),
                });
            }
        }
    }

    fn publish_config(&self, publisher: &mut impl FramePublisher) {
        match StatusEncoder::config(self.registry.system(), self.config.pilot_stage) {
            Ok(bytes) => publisher.publish(&Outbound::Config(bytes)),
            Err(e) => warn!("config frame encode failed: {}", e),
        }
    }

    fn emit_summary(&self, inbound_dropped: u32, sink: &mut impl EventSink) {
        let system = self.registry.system();
        sink.emit(&ControllerEvent::Summary {
            active: self.registry.active_count(),
            armed: system.armed,
            estop: self.supervisor.estop_active(),
            last_fault_code: system.last_fault_code,
            inbound_dropped,
        });
        for unit in self.registry.active() {
            sink.emit(&ControllerEvent::BurnerSummary(BurnerSnapshot::from(unit)));
        }
    }

    fn publish_status(
        &self,
        now: Millis,
        hw: &mut impl SensorPort,
        publisher: &mut impl FramePublisher,
    ) {
        let Some(unit) = self.registry.addressed() else {
            return;
        };
        let burner = unit.index();
        publisher.publish(&Outbound::Status {
            burner,
            frame: StatusEncoder::status(unit, self.registry.system(), now),
        });
        publisher.publish(&Outbound::Telemetry {
            burner,
            frame: StatusEncoder::telemetry(unit, &hw.board()),
        });
    }

    /// Translate every live burner's intents into port calls.
    fn apply_actuators(&self, hw: &mut impl ActuatorPort) {
        for unit in self.registry.active() {
            hw.apply(unit.index(), unit.intents());
        }
    }
}

fn due(last: Option<Millis>, now: Millis, interval_ms: u32) -> bool {
    last.is_none_or(|last| now.since(last) >= interval_ms)
}
