//! Log-based adapters.
//!
//! [`LogEventSink`] renders controller events to the ESP-IDF logger (UART /
//! USB-CDC in production).  [`LogFramePublisher`] stands in for a radio
//! transport by logging outbound frames.

use log::{debug, error, info, warn};

use crate::app::events::ControllerEvent;
use crate::app::ports::{EventSink, FramePublisher};
use crate::protocol::status::Outbound;

/// Adapter that logs every [`ControllerEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &ControllerEvent) {
        match event {
            ControllerEvent::Started { capacity } => {
                info!("START | capacity={}", capacity);
            }
            ControllerEvent::Activated { burners } => {
                info!("LINK  | activated burners={}", burners);
            }
            ControllerEvent::StateChanged { burner, from, to } => {
                info!("STATE | burner={} | {:?} -> {:?}", burner, from, to);
            }
            ControllerEvent::FaultRaised { burner, code } => {
                warn!("FAULT | burner={} code={:?} ({})", burner, code, code.code());
            }
            ControllerEvent::CommandRejected { reason, counters } => {
                warn!(
                    "REJECT | {} | unknown={} malformed={} range={} state={}",
                    reason,
                    counters.unknown_opcode,
                    counters.malformed,
                    counters.out_of_range,
                    counters.rejected
                );
            }
            ControllerEvent::EmergencyStop { burners_stopped } => {
                error!("ESTOP | asserted, stopped={}", burners_stopped);
            }
            ControllerEvent::EstopReleased => {
                info!("ESTOP | released");
            }
            ControllerEvent::LinkLost => {
                info!("LINK  | lost");
            }
            ControllerEvent::Summary { active: 0, .. } => {
                info!("SUMMARY | not initialized");
            }
            ControllerEvent::Summary {
                active,
                armed,
                estop,
                last_fault_code,
                inbound_dropped,
            } => {
                info!(
                    "SUMMARY | burners={} armed={} estop={} fault={} dropped={}",
                    active, armed, estop, last_fault_code, inbound_dropped
                );
            }
            ControllerEvent::BurnerSummary(b) => {
                info!(
                    "SUMMARY | burner={} {} flame={} reading={} pilot={} main={} retry={}",
                    b.burner,
                    b.state.name(),
                    on_off(b.flame_present),
                    b.reading,
                    on_off(b.pilot_open),
                    on_off(b.main_open),
                    b.retry_count
                );
            }
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "ON" } else { "OFF" }
}

/// Publisher that logs frames instead of transmitting them.
#[derive(Default)]
pub struct LogFramePublisher {
    published: u32,
}

impl LogFramePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> u32 {
        self.published
    }
}

impl FramePublisher for LogFramePublisher {
    fn publish(&mut self, frame: &Outbound) {
        self.published = self.published.wrapping_add(1);
        match frame {
            Outbound::Status { burner, frame } => debug!("TX status[{}] {:02X?}", burner, frame),
            Outbound::Telemetry { burner, frame } => {
                debug!("TX telem[{}] {:02X?}", burner, frame);
            }
            Outbound::Config(bytes) => info!("TX config {:02X?}", bytes.as_slice()),
            Outbound::Response { accepted, message } => {
                info!("TX response accepted={} \"{}\"", accepted, message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::events::BurnerSnapshot;
    use crate::fsm::BurnerState;
    use crate::protocol::status::StatusEncoder;

    #[test]
    fn summary_flags_render_as_on_off() {
        assert_eq!(on_off(true), "ON");
        assert_eq!(on_off(false), "OFF");

        let mut sink = LogEventSink::new();
        sink.emit(&ControllerEvent::Summary {
            active: 0,
            armed: false,
            estop: false,
            last_fault_code: 0,
            inbound_dropped: 0,
        });
        sink.emit(&ControllerEvent::BurnerSummary(BurnerSnapshot {
            burner: 3,
            state: BurnerState::MainOn,
            flame_present: true,
            reading: 512,
            pilot_open: true,
            main_open: true,
            retry_count: 0,
        }));
    }

    #[test]
    fn publisher_counts_frames() {
        let mut p = LogFramePublisher::new();
        p.publish(&StatusEncoder::response(Ok(())));
        p.publish(&Outbound::Status {
            burner: 0,
            frame: [0; 8],
        });
        assert_eq!(p.published(), 2);
    }
}
