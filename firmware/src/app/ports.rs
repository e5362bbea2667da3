//! Port traits: the boundary between the controller and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BurnerController (domain)
//! ```
//!
//! Hardware, transport and logging adapters implement these traits.  The
//! [`BurnerController`](super::service::BurnerController) takes them as
//! generics, so the core never touches GPIO, ADC or radios directly.

use crate::fsm::context::ActuatorIntents;
use crate::protocol::status::Outbound;
use crate::sensors::BoardSnapshot;

// ───────────────────────────────────────────────────────────────
// Sensor port (hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait SensorPort {
    /// Physical flame input that `burner` is sensed on.  Burners mapped to
    /// the same channel share one filter, so the input is sampled once per
    /// interval however many burners watch it.
    fn flame_channel(&self, burner: u8) -> u8 {
        burner
    }

    /// One raw flame-sense ADC count from `channel`.  Called `N` times per
    /// filter burst.
    fn read_flame_raw(&mut self, channel: u8) -> u16;

    /// True while the normally-closed e-stop loop is open.
    fn estop_asserted(&mut self) -> bool;

    /// Board health readings for telemetry.
    fn board(&mut self) -> BoardSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait ActuatorPort {
    fn set_pilot_valve(&mut self, burner: u8, open: bool);

    fn set_main_valve(&mut self, burner: u8, open: bool);

    fn set_ignition(&mut self, burner: u8, active: bool);

    /// Drive one burner's outputs to match its intents.  Main closes
    /// before the pilot, and the igniter is cut first.
    fn apply(&mut self, burner: u8, intents: ActuatorIntents) {
        if !intents.ignition_active {
            self.set_ignition(burner, false);
        }
        if !intents.main_open {
            self.set_main_valve(burner, false);
        }
        self.set_pilot_valve(burner, intents.pilot_open);
        if intents.main_open {
            self.set_main_valve(burner, true);
        }
        if intents.ignition_active {
            self.set_ignition(burner, true);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Frame publisher (domain → transport)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget push of outbound frames.  A lost frame must not affect
/// the controller, so there is no error path.
pub trait FramePublisher {
    fn publish(&mut self, frame: &Outbound);
}

// ───────────────────────────────────────────────────────────────
// Event sink (domain → logging)
// ───────────────────────────────────────────────────────────────

pub trait EventSink {
    fn emit(&mut self, event: &super::events::ControllerEvent);
}
