//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements     | Connects to                 |
//! |-------------|----------------|-----------------------------|
//! | `hardware`  | SensorPort     | ESP32 ADC1, e-stop GPIO     |
//! |             | ActuatorPort   | Relay GPIOs (burner 0)      |
//! | `log_sink`  | EventSink      | Serial log output           |
//! |             | FramePublisher | Serial log output           |
//! | `time`      | Clock          | ESP32 system timer          |

pub mod hardware;
pub mod log_sink;
pub mod time;
