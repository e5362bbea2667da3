//! Remote command/status protocol.
//!
//! | Module     | Role                                          |
//! |------------|-----------------------------------------------|
//! | `command`  | frame → [`Command`](command::Command)         |
//! | `router`   | validate + apply to the registry, counters    |
//! | `status`   | status / telemetry / config / response frames |
//! | `channels` | inbound channel from transport callbacks      |

pub mod channels;
pub mod command;
pub mod router;
pub mod status;
