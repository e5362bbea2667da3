//! Fuzz target: `Command::decode`
//!
//! Arbitrary bytes must decode or fail cleanly, and a decoded command must
//! report the opcode it was decoded from.
//!
//! cargo fuzz run fuzz_command_decode

#![no_main]

use flamewerks::protocol::command::Command;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(cmd) = Command::decode(data) {
        assert_eq!(cmd.opcode() as u8, data[0], "opcode mismatch");
        if let Some(burner) = cmd.burner() {
            assert_eq!(burner, data.get(1).copied().unwrap_or(0));
        }
    }
});
