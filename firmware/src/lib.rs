//! FlameWerks burner controller library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod protocol;
pub mod registry;
pub mod safety;
pub mod time;

pub mod pins;

// Hardware-facing modules; target-specific code is cfg-gated inside.
pub mod adapters;
pub mod drivers;
pub mod sensors;
