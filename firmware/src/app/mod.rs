//! Application core.
//!
//! Orchestrates the registry, router and safety supervisor on a single
//! sequential loop.  All interaction with hardware and transport happens
//! through the **port traits** in [`ports`].

pub mod events;
pub mod ports;
pub mod service;
