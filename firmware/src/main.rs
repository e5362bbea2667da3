//! FlameWerks firmware entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LogEventSink   LogFramePublisher           │
//! │  (Sensor+Actuator)  (EventSink)    (FramePublisher)            │
//! │  MonotonicClock     INBOUND channel (transport → loop)         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           BurnerController (pure logic)                │    │
//! │  │  Router · Registry · FSM · SafetySupervisor            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use esp_idf_hal::delay::{Ets, FreeRtos};
use log::{info, warn};

use flamewerks::adapters::hardware::HardwareAdapter;
use flamewerks::adapters::log_sink::{LogEventSink, LogFramePublisher};
use flamewerks::adapters::time::MonotonicClock;
use flamewerks::app::service::BurnerController;
use flamewerks::config::ControllerConfig;
use flamewerks::drivers::hw_init;
use flamewerks::protocol::channels::{INBOUND, Inbound};
use flamewerks::time::Clock;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  FlameWerks v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config ─────────────────────────────────────────────
    let config = ControllerConfig::default();
    config
        .validate()
        .map_err(|e| anyhow!("invalid controller config: {}", e))?;

    // ── 3. Peripherals (relays driven LOW first) ──────────────
    hw_init::init_peripherals().map_err(|e| anyhow!("HAL init failed: {}", e))?;

    let clock = MonotonicClock::new();
    let mut hw = HardwareAdapter::new();
    let mut delay = Ets;
    let mut sink = LogEventSink::new();
    let mut publisher = LogFramePublisher::new();

    // ── 4. Controller ─────────────────────────────────────────
    let tick_ms = config.tick_period_ms;
    let mut controller = BurnerController::new(config);
    controller.start(&mut sink);

    // Wired deployment: the link is up as soon as we boot.
    if !INBOUND.offer(Inbound::LinkUp) {
        warn!("inbound queue full at boot, activation deferred");
    }

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        controller.run_cycle(
            clock.now(),
            &INBOUND,
            &mut hw,
            &mut delay,
            &mut publisher,
            &mut sink,
        );
        FreeRtos::delay_ms(tick_ms);
    }
}
