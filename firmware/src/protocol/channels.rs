//! Inbound channel from the transport to the control loop.
//!
//! Transport callbacks (BLE write, serial, test harness) never touch the
//! registry.  They push onto one bounded `embassy-sync` channel, and the
//! control loop drains it between ticks, so commands and transitions
//! never interleave.
//!
//! ```text
//! ┌────────────────┐   Inbound    ┌──────────────┐
//! │ transport cb   │─────────────▶│ control loop │
//! │ (any context)  │  offer       │ try_receive  │
//! └────────────────┘              └──────────────┘
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;
use log::warn;

/// Longest accepted command frame.
pub const FRAME_CAPACITY: usize = 16;

/// Messages buffered before producers start dropping.
pub const INBOUND_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Raw command frame.
    Frame(Vec<u8, FRAME_CAPACITY>),
    /// A client connected; activates the registry.
    LinkUp,
    /// The client went away.  Burners keep running.
    LinkDown,
}

impl Inbound {
    /// Wrap raw bytes; `None` if the frame exceeds [`FRAME_CAPACITY`].
    pub fn frame(bytes: &[u8]) -> Option<Self> {
        Vec::from_slice(bytes).ok().map(Self::Frame)
    }
}

/// Bounded inbound queue plus a count of what producers had to drop.
///
/// Producers never block.  A full queue or an oversized frame is logged,
/// counted in [`dropped`](Self::dropped) and reported as `false`.
pub struct InboundChannel {
    queue: Channel<CriticalSectionRawMutex, Inbound, INBOUND_DEPTH>,
    dropped: AtomicU32,
}

impl InboundChannel {
    pub const fn new() -> Self {
        Self {
            queue: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue without blocking.
    pub fn offer(&self, msg: Inbound) -> bool {
        if self.queue.try_send(msg).is_err() {
            let total = self.record_drop();
            warn!("inbound channel full, message dropped (total={})", total);
            return false;
        }
        true
    }

    /// Wrap and enqueue a raw command frame.
    pub fn offer_frame(&self, bytes: &[u8]) -> bool {
        match Inbound::frame(bytes) {
            Some(msg) => self.offer(msg),
            None => {
                let total = self.record_drop();
                warn!(
                    "inbound frame of {} bytes exceeds {}, dropped (total={})",
                    bytes.len(),
                    FRAME_CAPACITY,
                    total
                );
                false
            }
        }
    }

    /// Consumer side, control loop only.
    pub fn try_receive(&self) -> Option<Inbound> {
        self.queue.try_receive().ok()
    }

    /// Messages refused since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn record_drop(&self) -> u32 {
        self.dropped.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }
}

impl Default for InboundChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// The firmware's single inbound channel.
pub static INBOUND: InboundChannel = InboundChannel::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_frame_refused() {
        assert!(Inbound::frame(&[0u8; FRAME_CAPACITY]).is_some());
        assert!(Inbound::frame(&[0u8; FRAME_CAPACITY + 1]).is_none());
    }

    #[test]
    fn full_channel_drops() {
        let ch = InboundChannel::new();
        for _ in 0..INBOUND_DEPTH {
            assert!(ch.offer(Inbound::LinkUp));
        }
        assert_eq!(ch.dropped(), 0);

        assert!(!ch.offer(Inbound::LinkDown));
        assert!(!ch.offer_frame(&[0x02, 0]));
        assert_eq!(ch.dropped(), 2);

        assert_eq!(ch.try_receive(), Some(Inbound::LinkUp));
    }

    #[test]
    fn oversized_frame_counted_as_drop() {
        let ch = InboundChannel::new();
        assert!(!ch.offer_frame(&[0x02; FRAME_CAPACITY + 1]));
        assert_eq!(ch.dropped(), 1);
        assert_eq!(ch.try_receive(), None);

        assert!(ch.offer_frame(&[0x02, 0]));
        assert_eq!(ch.dropped(), 1);
        assert_eq!(ch.try_receive(), Inbound::frame(&[0x02, 0]));
    }
}
