//! Wraparound-safe millisecond timestamps.
//!
//! The controller only ever asks "how long since X?", so a 32-bit
//! millisecond counter is enough: `wrapping_sub` gives the right answer
//! across the ~49.7 day rollover as long as no single interval exceeds it.

/// Monotonic millisecond timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Millis(pub u32);

impl Millis {
    pub const ZERO: Self = Self(0);

    /// Milliseconds elapsed from `earlier` to `self`.
    pub fn since(self, earlier: Millis) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Timestamp `ms` later, wrapping.
    pub fn offset(self, ms: u32) -> Self {
        Self(self.0.wrapping_add(ms))
    }
}

/// Source of monotonic time for the control loop.
pub trait Clock {
    fn now(&self) -> Millis;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_across_rollover() {
        let before = Millis(u32::MAX - 10);
        let after = before.offset(25);
        assert_eq!(after, Millis(14));
        assert_eq!(after.since(before), 25);
    }

    #[test]
    fn elapsed_zero_for_same_instant() {
        let t = Millis(1234);
        assert_eq!(t.since(t), 0);
    }
}
