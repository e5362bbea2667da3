//! Flame-presence filter.
//!
//! Turns the noisy flame-sense ADC into a smoothed magnitude and a boolean
//! decision.  Each burst averages `N` raw readings spaced by a short
//! busy-wait; the average then feeds a 3:1 IIR low-pass:
//!
//! ```text
//!  raw ──▶ [mean of N] ──avg──▶ filtered = filtered==0 ? avg
//!                                          : (3·filtered + avg) / 4
//!                                   │
//!                                   ▼
//!                        present = filtered >= threshold
//! ```
//!
//! There is no hysteresis band on the decision; noise rejection comes only
//! from the smoothing.
//!
//! Bursts are gated by `sample_interval_ms`.  Polling more often returns the
//! previous decision without touching the ADC, so the state machine can ask
//! every tick.

use embedded_hal::delay::DelayNs;

use crate::config::ControllerConfig;
use crate::time::Millis;

/// Output of one [`FlameFilter::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlameReading {
    pub present: bool,
    /// Smoothed ADC magnitude.
    pub filtered: u16,
}

pub struct FlameFilter {
    threshold: u16,
    interval_ms: u32,
    samples: u8,
    spacing_us: u32,
    filtered: u16,
    present: bool,
    last_burst: Option<Millis>,
}

impl FlameFilter {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            threshold: config.flame_threshold,
            interval_ms: config.sample_interval_ms,
            samples: config.samples_per_read.max(1),
            spacing_us: config.sample_spacing_us,
            filtered: 0,
            present: false,
            last_burst: None,
        }
    }

    /// Sample if the interval has elapsed, otherwise return the cached
    /// decision.  `read_raw` is called `samples_per_read` times per burst.
    pub fn poll(
        &mut self,
        now: Millis,
        mut read_raw: impl FnMut() -> u16,
        delay: &mut impl DelayNs,
    ) -> FlameReading {
        if let Some(last) = self.last_burst {
            if now.since(last) < self.interval_ms {
                return self.reading();
            }
        }
        self.last_burst = Some(now);

        let mut sum: u32 = 0;
        for i in 0..self.samples {
            sum += u32::from(read_raw());
            if i + 1 < self.samples {
                delay.delay_us(self.spacing_us);
            }
        }
        let avg = (sum / u32::from(self.samples)) as u16;
        self.feed(avg)
    }

    /// Push one burst average through the IIR and re-evaluate the decision.
    pub fn feed(&mut self, avg: u16) -> FlameReading {
        self.filtered = if self.filtered == 0 {
            avg
        } else {
            ((u32::from(self.filtered) * 3 + u32::from(avg)) / 4) as u16
        };
        self.present = self.filtered >= self.threshold;
        self.reading()
    }

    pub fn reading(&self) -> FlameReading {
        FlameReading {
            present: self.present,
            filtered: self.filtered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoDelay {
        calls: u32,
    }

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {
            self.calls += 1;
        }
    }

    fn filter() -> FlameFilter {
        FlameFilter::new(&ControllerConfig::default())
    }

    #[test]
    fn first_burst_seeds_filter() {
        let mut f = filter();
        let mut d = NoDelay { calls: 0 };
        let r = f.poll(Millis(0), || 400, &mut d);
        assert_eq!(r.filtered, 400);
        assert!(r.present);
    }

    #[test]
    fn burst_averages_samples_with_spacing() {
        let mut f = filter();
        let mut d = NoDelay { calls: 0 };
        let mut n = 0u16;
        let r = f.poll(
            Millis(0),
            || {
                n += 1;
                n * 10
            },
            &mut d,
        );
        // 10..=80 → mean 45
        assert_eq!(r.filtered, 45);
        assert_eq!(n, 8);
        assert_eq!(d.calls, 7);
    }

    #[test]
    fn polling_inside_interval_does_not_resample() {
        let mut f = filter();
        let mut d = NoDelay { calls: 0 };
        let mut reads = 0;
        f.poll(Millis(0), || 300, &mut d);
        let r = f.poll(
            Millis(50),
            || {
                reads += 1;
                0
            },
            &mut d,
        );
        assert_eq!(reads, 0);
        assert!(r.present);
        assert_eq!(r.filtered, 300);
    }

    #[test]
    fn resamples_once_interval_elapsed() {
        let mut f = filter();
        let mut d = NoDelay { calls: 0 };
        f.poll(Millis(0), || 300, &mut d);
        let r = f.poll(Millis(100), || 100, &mut d);
        assert_eq!(r.filtered, (300 * 3 + 100) / 4);
    }

    #[test]
    fn iir_weights_history_three_to_one() {
        let mut f = filter();
        f.feed(200);
        assert_eq!(f.feed(0).filtered, 150);
        assert!(f.reading().present);
        assert_eq!(f.feed(0).filtered, 112);
        assert!(!f.reading().present);
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut f = filter();
        assert!(f.feed(150).present);
        assert!(!filter().feed(149).present);
    }

    #[test]
    fn single_low_burst_does_not_drop_flame() {
        let mut f = filter();
        f.feed(250);
        assert!(f.feed(20).present); // 192
        let r = f.feed(20); // 149
        assert_eq!(r.filtered, 149);
        assert!(!r.present);
    }

}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn step_never_exceeds_quarter_of_delta(
            seed in 1u16..4096,
            inputs in proptest::collection::vec(0u16..4096, 1..64),
        ) {
            let mut f = FlameFilter::new(&ControllerConfig::default());
            f.feed(seed);
            for avg in inputs {
                let before = f.reading().filtered;
                if before == 0 {
                    f.feed(avg);
                    continue;
                }
                let after = f.feed(avg).filtered;
                let delta = u32::from(before.abs_diff(avg));
                let step = u32::from(before.abs_diff(after));
                prop_assert!(step <= delta.div_ceil(4),
                    "step {} exceeds 25% of delta {}", step, delta);
            }
        }

        #[test]
        fn steady_signal_above_threshold_stays_present_under_noise(
            level in 190u16..1000,
            noise in proptest::collection::vec(-20i32..=20, 4..40),
        ) {
            let mut f = FlameFilter::new(&ControllerConfig::default());
            for _ in 0..4 {
                f.feed(level);
            }
            prop_assert!(f.reading().present);
            for pct in noise {
                let spiked = i32::from(level) + i32::from(level) * pct / 100;
                prop_assert!(f.feed(spiked as u16).present);
            }
        }
    }
}
