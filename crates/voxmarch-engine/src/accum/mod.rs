//! Progressive accumulation bookkeeping.

/// Frame and sample counters for progressive accumulation.
///
/// Per frame the caller handles input (which may [`invalidate`](Self::invalidate)),
/// calls [`tick`](Self::tick), then dispatches the trace with the resulting
/// counters. The kernel blends each new estimate into the image with weight
/// `1 / sample_count`, so a `sample_count` of 1 overwrites whatever was there
/// and the image always holds the mean of every sample since the last reset.
///
/// A new accumulator has nothing accumulated, so it starts with a reset pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameAccumulator {
    global_frame_count: u64,
    sample_count: u32,
    reset_pending: bool,
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self {
            global_frame_count: 0,
            sample_count: 1,
            reset_pending: true,
        }
    }

    /// Frames rendered since startup. Never reset; seeds per-frame jitter.
    #[inline]
    pub fn global_frame_count(&self) -> u64 {
        self.global_frame_count
    }

    /// Samples in the image once the current frame's dispatch lands, starting at 1.
    #[inline]
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    #[inline]
    pub fn reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Restarts the running average at the next [`tick`](Self::tick).
    pub fn invalidate(&mut self) {
        self.sample_count = 1;
        self.reset_pending = true;
    }

    /// Advances to the next frame. Call once per frame, before the dispatch.
    pub fn tick(&mut self) {
        self.global_frame_count = self.global_frame_count.wrapping_add(1);
        if self.reset_pending {
            self.reset_pending = false;
            self.sample_count = 1;
        } else {
            self.sample_count = self.sample_count.saturating_add(1);
        }
    }
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── counters ──────────────────────────────────────────────────────────

    #[test]
    fn starts_at_one_sample() {
        let acc = FrameAccumulator::new();
        assert_eq!(acc.sample_count(), 1);
        assert_eq!(acc.global_frame_count(), 0);
        assert!(acc.reset_pending());
    }

    #[test]
    fn tick_increments_sample_count_by_one() {
        let mut acc = FrameAccumulator::new();
        for expected in 1..50 {
            acc.tick();
            assert_eq!(acc.sample_count(), expected);
        }
    }

    // ── invalidation ──────────────────────────────────────────────────────

    #[test]
    fn invalidate_resets_immediately() {
        let mut acc = FrameAccumulator::new();
        for _ in 0..10 {
            acc.tick();
        }
        acc.invalidate();
        assert_eq!(acc.sample_count(), 1);
    }

    #[test]
    fn tick_after_invalidate_stays_at_one() {
        let mut acc = FrameAccumulator::new();
        for _ in 0..10 {
            acc.tick();
        }
        acc.invalidate();
        acc.tick();
        assert_eq!(acc.sample_count(), 1);
        acc.tick();
        assert_eq!(acc.sample_count(), 2);
    }

    #[test]
    fn repeated_invalidation_in_one_frame_is_one_reset() {
        let mut acc = FrameAccumulator::new();
        acc.tick();
        acc.invalidate();
        acc.invalidate();
        acc.tick();
        assert_eq!(acc.sample_count(), 1);
        assert!(!acc.reset_pending());
    }

    // ── running average ───────────────────────────────────────────────────

    /// Kernel blend: `mix(prev, estimate, 1 / sample_count)`.
    fn blend(prev: f64, estimate: f64, sample_count: u32) -> f64 {
        prev + (estimate - prev) / sample_count as f64
    }

    #[test]
    fn tick_then_dispatch_averages_every_sample_since_reset() {
        let mut acc = FrameAccumulator::new();
        let mut image = 0.0;
        for estimate in [3.0, 5.0, 7.0] {
            acc.tick();
            image = blend(image, estimate, acc.sample_count());
        }
        assert!((image - 5.0).abs() < 1e-12);

        acc.invalidate();
        let mut weights = Vec::new();
        for estimate in [10.0, 20.0, 30.0] {
            acc.tick();
            weights.push(acc.sample_count());
            image = blend(image, estimate, acc.sample_count());
        }
        assert_eq!(weights, [1, 2, 3]);
        assert!((image - 20.0).abs() < 1e-12);
    }

    #[test]
    fn global_frame_count_is_never_reset() {
        let mut acc = FrameAccumulator::new();
        for i in 1..=30u64 {
            if i % 7 == 0 {
                acc.invalidate();
            }
            acc.tick();
            assert_eq!(acc.global_frame_count(), i);
        }
    }

    #[test]
    fn continuous_invalidation_holds_one_sample() {
        let mut acc = FrameAccumulator::new();
        for _ in 0..5 {
            acc.invalidate();
            assert_eq!(acc.sample_count(), 1);
            acc.tick();
        }
        assert_eq!(acc.sample_count(), 1);
        assert_eq!(acc.global_frame_count(), 5);
    }
}
