//! Frame timing with stall protection.
//!
//! The render loop asks the clock for the elapsed time since the previous
//! frame. Deltas are clamped so that a stalled host (backgrounded tab,
//! suspended VM) does not produce one giant animation jump on resume.

use instant::{Duration, Instant};

/// Ceiling applied to every frame delta.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(500);

/// Monotonic per-frame clock.
///
/// `advance` computes `min(now - previous, MAX_FRAME_DELTA)` and moves the
/// previous timestamp forward unconditionally. The first call yields zero.
/// Timestamps that go backwards (which `instant` does not produce, but hosts
/// have been known to) saturate to zero rather than underflow.
#[derive(Debug)]
pub struct FrameClock {
    last: Option<Instant>,
    max_delta: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_max_delta(MAX_FRAME_DELTA)
    }

    pub fn with_max_delta(max_delta: Duration) -> Self {
        Self {
            last: None,
            max_delta,
        }
    }

    pub fn advance(&mut self, now: Instant) -> Duration {
        let delta = match self.last {
            Some(last) => now.saturating_duration_since(last).min(self.max_delta),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        delta
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
