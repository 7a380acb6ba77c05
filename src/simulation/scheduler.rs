use std::time::{Duration, Instant};

/// Gates spread evaluation to a fixed wall-clock interval.
///
/// Elapsed time is measured against the last accepted tick, not frame count,
/// so the spread rate does not depend on the frame rate.
pub struct SpreadScheduler {
    interval: Duration,
    last_tick: Instant,
}

impl SpreadScheduler {
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last_tick: start,
        }
    }

    /// Returns true (and restarts the interval at `now`) once at least
    /// `interval` has elapsed since the last accepted tick.
    pub fn try_tick(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_tick) >= self.interval {
            self.last_tick = now;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self, now: Instant) {
        self.last_tick = now;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
