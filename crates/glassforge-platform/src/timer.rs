//! Fixed-rate timer
//!
//! Converts elapsed wall time into a whole number of engine ticks. Hosts
//! with their own timer callback don't need it; the headless runner does.

use std::time::{Duration, Instant};

use crate::{PlatformError, PlatformResult};

/// Ticks due per elapsed time, with a catch-up limit
#[derive(Debug, Clone)]
pub struct FixedRateTimer {
    period: Duration,
    accumulator: Duration,
    last: Option<Instant>,
    max_catch_up: u32,
}

impl FixedRateTimer {
    /// Create a timer firing `ticks_per_second` times per second
    pub fn new(ticks_per_second: u32) -> PlatformResult<Self> {
        if ticks_per_second == 0 {
            return Err(PlatformError::InvalidTickRate(ticks_per_second));
        }
        Ok(Self {
            period: Duration::from_secs(1) / ticks_per_second,
            accumulator: Duration::ZERO,
            last: None,
            max_catch_up: 8,
        })
    }

    /// Limit how many ticks a single poll may report
    pub fn with_max_catch_up(mut self, max_catch_up: u32) -> Self {
        self.max_catch_up = max_catch_up.max(1);
        self
    }

    /// Time between ticks
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Add elapsed time and return the number of ticks now due
    ///
    /// Time beyond the catch-up limit is dropped.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed;
        let mut due = 0;
        while self.accumulator >= self.period && due < self.max_catch_up {
            self.accumulator -= self.period;
            due += 1;
        }
        if due == self.max_catch_up && self.accumulator >= self.period {
            log::debug!("Timer fell behind, dropping {:?}", self.accumulator);
            self.accumulator = Duration::ZERO;
        }
        due
    }

    /// Measure time since the previous poll and return the ticks due
    pub fn poll(&mut self) -> u32 {
        let now = Instant::now();
        let elapsed = self.last.map_or(Duration::ZERO, |last| now - last);
        self.last = Some(now);
        self.advance(elapsed)
    }

    /// Time left until the next tick is due
    pub fn until_next(&self) -> Duration {
        self.period.saturating_sub(self.accumulator)
    }
}
