//! Wall-clock budget for a scrape run.
//!
//! Reads `tokio::time::Instant`, so a paused test runtime controls it.

use std::time::Duration;

use chrono::TimeDelta;
use tokio::time::Instant;

/// Deadline tracker: a start instant plus a maximum duration.
///
/// Queries are pure and may be called any number of times.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    started_at: Instant,
    max_duration: Duration,
}

impl Budget {
    #[must_use]
    pub fn new(started_at: Instant, max_duration: Duration) -> Self {
        Self {
            started_at,
            max_duration,
        }
    }

    /// Starts a budget at the current instant.
    #[must_use]
    pub fn start(max_duration: Duration) -> Self {
        Self::new(Instant::now(), max_duration)
    }

    #[must_use]
    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Time left before the deadline; negative once it has passed.
    #[must_use]
    pub fn remaining(&self) -> TimeDelta {
        self.remaining_after(self.elapsed())
    }

    #[must_use]
    pub fn expired(&self) -> bool {
        self.expired_after(self.elapsed())
    }

    #[must_use]
    pub fn remaining_after(&self, elapsed: Duration) -> TimeDelta {
        to_delta(self.max_duration) - to_delta(elapsed)
    }

    /// True once `elapsed` reaches the maximum duration.
    #[must_use]
    pub fn expired_after(&self, elapsed: Duration) -> bool {
        elapsed >= self.max_duration
    }
}

fn to_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}
