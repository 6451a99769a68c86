//! Fixed-interval recompute timer.
//!
//! ```text
//!            expiry, Idle                  solve published
//!   Idle ───────────────────▶ Recomputing ─────────────────▶ Idle
//!                               │    ▲
//!                               └────┘ expiry while Recomputing: dropped
//! ```
//!
//! The timer resets on every expiry. Missed intervals are not caught up and
//! expiries are never queued.

use tracing::warn;

/// Where the recompute loop is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the next expiry.
    Idle,
    /// A solve is running; expiries are dropped.
    Recomputing,
}

/// Result of advancing the timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    /// Interval not yet elapsed.
    Waiting,
    /// Interval elapsed while idle; the caller should recompute.
    Due,
    /// Interval elapsed while a recompute was in flight.
    Dropped,
}

/// Interval timer plus the [`Phase`] it gates on.
#[derive(Debug)]
pub struct Schedule {
    interval: f32,
    elapsed: f32,
    phase: Phase,
}

impl Schedule {
    /// `interval` must be positive and finite; callers validate it up front.
    #[must_use]
    pub const fn new(interval: f32) -> Self {
        Self {
            interval,
            elapsed: 0.0,
            phase: Phase::Idle,
        }
    }

    /// Seconds between expiries.
    #[must_use]
    pub const fn interval(&self) -> f32 {
        self.interval
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Seconds accumulated towards the next expiry.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Add `dt` seconds. Negative or non-finite steps count as zero.
    pub fn advance(&mut self, dt: f32) -> Expiry {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }

        if self.elapsed < self.interval {
            return Expiry::Waiting;
        }

        self.elapsed = 0.0;
        match self.phase {
            Phase::Idle => Expiry::Due,
            Phase::Recomputing => {
                warn!(interval = self.interval, "recompute still in flight, dropping expiry");
                Expiry::Dropped
            }
        }
    }

    /// Enter [`Phase::Recomputing`]. Call after a [`Expiry::Due`].
    pub fn begin(&mut self) {
        self.phase = Phase::Recomputing;
    }

    /// Back to [`Phase::Idle`] once the solve is published.
    pub fn finish(&mut self) {
        self.phase = Phase::Idle;
    }
}
