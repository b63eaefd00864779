//! Simulation time.
//!
//! Every timed behavior in the core (shot cadence, reload, weapon switching,
//! respawn) is expressed as a timestamp or deadline on this clock, so ticks of
//! any size resume correctly as long as time only moves forward.

use serde::{Deserialize, Serialize};

/// Monotonic simulation clock advanced once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    /// Seconds elapsed since the clock was created.
    now: f32,
    /// Number of completed ticks.
    ticks: u64,
}

impl SimClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { now: 0.0, ticks: 0 }
    }

    /// Creates a clock starting at an arbitrary time.
    #[must_use]
    pub const fn starting_at(now: f32) -> Self {
        Self { now, ticks: 0 }
    }

    /// Advances the clock by `dt` seconds and returns the step actually taken.
    ///
    /// Negative and non-finite steps are treated as zero.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let step = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.now += step;
        self.ticks += 1;
        step
    }

    /// Current time in seconds.
    #[must_use]
    pub const fn now(&self) -> f32 {
        self.now
    }

    /// Number of ticks advanced so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// A point in simulation time after which something becomes due.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deadline {
    at: f32,
}

impl Deadline {
    /// Deadline `delay` seconds after `now`.
    #[must_use]
    pub fn after(now: f32, delay: f32) -> Self {
        Self {
            at: now + delay.max(0.0),
        }
    }

    /// Absolute time of the deadline.
    #[must_use]
    pub const fn at(&self) -> f32 {
        self.at
    }

    /// Whether the deadline has been reached.
    #[must_use]
    pub fn is_due(&self, now: f32) -> bool {
        now >= self.at
    }

    /// Seconds left until the deadline (zero once due).
    #[must_use]
    pub fn remaining(&self, now: f32) -> f32 {
        (self.at - now).max(0.0)
    }
}
