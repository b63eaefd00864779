//! Hit points.

use serde::{Deserialize, Serialize};

/// Health component for combatants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    current: f32,
    max: f32,
}

impl Health {
    /// Creates full health.
    #[must_use]
    pub const fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Current hit points.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Fraction of health left in `[0, 1]`.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }

    /// Applies damage and returns the amount actually taken.
    pub fn damage(&mut self, amount: f32) -> f32 {
        let taken = amount.max(0.0).min(self.current);
        self.current -= taken;
        taken
    }

    /// Refills to maximum.
    pub fn reset(&mut self) {
        self.current = self.max;
    }

    /// Checks if dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}
