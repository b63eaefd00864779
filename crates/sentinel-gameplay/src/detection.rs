//! Target detection as seen by the behavior core.
//!
//! Raw sensing (vision cones, raycasts, colliders) belongs to the host. The
//! core only consumes a [`DetectionSnapshot`] per tick and derives the
//! detected/lost edges from consecutive snapshots.

use sentinel_common::Position;
use serde::{Deserialize, Serialize};

/// What the sensor reports about the current target this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionSnapshot {
    /// Target currently in line of sight.
    pub target_visible: bool,
    /// Target within attack range.
    pub target_in_attack_range: bool,
    /// Last known target position; `None` when no target is known.
    pub known_target: Option<Position>,
}

impl DetectionSnapshot {
    /// Snapshot with no known target.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            target_visible: false,
            target_in_attack_range: false,
            known_target: None,
        }
    }

    /// Snapshot for a known target.
    #[must_use]
    pub const fn known(position: Position, visible: bool, in_attack_range: bool) -> Self {
        Self {
            target_visible: visible,
            target_in_attack_range: in_attack_range,
            known_target: Some(position),
        }
    }

    /// Whether any target is known.
    #[must_use]
    pub const fn has_target(&self) -> bool {
        self.known_target.is_some()
    }
}

/// Change in target knowledge between two ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectionEdge {
    /// A target became known.
    Detected,
    /// The known target was lost.
    Lost,
}

/// Remembers whether a target was known last tick and reports edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionTracker {
    had_known_target: bool,
}

impl DetectionTracker {
    /// Creates a tracker with no known target.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            had_known_target: false,
        }
    }

    /// Whether a target was known as of the last observation.
    #[must_use]
    pub const fn had_known_target(&self) -> bool {
        self.had_known_target
    }

    /// Records a snapshot and returns the edge it produced, if any.
    pub fn observe(&mut self, snapshot: &DetectionSnapshot) -> Option<DetectionEdge> {
        let has_target = snapshot.has_target();
        let edge = match (self.had_known_target, has_target) {
            (false, true) => Some(DetectionEdge::Detected),
            (true, false) => Some(DetectionEdge::Lost),
            _ => None,
        };
        self.had_known_target = has_target;
        edge
    }

    /// Forgets the known target without reporting an edge (used on respawn).
    pub fn clear(&mut self) {
        self.had_known_target = false;
    }
}

/// Detection collaborator supplied by the host.
pub trait TargetSensor {
    /// Senses from `origin` and reports the current target state.
    fn sense(&mut self, origin: Position) -> DetectionSnapshot;

    /// The owner was hurt by something at `source`; sensors usually start
    /// tracking it.
    fn on_damaged(&mut self, _source: Position) {}

    /// The owner just attacked its target.
    fn on_attack(&mut self) {}
}
