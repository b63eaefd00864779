//! Patrol paths and the cursor that walks them.

use sentinel_common::{distance, Position};
use serde::{Deserialize, Serialize};

/// Ordered waypoints an enemy cycles through while patrolling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatrolPath {
    /// Waypoint positions in traversal order.
    pub nodes: Vec<Position>,
}

impl PatrolPath {
    /// Creates a path from waypoints.
    #[must_use]
    pub fn new(nodes: Vec<Position>) -> Self {
        Self { nodes }
    }

    /// Number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the path has no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position of a waypoint.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<Position> {
        self.nodes.get(index).copied()
    }

    /// Distance from `origin` to a waypoint.
    #[must_use]
    pub fn distance_to_node(&self, origin: Position, index: usize) -> Option<f32> {
        self.node(index).map(|node| distance(origin, node))
    }
}

/// Current destination index on a [`PatrolPath`].
///
/// The index is always in `[0, len)` for a non-empty path and stays at 0 for
/// an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatrolCursor {
    path: PatrolPath,
    index: usize,
}

impl PatrolCursor {
    /// Creates a cursor at the first waypoint of `path`.
    #[must_use]
    pub fn new(path: PatrolPath) -> Self {
        Self { path, index: 0 }
    }

    /// The patrolled path.
    #[must_use]
    pub fn path(&self) -> &PatrolPath {
        &self.path
    }

    /// Current destination index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Whether there is anything to patrol.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.path.is_empty()
    }

    /// Replaces the path and restarts at its first waypoint.
    pub fn assign(&mut self, path: PatrolPath) {
        self.path = path;
        self.index = 0;
    }

    /// Restarts at the first waypoint.
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Current destination, or `origin` itself when the path is empty.
    #[must_use]
    pub fn destination(&self, origin: Position) -> Position {
        self.path.node(self.index).unwrap_or(origin)
    }

    /// Moves to the next waypoint (previous one when `inverse_order`),
    /// wrapping at either end.
    pub fn advance(&mut self, inverse_order: bool) {
        let len = self.path.len();
        if len == 0 {
            self.index = 0;
            return;
        }

        self.index = if inverse_order {
            (self.index + len - 1) % len
        } else {
            (self.index + 1) % len
        };
    }

    /// Advances once `origin` is within `reaching_radius` of the current
    /// destination. Returns whether the cursor moved.
    pub fn update(&mut self, origin: Position, reaching_radius: f32, inverse_order: bool) -> bool {
        if !self.is_valid() {
            return false;
        }

        if distance(origin, self.destination(origin)) <= reaching_radius {
            self.advance(inverse_order);
            true
        } else {
            false
        }
    }

    /// Points the cursor at the waypoint nearest to `origin` (first one wins
    /// ties). An empty path resets to 0.
    pub fn set_to_closest(&mut self, origin: Position) {
        let mut closest = 0;
        let mut closest_distance = f32::INFINITY;

        for (i, node) in self.path.nodes.iter().enumerate() {
            let d = distance(origin, *node);
            if d < closest_distance {
                closest_distance = d;
                closest = i;
            }
        }

        self.index = closest;
    }
}
