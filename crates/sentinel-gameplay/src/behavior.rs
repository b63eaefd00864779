//! Enemy behavior state machine.
//!
//! Each tick the controller:
//! 1. derives detected/lost edges from the detection snapshot,
//! 2. applies the edge and range transitions,
//! 3. produces a movement destination, an orientation target and whether to
//!    attack.
//!
//! Movement itself is the navigation collaborator's job.

use crate::detection::{DetectionEdge, DetectionSnapshot, DetectionTracker};
use crate::patrol::{PatrolCursor, PatrolPath};
use sentinel_common::{distance, ConfigError, Position};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// State and configuration
// ============================================================================

/// High-level behavior of an enemy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Walking the patrol path.
    #[default]
    Patrol,
    /// Chasing the last known target position.
    Follow,
    /// Shooting at a target in range.
    Attack,
}

impl EnemyState {
    /// Whether the enemy is engaged with a target.
    #[must_use]
    pub const fn is_engaged(self) -> bool {
        matches!(self, Self::Follow | Self::Attack)
    }

    /// Display name for logs and debug overlays.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Patrol => "patrol",
            Self::Follow => "follow",
            Self::Attack => "attack",
        }
    }
}

/// Static tuning of the behavior controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Distance at which a patrol waypoint counts as reached.
    pub path_reaching_radius: f32,
    /// Attack range reported by the detection module.
    pub attack_range: f32,
    /// Fraction of the attack range under which the enemy stops closing in.
    pub attack_stop_distance_ratio: f32,
    /// Walk the patrol path backwards.
    pub patrol_inverse_order: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            path_reaching_radius: 2.0,
            attack_range: 10.0,
            attack_stop_distance_ratio: 0.5,
            patrol_inverse_order: false,
        }
    }
}

impl BehaviorConfig {
    /// Set attack range.
    #[must_use]
    pub const fn with_attack_range(mut self, range: f32) -> Self {
        self.attack_range = range;
        self
    }

    /// Set path reaching radius.
    #[must_use]
    pub const fn with_reaching_radius(mut self, radius: f32) -> Self {
        self.path_reaching_radius = radius;
        self
    }

    /// Set attack stop-distance ratio.
    #[must_use]
    pub const fn with_stop_ratio(mut self, ratio: f32) -> Self {
        self.attack_stop_distance_ratio = ratio;
        self
    }

    /// Distance under which the enemy holds ground while attacking.
    #[must_use]
    pub fn stop_distance(&self) -> f32 {
        self.attack_stop_distance_ratio * self.attack_range
    }

    /// Checks that all values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::ensure_non_negative("path_reaching_radius", self.path_reaching_radius)?;
        ConfigError::ensure_non_negative("attack_range", self.attack_range)?;
        ConfigError::ensure_range(
            "attack_stop_distance_ratio",
            self.attack_stop_distance_ratio,
            0.0,
            1.0,
        )
    }
}

/// What the controller wants this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviorOutput {
    /// Where the navigation collaborator should move the enemy.
    pub destination: Position,
    /// Where the enemy (and its weapon) should face, if anywhere.
    pub orientation_target: Option<Position>,
    /// Whether the weapon should be fired at the target.
    pub attack_requested: bool,
    /// Detection edge observed this tick.
    pub edge: Option<DetectionEdge>,
}

impl BehaviorOutput {
    fn hold(position: Position, edge: Option<DetectionEdge>) -> Self {
        Self {
            destination: position,
            orientation_target: None,
            attack_requested: false,
            edge,
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Patrol / follow / attack controller for one enemy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBehavior {
    state: EnemyState,
    cursor: PatrolCursor,
    tracker: DetectionTracker,
    config: BehaviorConfig,
    state_time: f32,
}

impl EnemyBehavior {
    /// Creates a patrolling controller for `path`.
    #[must_use]
    pub fn new(config: BehaviorConfig, path: PatrolPath) -> Self {
        Self {
            state: EnemyState::Patrol,
            cursor: PatrolCursor::new(path),
            tracker: DetectionTracker::new(),
            config,
            state_time: 0.0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> EnemyState {
        self.state
    }

    /// Seconds spent in the current state.
    #[must_use]
    pub const fn time_in_state(&self) -> f32 {
        self.state_time
    }

    /// Patrol cursor.
    #[must_use]
    pub fn cursor(&self) -> &PatrolCursor {
        &self.cursor
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    /// Whether a target was known as of the last tick.
    #[must_use]
    pub const fn has_known_target(&self) -> bool {
        self.tracker.had_known_target()
    }

    /// Assigns a new patrol path, starting from its first waypoint.
    pub fn assign_path(&mut self, path: PatrolPath) {
        self.cursor.assign(path);
    }

    /// Prepares the controller for a fresh life at `position`.
    ///
    /// Forgets the target, returns to patrol and restarts the patrol cursor
    /// at the waypoint closest to the spawn point.
    pub fn reset(&mut self, position: Position) {
        self.tracker.clear();
        self.set_state(EnemyState::Patrol);
        self.cursor.set_to_closest(position);
    }

    /// Advances the controller by one tick.
    pub fn tick(
        &mut self,
        position: Position,
        detection: &DetectionSnapshot,
        dt: f32,
    ) -> BehaviorOutput {
        self.state_time += dt.max(0.0);

        let edge = self.tracker.observe(detection);
        match edge {
            Some(DetectionEdge::Detected) if self.state == EnemyState::Patrol => {
                self.set_state(EnemyState::Follow);
            },
            Some(DetectionEdge::Lost) if self.state.is_engaged() => {
                self.set_state(EnemyState::Patrol);
            },
            _ => {},
        }

        match self.state {
            EnemyState::Follow if detection.target_visible && detection.target_in_attack_range => {
                self.set_state(EnemyState::Attack);
            },
            EnemyState::Attack if !detection.target_in_attack_range => {
                self.set_state(EnemyState::Follow);
            },
            _ => {},
        }

        match self.state {
            EnemyState::Patrol => {
                self.cursor.update(
                    position,
                    self.config.path_reaching_radius,
                    self.config.patrol_inverse_order,
                );
                BehaviorOutput {
                    destination: self.cursor.destination(position),
                    orientation_target: None,
                    attack_requested: false,
                    edge,
                }
            },
            EnemyState::Follow => match detection.known_target {
                Some(target) => BehaviorOutput {
                    destination: target,
                    orientation_target: Some(target),
                    attack_requested: false,
                    edge,
                },
                None => BehaviorOutput::hold(position, edge),
            },
            EnemyState::Attack => match detection.known_target {
                Some(target) => {
                    let destination = if distance(target, position) >= self.config.stop_distance() {
                        target
                    } else {
                        position
                    };
                    BehaviorOutput {
                        destination,
                        orientation_target: Some(target),
                        attack_requested: true,
                        edge,
                    }
                },
                None => BehaviorOutput::hold(position, edge),
            },
        }
    }

    fn set_state(&mut self, next: EnemyState) {
        if self.state != next {
            debug!("enemy behavior {} -> {}", self.state.name(), next.name());
            self.state = next;
            self.state_time = 0.0;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
