//! Delayed respawning at team spawn points.

use sentinel_common::{ConfigError, Deadline, EntityId, Position};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default seconds between death and respawn.
pub const DEFAULT_RESPAWN_DELAY: f32 = 5.0;

/// Team affiliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    /// Affiliation 0.
    #[default]
    Red,
    /// Any other affiliation.
    Blue,
}

impl Team {
    /// Maps a numeric affiliation to a team.
    #[must_use]
    pub const fn from_affiliation(affiliation: u32) -> Self {
        if affiliation == 0 {
            Self::Red
        } else {
            Self::Blue
        }
    }
}

/// Spawn points grouped by team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnPoints {
    /// Red team spawners.
    pub red: Vec<Position>,
    /// Blue team spawners.
    pub blue: Vec<Position>,
}

impl SpawnPoints {
    /// Spawners of `team`.
    #[must_use]
    pub fn for_team(&self, team: Team) -> &[Position] {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }

    /// Random spawner of `team`, `None` if the team has none.
    pub fn pick(&self, team: Team, rng: &mut fastrand::Rng) -> Option<Position> {
        let points = self.for_team(team);
        if points.is_empty() {
            None
        } else {
            Some(points[rng.usize(..points.len())])
        }
    }

    /// Every team needs at least one spawner.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.red.is_empty() {
            return Err(ConfigError::invalid("spawn_points.red", "at least one spawner required"));
        }
        if self.blue.is_empty() {
            return Err(ConfigError::invalid("spawn_points.blue", "at least one spawner required"));
        }
        Ok(())
    }
}

/// Tracks entities waiting to respawn.
#[derive(Debug, Clone)]
pub struct RespawnScheduler {
    delay: f32,
    pending: Vec<(EntityId, Deadline)>,
}

impl Default for RespawnScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_RESPAWN_DELAY)
    }
}

impl RespawnScheduler {
    /// Creates a scheduler with a fixed delay.
    #[must_use]
    pub fn new(delay: f32) -> Self {
        Self {
            delay: delay.max(0.0),
            pending: Vec::new(),
        }
    }

    /// Respawn delay in seconds.
    #[must_use]
    pub const fn delay(&self) -> f32 {
        self.delay
    }

    /// Number of entities waiting.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether `entity` is waiting to respawn.
    #[must_use]
    pub fn is_pending(&self, entity: EntityId) -> bool {
        self.pending.iter().any(|(id, _)| *id == entity)
    }

    /// Schedules `entity` to respawn `delay` seconds after `now`.
    /// An entity already waiting keeps its original deadline.
    pub fn schedule(&mut self, entity: EntityId, now: f32) -> Deadline {
        if let Some((_, deadline)) = self.pending.iter().find(|(id, _)| *id == entity) {
            return *deadline;
        }
        let deadline = Deadline::after(now, self.delay);
        debug!("entity {} respawns at {:.2}", entity, deadline.at());
        self.pending.push((entity, deadline));
        deadline
    }

    /// Drops a pending respawn.
    pub fn cancel(&mut self, entity: EntityId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(id, _)| *id != entity);
        self.pending.len() != before
    }

    /// Removes and returns the entities whose deadline has passed, earliest
    /// first.
    pub fn due(&mut self, now: f32) -> Vec<EntityId> {
        let mut ready: Vec<(EntityId, Deadline)> = Vec::new();
        self.pending.retain(|entry| {
            if entry.1.is_due(now) {
                ready.push(*entry);
                false
            } else {
                true
            }
        });
        ready.sort_by(|a, b| a.1.at().total_cmp(&b.1.at()));
        ready.into_iter().map(|(id, _)| id).collect()
    }
}
