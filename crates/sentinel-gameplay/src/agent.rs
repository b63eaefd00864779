//! Enemy agent: behavior, weapon, health and presentation for one enemy.
//!
//! Each tick runs in order:
//! 1. level-bounds check (falling below the self-destruct height respawns),
//! 2. sense through the [`TargetSensor`],
//! 3. decide with [`EnemyBehavior`] and notify observers of edges,
//! 4. act: orient, attack inside the burst window, update the weapon.

use crate::behavior::{BehaviorConfig, BehaviorOutput, EnemyBehavior, EnemyState};
use crate::detection::{DetectionEdge, TargetSensor};
use crate::health::Health;
use crate::patrol::PatrolPath;
use crate::respawn::Team;
use crate::weapon::{ShootInputs, Volley, Weapon, WeaponDefinition};
use glam::Vec4;
use sentinel_common::{orient_towards, ConfigError, EntityId, Position, Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ============================================================================
// Configuration
// ============================================================================

/// Static tuning of an enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Behavior controller tuning.
    pub behavior: BehaviorConfig,
    /// Turn speed toward the orientation target.
    pub orientation_speed: f32,
    /// Seconds the attack burst window stays open, then closed.
    pub attack_cooldown: f32,
    /// Falling below this height triggers a respawn.
    pub self_destruct_height: f32,
    /// Seconds the body flashes after a hit.
    pub flash_on_hit_duration: f32,
    /// Chance in `[0, 1]` of dropping loot on death.
    pub drop_rate: f32,
    /// Whether this enemy carries loot at all.
    pub has_loot: bool,
    /// Maximum health.
    pub max_health: f32,
    /// Team used to choose a spawner.
    pub team: Team,
    /// Eye emission while no target is known.
    pub default_eye_color: Vec4,
    /// Eye emission while a target is known.
    pub attack_eye_color: Vec4,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            behavior: BehaviorConfig::default(),
            orientation_speed: 10.0,
            attack_cooldown: 5.0,
            self_destruct_height: -20.0,
            flash_on_hit_duration: 0.5,
            drop_rate: 1.0,
            has_loot: true,
            max_health: 100.0,
            team: Team::Red,
            default_eye_color: Vec4::new(0.0, 0.6, 1.0, 1.0),
            attack_eye_color: Vec4::new(1.0, 0.1, 0.0, 1.0),
        }
    }
}

impl AgentConfig {
    /// Checks that all values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.behavior.validate()?;
        ConfigError::ensure_non_negative("orientation_speed", self.orientation_speed)?;
        ConfigError::ensure_range("attack_cooldown", self.attack_cooldown, 0.0, 30.0)?;
        ConfigError::ensure_non_negative("flash_on_hit_duration", self.flash_on_hit_duration)?;
        ConfigError::ensure_range("drop_rate", self.drop_rate, 0.0, 1.0)?;
        if !(self.max_health.is_finite() && self.max_health > 0.0) {
            return Err(ConfigError::invalid(
                "max_health",
                format!("must be > 0, got {}", self.max_health),
            ));
        }
        if !self.self_destruct_height.is_finite() {
            return Err(ConfigError::invalid("self_destruct_height", "must be finite"));
        }
        Ok(())
    }
}

// ============================================================================
// Observers
// ============================================================================

/// Hooks fired by an enemy. All methods default to no-ops.
pub trait EnemyObserver {
    /// A target became known.
    fn on_detected(&mut self, _enemy: EntityId) {}

    /// The known target was lost.
    fn on_lost(&mut self, _enemy: EntityId) {}

    /// Damage arrived from a non-enemy source at `source`.
    fn on_damaged(&mut self, _enemy: EntityId, _damage: f32, _source: Position) {}

    /// A volley was fired at the target.
    fn on_attack(&mut self, _enemy: EntityId, _volley: &Volley) {}

    /// The enemy died.
    fn on_death(&mut self, _enemy: EntityId, _dropped_loot: bool) {}
}

// ============================================================================
// Attack cadence
// ============================================================================

/// Burst window that toggles open/closed every `cooldown` seconds.
///
/// Starts closed with no time remaining, so the first step opens it for the
/// following steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackCadence {
    open: bool,
    time_remaining: f32,
    cooldown: f32,
}

impl AttackCadence {
    /// Creates a closed window.
    #[must_use]
    pub const fn new(cooldown: f32) -> Self {
        Self {
            open: false,
            time_remaining: 0.0,
            cooldown,
        }
    }

    /// Whether the window is currently open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Returns whether the window was open for this step, then advances it.
    pub fn step(&mut self, dt: f32) -> bool {
        let open = self.open;
        self.time_remaining -= dt;
        if self.time_remaining <= 0.0 {
            self.open = !self.open;
            self.time_remaining = self.cooldown;
        }
        open
    }

    /// Back to the initial closed state.
    pub fn reset(&mut self) {
        self.open = false;
        self.time_remaining = 0.0;
    }
}

// ============================================================================
// Agent
// ============================================================================

/// Where a hit came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageSource {
    /// Attacker position.
    pub position: Position,
    /// The attacker is another enemy (friendly fire is not reacted to).
    pub is_enemy: bool,
}

/// Result of applying damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Agent inactive; nothing happened.
    Ignored,
    /// Damage taken, still alive.
    Damaged,
    /// Killed; the agent now waits for respawn.
    Killed {
        /// Loot was dropped.
        dropped_loot: bool,
    },
}

/// Result of one agent tick.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentTick {
    /// Agent is waiting for respawn.
    Inactive,
    /// Agent fell below the level and needs a respawn.
    OutOfBounds,
    /// Normal tick.
    Acted {
        /// Behavior decision.
        output: BehaviorOutput,
        /// Volley fired at the target, if any.
        volley: Option<Volley>,
    },
}

/// One enemy combatant.
pub struct EnemyAgent<S: TargetSensor> {
    id: EntityId,
    position: Position,
    rotation: Quat,
    weapon_aim: Vec3,
    health: Health,
    behavior: EnemyBehavior,
    weapon: Weapon,
    cadence: AttackCadence,
    sensor: S,
    config: AgentConfig,
    observers: Vec<Box<dyn EnemyObserver>>,
    last_damaged: f32,
    active: bool,
}

impl<S: TargetSensor> std::fmt::Debug for EnemyAgent<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnemyAgent")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("state", &self.behavior.state())
            .field("health", &self.health.current())
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl<S: TargetSensor> EnemyAgent<S> {
    /// Creates an active enemy at `position` holding a shown weapon.
    pub fn new(
        config: AgentConfig,
        path: PatrolPath,
        weapon: WeaponDefinition,
        sensor: S,
        position: Position,
    ) -> Self {
        let mut behavior = EnemyBehavior::new(config.behavior, path);
        behavior.reset(position);
        let mut weapon = Weapon::new(weapon);
        weapon.show(true);

        Self {
            id: EntityId::new(),
            position,
            rotation: Quat::IDENTITY,
            weapon_aim: Vec3::Z,
            health: Health::new(config.max_health),
            behavior,
            weapon,
            cadence: AttackCadence::new(config.attack_cooldown),
            sensor,
            config,
            observers: Vec::new(),
            last_damaged: f32::NEG_INFINITY,
            active: true,
        }
    }

    /// Registers an observer.
    #[must_use]
    pub fn with_observer(mut self, observer: impl EnemyObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Registers an observer after construction.
    pub fn add_observer(&mut self, observer: impl EnemyObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Entity id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// World position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Moves the agent (navigation collaborator).
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Body rotation.
    #[must_use]
    pub const fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Direction the weapon points.
    #[must_use]
    pub const fn weapon_aim(&self) -> Vec3 {
        self.weapon_aim
    }

    /// Behavior state.
    #[must_use]
    pub const fn state(&self) -> EnemyState {
        self.behavior.state()
    }

    /// Behavior controller.
    #[must_use]
    pub const fn behavior(&self) -> &EnemyBehavior {
        &self.behavior
    }

    /// Held weapon.
    #[must_use]
    pub const fn weapon(&self) -> &Weapon {
        &self.weapon
    }

    /// Health.
    #[must_use]
    pub const fn health(&self) -> &Health {
        &self.health
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Sensor.
    #[must_use]
    pub const fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Mutable sensor.
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Burst window.
    #[must_use]
    pub const fn cadence(&self) -> &AttackCadence {
        &self.cadence
    }

    /// Whether the agent is in play (not waiting for respawn).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Team of this agent.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.config.team
    }

    /// Eye emission color: attack color while a target is known.
    #[must_use]
    pub fn eye_color(&self) -> Vec4 {
        if self.behavior.has_known_target() {
            self.config.attack_eye_color
        } else {
            self.config.default_eye_color
        }
    }

    /// Position on the hit-flash gradient in `[0, 1]`; 1 means no flash.
    #[must_use]
    pub fn flash_time(&self, now: f32) -> f32 {
        if self.config.flash_on_hit_duration <= 0.0 {
            return 1.0;
        }
        ((now - self.last_damaged) / self.config.flash_on_hit_duration).clamp(0.0, 1.0)
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Runs one tick ending at `now`.
    pub fn tick(&mut self, now: f32, dt: f32, rng: &mut fastrand::Rng) -> AgentTick {
        if !self.active {
            return AgentTick::Inactive;
        }

        if self.position.y < self.config.self_destruct_height {
            info!("enemy {} fell out of the level", self.id);
            self.trigger_respawn();
            return AgentTick::OutOfBounds;
        }

        let snapshot = self.sensor.sense(self.position);
        let output = self.behavior.tick(self.position, &snapshot, dt);
        match output.edge {
            Some(DetectionEdge::Detected) => self.notify(|o, id| o.on_detected(id)),
            Some(DetectionEdge::Lost) => self.notify(|o, id| o.on_lost(id)),
            None => {},
        }

        let mut volley = None;
        if let Some(target) = output.orientation_target {
            self.rotation = orient_towards(
                self.rotation,
                self.position,
                target,
                dt,
                self.config.orientation_speed,
            );
            self.orient_weapon_towards(target);

            if output.attack_requested {
                volley = self.try_attack(now, dt, rng);
            }
        }

        self.weapon.update(dt, now);
        AgentTick::Acted { output, volley }
    }

    fn orient_weapon_towards(&mut self, target: Position) {
        if let Some(aim) = (target - self.position).try_normalize() {
            self.weapon_aim = aim;
        }
    }

    fn try_attack(&mut self, now: f32, dt: f32, rng: &mut fastrand::Rng) -> Option<Volley> {
        let mut volley = None;
        if self.cadence.step(dt) {
            volley = self.weapon.try_fire(ShootInputs::hold(), self.weapon_aim, now, rng);
            if let Some(shot) = &volley {
                self.sensor.on_attack();
                for observer in &mut self.observers {
                    observer.on_attack(self.id, shot);
                }
            }
        }
        volley
    }

    fn notify(&mut self, hook: impl Fn(&mut dyn EnemyObserver, EntityId)) {
        for observer in &mut self.observers {
            hook(observer.as_mut(), self.id);
        }
    }

    // ========================================================================
    // Damage, death and respawn
    // ========================================================================

    /// Applies damage. Hits from non-enemies alert the sensor, notify
    /// observers and restart the body flash.
    pub fn apply_damage(
        &mut self,
        amount: f32,
        source: Option<DamageSource>,
        now: f32,
        rng: &mut fastrand::Rng,
    ) -> DamageOutcome {
        if !self.active {
            return DamageOutcome::Ignored;
        }

        let taken = self.health.damage(amount);
        if let Some(source) = source.filter(|s| !s.is_enemy) {
            self.sensor.on_damaged(source.position);
            for observer in &mut self.observers {
                observer.on_damaged(self.id, taken, source.position);
            }
            self.last_damaged = now;
        }

        if self.health.is_dead() {
            let dropped_loot = self.die(rng);
            DamageOutcome::Killed { dropped_loot }
        } else {
            DamageOutcome::Damaged
        }
    }

    /// Rolls the loot drop: never at rate 0, always at rate 1.
    pub fn try_drop_item(&self, rng: &mut fastrand::Rng) -> bool {
        let rate = self.config.drop_rate;
        if rate == 0.0 || !self.config.has_loot {
            false
        } else if rate == 1.0 {
            true
        } else {
            rng.f32() <= rate
        }
    }

    fn die(&mut self, rng: &mut fastrand::Rng) -> bool {
        let dropped_loot = self.try_drop_item(rng);
        info!("enemy {} died (loot: {})", self.id, dropped_loot);
        for observer in &mut self.observers {
            observer.on_death(self.id, dropped_loot);
        }
        self.trigger_respawn();
        dropped_loot
    }

    fn trigger_respawn(&mut self) {
        self.active = false;
        self.health.reset();
    }

    /// Brings the agent back into play at `position`.
    pub fn respawn_at(&mut self, position: Position) {
        self.position = position;
        self.active = true;
        self.behavior.reset(position);
        self.cadence.reset();
        debug!("enemy {} respawned at {}", self.id, position);
    }
}

// ============================================================================
// Tests
// ============================================================================
