//! Scripted encounter: one enemy against a target walking a looping route.
//!
//! Each fixed step runs respawns, moves the target, ticks the enemy, lets the
//! target shoot back and finally drains the event bus.

use crate::config::{CombatConfig, SimConfig, TargetConfig};
use crate::sensor::RangeSensor;
use sentinel_common::{ConfigError, EntityId, Position, SimClock, Vec3};
use sentinel_gameplay::{
    AgentTick, DamageOutcome, DamageSource, EnemyAgent, EnemyState, EventBus, GameEvent, Health,
    PatrolPath, RespawnScheduler, ShootInputs, Team, Volley, WeaponInputs, WeaponManager,
    WeaponSlotEvent,
};
use serde::Serialize;
use tracing::{debug, info};

// ============================================================================
// Hit resolution
// ============================================================================

/// Moves `from` toward `to` by at most `max_step`.
#[must_use]
pub fn step_towards(from: Position, to: Position, max_step: f32) -> Position {
    let offset = to - from;
    let distance = offset.length();
    if distance <= max_step || distance <= f32::EPSILON {
        to
    } else {
        from + offset / distance * max_step
    }
}

/// Bullets of `volley` fired from `origin` that hit a victim at `victim`.
#[must_use]
pub fn count_hits(
    origin: Position,
    volley: &Volley,
    victim: Position,
    combat: &CombatConfig,
) -> usize {
    let offset = victim - origin;
    if offset.length() > combat.max_hit_distance {
        return 0;
    }
    let Some(line) = offset.try_normalize() else {
        return volley.bullet_count();
    };
    let cone = combat.hit_cone_degrees.to_radians();
    volley
        .directions
        .iter()
        .filter(|direction| direction.angle_between(line) <= cone)
        .count()
}

// ============================================================================
// Target
// ============================================================================

/// The enemy's opponent: walks its waypoints and fires back.
#[derive(Debug)]
pub struct ScriptedTarget {
    id: EntityId,
    position: Position,
    health: Health,
    waypoint: usize,
    weapons: WeaponManager,
    config: TargetConfig,
    trigger_held_for: Option<f32>,
    next_switch: f32,
    active: bool,
}

impl ScriptedTarget {
    fn new(config: TargetConfig, weapons: WeaponManager) -> Self {
        let position = config.waypoints.first().copied().unwrap_or(Vec3::ZERO);
        Self {
            id: EntityId::new(),
            position,
            health: Health::new(config.max_health),
            waypoint: 0,
            weapons,
            next_switch: config.switch_interval,
            config,
            trigger_held_for: None,
            active: true,
        }
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

    /// Health.
    #[must_use]
    pub const fn health(&self) -> &Health {
        &self.health
    }

    /// Carried weapons.
    #[must_use]
    pub const fn weapons(&self) -> &WeaponManager {
        &self.weapons
    }

    /// Whether the target is in play.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    fn walk(&mut self, dt: f32) {
        let Some(&goal) = self.config.waypoints.get(self.waypoint) else {
            return;
        };
        self.position = step_towards(self.position, goal, self.config.speed * dt);
        if self.position == goal {
            self.waypoint = (self.waypoint + 1) % self.config.waypoints.len();
        }
    }

    /// Trigger pattern: press, hold for `trigger_hold`, release, repeat while
    /// the enemy stays within engage range.
    fn trigger(&mut self, engaged: bool, dt: f32) -> ShootInputs {
        match (engaged, self.trigger_held_for) {
            (true, None) => {
                self.trigger_held_for = Some(0.0);
                ShootInputs::press()
            },
            (true, Some(held)) if held + dt >= self.config.trigger_hold => {
                self.trigger_held_for = None;
                ShootInputs::release()
            },
            (true, Some(held)) => {
                self.trigger_held_for = Some(held + dt);
                ShootInputs::hold()
            },
            (false, Some(_)) => {
                self.trigger_held_for = None;
                ShootInputs::release()
            },
            (false, None) => ShootInputs::NONE,
        }
    }

    fn inputs(&mut self, enemy: Option<Position>, dt: f32, now: f32) -> WeaponInputs {
        let engaged = enemy.is_some_and(|p| p.distance(self.position) <= self.config.engage_range);
        let fire = self.trigger(engaged, dt);

        let reload_pressed = self
            .weapons
            .active_weapon()
            .is_some_and(|w| w.definition().has_physical_bullets && w.current_ammo() == 0);

        let mut switch_direction = 0;
        if self.config.switch_interval > 0.0 && now >= self.next_switch {
            self.next_switch = now + self.config.switch_interval;
            switch_direction = 1;
        }

        WeaponInputs {
            fire,
            aim_held: engaged,
            reload_pressed,
            switch_direction,
            select_slot: None,
        }
    }

    fn respawn_at(&mut self, position: Position) {
        self.position = position;
        self.health.reset();
        self.trigger_held_for = None;
        self.waypoint = closest_waypoint(&self.config.waypoints, position);
        self.active = true;
    }
}

fn closest_waypoint(waypoints: &[Position], position: Position) -> usize {
    waypoints
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.distance(position).total_cmp(&b.distance(position)))
        .map_or(0, |(index, _)| index)
}

// ============================================================================
// Simulation
// ============================================================================

/// An event stamped with the simulation time it was drained at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedEvent {
    /// Seconds since start.
    pub time: f32,
    /// The event.
    pub event: GameEvent,
}

/// Ticks spent by the enemy in each behavior state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StateTicks {
    /// Patrolling.
    pub patrol: u64,
    /// Chasing.
    pub follow: u64,
    /// Attacking.
    pub attack: u64,
}

/// Running totals of the encounter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SimStats {
    /// Ticks run.
    pub ticks: u64,
    /// Simulated seconds.
    pub elapsed: f32,
    /// Volleys fired by the enemy.
    pub enemy_volleys: u32,
    /// Enemy bullets that hit the target.
    pub enemy_hits: u64,
    /// Volleys fired by the target.
    pub target_volleys: u32,
    /// Target bullets that hit the enemy.
    pub target_hits: u64,
    /// Enemy deaths, falls included.
    pub enemy_deaths: u32,
    /// Target deaths.
    pub target_deaths: u32,
    /// Loot dropped by the enemy.
    pub loot_drops: u32,
    /// Respawns performed.
    pub respawns: u32,
    /// Weapon switches completed by the target.
    pub weapon_switches: u32,
    /// Enemy behavior time.
    pub states: StateTicks,
}

/// One enemy, one target and the shared plumbing between them.
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    clock: SimClock,
    dt: f32,
    rng: fastrand::Rng,
    enemy: EnemyAgent<RangeSensor>,
    target: ScriptedTarget,
    respawns: RespawnScheduler,
    bus: EventBus,
    stats: SimStats,
}

impl Simulation {
    /// Builds the encounter. The configuration is checked first.
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.check()?;

        let bus = EventBus::default();
        let enemy_weapon = config
            .weapon(&config.enemy_weapon)
            .cloned()
            .ok_or_else(|| ConfigError::invalid("enemy_weapon", "unknown weapon"))?;
        let sensor = RangeSensor::new(config.sensor, config.agent.behavior.attack_range);
        let enemy = EnemyAgent::new(
            config.agent.clone(),
            PatrolPath::new(config.patrol.clone()),
            enemy_weapon,
            sensor,
            config.enemy_spawn,
        )
        .with_observer(bus.observer());

        let mut weapons = WeaponManager::new(config.switch);
        for name in &config.target.weapons {
            let definition = config
                .weapon(name)
                .cloned()
                .ok_or_else(|| {
                    ConfigError::invalid("target.weapons", format!("unknown weapon '{name}'"))
                })?;
            weapons
                .add_weapon(definition)
                .map_err(|e| ConfigError::invalid("target.weapons", e.to_string()))?;
        }
        weapons.switch_weapon(true, 0.0);
        let target = ScriptedTarget::new(config.target.clone(), weapons);

        info!(
            "encounter ready: enemy {} with {}, target {} with {} weapon(s)",
            enemy.id(),
            config.enemy_weapon,
            target.id(),
            config.target.weapons.len()
        );

        Ok(Self {
            dt: config.fixed_dt(),
            respawns: RespawnScheduler::new(config.respawn_delay),
            rng: fastrand::Rng::with_seed(seed),
            clock: SimClock::new(),
            config,
            enemy,
            target,
            bus,
            stats: SimStats::default(),
        })
    }

    /// The enemy.
    #[must_use]
    pub const fn enemy(&self) -> &EnemyAgent<RangeSensor> {
        &self.enemy
    }

    /// The target.
    #[must_use]
    pub const fn target(&self) -> &ScriptedTarget {
        &self.target
    }

    /// Totals so far.
    #[must_use]
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Current simulation time.
    #[must_use]
    pub const fn now(&self) -> f32 {
        self.clock.now()
    }

    /// Runs `ticks` fixed steps, handing every drained event to `on_event`.
    pub fn run(&mut self, ticks: u64, mut on_event: impl FnMut(&TimedEvent)) -> SimStats {
        for _ in 0..ticks {
            for event in self.step() {
                on_event(&event);
            }
        }
        self.stats
    }

    /// Advances one fixed step and returns the events it produced.
    pub fn step(&mut self) -> Vec<TimedEvent> {
        let dt = self.clock.advance(self.dt);
        let now = self.clock.now();

        self.process_respawns(now);

        if self.target.active {
            self.target.walk(dt);
        }
        let target_position = self.target.active.then_some(self.target.position);
        self.enemy.sensor_mut().observe(target_position, now);

        self.tick_enemy(now, dt);
        self.tick_target(now, dt);

        for event in self.target.weapons.drain_events() {
            if matches!(event, WeaponSlotEvent::SwitchedTo { .. }) {
                self.stats.weapon_switches += 1;
            }
            self.bus.publish(event.into());
        }

        self.stats.ticks = self.clock.ticks();
        self.stats.elapsed = now;
        self.stats.enemy_volleys = self.enemy.sensor().attacks();

        self.bus
            .drain()
            .into_iter()
            .map(|event| {
                debug!("{now:.2}s {event:?}");
                TimedEvent { time: now, event }
            })
            .collect()
    }

    fn process_respawns(&mut self, now: f32) {
        for id in self.respawns.due(now) {
            let position = if id == self.enemy.id() {
                let position = self.spawn_position(self.enemy.team(), self.config.enemy_spawn);
                self.enemy.respawn_at(position);
                position
            } else if id == self.target.id {
                let fallback = self.target.config.waypoints.first().copied().unwrap_or(Vec3::ZERO);
                let position = self.spawn_position(self.target.config.team, fallback);
                self.target.respawn_at(position);
                position
            } else {
                continue;
            };

            self.stats.respawns += 1;
            info!("entity {} respawned at {}", id, position);
            self.bus.publish(GameEvent::EntityRespawned {
                entity_id: id,
                position,
            });
        }
    }

    fn spawn_position(&mut self, team: Team, fallback: Position) -> Position {
        self.config.spawn_points.pick(team, &mut self.rng).unwrap_or(fallback)
    }

    fn tick_enemy(&mut self, now: f32, dt: f32) {
        match self.enemy.tick(now, dt, &mut self.rng) {
            AgentTick::Inactive => {},
            AgentTick::OutOfBounds => {
                self.stats.enemy_deaths += 1;
                self.respawns.schedule(self.enemy.id(), now);
            },
            AgentTick::Acted { output, volley } => {
                match self.enemy.state() {
                    EnemyState::Patrol => self.stats.states.patrol += 1,
                    EnemyState::Follow => self.stats.states.follow += 1,
                    EnemyState::Attack => self.stats.states.attack += 1,
                }

                let position = step_towards(
                    self.enemy.position(),
                    output.destination,
                    self.config.enemy_move_speed * dt,
                );
                self.enemy.set_position(position);

                if let Some(volley) = volley {
                    self.hit_target(&volley, now);
                }
            },
        }
    }

    fn hit_target(&mut self, volley: &Volley, now: f32) {
        if !self.target.active {
            return;
        }
        let hits = count_hits(
            self.enemy.position(),
            volley,
            self.target.position,
            &self.config.combat,
        );
        if hits == 0 {
            return;
        }
        self.stats.enemy_hits += hits as u64;
        self.target.health.damage(hits as f32 * self.config.combat.enemy_bullet_damage);

        if self.target.health.is_dead() {
            info!("target {} went down", self.target.id);
            self.target.active = false;
            self.stats.target_deaths += 1;
            self.respawns.schedule(self.target.id, now);
        }
    }

    fn tick_target(&mut self, now: f32, dt: f32) {
        if !self.target.active {
            return;
        }

        let enemy = self.enemy.is_active().then(|| self.enemy.position());
        let inputs = self.target.inputs(enemy, dt, now);
        let aim = enemy
            .and_then(|p| (p - self.target.position).try_normalize())
            .unwrap_or(Vec3::Z);

        let Some(volley) = self.target.weapons.update(&inputs, aim, dt, now, &mut self.rng) else {
            return;
        };
        self.stats.target_volleys += 1;

        let Some(enemy_position) = enemy else {
            return;
        };
        let hits = count_hits(self.target.position, &volley, enemy_position, &self.config.combat);
        if hits == 0 {
            return;
        }
        self.stats.target_hits += hits as u64;

        let combat = &self.config.combat;
        let per_bullet = combat.target_bullet_damage + volley.charge * combat.charge_bonus_damage;
        let source = DamageSource {
            position: self.target.position,
            is_enemy: false,
        };
        let outcome =
            self.enemy.apply_damage(hits as f32 * per_bullet, Some(source), now, &mut self.rng);
        if let DamageOutcome::Killed { dropped_loot } = outcome {
            self.stats.enemy_deaths += 1;
            if dropped_loot {
                self.stats.loot_drops += 1;
            }
            self.respawns.schedule(self.enemy.id(), now);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
