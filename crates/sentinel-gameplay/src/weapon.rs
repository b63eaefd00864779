//! Weapon fire control.
//!
//! This module provides:
//! - Static weapon definitions (loadable from TOML)
//! - Manual, automatic and charge firing policies
//! - Ammo regeneration and timed manual reloads
//! - Shot fan-out into per-bullet directions

use crate::spread::shot_direction_within_spread;
use sentinel_common::{ConfigError, Deadline, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

// ============================================================================
// Definitions
// ============================================================================

/// How the trigger maps to shots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShootType {
    /// One shot per trigger press.
    #[default]
    Manual,
    /// Shoots every tick while the trigger is held.
    Automatic,
    /// Charges while held, shoots on release.
    Charge,
}

/// Static parameters of a weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponDefinition {
    /// Unique weapon name.
    pub name: String,
    /// Firing policy.
    pub shoot_type: ShootType,
    /// Minimum seconds between two shots.
    pub delay_between_shots: f32,
    /// Spread cone in degrees.
    pub bullet_spread_angle: f32,
    /// Bullets discharged by one shot.
    pub bullets_per_shot: u32,
    /// Recoil applied to the wielder per shot.
    pub recoil_force: f32,
    /// Regenerate ammo over time.
    pub automatic_reload: bool,
    /// Uses a carried pool of physical bullets (manual reload).
    pub has_physical_bullets: bool,
    /// Bullets refilled by one manual reload.
    pub clip_size: u32,
    /// Ammo regenerated per second.
    pub ammo_reload_rate: f32,
    /// Seconds without shooting before regeneration starts.
    pub ammo_reload_delay: f32,
    /// Ammo capacity.
    pub max_ammo: u32,
    /// Charge weapons fire by themselves once fully charged.
    pub automatic_release_on_charged: bool,
    /// Seconds to reach full charge.
    pub max_charge_duration: f32,
    /// Ammo consumed when a charge starts.
    pub ammo_used_on_start_charge: f32,
    /// Ammo consumed per unit of charge.
    pub ammo_usage_rate_while_charging: f32,
    /// Seconds a manual reload takes.
    pub reload_duration: f32,
}

impl Default for WeaponDefinition {
    fn default() -> Self {
        Self {
            name: "Blaster".to_string(),
            shoot_type: ShootType::Manual,
            delay_between_shots: 0.5,
            bullet_spread_angle: 0.0,
            bullets_per_shot: 1,
            recoil_force: 1.0,
            automatic_reload: true,
            has_physical_bullets: false,
            clip_size: 30,
            ammo_reload_rate: 1.0,
            ammo_reload_delay: 2.0,
            max_ammo: 8,
            automatic_release_on_charged: false,
            max_charge_duration: 2.0,
            ammo_used_on_start_charge: 1.0,
            ammo_usage_rate_while_charging: 1.0,
            reload_duration: 1.5,
        }
    }
}

impl WeaponDefinition {
    /// Create a definition with default parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, shoot_type: ShootType) -> Self {
        Self {
            name: name.into(),
            shoot_type,
            ..Self::default()
        }
    }

    /// Set delay between shots.
    #[must_use]
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay_between_shots = delay;
        self
    }

    /// Set spread angle.
    #[must_use]
    pub fn with_spread(mut self, degrees: f32) -> Self {
        self.bullet_spread_angle = degrees;
        self
    }

    /// Set bullets per shot.
    #[must_use]
    pub fn with_bullets_per_shot(mut self, bullets: u32) -> Self {
        self.bullets_per_shot = bullets;
        self
    }

    /// Set ammo capacity.
    #[must_use]
    pub fn with_max_ammo(mut self, max_ammo: u32) -> Self {
        self.max_ammo = max_ammo;
        self
    }

    /// Use a carried pool of physical bullets with manual reloading.
    #[must_use]
    pub fn with_physical_bullets(mut self, clip_size: u32) -> Self {
        self.has_physical_bullets = true;
        self.automatic_reload = false;
        self.clip_size = clip_size;
        self
    }

    /// Set charge parameters.
    #[must_use]
    pub fn with_charge(mut self, duration: f32, start_ammo: f32, usage_rate: f32) -> Self {
        self.max_charge_duration = duration;
        self.ammo_used_on_start_charge = start_ammo;
        self.ammo_usage_rate_while_charging = usage_rate;
        self
    }

    /// Enable or disable automatic reload.
    #[must_use]
    pub fn with_automatic_reload(mut self, enabled: bool) -> Self {
        self.automatic_reload = enabled;
        self
    }

    /// Checks that all values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid("name", "weapon name must not be empty"));
        }
        if self.bullets_per_shot == 0 {
            return Err(ConfigError::invalid("bullets_per_shot", "must be at least 1"));
        }
        if self.max_ammo == 0 {
            return Err(ConfigError::invalid("max_ammo", "must be at least 1"));
        }
        ConfigError::ensure_non_negative("delay_between_shots", self.delay_between_shots)?;
        ConfigError::ensure_range("bullet_spread_angle", self.bullet_spread_angle, 0.0, 360.0)?;
        ConfigError::ensure_non_negative("recoil_force", self.recoil_force)?;
        ConfigError::ensure_non_negative("ammo_reload_rate", self.ammo_reload_rate)?;
        ConfigError::ensure_non_negative("ammo_reload_delay", self.ammo_reload_delay)?;
        ConfigError::ensure_non_negative("max_charge_duration", self.max_charge_duration)?;
        ConfigError::ensure_non_negative(
            "ammo_used_on_start_charge",
            self.ammo_used_on_start_charge,
        )?;
        ConfigError::ensure_non_negative(
            "ammo_usage_rate_while_charging",
            self.ammo_usage_rate_while_charging,
        )?;
        ConfigError::ensure_non_negative("reload_duration", self.reload_duration)
    }
}

// ============================================================================
// Inputs and output
// ============================================================================

/// Trigger state for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShootInputs {
    /// Trigger pressed this tick.
    pub down: bool,
    /// Trigger held.
    pub held: bool,
    /// Trigger released this tick.
    pub up: bool,
}

impl ShootInputs {
    /// No trigger activity.
    pub const NONE: Self = Self {
        down: false,
        held: false,
        up: false,
    };

    /// Trigger pressed this tick (and therefore held).
    #[must_use]
    pub const fn press() -> Self {
        Self {
            down: true,
            held: true,
            up: false,
        }
    }

    /// Trigger kept down.
    #[must_use]
    pub const fn hold() -> Self {
        Self {
            down: false,
            held: true,
            up: false,
        }
    }

    /// Trigger released this tick.
    #[must_use]
    pub const fn release() -> Self {
        Self {
            down: false,
            held: false,
            up: true,
        }
    }
}

/// One discharged shot, handed to the projectile/VFX collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volley {
    /// One direction per bullet.
    pub directions: Vec<Vec3>,
    /// Charge ratio at release (0 for non-charge weapons).
    pub charge: f32,
    /// Recoil applied to the wielder.
    pub recoil_force: f32,
    /// A shell casing was ejected.
    pub shell_ejected: bool,
}

impl Volley {
    /// Bullets in this volley.
    #[must_use]
    pub fn bullet_count(&self) -> usize {
        self.directions.len()
    }
}

// ============================================================================
// Runtime state
// ============================================================================

/// Runtime state of one weapon instance.
#[derive(Debug, Clone)]
pub struct Weapon {
    definition: WeaponDefinition,
    current_ammo: f32,
    carried_bullets: u32,
    last_shot_time: f32,
    last_charge_trigger: f32,
    current_charge: f32,
    charging: bool,
    cooling: bool,
    reload: Option<Deadline>,
    ammo_ratio: f32,
    active: bool,
    wants_to_shoot: bool,
}

impl Weapon {
    /// Creates a full, hidden weapon.
    #[must_use]
    pub fn new(definition: WeaponDefinition) -> Self {
        let carried_bullets = if definition.has_physical_bullets {
            definition.clip_size
        } else {
            0
        };
        Self {
            current_ammo: definition.max_ammo as f32,
            carried_bullets,
            last_shot_time: f32::NEG_INFINITY,
            last_charge_trigger: f32::NEG_INFINITY,
            current_charge: 0.0,
            charging: false,
            cooling: false,
            reload: None,
            ammo_ratio: 1.0,
            active: false,
            wants_to_shoot: false,
            definition,
        }
    }

    /// Static parameters.
    #[must_use]
    pub fn definition(&self) -> &WeaponDefinition {
        &self.definition
    }

    /// Weapon name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Fractional ammo.
    #[must_use]
    pub fn ammo(&self) -> f32 {
        self.current_ammo
    }

    /// Whole rounds available.
    #[must_use]
    pub fn current_ammo(&self) -> u32 {
        self.current_ammo.floor() as u32
    }

    /// Physical bullets carried for manual reloads.
    #[must_use]
    pub fn carried_bullets(&self) -> u32 {
        self.carried_bullets
    }

    /// Charge ratio in `[0, 1]`.
    #[must_use]
    pub fn charge(&self) -> f32 {
        self.current_charge
    }

    /// Time of the last shot or ammo use.
    #[must_use]
    pub fn last_shot_time(&self) -> f32 {
        self.last_shot_time
    }

    /// Time the current (or last) charge started.
    #[must_use]
    pub fn last_charge_trigger(&self) -> f32 {
        self.last_charge_trigger
    }

    /// Charging in progress.
    #[must_use]
    pub fn is_charging(&self) -> bool {
        self.charging
    }

    /// Automatic regeneration in progress.
    #[must_use]
    pub fn is_cooling(&self) -> bool {
        self.cooling
    }

    /// Manual reload in progress.
    #[must_use]
    pub fn is_reloading(&self) -> bool {
        self.reload.is_some()
    }

    /// Pending reload deadline.
    #[must_use]
    pub fn reload_deadline(&self) -> Option<Deadline> {
        self.reload
    }

    /// Ammo as a fraction of capacity, refreshed by [`Weapon::update`].
    #[must_use]
    pub fn ammo_ratio(&self) -> f32 {
        self.ammo_ratio
    }

    /// Shown and held by its owner.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Trigger pressed or held on the last fire attempt.
    #[must_use]
    pub fn wants_to_shoot(&self) -> bool {
        self.wants_to_shoot
    }

    /// Whether a continuous-fire loop should be playing.
    #[must_use]
    pub fn continuous_fire_active(&self) -> bool {
        self.wants_to_shoot && self.current_ammo >= 1.0
    }

    /// Fraction of the ammo bar one shot needs.
    #[must_use]
    pub fn ammo_needed_to_shoot(&self) -> f32 {
        let per_shot = match self.definition.shoot_type {
            ShootType::Charge => self.definition.ammo_used_on_start_charge.max(1.0),
            ShootType::Manual | ShootType::Automatic => 1.0,
        };
        per_shot / (self.definition.max_ammo as f32 * self.definition.bullets_per_shot as f32)
    }

    /// Shows or hides the weapon.
    pub fn show(&mut self, show: bool) {
        if self.active != show {
            trace!("weapon {} {}", self.definition.name, if show { "shown" } else { "hidden" });
        }
        self.active = show;
    }

    /// Adds physical bullets to the carried pool.
    pub fn add_carried_bullets(&mut self, count: u32) {
        let capacity = self.definition.max_ammo.max(self.definition.clip_size);
        self.carried_bullets = self.carried_bullets.saturating_add(count).min(capacity);
    }

    /// Consumes ammo from the magazine and the carried pool.
    pub fn use_ammo(&mut self, amount: f32, now: f32) {
        let max = self.definition.max_ammo;
        self.current_ammo = (self.current_ammo - amount).clamp(0.0, max as f32);
        let carried = i64::from(self.carried_bullets) - amount.round() as i64;
        self.carried_bullets = carried.clamp(0, i64::from(max)) as u32;
        self.last_shot_time = now;
    }

    // ========================================================================
    // Firing
    // ========================================================================

    /// Applies trigger inputs. Returns the volley when a shot was fired.
    ///
    /// `aim` is the muzzle forward direction. Gating failures (cooldown,
    /// ammo, reload in progress) simply return `None`.
    pub fn try_fire(
        &mut self,
        inputs: ShootInputs,
        aim: Vec3,
        now: f32,
        rng: &mut fastrand::Rng,
    ) -> Option<Volley> {
        self.wants_to_shoot = inputs.down || inputs.held;
        if self.is_reloading() {
            return None;
        }

        match self.definition.shoot_type {
            ShootType::Manual if inputs.down => self.try_shoot(aim, now, rng),
            ShootType::Automatic if inputs.held => self.try_shoot(aim, now, rng),
            ShootType::Charge => {
                if inputs.held {
                    self.try_begin_charge(now);
                }
                let full =
                    self.definition.automatic_release_on_charged && self.current_charge >= 1.0;
                if inputs.up || full {
                    self.try_release_charge(aim, now, rng)
                } else {
                    None
                }
            },
            _ => None,
        }
    }

    fn cooldown_elapsed(&self, now: f32) -> bool {
        self.last_shot_time + self.definition.delay_between_shots < now
    }

    fn try_shoot(&mut self, aim: Vec3, now: f32, rng: &mut fastrand::Rng) -> Option<Volley> {
        if self.current_ammo >= 1.0 && self.cooldown_elapsed(now) {
            let volley = self.handle_shoot(aim, now, rng);
            self.current_ammo -= 1.0;
            Some(volley)
        } else {
            None
        }
    }

    fn try_begin_charge(&mut self, now: f32) -> bool {
        let start_cost = self.definition.ammo_used_on_start_charge;
        let bullets_after_start =
            ((self.current_ammo - start_cost) * self.definition.bullets_per_shot as f32).floor();

        if !self.charging
            && self.current_ammo >= start_cost
            && bullets_after_start > 0.0
            && self.cooldown_elapsed(now)
        {
            self.use_ammo(start_cost, now);
            self.last_charge_trigger = now;
            self.charging = true;
            trace!("weapon {} charge started", self.definition.name);
            true
        } else {
            false
        }
    }

    fn try_release_charge(
        &mut self,
        aim: Vec3,
        now: f32,
        rng: &mut fastrand::Rng,
    ) -> Option<Volley> {
        if !self.charging {
            return None;
        }
        let volley = self.handle_shoot(aim, now, rng);
        self.current_charge = 0.0;
        self.charging = false;
        Some(volley)
    }

    fn handle_shoot(&mut self, aim: Vec3, now: f32, rng: &mut fastrand::Rng) -> Volley {
        let bullets = match self.definition.shoot_type {
            ShootType::Charge => {
                (self.current_charge * self.definition.bullets_per_shot as f32).ceil() as usize
            },
            ShootType::Manual | ShootType::Automatic => self.definition.bullets_per_shot as usize,
        };

        let directions = (0..bullets)
            .map(|_| shot_direction_within_spread(aim, self.definition.bullet_spread_angle, rng))
            .collect();

        let shell_ejected = self.definition.has_physical_bullets;
        if shell_ejected {
            self.carried_bullets = self.carried_bullets.saturating_sub(1);
        }
        self.last_shot_time = now;

        Volley {
            directions,
            charge: self.current_charge,
            recoil_force: self.definition.recoil_force,
            shell_ejected,
        }
    }

    // ========================================================================
    // Reload
    // ========================================================================

    /// Starts a timed manual reload. Only starts when the carried pool holds
    /// more than the magazine.
    pub fn start_reload(&mut self, now: f32) -> bool {
        if self.is_reloading() || self.current_ammo >= self.carried_bullets as f32 {
            return false;
        }
        self.reload = Some(Deadline::after(now, self.definition.reload_duration));
        debug!("weapon {} reloading", self.definition.name);
        true
    }

    /// Finishes a reload: refills from the carried pool (bounded by the clip
    /// and capacity) and always clears the reloading flag.
    pub fn complete_reload(&mut self) {
        if self.carried_bullets > 0 {
            let refill = self
                .carried_bullets
                .min(self.definition.clip_size)
                .min(self.definition.max_ammo);
            self.current_ammo = refill as f32;
        }
        if self.reload.take().is_some() {
            debug!("weapon {} reloaded ({} rounds)", self.definition.name, self.current_ammo());
        }
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Advances regeneration, charge and reload by `dt` seconds ending at `now`.
    pub fn update(&mut self, dt: f32, now: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.update_ammo(dt, now);
        self.update_charge(dt, now);

        if self.reload.is_some_and(|deadline| deadline.is_due(now)) {
            self.complete_reload();
        }
    }

    fn update_ammo(&mut self, dt: f32, now: f32) {
        let max = self.definition.max_ammo as f32;
        self.cooling = self.definition.automatic_reload
            && self.last_shot_time + self.definition.ammo_reload_delay < now
            && self.current_ammo < max
            && !self.charging;

        if self.cooling {
            self.current_ammo =
                (self.current_ammo + self.definition.ammo_reload_rate * dt).clamp(0.0, max);
        }
        self.ammo_ratio = self.current_ammo / max;
    }

    fn update_charge(&mut self, dt: f32, now: f32) {
        if !self.charging || self.current_charge >= 1.0 {
            return;
        }

        let charge_left = 1.0 - self.current_charge;
        let rate_step = if self.definition.max_charge_duration <= 0.0 {
            charge_left
        } else {
            dt / self.definition.max_charge_duration
        };
        let added = rate_step.clamp(0.0, charge_left);

        let cost = added * self.definition.ammo_usage_rate_while_charging;
        if cost <= self.current_ammo {
            self.use_ammo(cost, now);
            self.current_charge = (self.current_charge + added).clamp(0.0, 1.0);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rng() -> fastrand::Rng {
        fastrand::Rng::with_seed(3)
    }

    fn charge_weapon() -> Weapon {
        Weapon::new(WeaponDefinition::new("Lance", ShootType::Charge).with_charge(2.0, 1.0, 1.0))
    }

    #[test]
    fn test_new_weapon_is_full_and_hidden() {
        let weapon = Weapon::new(WeaponDefinition::default());
        assert_eq!(weapon.current_ammo(), 8);
        assert_eq!(weapon.carried_bullets(), 0);
        assert!(!weapon.is_active());
        assert!(!weapon.is_reloading());
        assert_eq!(weapon.ammo_ratio(), 1.0);
    }

    #[test]
    fn test_manual_cooldown_scenario() {
        let mut rng = rng();
        let mut weapon = Weapon::new(WeaponDefinition::default());

        assert!(weapon.try_fire(ShootInputs::press(), Vec3::Z, 1.0, &mut rng).is_some());
        assert_eq!(weapon.current_ammo(), 7);

        assert!(weapon.try_fire(ShootInputs::press(), Vec3::Z, 1.2, &mut rng).is_none());
        assert_eq!(weapon.current_ammo(), 7);

        assert!(weapon.try_fire(ShootInputs::press(), Vec3::Z, 1.7, &mut rng).is_some());
        assert_eq!(weapon.current_ammo(), 6);
    }

    #[test]
    fn test_manual_ignores_held_trigger() {
        let mut rng = rng();
        let mut weapon = Weapon::new(WeaponDefinition::default());
        assert!(weapon.try_fire(ShootInputs::hold(), Vec3::Z, 10.0, &mut rng).is_none());
        assert!(weapon.wants_to_shoot());
    }

    #[test]
    fn test_automatic_fires_while_held() {
        let mut rng = rng();
        let mut weapon =
            Weapon::new(WeaponDefinition::new("Rifle", ShootType::Automatic).with_delay(0.1));

        assert!(weapon.try_fire(ShootInputs::hold(), Vec3::Z, 1.0, &mut rng).is_some());
        assert!(weapon.try_fire(ShootInputs::hold(), Vec3::Z, 1.05, &mut rng).is_none());
        assert!(weapon.try_fire(ShootInputs::hold(), Vec3::Z, 1.2, &mut rng).is_some());
        assert!(weapon.try_fire(ShootInputs::press(), Vec3::Z, 1.4, &mut rng).is_some());
        assert_eq!(weapon.current_ammo(), 5);
    }

    #[test]
    fn test_no_ammo_no_shot() {
        let mut rng = rng();
        let mut weapon = Weapon::new(WeaponDefinition::default().with_max_ammo(1));
        assert!(weapon.try_fire(ShootInputs::press(), Vec3::Z, 1.0, &mut rng).is_some());
        assert!(weapon.try_fire(ShootInputs::press(), Vec3::Z, 5.0, &mut rng).is_none());
        assert!(!weapon.continuous_fire_active());
    }

    #[test]
    fn test_volley_fans_out_bullets() {
        let mut rng = rng();
        let mut weapon =
            Weapon::new(WeaponDefinition::default().with_bullets_per_shot(6).with_spread(10.0));
        let volley = weapon
            .try_fire(ShootInputs::press(), Vec3::Z, 1.0, &mut rng)
            .expect("first shot fires");
        assert_eq!(volley.bullet_count(), 6);
        assert_eq!(volley.charge, 0.0);
        for dir in &volley.directions {
            assert!(dir.angle_between(Vec3::Z) <= 10.0_f32.to_radians() + 1e-3);
        }
    }

    #[test]
    fn test_charge_cycle() {
        let mut rng = rng();
        let mut weapon = charge_weapon();

        assert!(weapon.try_fire(ShootInputs::hold(), Vec3::Z, 1.0, &mut rng).is_none());
        assert!(weapon.is_charging());
        assert_eq!(weapon.ammo(), 7.0);
        assert_eq!(weapon.last_charge_trigger(), 1.0);

        weapon.update(0.5, 1.5);
        assert!((weapon.charge() - 0.25).abs() < 1e-6);
        assert!((weapon.ammo() - 6.75).abs() < 1e-6);

        let volley = weapon
            .try_fire(ShootInputs::release(), Vec3::Z, 1.5, &mut rng)
            .expect("release fires");
        assert_eq!(volley.bullet_count(), 1);
        assert!((volley.charge - 0.25).abs() < 1e-6);
        assert_eq!(weapon.charge(), 0.0);
        assert!(!weapon.is_charging());
    }

    #[test]
    fn test_charge_requires_ammo_beyond_start_cost() {
        let mut rng = rng();
        let mut weapon = Weapon::new(
            WeaponDefinition::new("Lance", ShootType::Charge)
                .with_max_ammo(1)
                .with_charge(2.0, 1.0, 1.0),
        );
        weapon.try_fire(ShootInputs::hold(), Vec3::Z, 1.0, &mut rng);
        assert!(!weapon.is_charging());
    }

    #[test]
    fn test_instant_charge_and_auto_release() {
        let mut rng = rng();
        let mut definition = WeaponDefinition::new("Burst", ShootType::Charge)
            .with_bullets_per_shot(4)
            .with_charge(0.0, 1.0, 1.0);
        definition.automatic_release_on_charged = true;
        let mut weapon = Weapon::new(definition);

        assert!(weapon.try_fire(ShootInputs::hold(), Vec3::Z, 1.0, &mut rng).is_none());
        weapon.update(0.016, 1.016);
        assert_eq!(weapon.charge(), 1.0);

        let volley = weapon
            .try_fire(ShootInputs::hold(), Vec3::Z, 1.016, &mut rng)
            .expect("auto release at full charge");
        assert_eq!(volley.bullet_count(), 4);
    }

    #[test]
    fn test_charge_stalls_without_ammo() {
        let mut rng = rng();
        let mut weapon = Weapon::new(
            WeaponDefinition::new("Lance", ShootType::Charge)
                .with_max_ammo(2)
                .with_charge(1.0, 1.0, 4.0),
        );
        weapon.try_fire(ShootInputs::hold(), Vec3::Z, 1.0, &mut rng);
        assert!(weapon.is_charging());

        // 0.5 charge would need 2 ammo, only 1 left
        weapon.update(0.5, 1.5);
        assert_eq!(weapon.charge(), 0.0);
        assert_eq!(weapon.ammo(), 1.0);
    }

    #[test]
    fn test_automatic_regeneration() {
        let mut rng = rng();
        let mut weapon = Weapon::new(WeaponDefinition::default());
        weapon.try_fire(ShootInputs::press(), Vec3::Z, 1.0, &mut rng);
        weapon.try_fire(ShootInputs::press(), Vec3::Z, 2.0, &mut rng);
        assert_eq!(weapon.current_ammo(), 6);

        weapon.update(1.0, 3.5);
        assert!(!weapon.is_cooling());
        assert_eq!(weapon.current_ammo(), 6);

        weapon.update(1.0, 4.5);
        assert!(weapon.is_cooling());
        assert_eq!(weapon.current_ammo(), 7);

        weapon.update(5.0, 9.5);
        assert_eq!(weapon.current_ammo(), 8);
        assert_eq!(weapon.ammo_ratio(), 1.0);

        weapon.update(1.0, 10.5);
        assert!(!weapon.is_cooling());
    }

    #[test]
    fn test_physical_bullets_and_manual_reload() {
        let mut rng = rng();
        let mut weapon = Weapon::new(
            WeaponDefinition::new("Pistol", ShootType::Manual).with_physical_bullets(30),
        );
        assert_eq!(weapon.carried_bullets(), 30);

        let volley = weapon
            .try_fire(ShootInputs::press(), Vec3::Z, 1.0, &mut rng)
            .expect("shot");
        assert!(volley.shell_ejected);
        assert_eq!(weapon.carried_bullets(), 29);
        weapon.try_fire(ShootInputs::press(), Vec3::Z, 2.0, &mut rng);
        assert_eq!(weapon.current_ammo(), 6);

        weapon.update(10.0, 20.0);
        assert_eq!(weapon.current_ammo(), 6, "no regeneration without automatic reload");

        assert!(weapon.start_reload(20.0));
        assert!(!weapon.start_reload(20.1));
        assert!(weapon.try_fire(ShootInputs::press(), Vec3::Z, 20.5, &mut rng).is_none());

        weapon.update(1.0, 21.0);
        assert!(weapon.is_reloading());
        weapon.update(0.5, 21.5);
        assert!(!weapon.is_reloading());
        assert_eq!(weapon.current_ammo(), 8);
    }

    #[test]
    fn test_reload_refused_when_pool_is_short() {
        let mut weapon = Weapon::new(WeaponDefinition::default());
        assert!(!weapon.start_reload(0.0));
    }

    #[test]
    fn test_complete_reload_with_empty_pool_clears_flag() {
        let mut weapon = Weapon::new(
            WeaponDefinition::new("Pistol", ShootType::Manual).with_physical_bullets(30),
        );
        weapon.use_ammo(8.0, 1.0);
        assert!(weapon.start_reload(1.0));
        weapon.carried_bullets = 0;

        weapon.update(2.0, 3.0);
        assert!(!weapon.is_reloading());
        assert_eq!(weapon.current_ammo(), 0);
    }

    #[test]
    fn test_use_ammo_clamps_pool() {
        let mut weapon = Weapon::new(
            WeaponDefinition::new("Pistol", ShootType::Manual).with_physical_bullets(30),
        );
        weapon.use_ammo(2.4, 3.0);
        assert!((weapon.ammo() - 5.6).abs() < 1e-5);
        // 30 - 2, clamped to capacity 8
        assert_eq!(weapon.carried_bullets(), 8);
        assert_eq!(weapon.last_shot_time(), 3.0);

        weapon.use_ammo(100.0, 4.0);
        assert_eq!(weapon.ammo(), 0.0);
        assert_eq!(weapon.carried_bullets(), 0);
    }

    #[test]
    fn test_add_carried_bullets_is_bounded() {
        let mut weapon = Weapon::new(
            WeaponDefinition::new("Pistol", ShootType::Manual).with_physical_bullets(12),
        );
        weapon.add_carried_bullets(100);
        assert_eq!(weapon.carried_bullets(), 12);
    }

    #[test]
    fn test_ammo_needed_to_shoot() {
        let weapon = Weapon::new(WeaponDefinition::default().with_bullets_per_shot(2));
        assert!((weapon.ammo_needed_to_shoot() - 1.0 / 16.0).abs() < 1e-6);

        let charge = Weapon::new(
            WeaponDefinition::new("Lance", ShootType::Charge).with_charge(2.0, 4.0, 1.0),
        );
        assert!((charge.ammo_needed_to_shoot() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ammo_needed_to_shoot_with_huge_capacity() {
        let definition = WeaponDefinition::default()
            .with_max_ammo(70_000)
            .with_bullets_per_shot(70_000);
        assert!(definition.validate().is_ok());

        let needed = Weapon::new(definition).ammo_needed_to_shoot();
        assert!(needed > 0.0);
        assert!((needed - 1.0 / 4.9e9).abs() < 1e-12);
    }

    #[test]
    fn test_definition_validation() {
        assert!(WeaponDefinition::default().validate().is_ok());
        assert!(WeaponDefinition::default().with_bullets_per_shot(0).validate().is_err());
        assert!(WeaponDefinition::default().with_max_ammo(0).validate().is_err());
        assert!(WeaponDefinition::default().with_delay(-1.0).validate().is_err());
        assert!(WeaponDefinition::default().with_spread(400.0).validate().is_err());
        assert!(WeaponDefinition::new(" ", ShootType::Manual).validate().is_err());
    }

    #[test]
    fn test_definition_toml_defaults() {
        let source = "name = \"Shotgun\"\nshoot_type = \"automatic\"\nbullets_per_shot = 8\n";
        let parsed: WeaponDefinition = toml::from_str(source).expect("valid weapon toml");
        assert_eq!(parsed.shoot_type, ShootType::Automatic);
        assert_eq!(parsed.bullets_per_shot, 8);
        assert_eq!(parsed.max_ammo, 8);
        assert_eq!(parsed.delay_between_shots, 0.5);
    }

    proptest! {
        #[test]
        fn prop_charge_is_monotonic(steps in proptest::collection::vec(0.0f32..0.2, 1..60)) {
            let mut rng = rng();
            let mut weapon = charge_weapon();
            let mut now = 1.0;
            weapon.try_fire(ShootInputs::hold(), Vec3::Z, now, &mut rng);
            prop_assert!(weapon.is_charging());

            let mut previous = weapon.charge();
            for dt in steps {
                now += dt;
                weapon.update(dt, now);
                weapon.try_fire(ShootInputs::hold(), Vec3::Z, now, &mut rng);
                prop_assert!(weapon.charge() >= previous);
                prop_assert!(weapon.charge() <= 1.0);
                previous = weapon.charge();
            }

            weapon.try_fire(ShootInputs::release(), Vec3::Z, now, &mut rng);
            prop_assert_eq!(weapon.charge(), 0.0);
        }

        #[test]
        fn prop_fire_consumes_one_round(shots in 1usize..20) {
            let mut rng = rng();
            let mut weapon =
                Weapon::new(WeaponDefinition::default().with_max_ammo(32).with_delay(0.1));
            for i in 0..shots {
                let before = weapon.ammo();
                let fired =
                    weapon.try_fire(ShootInputs::press(), Vec3::Z, 1.0 + i as f32, &mut rng);
                prop_assert!(fired.is_some());
                prop_assert_eq!(weapon.ammo(), (before - 1.0).max(0.0));
            }
        }

        #[test]
        fn prop_reload_always_completes(spent in 0.0f32..40.0) {
            let mut weapon = Weapon::new(
                WeaponDefinition::new("Pistol", ShootType::Manual).with_physical_bullets(30),
            );
            weapon.use_ammo(spent, 0.0);
            if weapon.start_reload(1.0) {
                prop_assert!(weapon.is_reloading());
                weapon.update(2.0, 3.0);
            }
            prop_assert!(!weapon.is_reloading());
        }
    }
}
