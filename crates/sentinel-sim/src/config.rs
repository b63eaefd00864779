//! Encounter configuration.
//!
//! Provides the run length, enemy and target tuning, spawners and the weapon
//! table. Configuration can be loaded from and saved to a TOML file.

use sentinel_common::{ConfigError, Position, SentinelResult, Vec3};
use sentinel_gameplay::{
    AgentConfig, ShootType, SpawnPoints, SwitchConfig, Team, WeaponDefinition, WEAPON_SLOT_COUNT,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Range sensor tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Distance at which the target is seen.
    pub detection_range: f32,
    /// Seconds a target out of sight stays known.
    pub known_target_timeout: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            detection_range: 20.0,
            known_target_timeout: 4.0,
        }
    }
}

/// The scripted target the enemy fights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Looping route.
    pub waypoints: Vec<Position>,
    /// Walking speed in units per second.
    pub speed: f32,
    /// Maximum health.
    pub max_health: f32,
    /// The target shoots back when the enemy is this close.
    pub engage_range: f32,
    /// Seconds the trigger is held before it is let go.
    pub trigger_hold: f32,
    /// Seconds between scrolls to the next weapon (0 never switches).
    pub switch_interval: f32,
    /// Names of the weapons carried, in slot order.
    pub weapons: Vec<String>,
    /// Team used to choose a spawner.
    pub team: Team,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            waypoints: vec![
                Vec3::new(-30.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 6.0),
                Vec3::new(30.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, -6.0),
            ],
            speed: 2.5,
            max_health: 100.0,
            engage_range: 15.0,
            trigger_hold: 1.0,
            switch_interval: 8.0,
            weapons: vec!["Blaster".into(), "Shotgun".into(), "Disruptor".into()],
            team: Team::Blue,
        }
    }
}

/// Hit resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Damage of one enemy bullet.
    pub enemy_bullet_damage: f32,
    /// Damage of one target bullet.
    pub target_bullet_damage: f32,
    /// Extra damage of a fully charged bullet.
    pub charge_bonus_damage: f32,
    /// A bullet hits when it leaves within this angle of the line to the victim.
    pub hit_cone_degrees: f32,
    /// Bullets travel no further than this.
    pub max_hit_distance: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            enemy_bullet_damage: 4.0,
            target_bullet_damage: 12.0,
            charge_bonus_damage: 30.0,
            hit_cone_degrees: 3.0,
            max_hit_distance: 60.0,
        }
    }
}

/// Full harness configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Run ===
    /// Ticks per simulated second.
    pub tick_rate: u32,
    /// Ticks to run.
    pub ticks: u64,
    /// Random seed; `None` picks one at startup.
    pub seed: Option<u64>,
    /// Seconds between death and respawn.
    pub respawn_delay: f32,

    // === Enemy ===
    /// Enemy tuning.
    pub agent: AgentConfig,
    /// Name of the enemy weapon.
    pub enemy_weapon: String,
    /// Navigation speed in units per second.
    pub enemy_move_speed: f32,
    /// First spawn position.
    pub enemy_spawn: Position,
    /// Patrol route.
    pub patrol: Vec<Position>,
    /// Range sensor.
    pub sensor: SensorConfig,

    // === Target ===
    /// Scripted target.
    pub target: TargetConfig,
    /// Target weapon switching.
    pub switch: SwitchConfig,

    // === World ===
    /// Hit resolution.
    pub combat: CombatConfig,
    /// Team spawners.
    pub spawn_points: SpawnPoints,
    /// Weapon table, referenced by name.
    pub weapons: Vec<WeaponDefinition>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            ticks: 3600,
            seed: None,
            respawn_delay: 5.0,

            agent: AgentConfig::default(),
            enemy_weapon: "Eye Laser".into(),
            enemy_move_speed: 3.5,
            enemy_spawn: Vec3::new(0.0, 0.0, 12.0),
            patrol: vec![
                Vec3::new(-8.0, 0.0, 12.0),
                Vec3::new(8.0, 0.0, 12.0),
                Vec3::new(8.0, 0.0, 20.0),
                Vec3::new(-8.0, 0.0, 20.0),
            ],
            sensor: SensorConfig::default(),

            target: TargetConfig::default(),
            switch: SwitchConfig::default(),

            combat: CombatConfig::default(),
            spawn_points: SpawnPoints {
                red: vec![Vec3::new(0.0, 0.0, 16.0)],
                blue: vec![Vec3::new(-30.0, 0.0, 0.0), Vec3::new(30.0, 0.0, 0.0)],
            },
            weapons: default_weapons(),
        }
    }
}

fn default_weapons() -> Vec<WeaponDefinition> {
    vec![
        WeaponDefinition::new("Eye Laser", ShootType::Automatic)
            .with_delay(0.2)
            .with_spread(4.0)
            .with_max_ammo(20),
        WeaponDefinition::new("Blaster", ShootType::Manual),
        WeaponDefinition::new("Shotgun", ShootType::Manual)
            .with_delay(1.0)
            .with_spread(10.0)
            .with_bullets_per_shot(6)
            .with_max_ammo(6)
            .with_physical_bullets(24),
        WeaponDefinition::new("Disruptor", ShootType::Charge).with_charge(1.0, 1.0, 2.0),
    ]
}

impl SimConfig {
    /// Loads configuration from a specific path.
    ///
    /// Returns defaults if the file doesn't exist or can't be parsed.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match Self::from_toml(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Parses a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to a specific path, creating parent directories.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> SentinelResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = toml::to_string_pretty(self).map_err(ConfigError::from)?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamps values to sane ranges.
    pub fn validate(&mut self) {
        // Run
        self.tick_rate = self.tick_rate.clamp(1, 240);
        self.respawn_delay = self.respawn_delay.clamp(0.0, 60.0);

        // Enemy
        self.enemy_move_speed = self.enemy_move_speed.clamp(0.0, 50.0);
        self.sensor.detection_range = self.sensor.detection_range.clamp(0.0, 500.0);
        self.sensor.known_target_timeout = self.sensor.known_target_timeout.clamp(0.0, 60.0);

        // Target
        self.target.speed = self.target.speed.clamp(0.0, 50.0);
        self.target.engage_range = self.target.engage_range.max(0.0);
        self.target.trigger_hold = self.target.trigger_hold.clamp(0.0, 10.0);
        self.target.switch_interval = self.target.switch_interval.max(0.0);

        // Combat
        self.combat.hit_cone_degrees = self.combat.hit_cone_degrees.clamp(0.0, 45.0);
        self.combat.max_hit_distance = self.combat.max_hit_distance.max(0.0);
    }

    /// Checks the parts that cannot be clamped: weapon table, loadouts,
    /// spawners and agent tuning.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.agent.validate()?;
        self.spawn_points.validate()?;

        let mut names = HashSet::new();
        for weapon in &self.weapons {
            weapon.validate()?;
            if !names.insert(weapon.name.as_str()) {
                return Err(ConfigError::DuplicateWeapon(weapon.name.clone()));
            }
        }

        if self.weapon(&self.enemy_weapon).is_none() {
            return Err(ConfigError::invalid(
                "enemy_weapon",
                format!("unknown weapon '{}'", self.enemy_weapon),
            ));
        }
        if self.target.weapons.len() > WEAPON_SLOT_COUNT {
            return Err(ConfigError::invalid(
                "target.weapons",
                format!("at most {WEAPON_SLOT_COUNT} weapons fit in the slots"),
            ));
        }
        if let Some(missing) = self.target.weapons.iter().find(|name| self.weapon(name).is_none()) {
            return Err(ConfigError::invalid(
                "target.weapons",
                format!("unknown weapon '{missing}'"),
            ));
        }
        if self.target.waypoints.is_empty() {
            return Err(ConfigError::invalid("target.waypoints", "at least one waypoint required"));
        }
        if !(self.target.max_health.is_finite() && self.target.max_health > 0.0) {
            return Err(ConfigError::invalid("target.max_health", "must be > 0"));
        }

        let combat = &self.combat;
        ConfigError::ensure_non_negative("combat.enemy_bullet_damage", combat.enemy_bullet_damage)?;
        ConfigError::ensure_non_negative(
            "combat.target_bullet_damage",
            combat.target_bullet_damage,
        )?;
        ConfigError::ensure_non_negative("combat.charge_bonus_damage", combat.charge_bonus_damage)?;
        Ok(())
    }

    /// Looks up a weapon definition by name.
    #[must_use]
    pub fn weapon(&self, name: &str) -> Option<&WeaponDefinition> {
        self.weapons.iter().find(|w| w.name == name)
    }

    /// Fixed step in seconds.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.patrol.len(), 4);
        assert!(config.check().is_ok());
        assert!((config.fixed_dt() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_config_validation_clamps() {
        let mut config = SimConfig::default();
        config.tick_rate = 0;
        config.respawn_delay = -3.0;
        config.combat.hit_cone_degrees = 90.0;

        config.validate();

        assert_eq!(config.tick_rate, 1);
        assert_eq!(config.respawn_delay, 0.0);
        assert_eq!(config.combat.hit_cone_degrees, 45.0);
    }

    #[test]
    fn test_check_rejects_duplicate_weapon() {
        let mut config = SimConfig::default();
        config.weapons.push(WeaponDefinition::default());
        assert!(matches!(
            config.check(),
            Err(ConfigError::DuplicateWeapon(name)) if name == "Blaster"
        ));
    }

    #[test]
    fn test_check_rejects_unknown_weapons() {
        let mut config = SimConfig::default();
        config.enemy_weapon = "Railgun".into();
        assert!(config.check().is_err());

        let mut config = SimConfig::default();
        config.target.weapons.push("Railgun".into());
        assert!(config.check().is_err());
    }

    #[test]
    fn test_check_rejects_invalid_weapon_definition() {
        let mut config = SimConfig::default();
        config.weapons[0].bullet_spread_angle = 400.0;
        assert!(matches!(config.check(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("sentinel.toml");

        let mut config = SimConfig::default();
        config.ticks = 120;
        config.seed = Some(12345);
        config.agent.attack_cooldown = 2.0;
        config.weapons[1].delay_between_shots = 0.25;

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = SimConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = SimConfig::load_from("/nonexistent/path/sentinel.toml");
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_config_load_invalid_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "tick_rate = \"fast\"").expect("write");
        assert_eq!(SimConfig::load_from(&config_path), SimConfig::default());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SimConfig::from_toml(
            r#"
            ticks = 10
            enemy_weapon = "Zapper"

            [[weapons]]
            name = "Zapper"
            shoot_type = "automatic"
            delay_between_shots = 0.1
            "#,
        )
        .expect("parse");

        assert_eq!(config.ticks, 10);
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.weapons.len(), 1);
        assert_eq!(config.weapons[0].shoot_type, ShootType::Automatic);
        assert_eq!(config.weapons[0].max_ammo, 8);
        // the default target loadout references weapons that no longer exist
        assert!(config.check().is_err());
    }

    #[test]
    fn test_config_toml_serialization() {
        let toml_str = toml::to_string_pretty(&SimConfig::default()).expect("Failed to serialize");
        assert!(toml_str.contains("tick_rate"));
        assert!(toml_str.contains("[[weapons]]"));
    }
}
