//! Distance-based target sensor.

use crate::config::SensorConfig;
use sentinel_common::{within_radius, Position};
use sentinel_gameplay::{DetectionSnapshot, TargetSensor};

/// Sees the target inside a detection sphere and remembers it for a while
/// after it leaves. Being hit reveals the attacker's position.
#[derive(Debug, Clone)]
pub struct RangeSensor {
    detection_range: f32,
    attack_range: f32,
    known_target_timeout: f32,
    target: Option<Position>,
    known: Option<Position>,
    last_seen: f32,
    now: f32,
    attacks: u32,
}

impl RangeSensor {
    /// Creates a sensor with nothing known.
    #[must_use]
    pub fn new(config: SensorConfig, attack_range: f32) -> Self {
        Self {
            detection_range: config.detection_range,
            attack_range,
            known_target_timeout: config.known_target_timeout,
            target: None,
            known: None,
            last_seen: f32::NEG_INFINITY,
            now: 0.0,
            attacks: 0,
        }
    }

    /// Feeds the target position for the coming tick (`None` while the
    /// target is down).
    pub fn observe(&mut self, target: Option<Position>, now: f32) {
        self.target = target;
        self.now = now;
    }

    /// Volleys fired through this sensor's owner.
    #[must_use]
    pub const fn attacks(&self) -> u32 {
        self.attacks
    }
}

impl TargetSensor for RangeSensor {
    fn sense(&mut self, origin: Position) -> DetectionSnapshot {
        let visible = match self.target {
            Some(target) if within_radius(origin, target, self.detection_range) => {
                self.known = Some(target);
                self.last_seen = self.now;
                true
            },
            _ => false,
        };

        let expired = self.now - self.last_seen > self.known_target_timeout;
        if self.target.is_none() || (!visible && expired) {
            self.known = None;
        }

        match self.known {
            Some(known) => {
                let in_range = within_radius(origin, known, self.attack_range);
                DetectionSnapshot::known(known, visible, in_range)
            },
            None => DetectionSnapshot::none(),
        }
    }

    fn on_damaged(&mut self, source: Position) {
        self.known = Some(source);
        self.last_seen = self.now;
    }

    fn on_attack(&mut self) {
        self.attacks += 1;
    }
}
