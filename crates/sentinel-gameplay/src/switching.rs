//! Weapon slots and the put-down / put-up switching sequencer.

use crate::weapon::{ShootInputs, Volley, Weapon, WeaponDefinition};
use sentinel_common::{SlotIndex, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Number of weapon slots.
pub const WEAPON_SLOT_COUNT: usize = 9;

// ============================================================================
// Types
// ============================================================================

/// Phase of the switching sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponSwitchState {
    /// Active weapon raised and usable.
    Up,
    /// Nothing raised.
    #[default]
    Down,
    /// Lowering the previous weapon.
    PutDownPrevious,
    /// Raising the new weapon.
    PutUpNew,
}

impl WeaponSwitchState {
    /// Whether a new switch may be requested in this phase.
    #[must_use]
    pub const fn accepts_switch(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}

/// Errors when adding weapons to slots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    /// A weapon with the same name is already held.
    #[error("weapon {0} is already held")]
    AlreadyHeld(String),
    /// All slots are occupied.
    #[error("no free weapon slot")]
    NoFreeSlot,
}

/// Tuning of the weapon manager.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchConfig {
    /// Seconds per put-down or put-up phase.
    pub switch_delay: f32,
    /// Maximum accumulated recoil distance.
    pub max_recoil_distance: f32,
    /// How fast the weapon follows accumulated recoil.
    pub recoil_sharpness: f32,
    /// How fast the weapon returns after recoil.
    pub recoil_restitution_sharpness: f32,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            switch_delay: 1.0,
            max_recoil_distance: 0.5,
            recoil_sharpness: 50.0,
            recoil_restitution_sharpness: 10.0,
        }
    }
}

/// Per-tick inputs of a weapon wielder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponInputs {
    /// Trigger state.
    pub fire: ShootInputs,
    /// Aim button held.
    pub aim_held: bool,
    /// Reload button pressed this tick.
    pub reload_pressed: bool,
    /// Scroll direction: positive ascending, negative descending, 0 none.
    pub switch_direction: i32,
    /// Direct slot selection.
    pub select_slot: Option<usize>,
}

/// Slot changes reported to listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponSlotEvent {
    /// A weapon was placed in a slot.
    Added {
        /// Slot used
        slot: SlotIndex,
        /// Weapon name
        name: String,
    },
    /// A weapon was removed from a slot.
    Removed {
        /// Slot freed
        slot: SlotIndex,
        /// Weapon name
        name: String,
    },
    /// The active slot changed.
    SwitchedTo {
        /// New active slot
        slot: SlotIndex,
        /// Weapon in that slot, if any
        name: Option<String>,
    },
}

/// Distance from `from` to `to` walking the slots in one direction.
///
/// `from` is `None` when nothing is active; walking then starts just before
/// slot 0 (ascending) or just after the last slot (descending).
#[must_use]
pub fn slot_distance(from: Option<usize>, to: usize, ascending: bool, slot_count: usize) -> usize {
    let from = from.map_or(-1, |f| f as isize);
    let to = to as isize;
    let mut distance = if ascending { to - from } else { from - to };
    if distance < 0 {
        distance += slot_count as isize;
    }
    distance as usize
}

// ============================================================================
// Manager
// ============================================================================

/// Nine weapon slots plus the switching sequencer.
#[derive(Debug, Clone)]
pub struct WeaponManager {
    slots: [Option<Weapon>; WEAPON_SLOT_COUNT],
    active: Option<usize>,
    pending: Option<usize>,
    state: WeaponSwitchState,
    switch_started: f32,
    aiming: bool,
    accumulated_recoil: f32,
    recoil_offset: f32,
    config: SwitchConfig,
    events: Vec<WeaponSlotEvent>,
}

impl Default for WeaponManager {
    fn default() -> Self {
        Self::new(SwitchConfig::default())
    }
}

impl WeaponManager {
    /// Creates an empty manager with nothing raised.
    #[must_use]
    pub fn new(config: SwitchConfig) -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            active: None,
            pending: None,
            state: WeaponSwitchState::Down,
            switch_started: 0.0,
            aiming: false,
            accumulated_recoil: 0.0,
            recoil_offset: 0.0,
            config,
            events: Vec::new(),
        }
    }

    /// Current sequencer phase.
    #[must_use]
    pub const fn state(&self) -> WeaponSwitchState {
        self.state
    }

    /// Active slot, if any.
    #[must_use]
    pub fn active_index(&self) -> Option<SlotIndex> {
        self.active.map(SlotIndex)
    }

    /// Aiming as of the last update.
    #[must_use]
    pub const fn is_aiming(&self) -> bool {
        self.aiming
    }

    /// Accumulated recoil distance.
    #[must_use]
    pub const fn accumulated_recoil(&self) -> f32 {
        self.accumulated_recoil
    }

    /// Current recoil displacement of the weapon.
    #[must_use]
    pub const fn recoil_offset(&self) -> f32 {
        self.recoil_offset
    }

    /// Weapon in `slot`.
    #[must_use]
    pub fn weapon_at(&self, slot: usize) -> Option<&Weapon> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Mutable weapon in `slot`.
    pub fn weapon_at_mut(&mut self, slot: usize) -> Option<&mut Weapon> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Weapon in the active slot.
    #[must_use]
    pub fn active_weapon(&self) -> Option<&Weapon> {
        self.active.and_then(|slot| self.weapon_at(slot))
    }

    /// Mutable weapon in the active slot.
    pub fn active_weapon_mut(&mut self) -> Option<&mut Weapon> {
        let slot = self.active?;
        self.weapon_at_mut(slot)
    }

    /// Slot holding a weapon named `name`.
    #[must_use]
    pub fn has_weapon(&self, name: &str) -> Option<SlotIndex> {
        self.slots
            .iter()
            .position(|w| w.as_ref().is_some_and(|w| w.name() == name))
            .map(SlotIndex)
    }

    /// Number of held weapons.
    #[must_use]
    pub fn weapon_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Drains pending slot events.
    pub fn drain_events(&mut self) -> Vec<WeaponSlotEvent> {
        std::mem::take(&mut self.events)
    }

    /// Puts a new, hidden weapon in the first free slot.
    pub fn add_weapon(&mut self, definition: WeaponDefinition) -> Result<SlotIndex, SlotError> {
        if self.has_weapon(&definition.name).is_some() {
            return Err(SlotError::AlreadyHeld(definition.name));
        }

        let slot = self.slots.iter().position(Option::is_none).ok_or(SlotError::NoFreeSlot)?;
        let mut weapon = Weapon::new(definition);
        weapon.show(false);
        let name = weapon.name().to_string();
        self.slots[slot] = Some(weapon);

        debug!("added weapon {} in slot {}", name, slot);
        self.events.push(WeaponSlotEvent::Added {
            slot: SlotIndex(slot),
            name,
        });
        Ok(SlotIndex(slot))
    }

    /// Removes the weapon in `slot`. Removing the active weapon switches to
    /// the next one.
    pub fn remove_weapon(&mut self, slot: usize, now: f32) -> Option<Weapon> {
        let weapon = self.slots.get_mut(slot)?.take()?;
        self.events.push(WeaponSlotEvent::Removed {
            slot: SlotIndex(slot),
            name: weapon.name().to_string(),
        });
        debug!("removed weapon {} from slot {}", weapon.name(), slot);

        if self.active == Some(slot) {
            self.switch_weapon(true, now);
        }
        Some(weapon)
    }

    /// Switches to the nearest occupied slot in the given direction.
    /// Returns whether a switch started.
    pub fn switch_weapon(&mut self, ascending: bool, now: f32) -> bool {
        let mut best: Option<(usize, usize)> = None;
        for (slot, weapon) in self.slots.iter().enumerate() {
            if Some(slot) == self.active || weapon.is_none() {
                continue;
            }
            let distance = slot_distance(self.active, slot, ascending, WEAPON_SLOT_COUNT);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((slot, distance));
            }
        }

        match best {
            Some((slot, _)) => self.switch_to_index(slot, now),
            None => false,
        }
    }

    /// Starts switching to `slot`. Switching to the active slot does nothing.
    pub fn switch_to_index(&mut self, slot: usize, now: f32) -> bool {
        if slot >= WEAPON_SLOT_COUNT || Some(slot) == self.active {
            return false;
        }

        self.pending = Some(slot);
        self.switch_started = now;

        if self.active_weapon().is_none() {
            self.state = WeaponSwitchState::PutUpNew;
            self.active = Some(slot);
            self.on_switched(slot);
        } else {
            self.state = WeaponSwitchState::PutDownPrevious;
        }
        true
    }

    /// Progress of the current phase in `[0, 1]`.
    #[must_use]
    pub fn switching_factor(&self, now: f32) -> f32 {
        if self.config.switch_delay == 0.0 {
            1.0
        } else {
            ((now - self.switch_started) / self.config.switch_delay).clamp(0.0, 1.0)
        }
    }

    /// How far the weapon is lowered: 0 raised, 1 fully down.
    #[must_use]
    pub fn lowered_ratio(&self, now: f32) -> f32 {
        match self.state {
            WeaponSwitchState::Up => 0.0,
            WeaponSwitchState::Down => 1.0,
            WeaponSwitchState::PutDownPrevious => self.switching_factor(now),
            WeaponSwitchState::PutUpNew => 1.0 - self.switching_factor(now),
        }
    }

    /// Advances the sequencer.
    pub fn update_switching(&mut self, now: f32) {
        if self.switching_factor(now) < 1.0 {
            return;
        }

        match self.state {
            WeaponSwitchState::PutDownPrevious => {
                if let Some(old) = self.active_weapon_mut() {
                    old.show(false);
                }
                let Some(new_slot) = self.pending else {
                    self.state = WeaponSwitchState::Down;
                    return;
                };
                self.active = Some(new_slot);
                self.on_switched(new_slot);

                if self.weapon_at(new_slot).is_some() {
                    self.switch_started = now;
                    self.state = WeaponSwitchState::PutUpNew;
                } else {
                    self.state = WeaponSwitchState::Down;
                }
            },
            WeaponSwitchState::PutUpNew => {
                self.state = WeaponSwitchState::Up;
            },
            WeaponSwitchState::Up | WeaponSwitchState::Down => {},
        }
    }

    fn on_switched(&mut self, slot: usize) {
        let name = self.weapon_at_mut(slot).map(|weapon| {
            weapon.show(true);
            weapon.name().to_string()
        });
        info!("switched to slot {} ({})", slot, name.as_deref().unwrap_or("empty"));
        self.events.push(WeaponSlotEvent::SwitchedTo {
            slot: SlotIndex(slot),
            name,
        });
    }

    // ========================================================================
    // Per-tick update
    // ========================================================================

    /// Runs one tick: weapon timers, inputs, switching and recoil.
    /// Returns the volley fired by the active weapon, if any.
    pub fn update(
        &mut self,
        inputs: &WeaponInputs,
        aim: Vec3,
        dt: f32,
        now: f32,
        rng: &mut fastrand::Rng,
    ) -> Option<Volley> {
        for weapon in self.slots.iter_mut().flatten() {
            weapon.update(dt, now);
        }

        let volley = self.handle_inputs(inputs, aim, now, rng);
        self.update_recoil(dt);
        self.update_switching(now);
        volley
    }

    fn handle_inputs(
        &mut self,
        inputs: &WeaponInputs,
        aim: Vec3,
        now: f32,
        rng: &mut fastrand::Rng,
    ) -> Option<Volley> {
        if self.active_weapon().is_some_and(Weapon::is_reloading) {
            return None;
        }

        let mut volley = None;
        if self.state == WeaponSwitchState::Up {
            if let Some(weapon) = self.active.and_then(|slot| self.slots[slot].as_mut()) {
                if !weapon.definition().automatic_reload
                    && inputs.reload_pressed
                    && weapon.ammo_ratio() < 1.0
                {
                    self.aiming = false;
                    weapon.start_reload(now);
                    return None;
                }

                self.aiming = inputs.aim_held;
                volley = weapon.try_fire(inputs.fire, aim, now, rng);
                if let Some(shot) = &volley {
                    self.accumulated_recoil = (self.accumulated_recoil + shot.recoil_force)
                        .min(self.config.max_recoil_distance);
                }
            }
        }

        let charging = self.active_weapon().is_some_and(Weapon::is_charging);
        if !self.aiming && !charging && self.state.accepts_switch() {
            if inputs.switch_direction != 0 {
                self.switch_weapon(inputs.switch_direction > 0, now);
            } else if let Some(slot) = inputs.select_slot {
                if self.weapon_at(slot).is_some() {
                    self.switch_to_index(slot, now);
                }
            }
        }

        volley
    }

    fn update_recoil(&mut self, dt: f32) {
        if self.recoil_offset <= self.accumulated_recoil * 0.99 {
            let t = (self.config.recoil_sharpness * dt).clamp(0.0, 1.0);
            self.recoil_offset += (self.accumulated_recoil - self.recoil_offset) * t;
        } else {
            let t = (self.config.recoil_restitution_sharpness * dt).clamp(0.0, 1.0);
            self.recoil_offset -= self.recoil_offset * t;
            self.accumulated_recoil = self.recoil_offset;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weapon::ShootType;

    fn rng() -> fastrand::Rng {
        fastrand::Rng::with_seed(11)
    }

    fn manager_with(names: &[&str]) -> WeaponManager {
        let mut manager = WeaponManager::new(SwitchConfig {
            switch_delay: 0.5,
            ..SwitchConfig::default()
        });
        for name in names {
            manager
                .add_weapon(WeaponDefinition::new(*name, ShootType::Manual))
                .expect("free slot");
        }
        manager
    }

    fn raised(names: &[&str]) -> WeaponManager {
        let mut manager = manager_with(names);
        assert!(manager.switch_weapon(true, 0.0));
        manager.update_switching(0.5);
        assert_eq!(manager.state(), WeaponSwitchState::Up);
        manager
    }

    #[test]
    fn test_slot_distance() {
        assert_eq!(slot_distance(Some(2), 5, true, 9), 3);
        assert_eq!(slot_distance(Some(5), 2, true, 9), 6);
        assert_eq!(slot_distance(Some(5), 2, false, 9), 3);
        assert_eq!(slot_distance(Some(2), 5, false, 9), 6);
        assert_eq!(slot_distance(None, 0, true, 9), 1);
        assert_eq!(slot_distance(None, 8, false, 9), 0);
    }

    #[test]
    fn test_add_weapon_rules() {
        let mut manager = manager_with(&["Blaster"]);
        assert_eq!(manager.has_weapon("Blaster"), Some(SlotIndex(0)));
        assert!(!manager.weapon_at(0).is_some_and(Weapon::is_active));
        assert_eq!(
            manager.add_weapon(WeaponDefinition::new("Blaster", ShootType::Manual)),
            Err(SlotError::AlreadyHeld("Blaster".to_string()))
        );

        for i in 1..WEAPON_SLOT_COUNT {
            manager
                .add_weapon(WeaponDefinition::new(format!("Gun{i}"), ShootType::Manual))
                .expect("free slot");
        }
        assert_eq!(
            manager.add_weapon(WeaponDefinition::new("Extra", ShootType::Manual)),
            Err(SlotError::NoFreeSlot)
        );
        assert_eq!(manager.weapon_count(), WEAPON_SLOT_COUNT);
    }

    #[test]
    fn test_first_switch_puts_up_immediately() {
        let mut manager = manager_with(&["Blaster", "Shotgun"]);
        manager.drain_events();

        assert!(manager.switch_weapon(true, 1.0));
        assert_eq!(manager.state(), WeaponSwitchState::PutUpNew);
        assert_eq!(manager.active_index(), Some(SlotIndex(0)));
        assert!(manager.active_weapon().is_some_and(Weapon::is_active));
        assert_eq!(
            manager.drain_events(),
            vec![WeaponSlotEvent::SwitchedTo {
                slot: SlotIndex(0),
                name: Some("Blaster".to_string()),
            }]
        );

        manager.update_switching(1.4);
        assert_eq!(manager.state(), WeaponSwitchState::PutUpNew);
        manager.update_switching(1.5);
        assert_eq!(manager.state(), WeaponSwitchState::Up);
    }

    #[test]
    fn test_full_switch_sequence() {
        let mut manager = raised(&["Blaster", "Shotgun"]);

        assert!(manager.switch_weapon(true, 2.0));
        assert_eq!(manager.state(), WeaponSwitchState::PutDownPrevious);
        assert_eq!(manager.active_index(), Some(SlotIndex(0)));

        manager.update_switching(2.3);
        assert!(manager.weapon_at(0).is_some_and(Weapon::is_active), "old weapon still shown");
        assert!(!manager.weapon_at(1).is_some_and(Weapon::is_active));

        manager.update_switching(2.5);
        assert_eq!(manager.state(), WeaponSwitchState::PutUpNew);
        assert_eq!(manager.active_index(), Some(SlotIndex(1)));
        assert!(!manager.weapon_at(0).is_some_and(Weapon::is_active));
        assert!(manager.weapon_at(1).is_some_and(Weapon::is_active));

        manager.update_switching(3.0);
        assert_eq!(manager.state(), WeaponSwitchState::Up);
    }

    #[test]
    fn test_switch_to_active_slot_is_noop() {
        let mut manager = raised(&["Blaster", "Shotgun"]);
        manager.drain_events();

        assert!(!manager.switch_to_index(0, 4.0));
        assert_eq!(manager.state(), WeaponSwitchState::Up);
        assert_eq!(manager.active_index(), Some(SlotIndex(0)));
        assert!(manager.drain_events().is_empty());
    }

    #[test]
    fn test_single_weapon_has_nowhere_to_switch() {
        let mut manager = raised(&["Blaster"]);
        assert!(!manager.switch_weapon(true, 1.0));
        assert!(!manager.switch_weapon(false, 1.0));
        assert_eq!(manager.state(), WeaponSwitchState::Up);
    }

    #[test]
    fn test_descending_wraps() {
        let mut manager = raised(&["A", "B", "C"]);
        manager.switch_weapon(false, 1.0);
        manager.update_switching(1.5);
        assert_eq!(manager.active_index(), Some(SlotIndex(2)));
    }

    #[test]
    fn test_zero_delay_completes_on_next_update() {
        let mut manager = WeaponManager::new(SwitchConfig {
            switch_delay: 0.0,
            ..SwitchConfig::default()
        });
        manager.add_weapon(WeaponDefinition::default()).expect("slot");
        manager.switch_weapon(true, 0.0);
        assert_eq!(manager.state(), WeaponSwitchState::PutUpNew);
        manager.update_switching(0.0);
        assert_eq!(manager.state(), WeaponSwitchState::Up);
    }

    #[test]
    fn test_put_down_onto_empty_slot_rests_down() {
        let mut manager = raised(&["Blaster"]);
        assert!(manager.switch_to_index(4, 1.0));
        manager.update_switching(1.5);
        assert_eq!(manager.state(), WeaponSwitchState::Down);
        assert!(manager.active_weapon().is_none());
        assert!(!manager.weapon_at(0).is_some_and(Weapon::is_active));
    }

    #[test]
    fn test_remove_active_switches_to_next() {
        let mut manager = raised(&["Blaster", "Shotgun"]);
        let removed = manager.remove_weapon(0, 1.0).expect("weapon in slot 0");
        assert_eq!(removed.name(), "Blaster");
        assert_eq!(manager.state(), WeaponSwitchState::PutUpNew);
        assert_eq!(manager.active_index(), Some(SlotIndex(1)));
        assert!(manager.remove_weapon(0, 1.0).is_none());
    }

    #[test]
    fn test_lowered_ratio() {
        let mut manager = manager_with(&["Blaster", "Shotgun"]);
        assert_eq!(manager.lowered_ratio(0.0), 1.0);

        manager.switch_weapon(true, 0.0);
        assert!((manager.lowered_ratio(0.25) - 0.5).abs() < 1e-6);
        manager.update_switching(0.5);
        assert_eq!(manager.lowered_ratio(0.5), 0.0);

        manager.switch_weapon(true, 1.0);
        assert!((manager.lowered_ratio(1.125) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_update_fires_and_accumulates_recoil() {
        let mut rng = rng();
        let mut manager = raised(&["Blaster"]);
        let inputs = WeaponInputs {
            fire: ShootInputs::press(),
            ..WeaponInputs::default()
        };

        let volley = manager.update(&inputs, Vec3::Z, 0.0, 1.0, &mut rng);
        assert!(volley.is_some());
        assert_eq!(manager.active_weapon().map(Weapon::current_ammo), Some(7));
        assert!(manager.accumulated_recoil() <= 0.5);
        assert!(manager.accumulated_recoil() > 0.0);
    }

    #[test]
    fn test_fire_without_weapon_does_nothing() {
        let mut rng = rng();
        let mut manager = WeaponManager::default();
        let inputs = WeaponInputs {
            fire: ShootInputs::press(),
            ..WeaponInputs::default()
        };

        assert!(manager.update(&inputs, Vec3::Z, 0.1, 1.0, &mut rng).is_none());
        assert_eq!(manager.state(), WeaponSwitchState::Down);
        assert_eq!(manager.accumulated_recoil(), 0.0);
    }

    #[test]
    fn test_fire_after_removing_last_weapon_does_nothing() {
        let mut rng = rng();
        let mut manager = raised(&["Blaster"]);
        assert!(manager.remove_weapon(0, 1.0).is_some());
        assert!(manager.active_weapon().is_none());

        let inputs = WeaponInputs {
            fire: ShootInputs::press(),
            ..WeaponInputs::default()
        };
        for i in 0..3 {
            let now = 2.0 + i as f32;
            assert!(manager.update(&inputs, Vec3::Z, 0.1, now, &mut rng).is_none());
        }
        assert_eq!(manager.state(), WeaponSwitchState::Up);
        assert_eq!(manager.accumulated_recoil(), 0.0);
    }

    #[test]
    fn test_no_fire_while_switching() {
        let mut rng = rng();
        let mut manager = manager_with(&["Blaster"]);
        manager.switch_weapon(true, 0.0);
        let inputs = WeaponInputs {
            fire: ShootInputs::press(),
            ..WeaponInputs::default()
        };
        assert!(manager.update(&inputs, Vec3::Z, 0.1, 0.1, &mut rng).is_none());
    }

    #[test]
    fn test_manual_reload_blocks_everything() {
        let mut rng = rng();
        let mut manager = WeaponManager::new(SwitchConfig {
            switch_delay: 0.0,
            ..SwitchConfig::default()
        });
        manager
            .add_weapon(
                WeaponDefinition::new("Pistol", ShootType::Manual).with_physical_bullets(30),
            )
            .expect("slot");
        manager
            .add_weapon(WeaponDefinition::new("Rifle", ShootType::Automatic))
            .expect("slot");
        manager.switch_weapon(true, 0.0);
        manager.update_switching(0.0);

        let fire = WeaponInputs {
            fire: ShootInputs::press(),
            ..WeaponInputs::default()
        };
        assert!(manager.update(&fire, Vec3::Z, 0.1, 1.0, &mut rng).is_some());

        let reload = WeaponInputs {
            reload_pressed: true,
            ..WeaponInputs::default()
        };
        manager.update(&reload, Vec3::Z, 0.1, 1.1, &mut rng);
        assert!(manager.active_weapon().is_some_and(Weapon::is_reloading));

        let switch = WeaponInputs {
            switch_direction: 1,
            ..fire
        };
        assert!(manager.update(&switch, Vec3::Z, 0.1, 1.2, &mut rng).is_none());
        assert_eq!(manager.state(), WeaponSwitchState::Up);
        assert_eq!(manager.active_index(), Some(SlotIndex(0)));

        manager.update(&WeaponInputs::default(), Vec3::Z, 2.0, 3.0, &mut rng);
        assert!(!manager.active_weapon().is_some_and(Weapon::is_reloading));
    }

    #[test]
    fn test_aiming_blocks_switching() {
        let mut rng = rng();
        let mut manager = raised(&["Blaster", "Shotgun"]);
        let inputs = WeaponInputs {
            aim_held: true,
            switch_direction: 1,
            ..WeaponInputs::default()
        };
        manager.update(&inputs, Vec3::Z, 0.1, 1.0, &mut rng);
        assert!(manager.is_aiming());
        assert_eq!(manager.state(), WeaponSwitchState::Up);

        let inputs = WeaponInputs {
            select_slot: Some(1),
            ..WeaponInputs::default()
        };
        manager.update(&inputs, Vec3::Z, 0.1, 1.1, &mut rng);
        assert_eq!(manager.state(), WeaponSwitchState::PutDownPrevious);
    }

    #[test]
    fn test_select_empty_slot_is_ignored() {
        let mut rng = rng();
        let mut manager = raised(&["Blaster"]);
        let inputs = WeaponInputs {
            select_slot: Some(6),
            ..WeaponInputs::default()
        };
        manager.update(&inputs, Vec3::Z, 0.1, 1.0, &mut rng);
        assert_eq!(manager.state(), WeaponSwitchState::Up);
    }

    #[test]
    fn test_recoil_settles_back() {
        let mut rng = rng();
        let mut manager = raised(&["Blaster"]);
        let fire = WeaponInputs {
            fire: ShootInputs::press(),
            ..WeaponInputs::default()
        };
        manager.update(&fire, Vec3::Z, 0.016, 1.0, &mut rng);
        for i in 0..200 {
            let now = 1.0 + i as f32 * 0.016;
            manager.update(&WeaponInputs::default(), Vec3::Z, 0.016, now, &mut rng);
        }
        assert!(manager.recoil_offset() < 0.01);
    }
}
