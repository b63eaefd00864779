//! Event bus for inter-system communication.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::agent::EnemyObserver;
use crate::switching::WeaponSlotEvent;
use crate::weapon::Volley;
use sentinel_common::{EntityId, Position, SlotIndex};

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Enemy acquired a target
    TargetDetected {
        /// Enemy ID
        entity_id: EntityId,
    },
    /// Enemy lost its target
    TargetLost {
        /// Enemy ID
        entity_id: EntityId,
    },
    /// Enemy took damage from a non-enemy source
    EnemyDamaged {
        /// Enemy ID
        entity_id: EntityId,
        /// Damage amount
        damage: f32,
        /// Where the damage came from
        source: Position,
    },
    /// Enemy fired at its target
    EnemyAttacked {
        /// Enemy ID
        entity_id: EntityId,
        /// Bullets in the volley
        bullets: usize,
    },
    /// Enemy died
    EnemyDied {
        /// Enemy ID
        entity_id: EntityId,
        /// Loot was dropped
        dropped_loot: bool,
    },
    /// Entity came back at a spawner
    EntityRespawned {
        /// Entity ID
        entity_id: EntityId,
        /// Spawn position
        position: Position,
    },
    /// Weapon placed in a slot
    WeaponAdded {
        /// Slot
        slot: SlotIndex,
        /// Weapon name
        name: String,
    },
    /// Weapon removed from a slot
    WeaponRemoved {
        /// Slot
        slot: SlotIndex,
        /// Weapon name
        name: String,
    },
    /// Active weapon slot changed
    WeaponSwitched {
        /// New active slot
        slot: SlotIndex,
        /// Weapon name, if the slot holds one
        name: Option<String>,
    },
}

impl From<WeaponSlotEvent> for GameEvent {
    fn from(event: WeaponSlotEvent) -> Self {
        match event {
            WeaponSlotEvent::Added { slot, name } => Self::WeaponAdded { slot, name },
            WeaponSlotEvent::Removed { slot, name } => Self::WeaponRemoved { slot, name },
            WeaponSlotEvent::SwitchedTo { slot, name } => Self::WeaponSwitched { slot, name },
        }
    }
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus. Dropped when the bus is full.
    pub fn publish(&self, event: GameEvent) {
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<GameEvent> {
        self.sender.clone()
    }

    /// Observer that forwards enemy hooks onto this bus.
    #[must_use]
    pub fn observer(&self) -> EventBusObserver {
        EventBusObserver {
            sender: self.sender(),
        }
    }
}

/// Publishes enemy hooks as [`GameEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBusObserver {
    sender: Sender<GameEvent>,
}

impl EventBusObserver {
    fn publish(&self, event: GameEvent) {
        let _ = self.sender.try_send(event);
    }
}

impl EnemyObserver for EventBusObserver {
    fn on_detected(&mut self, enemy: EntityId) {
        self.publish(GameEvent::TargetDetected { entity_id: enemy });
    }

    fn on_lost(&mut self, enemy: EntityId) {
        self.publish(GameEvent::TargetLost { entity_id: enemy });
    }

    fn on_damaged(&mut self, enemy: EntityId, damage: f32, source: Position) {
        self.publish(GameEvent::EnemyDamaged {
            entity_id: enemy,
            damage,
            source,
        });
    }

    fn on_attack(&mut self, enemy: EntityId, volley: &Volley) {
        self.publish(GameEvent::EnemyAttacked {
            entity_id: enemy,
            bullets: volley.bullet_count(),
        });
    }

    fn on_death(&mut self, enemy: EntityId, dropped_loot: bool) {
        self.publish(GameEvent::EnemyDied {
            entity_id: enemy,
            dropped_loot,
        });
    }
}
