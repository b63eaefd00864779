//! # Sentinel Gameplay
//!
//! Engine-independent combat logic for Sentinel.
//!
//! This crate provides the tick-driven decision layer:
//! - Patrol paths and the patrol cursor
//! - Detection snapshots and detected/lost edges
//! - Enemy behavior state machine (patrol, follow, attack)
//! - Weapon fire control (manual, automatic, charge, reload, regeneration)
//! - Weapon slots and the switching sequencer
//! - Enemy agent composition with observers
//! - Respawn scheduling at team spawners
//! - Event bus for inter-system communication

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod agent;
pub mod behavior;
pub mod detection;
pub mod events;
pub mod health;
pub mod patrol;
pub mod respawn;
pub mod spread;
pub mod switching;
pub mod weapon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::agent::*;
    pub use crate::behavior::*;
    pub use crate::detection::*;
    pub use crate::events::*;
    pub use crate::health::*;
    pub use crate::patrol::*;
    pub use crate::respawn::*;
    pub use crate::spread::*;
    pub use crate::switching::*;
    pub use crate::weapon::*;
}

pub use prelude::*;
