//! # Sentinel Common
//!
//! Common types and shared abstractions for the Sentinel combat core.
//!
//! This crate provides foundational types used across all Sentinel crates:
//! - Position and orientation helpers (glam based)
//! - ID types (EntityId, SlotIndex)
//! - Simulation clock and deadlines
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod error;
pub mod ids;
pub mod position;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::position::*;
}

pub use prelude::*;
