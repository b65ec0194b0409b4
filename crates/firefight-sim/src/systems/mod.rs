//! ECS systems that operate on the battle world each tick.
//!
//! Systems are plain functions over `&mut World` (or `&World` for read-only).
//! They own no state; everything lives in components, the engine's squad
//! arena, and the effect buffers.

pub mod decision;
pub mod fire_control;
pub mod movement;
pub mod perception;
pub mod psychology;
pub mod snapshot;
pub mod sound;
pub mod upkeep;
