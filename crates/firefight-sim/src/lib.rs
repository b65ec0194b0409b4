//! Battle engine for FIREFIGHT.
//!
//! Owns the hecs ECS world, runs systems in a fixed pass order,
//! and produces BattleSnapshots for rendering and telemetry.

pub mod ballistics;
pub mod effects;
pub mod engine;
pub mod rng;
pub mod roster;
pub mod scenario;
pub mod squad;
pub mod systems;
pub mod world_setup;

pub use firefight_core as core;
pub use engine::BattleEngine;
pub use firefight_core::config::SimConfig;
pub use scenario::Scenario;
