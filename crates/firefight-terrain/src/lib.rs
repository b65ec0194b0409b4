//! Battlefield geometry for FIREFIGHT.
//!
//! Map bounds, buildings and cover, line-of-sight queries, bullet-path
//! intersection, gunfire audibility, and grid pathfinding.

pub use firefight_core as core;

pub mod cover;
pub mod geometry;
pub mod los;
pub mod map;
pub mod nav;
pub mod sound;

use firefight_core::types::Position;

// Re-export key types for convenience.
pub use cover::{CoverHit, CoverKind, CoverObject};
pub use geometry::{reflect, Aabb, RayHit};
pub use map::BattleMap;
pub use nav::NavGrid;

/// Route planning between two points.
pub trait Pathfinder {
    fn find_path(&self, from: &Position, to: &Position) -> Option<Vec<Position>>;
}

/// Visibility and cover queries used by perception and fire control.
pub trait SightQuery {
    /// Sight blocked only by buildings.
    fn has_line_of_sight(&self, from: &Position, to: &Position) -> bool;
    /// Sight blocked by buildings and full-height cover.
    fn has_clear_shot(&self, from: &Position, to: &Position) -> bool;
    fn cover_against(&self, defender: &Position, attacker: &Position) -> Option<CoverHit>;
    fn sightline_score(&self, pos: &Position) -> f64;
    fn first_wall_hit(&self, from: &Position, to: &Position) -> Option<RayHit>;
}

pub trait SoundField {
    fn perceived_strength(
        &self,
        source: &Position,
        listener: &Position,
        loudness: f64,
        fieldcraft: f64,
    ) -> f64;
}

impl Pathfinder for NavGrid {
    fn find_path(&self, from: &Position, to: &Position) -> Option<Vec<Position>> {
        NavGrid::find_path(self, from, to)
    }
}

impl SightQuery for BattleMap {
    fn has_line_of_sight(&self, from: &Position, to: &Position) -> bool {
        los::has_line_of_sight(self, from, to)
    }

    fn has_clear_shot(&self, from: &Position, to: &Position) -> bool {
        los::has_clear_shot(self, from, to)
    }

    fn cover_against(&self, defender: &Position, attacker: &Position) -> Option<CoverHit> {
        los::cover_against(self, defender, attacker)
    }

    fn sightline_score(&self, pos: &Position) -> f64 {
        los::sightline_score(self, pos)
    }

    fn first_wall_hit(&self, from: &Position, to: &Position) -> Option<RayHit> {
        los::first_wall_hit(self, from, to)
    }
}

impl SoundField for BattleMap {
    fn perceived_strength(
        &self,
        source: &Position,
        listener: &Position,
        loudness: f64,
        fieldcraft: f64,
    ) -> f64 {
        sound::perceived_strength(self, source, listener, loudness, fieldcraft)
    }
}
