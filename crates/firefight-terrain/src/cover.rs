//! Cover objects: static geometry that protects whoever hides behind it.

use serde::{Deserialize, Serialize};

use crate::geometry::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverKind {
    /// Full-height wall. Blocks sight and fire.
    TallWall,
    /// Waist-high wall.
    ChestWall,
    /// Debris pile.
    Rubble,
}

impl CoverKind {
    /// Fraction of the silhouette this cover hides.
    pub fn defence(self) -> f64 {
        match self {
            CoverKind::TallWall => 0.9,
            CoverKind::ChestWall => 0.6,
            CoverKind::Rubble => 0.35,
        }
    }

    pub fn blocks_los(self) -> bool {
        matches!(self, CoverKind::TallWall)
    }
}

/// Immutable after map generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverObject {
    pub bounds: Aabb,
    pub kind: CoverKind,
    pub defence: f64,
    pub blocks_los: bool,
}

impl CoverObject {
    pub fn new(bounds: Aabb, kind: CoverKind) -> Self {
        Self {
            bounds,
            kind,
            defence: kind.defence(),
            blocks_los: kind.blocks_los(),
        }
    }
}

/// Cover interposed between a defender and an attacker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverHit {
    pub kind: CoverKind,
    pub defence: f64,
}
