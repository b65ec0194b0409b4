//! The battle map: bounds, buildings, and cover.

use serde::{Deserialize, Serialize};

use firefight_core::types::Position;

use crate::cover::CoverObject;
use crate::geometry::Aabb;

/// Static battlefield geometry. Nothing here changes once a battle starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleMap {
    pub width: f64,
    pub height: f64,
    /// Buildings. Block movement, sight, and fire.
    pub walls: Vec<Aabb>,
    pub cover: Vec<CoverObject>,
}

impl BattleMap {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            walls: Vec::new(),
            cover: Vec::new(),
        }
    }

    pub fn with_wall(mut self, wall: Aabb) -> Self {
        self.walls.push(wall);
        self
    }

    pub fn with_cover(mut self, cover: CoverObject) -> Self {
        self.cover.push(cover);
        self
    }

    pub fn in_bounds(&self, p: &Position) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width && p.y <= self.height
    }

    /// Whether `p` lies inside a building or a full-height wall.
    pub fn is_solid(&self, p: &Position) -> bool {
        let v = p.as_dvec2();
        self.walls.iter().any(|w| w.contains(v))
            || self
                .cover
                .iter()
                .any(|c| c.blocks_los && c.bounds.contains(v))
    }

    /// Clamp a point into the playable area.
    pub fn clamp(&self, p: Position) -> Position {
        Position::new(p.x.clamp(0.0, self.width), p.y.clamp(0.0, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::CoverKind;

    #[test]
    fn test_bounds_and_solidity() {
        let map = BattleMap::new(100.0, 50.0)
            .with_wall(Aabb::from_rect(10.0, 10.0, 10.0, 10.0))
            .with_cover(CoverObject::new(
                Aabb::from_rect(40.0, 10.0, 4.0, 10.0),
                CoverKind::ChestWall,
            ));
        assert!(map.in_bounds(&Position::new(100.0, 50.0)));
        assert!(!map.in_bounds(&Position::new(-1.0, 10.0)));
        assert!(map.is_solid(&Position::new(15.0, 15.0)));
        // Chest walls can be stepped over.
        assert!(!map.is_solid(&Position::new(42.0, 15.0)));
        assert_eq!(map.clamp(Position::new(120.0, -3.0)), Position::new(100.0, 0.0));
    }
}
