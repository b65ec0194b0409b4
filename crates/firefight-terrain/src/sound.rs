//! Gunfire audibility.

use firefight_core::constants::{GUNFIRE_AUDIBLE_RANGE, SOUND_OCCLUSION_FACTOR};
use firefight_core::types::{clamp01, Position};

use crate::los::has_line_of_sight;
use crate::map::BattleMap;

/// Perceived strength in [0, 1] of a shot of `loudness` heard at `listener`.
///
/// Linear falloff to zero at `GUNFIRE_AUDIBLE_RANGE * loudness`. Buildings
/// between source and listener muffle the sound. Fieldcraft sharpens hearing.
pub fn perceived_strength(
    map: &BattleMap,
    source: &Position,
    listener: &Position,
    loudness: f64,
    fieldcraft: f64,
) -> f64 {
    let reach = GUNFIRE_AUDIBLE_RANGE * loudness;
    if reach <= 0.0 {
        return 0.0;
    }
    let dist = source.range_to(listener);
    if dist >= reach {
        return 0.0;
    }
    let mut strength = 1.0 - dist / reach;
    if !has_line_of_sight(map, source, listener) {
        strength *= SOUND_OCCLUSION_FACTOR;
    }
    clamp01(strength * (0.6 + 0.4 * clamp01(fieldcraft)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Aabb;

    #[test]
    fn test_falls_off_with_distance() {
        let map = BattleMap::new(2000.0, 2000.0);
        let src = Position::new(0.0, 0.0);
        let near = perceived_strength(&map, &src, &Position::new(100.0, 0.0), 1.0, 1.0);
        let far = perceived_strength(&map, &src, &Position::new(600.0, 0.0), 1.0, 1.0);
        assert!(near > far);
        assert_eq!(
            perceived_strength(&map, &src, &Position::new(1500.0, 0.0), 1.0, 1.0),
            0.0
        );
    }

    #[test]
    fn test_walls_muffle() {
        let open = BattleMap::new(1000.0, 1000.0);
        let walled = open.clone().with_wall(Aabb::from_rect(200.0, 0.0, 20.0, 400.0));
        let src = Position::new(100.0, 100.0);
        let listener = Position::new(400.0, 100.0);
        let clear = perceived_strength(&open, &src, &listener, 1.0, 0.5);
        let muffled = perceived_strength(&walled, &src, &listener, 1.0, 0.5);
        assert!((muffled - clear * SOUND_OCCLUSION_FACTOR).abs() < 1e-12);
    }

    #[test]
    fn test_fieldcraft_sharpens_hearing() {
        let map = BattleMap::new(1000.0, 1000.0);
        let src = Position::new(0.0, 0.0);
        let at = Position::new(300.0, 0.0);
        assert!(
            perceived_strength(&map, &src, &at, 1.0, 1.0)
                > perceived_strength(&map, &src, &at, 1.0, 0.0)
        );
    }
}
