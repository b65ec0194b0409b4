//! Line-of-sight and bullet-path queries against static geometry.
//!
//! Segments are tested analytically against every wall and cover box; maps
//! are small enough that a spatial index would not pay for itself.

use glam::DVec2;

use firefight_core::constants::{COVER_ADJACENCY, SIGHTLINE_PROBE_LENGTH};
use firefight_core::types::Position;

use crate::cover::CoverHit;
use crate::geometry::RayHit;
use crate::map::BattleMap;

/// Number of rays cast when scoring a position's sightlines.
const SIGHTLINE_RAYS: usize = 8;

/// Clear sight between two points, ignoring cover.
///
/// Only buildings block. Used for sound occlusion and coarse visibility.
pub fn has_line_of_sight(map: &BattleMap, from: &Position, to: &Position) -> bool {
    let (a, b) = (from.as_dvec2(), to.as_dvec2());
    !map.walls.iter().any(|w| w.intersects_segment(a, b))
}

/// Clear sight that also respects LOS-blocking cover (tall walls).
pub fn has_clear_shot(map: &BattleMap, from: &Position, to: &Position) -> bool {
    if !has_line_of_sight(map, from, to) {
        return false;
    }
    let (a, b) = (from.as_dvec2(), to.as_dvec2());
    !map
        .cover
        .iter()
        .filter(|c| c.blocks_los)
        .any(|c| c.bounds.intersects_segment(a, b))
}

/// First solid surface (building or tall wall) struck along `from → to`.
pub fn first_wall_hit(map: &BattleMap, from: &Position, to: &Position) -> Option<RayHit> {
    let (a, b) = (from.as_dvec2(), to.as_dvec2());
    map.walls
        .iter()
        .chain(map.cover.iter().filter(|c| c.blocks_los).map(|c| &c.bounds))
        .filter_map(|bounds| bounds.segment_hit(a, b))
        .min_by(|x, y| x.t.total_cmp(&y.t))
}

/// Best cover next to `defender` that sits between it and `attacker`.
pub fn cover_against(map: &BattleMap, defender: &Position, attacker: &Position) -> Option<CoverHit> {
    let (d, a) = (defender.as_dvec2(), attacker.as_dvec2());
    map.cover
        .iter()
        .filter(|c| c.bounds.distance_to(d) <= COVER_ADJACENCY)
        .filter(|c| c.bounds.intersects_segment(a, d))
        .map(|c| CoverHit {
            kind: c.kind,
            defence: c.defence,
        })
        .max_by(|x, y| x.defence.total_cmp(&y.defence))
}

/// Openness of the surroundings in [0, 1]: mean unobstructed fraction of radial rays.
pub fn sightline_score(map: &BattleMap, pos: &Position) -> f64 {
    let origin = pos.as_dvec2();
    let mut total = 0.0;
    for i in 0..SIGHTLINE_RAYS {
        let angle = i as f64 * std::f64::consts::TAU / SIGHTLINE_RAYS as f64;
        let end = origin + DVec2::from_angle(angle) * SIGHTLINE_PROBE_LENGTH;
        let end_pos = Position::from(end);
        let open = first_wall_hit(map, pos, &end_pos).map_or(1.0, |hit| hit.t);
        total += open;
    }
    total / SIGHTLINE_RAYS as f64
}
