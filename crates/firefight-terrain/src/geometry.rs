//! Axis-aligned boxes, segment hits, and reflection.

use glam::DVec2;
use serde::{Deserialize, Serialize};

const PARALLEL_EPSILON: f64 = 1e-12;

/// Axis-aligned bounding box in map space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: DVec2,
    pub max: DVec2,
}

/// Where a segment first enters a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Fraction along the segment, in (0, 1].
    pub t: f64,
    pub point: DVec2,
    /// Outward unit normal of the struck face.
    pub normal: DVec2,
}

impl Aabb {
    /// Box spanning two corners in any order.
    pub fn new(a: DVec2, b: DVec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box from its top-left corner and size.
    pub fn from_rect(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(DVec2::new(x, y), DVec2::new(x + w, y + h))
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Distance from a point to the box; zero inside.
    pub fn distance_to(&self, p: DVec2) -> f64 {
        let clamped = p.clamp(self.min, self.max);
        p.distance(clamped)
    }

    /// First entry of segment `a → b` into the box (slab method).
    ///
    /// Returns `None` when the segment misses, starts inside, or would only
    /// enter past `b`.
    pub fn segment_hit(&self, a: DVec2, b: DVec2) -> Option<RayHit> {
        let (t_enter, t_exit, normal) = self.slab(a, b)?;
        if t_enter <= 0.0 || t_enter > 1.0 || t_enter > t_exit {
            return None;
        }
        Some(RayHit {
            t: t_enter,
            point: a + (b - a) * t_enter,
            normal,
        })
    }

    /// Whether any part of segment `a → b` overlaps the box, including starting inside.
    pub fn intersects_segment(&self, a: DVec2, b: DVec2) -> bool {
        match self.slab(a, b) {
            Some((t_enter, t_exit, _)) => t_enter <= t_exit && t_enter <= 1.0 && t_exit >= 0.0,
            None => false,
        }
    }

    /// Entry/exit parameters along `a → b` and the normal of the entry face.
    fn slab(&self, a: DVec2, b: DVec2) -> Option<(f64, f64, DVec2)> {
        let d = b - a;
        let mut t_enter = f64::NEG_INFINITY;
        let mut t_exit = f64::INFINITY;
        let mut normal = DVec2::ZERO;

        let axes = [
            (a.x, d.x, self.min.x, self.max.x, DVec2::NEG_X),
            (a.y, d.y, self.min.y, self.max.y, DVec2::NEG_Y),
        ];
        for (origin, delta, lo, hi, lo_normal) in axes {
            if delta.abs() < PARALLEL_EPSILON {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }
            let mut t0 = (lo - origin) / delta;
            let mut t1 = (hi - origin) / delta;
            let mut n = lo_normal;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
                n = -n;
            }
            if t0 > t_enter {
                t_enter = t0;
                normal = n;
            }
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }
        Some((t_enter, t_exit, normal))
    }
}

/// Reflect `dir` about a unit `normal`.
pub fn reflect(dir: DVec2, normal: DVec2) -> DVec2 {
    dir - 2.0 * dir.dot(normal) * normal
}

/// Shortest distance from `p` to segment `a → b`.
pub fn point_segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < PARALLEL_EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
