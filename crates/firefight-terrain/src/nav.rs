//! A* over a coarse walkability grid.
//!
//! Cells are `NAV_CELL_SIZE` pixels square. A cell is blocked when any
//! building or full-height wall overlaps it. Costs are integers (10 straight,
//! 14 diagonal) so search order never depends on float rounding.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use firefight_core::constants::NAV_CELL_SIZE;
use firefight_core::types::Position;

use crate::geometry::Aabb;
use crate::map::BattleMap;

const STRAIGHT_COST: u32 = 10;
const DIAGONAL_COST: u32 = 14;

const NEIGHBORS: [(i32, i32, u32); 8] = [
    (1, 0, STRAIGHT_COST),
    (-1, 0, STRAIGHT_COST),
    (0, 1, STRAIGHT_COST),
    (0, -1, STRAIGHT_COST),
    (1, 1, DIAGONAL_COST),
    (1, -1, DIAGONAL_COST),
    (-1, 1, DIAGONAL_COST),
    (-1, -1, DIAGONAL_COST),
];

/// Walkability grid derived from a [`BattleMap`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavGrid {
    pub cols: i32,
    pub rows: i32,
    pub cell_size: f64,
    blocked: Vec<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f: u32,
    h: u32,
    index: usize,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on f, then h, then index for a stable order.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl NavGrid {
    pub fn from_map(map: &BattleMap) -> Self {
        let cell_size = NAV_CELL_SIZE;
        let cols = (map.width / cell_size).ceil().max(1.0) as i32;
        let rows = (map.height / cell_size).ceil().max(1.0) as i32;
        let solid: Vec<Aabb> = map
            .walls
            .iter()
            .copied()
            .chain(map.cover.iter().filter(|c| c.blocks_los).map(|c| c.bounds))
            .collect();

        let mut blocked = vec![false; (cols * rows) as usize];
        for row in 0..rows {
            for col in 0..cols {
                let cell = Aabb::from_rect(
                    col as f64 * cell_size,
                    row as f64 * cell_size,
                    cell_size,
                    cell_size,
                );
                blocked[(row * cols + col) as usize] = solid.iter().any(|s| overlaps(s, &cell));
            }
        }

        Self {
            cols,
            rows,
            cell_size,
            blocked,
        }
    }

    /// Grid cell containing `p`, clamped to the grid.
    pub fn cell_of(&self, p: &Position) -> (i32, i32) {
        let col = ((p.x / self.cell_size).floor() as i32).clamp(0, self.cols - 1);
        let row = ((p.y / self.cell_size).floor() as i32).clamp(0, self.rows - 1);
        (col, row)
    }

    pub fn cell_center(&self, (col, row): (i32, i32)) -> Position {
        Position::new(
            (col as f64 + 0.5) * self.cell_size,
            (row as f64 + 0.5) * self.cell_size,
        )
    }

    pub fn is_blocked(&self, (col, row): (i32, i32)) -> bool {
        if col < 0 || row < 0 || col >= self.cols || row >= self.rows {
            return true;
        }
        self.blocked[(row * self.cols + col) as usize]
    }

    /// Waypoints from `from` to `to`, excluding the start and ending exactly on `to`.
    ///
    /// `None` when the destination cell is blocked or unreachable.
    pub fn find_path(&self, from: &Position, to: &Position) -> Option<Vec<Position>> {
        let start = self.cell_of(from);
        let goal = self.cell_of(to);
        if self.is_blocked(goal) {
            return None;
        }
        if start == goal {
            return Some(vec![*to]);
        }

        let len = (self.cols * self.rows) as usize;
        let mut g_scores = vec![u32::MAX; len];
        let mut came_from: Vec<Option<usize>> = vec![None; len];
        let mut closed = vec![false; len];
        let mut open = BinaryHeap::new();

        let start_idx = self.index(start);
        let goal_idx = self.index(goal);
        g_scores[start_idx] = 0;
        let h = octile(start, goal);
        open.push(OpenNode {
            f: h,
            h,
            index: start_idx,
        });

        while let Some(current) = open.pop() {
            if current.index == goal_idx {
                return Some(self.reconstruct(&came_from, goal_idx, to));
            }
            if closed[current.index] {
                continue;
            }
            closed[current.index] = true;

            let cell = self.cell_at(current.index);
            let current_g = g_scores[current.index];
            for (dc, dr, cost) in NEIGHBORS {
                let next = (cell.0 + dc, cell.1 + dr);
                if self.is_blocked(next) {
                    continue;
                }
                // No squeezing diagonally between two blocked cells.
                if dc != 0
                    && dr != 0
                    && (self.is_blocked((cell.0 + dc, cell.1)) || self.is_blocked((cell.0, cell.1 + dr)))
                {
                    continue;
                }
                let next_idx = self.index(next);
                let tentative = current_g + cost;
                if tentative < g_scores[next_idx] {
                    g_scores[next_idx] = tentative;
                    came_from[next_idx] = Some(current.index);
                    let h = octile(next, goal);
                    open.push(OpenNode {
                        f: tentative + h,
                        h,
                        index: next_idx,
                    });
                }
            }
        }

        None
    }

    fn index(&self, (col, row): (i32, i32)) -> usize {
        (row * self.cols + col) as usize
    }

    fn cell_at(&self, index: usize) -> (i32, i32) {
        let i = index as i32;
        (i % self.cols, i / self.cols)
    }

    fn reconstruct(&self, came_from: &[Option<usize>], goal_idx: usize, to: &Position) -> Vec<Position> {
        let mut cells = vec![goal_idx];
        let mut current = goal_idx;
        while let Some(prev) = came_from[current] {
            cells.push(prev);
            current = prev;
        }
        cells.reverse();

        // Drop the start cell and replace the goal cell centre with the exact target.
        let mut path: Vec<Position> = cells
            .iter()
            .skip(1)
            .map(|&i| self.cell_center(self.cell_at(i)))
            .collect();
        if let Some(last) = path.last_mut() {
            *last = *to;
        }
        path
    }
}

fn overlaps(a: &Aabb, b: &Aabb) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

fn octile(a: (i32, i32), b: (i32, i32)) -> u32 {
    let dx = (a.0 - b.0).unsigned_abs();
    let dy = (a.1 - b.1).unsigned_abs();
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    DIAGONAL_COST * lo + STRAIGHT_COST * (hi - lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_path_ends_on_target() {
        let grid = NavGrid::from_map(&BattleMap::new(320.0, 320.0));
        let to = Position::new(200.0, 10.0);
        let path = grid.find_path(&Position::new(10.0, 10.0), &to).unwrap();
        assert_eq!(path.last(), Some(&to));
        assert!(path.len() >= 2);
    }

    #[test]
    fn test_same_cell_is_single_step() {
        let grid = NavGrid::from_map(&BattleMap::new(320.0, 320.0));
        let to = Position::new(12.0, 12.0);
        let path = grid.find_path(&Position::new(2.0, 2.0), &to).unwrap();
        assert_eq!(path, vec![to]);
    }

    #[test]
    fn test_routes_around_wall() {
        let map = BattleMap::new(320.0, 320.0).with_wall(Aabb::from_rect(128.0, 0.0, 32.0, 240.0));
        let grid = NavGrid::from_map(&map);
        let path = grid
            .find_path(&Position::new(40.0, 40.0), &Position::new(260.0, 40.0))
            .unwrap();
        assert!(path.iter().all(|p| !map.is_solid(p)));
        // Has to dip below the wall.
        assert!(path.iter().any(|p| p.y > 240.0));
    }

    #[test]
    fn test_no_path_into_wall_or_enclosure() {
        let map = BattleMap::new(320.0, 320.0)
            .with_wall(Aabb::from_rect(0.0, 160.0, 320.0, 16.0));
        let grid = NavGrid::from_map(&map);
        assert!(grid
            .find_path(&Position::new(40.0, 40.0), &Position::new(40.0, 168.0))
            .is_none());
        assert!(grid
            .find_path(&Position::new(40.0, 40.0), &Position::new(40.0, 300.0))
            .is_none());
    }
}
