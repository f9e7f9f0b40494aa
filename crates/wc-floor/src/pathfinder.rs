//! Pathfinding trait and default A* implementation.
//!
//! # Pluggability
//!
//! Dispatch and execution call routing through the [`Pathfinder`] trait, so
//! applications can swap in cached or hierarchical searches without touching
//! the core.  The default [`AStarPathfinder`] searches the full grid on every
//! call, which is fine at ward scale (tens of carts, ≤ ~60×60 cells).
//!
//! # Cost model
//!
//! Every orthogonal step costs 1.  The heuristic is Manhattan distance, which
//! is admissible and consistent on a unit-cost 4-connected grid, so the first
//! time the goal is popped the path is optimal.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use wc_core::GridPos;

use crate::{AccessProfiles, Floor, FloorError, FloorResult};

// ── GridPath ──────────────────────────────────────────────────────────────────

/// A cell sequence from start to goal, both inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPath {
    pub cells: Vec<GridPos>,
}

impl GridPath {
    /// Number of moves: one fewer than the number of cells.
    #[inline]
    pub fn len_steps(&self) -> u32 {
        self.cells.len().saturating_sub(1) as u32
    }

    /// `true` when start and goal coincide.
    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.cells.len() <= 1
    }

    /// The cell after the start, `None` for a trivial path.
    #[inline]
    pub fn next_step(&self) -> Option<GridPos> {
        self.cells.get(1).copied()
    }

    pub fn goal(&self) -> Option<GridPos> {
        self.cells.last().copied()
    }

    /// Seconds to walk the path at `speed` cells per second.  A stationary
    /// agent (`speed <= 0`) never arrives.
    pub fn travel_secs(&self, speed: f64) -> f64 {
        if speed <= 0.0 {
            return f64::INFINITY;
        }
        self.len_steps() as f64 / speed
    }

    /// Battery consumed walking the path at `drain_per_cell`.
    #[inline]
    pub fn battery_drain(&self, drain_per_cell: f64) -> f64 {
        self.len_steps() as f64 * drain_per_cell
    }
}

// ── Pathfinder trait ──────────────────────────────────────────────────────────

/// Pluggable grid search.
///
/// Implementations must be `Send + Sync` so a dispatcher can evaluate
/// candidates on worker threads.
pub trait Pathfinder: Send + Sync {
    /// Shortest path from `start` to `end` on `floor`.
    ///
    /// With `access = Some(..)` restricted cells are checked against the
    /// profiles; with `None` restriction is ignored (agent-agnostic search).
    /// Quarantine and obstacles block unconditionally.
    fn find_path(
        &self,
        floor:  &Floor,
        start:  GridPos,
        end:    GridPos,
        access: Option<&AccessProfiles>,
    ) -> FloorResult<GridPath>;
}

// ── AStarPathfinder ───────────────────────────────────────────────────────────

/// A* over the 4-connected grid.
///
/// Frontier ties on `f = g + h` resolve by discovery order: each push gets a
/// monotonically increasing sequence number used as the secondary heap key.
pub struct AStarPathfinder;

impl Pathfinder for AStarPathfinder {
    fn find_path(
        &self,
        floor:  &Floor,
        start:  GridPos,
        end:    GridPos,
        access: Option<&AccessProfiles>,
    ) -> FloorResult<GridPath> {
        astar(floor, start, end, access)
    }
}

fn astar(
    floor:  &Floor,
    start:  GridPos,
    end:    GridPos,
    access: Option<&AccessProfiles>,
) -> FloorResult<GridPath> {
    let start_idx = floor.index_of(start).ok_or(FloorError::OutOfBounds(start))?;
    let goal_idx = floor.index_of(end).ok_or(FloorError::OutOfBounds(end))?;
    let cells = floor.cells();

    // The goal is vetted up front; the start is not (an agent may stand on a
    // cell that has since been closed around it).
    if !cells[goal_idx].admits(access) {
        return Err(FloorError::GoalBlocked(end));
    }
    if start_idx == goal_idx {
        return Ok(GridPath { cells: vec![start] });
    }

    let n = floor.cell_count();
    let mut g_score = vec![u32::MAX; n];
    let mut came_from = vec![usize::MAX; n];
    let mut closed = vec![false; n];

    // Min-heap on (f, discovery sequence).
    let mut frontier: BinaryHeap<Reverse<(u32, u64, usize)>> = BinaryHeap::new();
    let mut seq: u64 = 0;

    g_score[start_idx] = 0;
    frontier.push(Reverse((start.manhattan(end), seq, start_idx)));

    while let Some(Reverse((_, _, idx))) = frontier.pop() {
        if idx == goal_idx {
            return Ok(reconstruct(floor, &came_from, goal_idx));
        }
        // Stale duplicate of an already-expanded cell.
        if closed[idx] {
            continue;
        }
        closed[idx] = true;

        let pos = floor.pos_of(idx);
        let tentative = g_score[idx] + 1;

        for neighbor in pos.neighbors4() {
            let Some(n_idx) = floor.index_of(neighbor) else {
                continue;
            };
            if closed[n_idx] || !cells[n_idx].admits(access) {
                continue;
            }
            if tentative < g_score[n_idx] {
                g_score[n_idx] = tentative;
                came_from[n_idx] = idx;
                seq += 1;
                frontier.push(Reverse((tentative + neighbor.manhattan(end), seq, n_idx)));
            }
        }
    }

    Err(FloorError::NoPath { from: start, to: end })
}

fn reconstruct(floor: &Floor, came_from: &[usize], goal_idx: usize) -> GridPath {
    let mut cells = vec![floor.pos_of(goal_idx)];
    let mut cur = goal_idx;
    while came_from[cur] != usize::MAX {
        cur = came_from[cur];
        cells.push(floor.pos_of(cur));
    }
    cells.reverse();
    GridPath { cells }
}

// ── Nearest facility ──────────────────────────────────────────────────────────

/// Search to every candidate and keep the shortest reachable one.
///
/// Ties keep the earliest candidate.  Returns `None` when no candidate is
/// reachable.  Used for "nearest charger" / "nearest staging area".
pub fn nearest_reachable<P, T, I>(
    pathfinder: &P,
    floor:      &Floor,
    start:      GridPos,
    candidates: I,
    access:     Option<&AccessProfiles>,
) -> Option<(T, GridPath)>
where
    P: Pathfinder + ?Sized,
    I: IntoIterator<Item = (T, GridPos)>,
{
    let mut best: Option<(T, GridPath)> = None;
    for (tag, target) in candidates {
        let Ok(path) = pathfinder.find_path(floor, start, target, access) else {
            continue;
        };
        let better = best
            .as_ref()
            .is_none_or(|(_, b)| path.len_steps() < b.len_steps());
        if better {
            best = Some((tag, path));
        }
    }
    best
}
