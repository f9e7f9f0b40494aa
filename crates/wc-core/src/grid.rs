//! Grid coordinate types.
//!
//! Floors are square-celled grids; every position in the simulation is an
//! integer `(x, y)` cell plus the floor it lives on.  Signed coordinates keep
//! neighbour arithmetic free of underflow checks: bounds are enforced by the
//! floor, not the type.

use std::fmt;

use crate::FloorId;

/// A cell coordinate on one floor.  `x` grows east, `y` grows south.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (L1) distance: the exact step count on an open
    /// 4-connected grid.
    #[inline]
    pub fn manhattan(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// `true` if `other` is exactly one orthogonal step away.
    #[inline]
    pub fn is_adjacent(self, other: GridPos) -> bool {
        self.manhattan(other) == 1
    }

    /// The four orthogonal neighbours in fixed order: north, south, west, east.
    ///
    /// The order is part of the pathfinder's tie-breaking contract; do not
    /// reorder.
    #[inline]
    pub fn neighbors4(self) -> [GridPos; 4] {
        [
            GridPos::new(self.x, self.y - 1),
            GridPos::new(self.x, self.y + 1),
            GridPos::new(self.x - 1, self.y),
            GridPos::new(self.x + 1, self.y),
        ]
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        GridPos::new(x, y)
    }
}

/// A cell on a specific floor.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub floor: FloorId,
    pub pos:   GridPos,
}

impl Location {
    #[inline]
    pub const fn new(floor: FloorId, pos: GridPos) -> Self {
        Self { floor, pos }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.pos, self.floor)
    }
}
