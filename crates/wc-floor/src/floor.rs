//! Floor grid representation and builder.
//!
//! # Data layout
//!
//! A floor is a dense row-major `Vec<GridCell>`: the cell at `(x, y)` lives at
//! index `y * width + x`.  Pathfinding keeps its scratch arrays in the same
//! layout, so a cell index is valid across both.
//!
//! # Legend rows
//!
//! Floors can be described as text rows, one character per cell:
//!
//! | Char | Cell                                                    |
//! |------|---------------------------------------------------------|
//! | `.`  | open floor                                              |
//! | `#`  | obstacle (wall, fixed equipment)                        |
//! | `Q`  | quarantine: closed to every agent                      |
//! | `R`  | restricted: profiles attached with `FloorBuilder::restrict` |
//! | `C`  | open floor with a charger marker                        |
//! | `S`  | open floor with a storage marker                        |
//! | `T`  | open floor with a staging marker                        |
//! | `X`  | open floor with a connector (lift/stair) marker         |
//! | ` `  | void: outside the building, not walkable               |

use wc_core::{FloorId, GridPos};

use crate::{AccessProfiles, FloorError, FloorResult};

// ── GridCell ──────────────────────────────────────────────────────────────────

/// One floor tile.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCell {
    pub pos:                GridPos,
    pub walkable:           bool,
    pub is_obstacle:        bool,
    /// Hard block for every agent regardless of access profiles.
    pub is_quarantine:      bool,
    pub is_restricted:      bool,
    /// Any one of these tags admits an agent.  Empty means "restricted in
    /// name only": open to all.
    pub required_profiles:  Vec<String>,
    pub has_charger:        bool,
    pub has_storage:        bool,
    pub has_staging:        bool,
    pub has_connector:      bool,
}

impl GridCell {
    /// An open, unrestricted, unmarked cell.
    pub fn open(pos: GridPos) -> Self {
        Self {
            pos,
            walkable:          true,
            is_obstacle:       false,
            is_quarantine:     false,
            is_restricted:     false,
            required_profiles: Vec::new(),
            has_charger:       false,
            has_storage:       false,
            has_staging:       false,
            has_connector:     false,
        }
    }

    /// Walkable for an agent-agnostic query: restriction is not evaluated.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.walkable && !self.is_obstacle && !self.is_quarantine
    }

    /// Full traversal rule.  `access = None` skips the restriction check.
    #[inline]
    pub fn admits(&self, access: Option<&AccessProfiles>) -> bool {
        if !self.is_open() {
            return false;
        }
        match access {
            Some(profiles) if self.is_restricted => profiles.permits(&self.required_profiles),
            _ => true,
        }
    }

    fn legend_char(&self) -> char {
        if self.is_obstacle {
            '#'
        } else if self.is_quarantine {
            'Q'
        } else if !self.walkable {
            ' '
        } else if self.is_restricted {
            'R'
        } else if self.has_charger {
            'C'
        } else if self.has_storage {
            'S'
        } else if self.has_staging {
            'T'
        } else if self.has_connector {
            'X'
        } else {
            '.'
        }
    }
}

// ── Floor ─────────────────────────────────────────────────────────────────────

/// A fixed-size grid of cells.  Immutable once built.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Floor {
    pub id:          FloorId,
    pub name:        String,
    pub width:       u32,
    pub height:      u32,
    /// Physical edge length of one cell.
    pub cell_size_m: f32,
    cells:           Vec<GridCell>,
}

impl Floor {
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Row-major index of `pos`, `None` when out of bounds.
    #[inline]
    pub fn index_of(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    #[inline]
    pub fn pos_of(&self, index: usize) -> GridPos {
        let w = self.width as usize;
        GridPos::new((index % w) as i32, (index / w) as i32)
    }

    pub fn cell(&self, pos: GridPos) -> Option<&GridCell> {
        self.index_of(pos).map(|i| &self.cells[i])
    }

    /// Agent-agnostic walkability (restriction not evaluated).
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        self.cell(pos).is_some_and(GridCell::is_open)
    }

    /// Walkability for a specific access profile.
    pub fn is_traversable(&self, pos: GridPos, access: Option<&AccessProfiles>) -> bool {
        self.cell(pos).is_some_and(|c| c.admits(access))
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Render the floor back to legend rows (see module docs).
    pub fn to_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width as usize)
            .map(|row| row.iter().map(GridCell::legend_char).collect())
            .collect()
    }
}

// ── FloorBuilder ──────────────────────────────────────────────────────────────

/// Construct a [`Floor`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use wc_core::{FloorId, GridPos};
/// use wc_floor::FloorBuilder;
///
/// let mut b = FloorBuilder::new(FloorId(0), 5, 5);
/// b.wall(GridPos::new(2, 0), GridPos::new(2, 3));
/// let floor = b.build();
/// assert!(!floor.is_walkable(GridPos::new(2, 1)));
/// assert!(floor.is_walkable(GridPos::new(2, 4)));
/// ```
pub struct FloorBuilder {
    id:          FloorId,
    name:        String,
    width:       u32,
    height:      u32,
    cell_size_m: f32,
    cells:       Vec<GridCell>,
}

impl FloorBuilder {
    /// A `width × height` floor with every cell open.
    pub fn new(id: FloorId, width: u32, height: u32) -> Self {
        let cells = (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| GridCell::open(GridPos::new(x, y))))
            .collect();
        Self {
            id,
            name: format!("floor-{}", id.0),
            width,
            height,
            cell_size_m: 1.0,
            cells,
        }
    }

    /// Parse legend rows (see module docs).  All rows must share one width.
    pub fn from_rows<S: AsRef<str>>(id: FloorId, rows: &[S]) -> FloorResult<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.as_ref().chars().count()) as u32;
        if width == 0 || height == 0 {
            return Err(FloorError::Layout("floor must have at least one cell".into()));
        }

        let mut b = Self::new(id, width, height);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() as u32 != width {
                return Err(FloorError::Layout(format!(
                    "row {y} has {} cells, expected {width}",
                    row.chars().count()
                )));
            }
            for (x, ch) in row.chars().enumerate() {
                let pos = GridPos::new(x as i32, y as i32);
                let cell = b.cell_mut(pos)?;
                match ch {
                    '.' => {}
                    '#' => cell.is_obstacle = true,
                    'Q' => cell.is_quarantine = true,
                    'R' => cell.is_restricted = true,
                    'C' => cell.has_charger = true,
                    'S' => cell.has_storage = true,
                    'T' => cell.has_staging = true,
                    'X' => cell.has_connector = true,
                    ' ' => cell.walkable = false,
                    other => {
                        return Err(FloorError::Layout(format!(
                            "unknown legend character {other:?} at {pos}"
                        )));
                    }
                }
            }
        }
        Ok(b)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn cell_size(mut self, metres: f32) -> Self {
        self.cell_size_m = metres;
        self
    }

    /// Mutable access to one cell for fine-grained edits.
    pub fn cell_mut(&mut self, pos: GridPos) -> FloorResult<&mut GridCell> {
        let in_bounds =
            pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height;
        if !in_bounds {
            return Err(FloorError::OutOfBounds(pos));
        }
        let idx = pos.y as usize * self.width as usize + pos.x as usize;
        Ok(&mut self.cells[idx])
    }

    /// Mark one cell as an obstacle.  Out-of-bounds positions are ignored.
    pub fn obstacle(&mut self, pos: GridPos) -> &mut Self {
        if let Ok(c) = self.cell_mut(pos) {
            c.is_obstacle = true;
        }
        self
    }

    /// Obstacles along the axis-aligned segment `from..=to` (inclusive).
    pub fn wall(&mut self, from: GridPos, to: GridPos) -> &mut Self {
        let (x0, x1) = (from.x.min(to.x), from.x.max(to.x));
        let (y0, y1) = (from.y.min(to.y), from.y.max(to.y));
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.obstacle(GridPos::new(x, y));
            }
        }
        self
    }

    pub fn quarantine(&mut self, pos: GridPos) -> &mut Self {
        if let Ok(c) = self.cell_mut(pos) {
            c.is_quarantine = true;
        }
        self
    }

    /// Restrict a cell to agents holding any of `profiles`.
    pub fn restrict<S: Into<String>>(
        &mut self,
        pos: GridPos,
        profiles: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        if let Ok(c) = self.cell_mut(pos) {
            c.is_restricted = true;
            c.required_profiles = profiles.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Attach `profiles` to every cell already marked restricted (e.g. by an
    /// `R` in legend rows) that does not yet declare any.
    pub fn restrict_marked<S: Into<String> + Clone>(&mut self, profiles: &[S]) -> &mut Self {
        let tags: Vec<String> = profiles.iter().cloned().map(Into::into).collect();
        for c in self.cells.iter_mut().filter(|c| c.is_restricted && c.required_profiles.is_empty()) {
            c.required_profiles = tags.clone();
        }
        self
    }

    /// Make every cell outside the listed positions non-walkable void.
    pub fn only_walkable(&mut self, open: &[GridPos]) -> &mut Self {
        for c in &mut self.cells {
            c.walkable = open.contains(&c.pos);
        }
        self
    }

    pub fn build(self) -> Floor {
        Floor {
            id:          self.id,
            name:        self.name,
            width:       self.width,
            height:      self.height,
            cell_size_m: self.cell_size_m,
            cells:       self.cells,
        }
    }
}
