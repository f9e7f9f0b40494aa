//! Fixed facilities placed on floors, plus the room lookup index.
//!
//! # Room index
//!
//! Rooms are axis-aligned rectangles of cells.  An R-tree (via `rstar`) maps a
//! cell to the room(s) containing it so events and snapshots can carry a
//! human-readable place name without a linear scan per query.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use wc_core::{ChargerId, FloorId, GridPos, Location, RoomId, StagingId};

// ── Facilities ────────────────────────────────────────────────────────────────

/// A charging dock occupying one cell.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Charger {
    pub id:                  ChargerId,
    pub location:            Location,
    /// Battery units gained per simulated second while docked.
    pub charge_rate_per_sec: f64,
}

/// A supply store carts pick up from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoragePoint {
    pub name:     String,
    pub location: Location,
}

/// A parking area for idle carts.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StagingArea {
    pub id:       StagingId,
    pub name:     String,
    pub location: Location,
}

/// A lift or stairwell linking floors.  Carried as data only: dispatch never
/// routes across floors.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connector {
    pub name:     String,
    pub location: Location,
    pub links_to: Vec<FloorId>,
}

/// A named rectangular room, corners inclusive.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    pub id:    RoomId,
    pub name:  String,
    pub floor: FloorId,
    pub min:   GridPos,
    pub max:   GridPos,
}

impl Room {
    pub fn contains(&self, loc: Location) -> bool {
        loc.floor == self.floor
            && (self.min.x..=self.max.x).contains(&loc.pos.x)
            && (self.min.y..=self.max.y).contains(&loc.pos.y)
    }

    /// Centre cell (rounded toward `min`).  Used as a default drop point.
    pub fn center(&self) -> GridPos {
        GridPos::new((self.min.x + self.max.x) / 2, (self.min.y + self.max.y) / 2)
    }
}

// ── RoomIndex ─────────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: one room's rectangle.
#[derive(Clone, Debug)]
struct RoomEntry {
    min:   [i32; 2],
    max:   [i32; 2],
    floor: FloorId,
    id:    RoomId,
}

impl RTreeObject for RoomEntry {
    type Envelope = AABB<[i32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for RoomEntry {
    /// Squared distance from the point to the rectangle; zero inside it.
    fn distance_2(&self, point: &[i32; 2]) -> i32 {
        let dx = (self.min[0] - point[0]).max(0).max(point[0] - self.max[0]);
        let dy = (self.min[1] - point[1]).max(0).max(point[1] - self.max[1]);
        dx * dx + dy * dy
    }
}

/// Spatial lookup from cell to room.
pub struct RoomIndex {
    rooms: Vec<Room>,
    tree:  RTree<RoomEntry>,
}

impl RoomIndex {
    pub fn new(rooms: Vec<Room>) -> Self {
        let entries = rooms
            .iter()
            .map(|r| RoomEntry {
                min:   [r.min.x.min(r.max.x), r.min.y.min(r.max.y)],
                max:   [r.min.x.max(r.max.x), r.min.y.max(r.max.y)],
                floor: r.floor,
                id:    r.id,
            })
            .collect();
        Self { rooms, tree: RTree::bulk_load(entries) }
    }

    /// The room containing `loc`.  Overlapping rooms resolve to the lowest id.
    pub fn room_at(&self, loc: Location) -> Option<&Room> {
        let id = self
            .tree
            .locate_all_at_point(&[loc.pos.x, loc.pos.y])
            .filter(|e| e.floor == loc.floor)
            .map(|e| e.id)
            .min()?;
        self.get(id)
    }

    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.name == name)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl Clone for RoomIndex {
    fn clone(&self) -> Self {
        Self::new(self.rooms.clone())
    }
}

impl std::fmt::Debug for RoomIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomIndex").field("rooms", &self.rooms.len()).finish()
    }
}
