//! `HospitalMap`: every floor plus the facilities placed on them.

use wc_core::{FloorId, Location};

use crate::{
    Charger, Connector, Floor, FloorError, FloorResult, Room, RoomIndex, StagingArea,
    StoragePoint,
};

/// Read-only map input consumed by dispatch and execution.
///
/// Produced by the external map editor (or a scenario document); the core
/// never mutates it during a run.
#[derive(Clone, Debug, Default)]
pub struct HospitalMap {
    pub floors:     Vec<Floor>,
    pub chargers:   Vec<Charger>,
    pub storage:    Vec<StoragePoint>,
    pub staging:    Vec<StagingArea>,
    pub connectors: Vec<Connector>,
    rooms:          Option<RoomIndex>,
}

impl HospitalMap {
    /// A map with the given floors and no facilities.
    pub fn new(floors: Vec<Floor>) -> Self {
        Self { floors, ..Self::default() }
    }

    /// A map with a single floor and no facilities.
    pub fn single(floor: Floor) -> Self {
        Self { floors: vec![floor], ..Self::default() }
    }

    pub fn with_chargers(mut self, chargers: Vec<Charger>) -> Self {
        self.chargers = chargers;
        self
    }

    pub fn with_staging(mut self, staging: Vec<StagingArea>) -> Self {
        self.staging = staging;
        self
    }

    pub fn with_storage(mut self, storage: Vec<StoragePoint>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_connectors(mut self, connectors: Vec<Connector>) -> Self {
        self.connectors = connectors;
        self
    }

    pub fn with_rooms(mut self, rooms: Vec<Room>) -> Self {
        self.rooms = Some(RoomIndex::new(rooms));
        self
    }

    pub fn floor(&self, id: FloorId) -> Option<&Floor> {
        self.floors.iter().find(|f| f.id == id)
    }

    pub fn require_floor(&self, id: FloorId) -> FloorResult<&Floor> {
        self.floor(id).ok_or(FloorError::FloorNotFound(id))
    }

    /// Chargers on `floor`, in declaration order.
    pub fn chargers_on(&self, floor: FloorId) -> impl Iterator<Item = &Charger> {
        self.chargers.iter().filter(move |c| c.location.floor == floor)
    }

    /// Staging areas on `floor`, in declaration order.
    pub fn staging_on(&self, floor: FloorId) -> impl Iterator<Item = &StagingArea> {
        self.staging.iter().filter(move |s| s.location.floor == floor)
    }

    /// The charger docked at exactly `loc`, if any.
    pub fn charger_at(&self, loc: Location) -> Option<&Charger> {
        self.chargers.iter().find(|c| c.location == loc)
    }

    pub fn rooms(&self) -> &[Room] {
        match &self.rooms {
            Some(index) => index.rooms(),
            None => &[],
        }
    }

    pub fn room_at(&self, loc: Location) -> Option<&Room> {
        self.rooms.as_ref()?.room_at(loc)
    }

    pub fn room_by_name(&self, name: &str) -> Option<&Room> {
        self.rooms.as_ref()?.by_name(name)
    }

    /// Name of the room at `loc`, or the bare coordinates.
    pub fn describe(&self, loc: Location) -> String {
        match self.room_at(loc) {
            Some(room) => format!("{} {}", room.name, loc.pos),
            None => loc.to_string(),
        }
    }
}
