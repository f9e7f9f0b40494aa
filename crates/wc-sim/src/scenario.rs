//! Versioned JSON scenario documents.
//!
//! A scenario bundles the map, roster, jobs, triage templates and config
//! overrides.  Floors are written as legend rows (see `wc_floor::floor`), with
//! access profiles for restricted cells given either as a floor-wide default
//! or per rectangular zone.
//!
//! ```json
//! {
//!   "version": 1,
//!   "floors": [{ "id": 0, "rows": ["....", ".RR.", "...."], "restricted_profiles": ["ICU"] }],
//!   "chargers": [{ "id": 0, "location": { "floor": 0, "pos": { "x": 0, "y": 0 } }, "charge_rate_per_sec": 1.0 }],
//!   "agents": [],
//!   "jobs": []
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use wc_core::{FloorId, GridPos, IdAllocator, SimConfig};
use wc_dispatch::Dispatcher;
use wc_floor::{
    Charger, Connector, Floor, FloorBuilder, FloorError, HospitalMap, Pathfinder, Room, StagingArea,
    StoragePoint,
};
use wc_fleet::{Agent, Fleet, FleetError};
use wc_jobs::{Job, TriageCase};

use crate::{Sim, SimBuilder};

/// The only document version this build reads and writes.
pub const SCENARIO_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("unsupported scenario version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("floor {floor}: {source}")]
    Floor { floor: FloorId, source: FloorError },

    #[error("roster error: {0}")]
    Fleet(#[from] FleetError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;

// ── Document types ────────────────────────────────────────────────────────────

/// A rectangle of restricted cells sharing one profile list, corners
/// inclusive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneDoc {
    pub min:      GridPos,
    pub max:      GridPos,
    pub profiles: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorDoc {
    pub id:   FloorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_cell_size")]
    pub cell_size_m: f32,
    pub rows: Vec<String>,
    /// Profiles for `R` cells not covered by a zone.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restricted_profiles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<ZoneDoc>,
}

fn default_cell_size() -> f32 {
    1.0
}

impl FloorDoc {
    pub fn build(&self) -> ScenarioResult<Floor> {
        let wrap = |source| ScenarioError::Floor { floor: self.id, source };
        let mut b = FloorBuilder::from_rows(self.id, &self.rows).map_err(wrap)?;
        for zone in &self.zones {
            for y in zone.min.y.min(zone.max.y)..=zone.min.y.max(zone.max.y) {
                for x in zone.min.x.min(zone.max.x)..=zone.min.x.max(zone.max.x) {
                    b.restrict(GridPos::new(x, y), zone.profiles.iter().cloned());
                }
            }
        }
        b.restrict_marked(&self.restricted_profiles);

        let mut b = b.cell_size(self.cell_size_m);
        if let Some(name) = &self.name {
            b = b.name(name.clone());
        }
        Ok(b.build())
    }

    /// Describe `floor` as legend rows plus one 1×1 zone per restricted cell
    /// that declares profiles.
    pub fn from_floor(floor: &Floor) -> Self {
        let zones = floor
            .cells()
            .iter()
            .filter(|c| c.is_restricted && !c.required_profiles.is_empty())
            .map(|c| ZoneDoc { min: c.pos, max: c.pos, profiles: c.required_profiles.clone() })
            .collect();
        Self {
            id:                  floor.id,
            name:                Some(floor.name.clone()),
            cell_size_m:         floor.cell_size_m,
            rows:                floor.to_rows(),
            restricted_profiles: Vec::new(),
            zones,
        }
    }
}

/// The whole scenario document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub version: u32,
    #[serde(default)]
    pub name:    String,
    #[serde(default)]
    pub config:  SimConfig,
    pub floors:  Vec<FloorDoc>,
    #[serde(default)]
    pub chargers:   Vec<Charger>,
    #[serde(default)]
    pub storage:    Vec<StoragePoint>,
    #[serde(default)]
    pub staging:    Vec<StagingArea>,
    #[serde(default)]
    pub connectors: Vec<Connector>,
    #[serde(default)]
    pub rooms:      Vec<Room>,
    #[serde(default)]
    pub agents:     Vec<Agent>,
    #[serde(default)]
    pub jobs:       Vec<Job>,
    #[serde(default)]
    pub triage:     Vec<TriageCase>,
}

impl Scenario {
    /// Parse and check the version.
    pub fn from_json(text: &str) -> ScenarioResult<Self> {
        // Read the version first so a newer document fails with a version
        // error, not a schema error.
        #[derive(Deserialize)]
        struct VersionOnly {
            version: u32,
        }
        let head: VersionOnly = serde_json::from_str(text)?;
        if head.version != SCENARIO_VERSION {
            return Err(ScenarioError::UnsupportedVersion {
                found:    head.version,
                expected: SCENARIO_VERSION,
            });
        }
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> ScenarioResult<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn to_json_pretty(&self) -> ScenarioResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_path(&self, path: &Path) -> ScenarioResult<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn build_map(&self) -> ScenarioResult<HospitalMap> {
        let floors = self.floors.iter().map(FloorDoc::build).collect::<ScenarioResult<Vec<_>>>()?;
        let mut map = HospitalMap::new(floors)
            .with_chargers(self.chargers.clone())
            .with_storage(self.storage.clone())
            .with_staging(self.staging.clone())
            .with_connectors(self.connectors.clone());
        if !self.rooms.is_empty() {
            map = map.with_rooms(self.rooms.clone());
        }
        Ok(map)
    }

    pub fn build_fleet(&self) -> ScenarioResult<Fleet> {
        let mut fleet = Fleet::new();
        for agent in &self.agents {
            agent.validate()?;
            fleet.push(agent.clone())?;
        }
        Ok(fleet)
    }

    /// A builder loaded with this scenario's map, roster, jobs and triage
    /// templates.
    pub fn into_builder<D: Dispatcher, P: Pathfinder>(
        self,
        dispatcher: D,
        pathfinder: P,
    ) -> ScenarioResult<SimBuilder<D, P>> {
        let map = self.build_map()?;
        let fleet = self.build_fleet()?;
        let ids = IdAllocator::resume_after(fleet.ids().max(), self.jobs.iter().map(|j| j.id).max());
        Ok(SimBuilder::new(self.config, map, fleet, dispatcher, pathfinder)
            .ids(ids)
            .jobs(self.jobs)
            .triage(self.triage))
    }

    /// Capture the current state of `sim` as a document.
    pub fn from_sim<D: Dispatcher, P: Pathfinder>(sim: &Sim<D, P>, name: impl Into<String>) -> Self {
        let map = &sim.map;
        Self {
            version:    SCENARIO_VERSION,
            name:       name.into(),
            config:     sim.config.clone(),
            floors:     map.floors.iter().map(FloorDoc::from_floor).collect(),
            chargers:   map.chargers.clone(),
            storage:    map.storage.clone(),
            staging:    map.staging.clone(),
            connectors: map.connectors.clone(),
            rooms:      map.rooms().to_vec(),
            agents:     sim.fleet.as_slice().to_vec(),
            jobs:       sim.jobs.as_slice().to_vec(),
            triage:     sim.triage.clone(),
        }
    }
}
