//! Fluent construction of a [`Fleet`].
//!
//! # Usage
//!
//! ```rust
//! use wc_core::{FloorId, GridPos, IdAllocator, Location};
//! use wc_fleet::{AgentSpec, FleetBuilder, Pool};
//!
//! let mut ids = IdAllocator::new();
//! let fleet = FleetBuilder::new()
//!     .agent(AgentSpec::new("cart-1", Location::new(FloorId(0), GridPos::new(0, 0)))
//!         .pool(Pool::Urgent)
//!         .access(["ICU"]))
//!     .agent(AgentSpec::new("cart-2", Location::new(FloorId(0), GridPos::new(4, 0))))
//!     .build(&mut ids)
//!     .unwrap();
//!
//! assert_eq!(fleet.len(), 2);
//! ```

use wc_core::{IdAllocator, Location};
use wc_floor::AccessProfiles;

use crate::agent::check_figures;
use crate::{Agent, AgentStatus, Fleet, FleetError, FleetResult, Pool};

/// Everything about a cart except its id.
#[derive(Clone, Debug)]
pub struct AgentSpec {
    name:           String,
    location:       Location,
    speed:          f64,
    battery:        f64,
    max_battery:    f64,
    drain_per_cell: f64,
    payload_limit:  f64,
    access:         AccessProfiles,
    pool:           Pool,
}

impl AgentSpec {
    /// A full, empty, 1 cell/s cart with a 50 kg limit in the non-urgent pool.
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
            speed:          1.0,
            battery:        100.0,
            max_battery:    100.0,
            drain_per_cell: 0.1,
            payload_limit:  50.0,
            access:         AccessProfiles::new(),
            pool:           Pool::NonUrgent,
        }
    }

    pub fn speed(mut self, cells_per_sec: f64) -> Self {
        self.speed = cells_per_sec;
        self
    }

    pub fn battery(mut self, level: f64) -> Self {
        self.battery = level;
        self
    }

    pub fn max_battery(mut self, capacity: f64) -> Self {
        self.max_battery = capacity;
        self
    }

    pub fn drain_per_cell(mut self, drain: f64) -> Self {
        self.drain_per_cell = drain;
        self
    }

    pub fn payload_limit(mut self, kg: f64) -> Self {
        self.payload_limit = kg;
        self
    }

    pub fn access<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.access = tags.into_iter().collect();
        self
    }

    pub fn pool(mut self, pool: Pool) -> Self {
        self.pool = pool;
        self
    }

    fn validate(&self) -> FleetResult<()> {
        check_figures(self.speed, self.battery, self.max_battery, self.drain_per_cell, self.payload_limit)
            .map_err(|reason| FleetError::InvalidAgent { name: self.name.clone(), reason: reason.into() })
    }

    fn into_agent(self, ids: &mut IdAllocator) -> Agent {
        Agent {
            id:             ids.next_agent(),
            name:           self.name,
            location:       self.location,
            speed:          self.speed,
            battery:        self.battery,
            max_battery:    self.max_battery,
            drain_per_cell: self.drain_per_cell,
            payload_limit:  self.payload_limit,
            payload:        0.0,
            access:         self.access,
            current_job:    None,
            status:         AgentStatus::Idle,
            pool:           self.pool,
        }
    }
}

/// Collects [`AgentSpec`]s and assigns ids in insertion order.
#[derive(Default)]
pub struct FleetBuilder {
    specs: Vec<AgentSpec>,
}

impl FleetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent(mut self, spec: AgentSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Validate every spec, then allocate ids from `ids`.
    ///
    /// Nothing is allocated if any spec is invalid.
    pub fn build(self, ids: &mut IdAllocator) -> FleetResult<Fleet> {
        for spec in &self.specs {
            spec.validate()?;
        }
        let mut fleet = Fleet::new();
        for spec in self.specs {
            fleet.push(spec.into_agent(ids))?;
        }
        Ok(fleet)
    }
}
