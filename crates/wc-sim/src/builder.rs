//! Fluent builder for constructing a [`Sim`].

use tracing::debug;

use wc_core::{IdAllocator, SimConfig};
use wc_dispatch::Dispatcher;
use wc_floor::{HospitalMap, Pathfinder};
use wc_fleet::{AgentStatus, Fleet};
use wc_jobs::{DemandGenerator, DemandProfile, Job, JobBoard, JobState, TriageCase};
use wc_motion::MotionEngine;

use crate::{IdSet, ReplanState, RunState, SessionMetrics, Sim, SimError, SimResult, Snapshot};

/// Fluent builder for [`Sim<D, P>`].
///
/// # Required inputs
///
/// - [`SimConfig`]
/// - [`HospitalMap`] with at least one floor
/// - [`Fleet`], every agent standing on a walkable cell of an existing floor
/// - `D: Dispatcher` (e.g. [`wc_dispatch::GreedyDispatcher`])
/// - `P: Pathfinder` for execution-time stepping (e.g. [`wc_floor::AStarPathfinder`])
///
/// # Optional inputs
///
/// | Method          | Default                                   |
/// |-----------------|-------------------------------------------|
/// | `.jobs(v)`      | empty board                               |
/// | `.triage(v)`    | no triage templates                       |
/// | `.demand(p)`    | no generated demand                       |
/// | `.ids(a)`       | resume after the highest agent / job ids  |
///
/// Queued jobs pass the feasibility check on the way in.  Jobs that arrive
/// mid-flight (from an exported scenario) are returned to the queue, since
/// the plan they belonged to is not part of the input.
pub struct SimBuilder<D: Dispatcher, P: Pathfinder> {
    config:     SimConfig,
    map:        HospitalMap,
    fleet:      Fleet,
    dispatcher: D,
    pathfinder: P,
    jobs:       Vec<Job>,
    triage:     Vec<TriageCase>,
    demand:     Option<DemandProfile>,
    ids:        Option<IdAllocator>,
}

impl<D: Dispatcher, P: Pathfinder> SimBuilder<D, P> {
    pub fn new(config: SimConfig, map: HospitalMap, fleet: Fleet, dispatcher: D, pathfinder: P) -> Self {
        Self {
            config,
            map,
            fleet,
            dispatcher,
            pathfinder,
            jobs:   Vec::new(),
            triage: Vec::new(),
            demand: None,
            ids:    None,
        }
    }

    pub fn jobs(mut self, jobs: Vec<Job>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn triage(mut self, cases: Vec<TriageCase>) -> Self {
        self.triage = cases;
        self
    }

    /// Generate jobs each tick from `profile`, seeded with `config.seed`.
    pub fn demand(mut self, profile: DemandProfile) -> Self {
        self.demand = Some(profile);
        self
    }

    /// Continue from an existing allocator (e.g. the one that built the
    /// fleet).
    pub fn ids(mut self, ids: IdAllocator) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn build(self) -> SimResult<Sim<D, P>> {
        validate_config(&self.config)?;
        if self.map.floors.is_empty() {
            return Err(SimError::Config("map has no floors".into()));
        }

        let mut fleet = self.fleet;
        for agent in fleet.iter() {
            agent.validate()?;
            let reason = match self.map.floor(agent.location.floor) {
                None => Some(format!("floor {} does not exist", agent.location.floor)),
                Some(f) if !f.is_walkable(agent.location.pos) => {
                    Some(format!("cell {} is not walkable", agent.location.pos))
                }
                Some(_) => None,
            };
            if let Some(reason) = reason {
                return Err(SimError::Placement { agent: agent.id, reason });
            }
        }

        let mut ids = self.ids.unwrap_or_else(|| {
            IdAllocator::resume_after(fleet.ids().max(), self.jobs.iter().map(|j| j.id).max())
        });
        for id in fleet.ids() {
            ids.observe_agent(id);
        }

        // Working agents lose their (absent) plan: back to idle, empty.
        let working: Vec<_> = fleet
            .iter()
            .filter(|a| a.status != AgentStatus::Charging && (a.status != AgentStatus::Idle || a.current_job.is_some()))
            .map(|a| a.id)
            .collect();
        for id in working {
            fleet.clear_job(id)?;
            fleet.set_payload(id, 0.0)?;
            fleet.set_status(id, AgentStatus::Idle)?;
        }

        let demand = self.demand.map(|p| DemandGenerator::new(p, self.config.seed));
        let clock = self.config.make_clock();

        let mut sim = Sim {
            clock,
            config:      self.config,
            ids,
            map:         self.map,
            fleet,
            jobs:        JobBoard::new(),
            plan:        None,
            motion:      MotionEngine::new(self.pathfinder),
            dispatcher:  self.dispatcher,
            metrics:     SessionMetrics::default(),
            triage:      self.triage,
            demand,
            replan:      ReplanState::default(),
            run_state:   RunState::Stopped,
            low_battery: IdSet::default(),
            pending:     Vec::new(),
            initial:     Snapshot {
                fleet:   Fleet::new(),
                jobs:    JobBoard::new(),
                ids:     IdAllocator::new(),
                demand:  None,
                pending: Vec::new(),
            },
        };

        for mut job in self.jobs {
            if job.state.is_in_flight() {
                debug!(job = %job.id, state = %job.state.as_str(), "in-flight job returned to queue");
                job.state = JobState::Queued;
                job.assigned_agent = None;
                job.progress = Default::default();
            }
            sim.enqueue(job)?;
        }

        sim.initial = Snapshot {
            fleet:   sim.fleet.clone(),
            jobs:    sim.jobs.clone(),
            ids:     sim.ids.clone(),
            demand:  sim.demand.clone(),
            pending: sim.pending.clone(),
        };
        Ok(sim)
    }
}

fn validate_config(config: &SimConfig) -> SimResult<()> {
    let b = &config.battery;
    let ordered = 0.0 <= b.critical_pct
        && b.critical_pct < b.dispatch_min_pct
        && b.reserve_pct < b.dispatch_min_pct
        && b.dispatch_min_pct < b.full_pct
        && b.full_pct <= 100.0;
    if !ordered {
        return Err(SimError::Config(format!(
            "battery thresholds out of order: critical {} / reserve {} / dispatch {} / full {}",
            b.critical_pct, b.reserve_pct, b.dispatch_min_pct, b.full_pct
        )));
    }
    if config.energy_wh_per_cell < 0.0 || config.co2_g_per_wh < 0.0 {
        return Err(SimError::Config("energy and CO2 factors must be non-negative".into()));
    }
    if config.replan_cooldown_secs < 0.0 {
        return Err(SimError::Config("replan cooldown must be non-negative".into()));
    }
    Ok(())
}
