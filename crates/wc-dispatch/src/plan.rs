//! Plan data types.
//!
//! A `Plan` is produced wholesale by a dispatcher and then owned by the tick
//! executor until the next replan replaces it.  Only `metrics` is updated in
//! place afterwards.

use std::fmt;
use std::time::Duration;

use wc_core::{AgentId, FloorId, GridPos, JobId, SimTime};

use crate::{DispatchError, DispatchResult};

// ── RouteStep ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RouteAction {
    Pickup,
    Dropoff,
}

impl fmt::Display for RouteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RouteAction::Pickup  => "PICKUP",
            RouteAction::Dropoff => "DROPOFF",
        })
    }
}

/// One cell of a route, optionally carrying a timed action.
///
/// Consecutive steps are 4-adjacent, or identical when the second one is the
/// action dwell at the cell just reached.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteStep {
    pub pos:    GridPos,
    /// Expected arrival, assuming no delays.
    pub eta:    SimTime,
    pub action: Option<RouteAction>,
    /// Dwell time for `action`; zero for plain movement steps.
    pub dwell:  Duration,
}

impl RouteStep {
    #[inline]
    pub fn travel(pos: GridPos, eta: SimTime) -> Self {
        Self { pos, eta, action: None, dwell: Duration::ZERO }
    }

    #[inline]
    pub fn action(pos: GridPos, eta: SimTime, action: RouteAction, dwell: Duration) -> Self {
        Self { pos, eta, action: Some(action), dwell }
    }
}

// ── AgentPlan ─────────────────────────────────────────────────────────────────

/// The route handed to one agent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentPlan {
    pub agent:     AgentId,
    pub floor:     FloorId,
    pub steps:     Vec<RouteStep>,
    /// Jobs served by this route, in pickup order.
    pub job_ids:   Vec<JobId>,
    pub energy_wh: f64,
    pub co2_g:     f64,
}

impl AgentPlan {
    /// Expected completion time (end of the last dwell).
    pub fn finish_eta(&self) -> Option<SimTime> {
        self.steps.last().map(|s| s.eta + s.dwell)
    }

    /// Cells moved along the route (action steps excluded).
    pub fn cells_moved(&self) -> usize {
        self.steps
            .windows(2)
            .filter(|w| w[0].pos != w[1].pos)
            .count()
    }

    /// Check the adjacency and ordering rules for route steps.
    pub fn validate(&self) -> DispatchResult<()> {
        for (i, w) in self.steps.windows(2).enumerate() {
            let (a, b) = (&w[0], &w[1]);
            if a.pos != b.pos && !a.pos.is_adjacent(b.pos) {
                return Err(DispatchError::DisjointRoute {
                    agent: self.agent,
                    index: i + 1,
                    from:  a.pos,
                    to:    b.pos,
                });
            }
            if b.eta < a.eta {
                return Err(DispatchError::NonMonotonicEta { agent: self.agent, index: i + 1 });
            }
        }
        Ok(())
    }
}

// ── Unassigned jobs ───────────────────────────────────────────────────────────

/// Why a queued job was left out of a plan.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnassignedReason {
    /// No idle, charged, unclaimed agent at all.
    NoAvailableAgent,
    /// Nobody available can carry the weight.
    NoCapacity,
    /// Nobody available is on the job's floor.
    NoAgentOnFloor,
    /// Pickup and dropoff are on different floors.
    CrossFloor,
    /// Every candidate failed the path or battery-reserve test.
    NoViableRoute,
}

/// Display-only estimate for a job left in the queue.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnassignedEta {
    pub job:         JobId,
    pub deadline:    SimTime,
    /// Deadline falls within the configured buffer of the planning time.
    pub likely_late: bool,
    pub reason:      UnassignedReason,
}

// ── PlanMetrics ───────────────────────────────────────────────────────────────

/// Estimates filled by the dispatcher, actuals accumulated by the executor.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanMetrics {
    pub estimated_energy_wh: f64,
    pub estimated_co2_g:     f64,
    pub energy_wh:           f64,
    pub co2_g:               f64,
    pub cells_moved:         u64,
    pub cells_loaded:        u64,
    pub delivered_on_time:   u32,
    pub delivered_late:      u32,
}

impl PlanMetrics {
    /// Share of movement made with no payload, in percent.
    pub fn deadhead_pct(&self) -> f64 {
        if self.cells_moved == 0 {
            return 0.0;
        }
        (self.cells_moved - self.cells_loaded) as f64 / self.cells_moved as f64 * 100.0
    }

    pub fn on_time_pct(&self) -> f64 {
        let total = self.delivered_on_time + self.delivered_late;
        if total == 0 {
            return 100.0;
        }
        self.delivered_on_time as f64 / total as f64 * 100.0
    }
}

// ── Plan ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plan {
    pub created_at:  SimTime,
    pub agent_plans: Vec<AgentPlan>,
    pub unassigned:  Vec<JobId>,
    pub etas:        Vec<UnassignedEta>,
    pub metrics:     PlanMetrics,
}

impl Plan {
    pub fn empty(created_at: SimTime) -> Self {
        Self {
            created_at,
            agent_plans: Vec::new(),
            unassigned:  Vec::new(),
            etas:        Vec::new(),
            metrics:     PlanMetrics::default(),
        }
    }

    pub fn for_agent(&self, agent: AgentId) -> Option<&AgentPlan> {
        self.agent_plans.iter().find(|p| p.agent == agent)
    }

    /// `(job, agent)` pairs in plan order.
    pub fn assignments(&self) -> impl Iterator<Item = (JobId, AgentId)> + '_ {
        self.agent_plans
            .iter()
            .flat_map(|p| p.job_ids.iter().map(move |j| (*j, p.agent)))
    }

    pub fn validate(&self) -> DispatchResult<()> {
        self.agent_plans.iter().try_for_each(AgentPlan::validate)
    }
}
