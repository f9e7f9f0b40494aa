//! The `Dispatcher` trait and the greedy nearest-fit implementation.

use std::collections::HashSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, warn};

use wc_core::{AgentId, SimTime};
use wc_floor::{Floor, GridPath, Pathfinder};
use wc_fleet::{Agent, AgentStatus, Pool};
use wc_jobs::{Job, JobState, sort_queue};

use crate::{
    DispatchContext, Plan, UnassignedEta, UnassignedReason, build_agent_plan, step_duration,
};

/// Pluggable planning policy.
///
/// Implementations must be pure functions of the context: no interior state
/// that changes the result between calls.
pub trait Dispatcher: Send + Sync {
    fn create_plan(&self, ctx: &DispatchContext<'_>) -> Plan;
}

impl<D: Dispatcher + ?Sized> Dispatcher for Box<D> {
    fn create_plan(&self, ctx: &DispatchContext<'_>) -> Plan {
        (**self).create_plan(ctx)
    }
}

// ── GreedyDispatcher ──────────────────────────────────────────────────────────

/// Priority-ordered, single-pass, nearest-available-agent assignment.
///
/// For each queued job, most urgent first, the dispatcher narrows the
/// unclaimed agents (idle, charged, pool, capacity, floor), searches both
/// legs for every remaining candidate and claims the one with the shortest
/// total path.  There is no backtracking: a claim made for an earlier job is
/// never revisited, so the result is greedy, not optimal.
pub struct GreedyDispatcher<P: Pathfinder> {
    pathfinder: P,
}

/// A candidate that passed path and battery checks.
struct Candidate {
    roster_idx:  usize,
    pickup_leg:  GridPath,
    dropoff_leg: GridPath,
}

impl Candidate {
    fn total_len(&self) -> u32 {
        self.pickup_leg.len_steps() + self.dropoff_leg.len_steps()
    }
}

impl<P: Pathfinder> GreedyDispatcher<P> {
    pub fn new(pathfinder: P) -> Self {
        Self { pathfinder }
    }

    pub fn pathfinder(&self) -> &P {
        &self.pathfinder
    }

    /// Agents allowed to take a new job this pass, in roster order.
    fn available<'a>(
        &self,
        ctx:     &'a DispatchContext<'_>,
        claimed: &HashSet<AgentId>,
    ) -> Vec<(usize, &'a Agent)> {
        let min_pct = ctx.config.battery.dispatch_min_pct;
        ctx.fleet
            .iter()
            .enumerate()
            .filter(|(_, a)| {
                !claimed.contains(&a.id)
                    && a.status == AgentStatus::Idle
                    && a.current_job.is_none()
                    && a.battery_pct() > min_pct
                    && a.speed > 0.0
            })
            .collect()
    }

    /// Path both legs for one agent; `None` if a leg is unreachable or the
    /// trip would eat into the battery reserve.
    fn evaluate(
        &self,
        ctx:        &DispatchContext<'_>,
        floor:      &Floor,
        job:        &Job,
        roster_idx: usize,
        agent:      &Agent,
    ) -> Option<Candidate> {
        if step_duration(agent.speed).is_none() {
            debug!(agent = %agent.id, speed = agent.speed, "candidate rejected: unusable speed");
            return None;
        }
        let access = Some(&agent.access);
        let pickup_pos = job.pickup.map_or(agent.location.pos, |p| p.pos);

        let pickup_leg = self
            .pathfinder
            .find_path(floor, agent.location.pos, pickup_pos, access)
            .ok()?;
        let dropoff_leg = self
            .pathfinder
            .find_path(floor, pickup_pos, job.dropoff.pos, access)
            .ok()?;

        let drain = pickup_leg.battery_drain(agent.drain_per_cell)
            + dropoff_leg.battery_drain(agent.drain_per_cell);
        let reserve = agent.battery_at_pct(ctx.config.battery.reserve_pct);
        if agent.battery - drain < reserve {
            debug!(agent = %agent.id, job = %job.id, drain, "candidate rejected: battery reserve");
            return None;
        }

        Some(Candidate { roster_idx, pickup_leg, dropoff_leg })
    }

    fn evaluate_all(
        &self,
        ctx:        &DispatchContext<'_>,
        floor:      &Floor,
        job:        &Job,
        candidates: &[(usize, &Agent)],
    ) -> Vec<Option<Candidate>> {
        #[cfg(feature = "parallel")]
        {
            candidates
                .par_iter()
                .map(|&(idx, agent)| self.evaluate(ctx, floor, job, idx, agent))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            candidates
                .iter()
                .map(|&(idx, agent)| self.evaluate(ctx, floor, job, idx, agent))
                .collect()
        }
    }

    /// Run steps (b)–(f) for one job.  `Err` carries the reason it stays
    /// queued.
    fn select(
        &self,
        ctx:     &DispatchContext<'_>,
        job:     &Job,
        claimed: &HashSet<AgentId>,
    ) -> Result<Candidate, UnassignedReason> {
        let available = self.available(ctx, claimed);
        if available.is_empty() {
            return Err(UnassignedReason::NoAvailableAgent);
        }

        let in_pool = |pool: Pool| {
            available
                .iter()
                .copied()
                .filter(|(_, a)| a.pool == pool)
                .collect::<Vec<_>>()
        };
        let mut pool = if job.priority.is_urgent() {
            let own = in_pool(Pool::Urgent);
            if own.is_empty() { in_pool(Pool::NonUrgent) } else { own }
        } else {
            in_pool(Pool::NonUrgent)
        };
        if pool.is_empty() {
            pool = available.clone();
        }

        let capable: Vec<_> = pool
            .into_iter()
            .filter(|(_, a)| a.can_carry(job.weight_kg()))
            .collect();
        if capable.is_empty() {
            return Err(UnassignedReason::NoCapacity);
        }

        let floor_id = job.dropoff.floor;
        if job.pickup.is_some_and(|p| p.floor != floor_id) {
            return Err(UnassignedReason::CrossFloor);
        }
        let Some(floor) = ctx.map.floor(floor_id) else {
            return Err(UnassignedReason::NoAgentOnFloor);
        };
        let on_floor: Vec<_> = capable
            .into_iter()
            .filter(|(_, a)| a.location.floor == floor_id)
            .collect();
        if on_floor.is_empty() {
            return Err(UnassignedReason::NoAgentOnFloor);
        }

        // Shortest total path; strict `<` keeps the earliest roster entry on
        // ties.
        let mut best: Option<Candidate> = None;
        for cand in self.evaluate_all(ctx, floor, job, &on_floor).into_iter().flatten() {
            if best.as_ref().is_none_or(|b| cand.total_len() < b.total_len()) {
                best = Some(cand);
            }
        }
        best.ok_or(UnassignedReason::NoViableRoute)
    }
}

impl<P: Pathfinder> Dispatcher for GreedyDispatcher<P> {
    fn create_plan(&self, ctx: &DispatchContext<'_>) -> Plan {
        let cfg = ctx.config;
        let mut plan = Plan::empty(ctx.now);
        let mut claimed: HashSet<AgentId> = HashSet::new();

        let queue = sort_queue(
            ctx.jobs.in_state(JobState::Queued),
            ctx.now,
            cfg.starvation_threshold_secs,
        );

        for job in queue {
            let built = self.select(ctx, job, &claimed).and_then(|cand| {
                let agent = &ctx.fleet.as_slice()[cand.roster_idx];
                build_agent_plan(agent, job, &cand.pickup_leg, &cand.dropoff_leg, ctx.now, cfg)
                    .map(|agent_plan| (cand.total_len(), agent_plan))
                    .map_err(|e| {
                        warn!(job = %job.id, %e, "route not built");
                        UnassignedReason::NoViableRoute
                    })
            });
            match built {
                Ok((cells, agent_plan)) => {
                    debug!(
                        job = %job.id,
                        agent = %agent_plan.agent,
                        priority = %job.priority,
                        cells,
                        "job assigned"
                    );
                    claimed.insert(agent_plan.agent);
                    plan.agent_plans.push(agent_plan);
                }
                Err(reason) => {
                    debug!(job = %job.id, ?reason, "job left unassigned");
                    plan.unassigned.push(job.id);
                    plan.etas.push(eta_note(job, ctx.now, cfg.late_buffer_secs, reason));
                }
            }
        }

        plan.metrics.estimated_energy_wh = plan.agent_plans.iter().map(|p| p.energy_wh).sum();
        plan.metrics.estimated_co2_g = plan.agent_plans.iter().map(|p| p.co2_g).sum();
        plan
    }
}

fn eta_note(job: &Job, now: SimTime, buffer_secs: f64, reason: UnassignedReason) -> UnassignedEta {
    UnassignedEta {
        job:         job.id,
        deadline:    job.deadline,
        likely_late: job.deadline.secs_after(now) <= buffer_secs,
        reason,
    }
}
