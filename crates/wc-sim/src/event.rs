//! Events emitted by the tick executor.
//!
//! Events are the only way failures inside a tick surface: nothing in
//! [`Sim::step`][crate::Sim::step] returns an error.

use std::fmt;

use wc_core::{AgentId, GridPos, JobId, Location, SimTime};

/// What caused a replan.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ReplanReason {
    /// The set of queued job ids differs from the last replan.
    QueueChanged,
    /// The previous plan ran out of active routes this tick.
    PlanCleared,
    /// Nothing changed but the cooldown elapsed.
    Cooldown,
    /// Requested through [`Sim::replan_now`][crate::Sim::replan_now].
    Manual,
}

impl ReplanReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ReplanReason::QueueChanged => "queue_changed",
            ReplanReason::PlanCleared  => "plan_cleared",
            ReplanReason::Cooldown     => "cooldown",
            ReplanReason::Manual       => "manual",
        }
    }
}

impl fmt::Display for ReplanReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of what a replan changed.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct ReplanImpact {
    pub assigned:    usize,
    pub unassigned:  usize,
    pub likely_late: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    JobCompleted { job: JobId, agent: AgentId, at: SimTime, late: bool },
    /// The agent hit the critical level; `released` went back to the queue.
    LowBattery { agent: AgentId, battery_pct: f64, released: Vec<JobId> },
    /// No path toward the agent's next cell.  Reported once per episode.
    AgentStuck { agent: AgentId, at: Location, target: GridPos },
    /// An in-flight job passed its deadline.
    JobDelayed { job: JobId, agent: Option<AgentId> },
    ReplanCompleted { reason: ReplanReason, impact: ReplanImpact },
    JobInfeasible { job: JobId, reason: String },
    JobReleased { job: JobId, agent: AgentId },
}

impl SimEvent {
    /// Stable snake-case tag used by output backends.
    pub fn kind(&self) -> &'static str {
        match self {
            SimEvent::JobCompleted { .. }    => "job_completed",
            SimEvent::LowBattery { .. }      => "low_battery",
            SimEvent::AgentStuck { .. }      => "agent_stuck",
            SimEvent::JobDelayed { .. }      => "job_delayed",
            SimEvent::ReplanCompleted { .. } => "replan_completed",
            SimEvent::JobInfeasible { .. }   => "job_infeasible",
            SimEvent::JobReleased { .. }     => "job_released",
        }
    }

    pub fn agent(&self) -> Option<AgentId> {
        match self {
            SimEvent::JobCompleted { agent, .. }
            | SimEvent::LowBattery { agent, .. }
            | SimEvent::AgentStuck { agent, .. }
            | SimEvent::JobReleased { agent, .. } => Some(*agent),
            SimEvent::JobDelayed { agent, .. } => *agent,
            SimEvent::ReplanCompleted { .. } | SimEvent::JobInfeasible { .. } => None,
        }
    }

    pub fn job(&self) -> Option<JobId> {
        match self {
            SimEvent::JobCompleted { job, .. }
            | SimEvent::JobDelayed { job, .. }
            | SimEvent::JobInfeasible { job, .. }
            | SimEvent::JobReleased { job, .. } => Some(*job),
            _ => None,
        }
    }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimEvent::JobCompleted { job, agent, at, late } => {
                let timing = if *late { "late" } else { "on time" };
                write!(f, "{job} delivered by {agent} at {at} ({timing})")
            }
            SimEvent::LowBattery { agent, battery_pct, released } => {
                write!(f, "{agent} battery at {battery_pct:.1}%, released {} job(s)", released.len())
            }
            SimEvent::AgentStuck { agent, at, target } => {
                write!(f, "{agent} stuck at {at}, no path to {target}")
            }
            SimEvent::JobDelayed { job, .. } => write!(f, "{job} missed its deadline"),
            SimEvent::ReplanCompleted { reason, impact } => write!(
                f,
                "replan ({reason}): {} assigned, {} unassigned, {} likely late",
                impact.assigned, impact.unassigned, impact.likely_late
            ),
            SimEvent::JobInfeasible { job, reason } => write!(f, "{job} infeasible: {reason}"),
            SimEvent::JobReleased { job, agent } => write!(f, "{job} released by {agent}"),
        }
    }
}
