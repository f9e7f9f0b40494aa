//! Replan policy.
//!
//! A new plan is only requested when queued work exists, at least one agent
//! is idle with nothing assigned, and no route of the previous plan is still
//! running.  Among those ticks, dispatch happens when the queued-id set
//! changed since the last replan, when the previous plan finished this tick,
//! or when the cooldown has elapsed.  The cooldown alone therefore bounds how
//! often an unproductive dispatch can repeat.

use tracing::{debug, info, warn};

use wc_core::{AgentId, JobId, SimTime};
use wc_dispatch::{DispatchContext, Dispatcher};
use wc_floor::Pathfinder;
use wc_fleet::AgentStatus;

use crate::{ReplanImpact, ReplanReason, Sim, SimEvent};

impl<D: Dispatcher, P: Pathfinder> Sim<D, P> {
    pub(crate) fn replan_if_due(&mut self, now: SimTime) {
        let mut cleared = false;
        if let Some(plan) = &self.plan {
            let active = plan
                .agent_plans
                .iter()
                .any(|p| !self.motion.store.is_completed(p.agent));
            if !active {
                cleared = !plan.agent_plans.is_empty();
                self.plan = None;
            }
        }

        if self.plan.is_some() || !self.jobs.has_queued() {
            return;
        }
        if !self.fleet.iter().any(|a| a.is_free()) {
            return;
        }

        let queued = self.jobs.queued_ids();
        let cooled = self
            .replan
            .last_at
            .is_none_or(|t| now.since(t) >= self.config.replan_cooldown());
        let reason = if queued != self.replan.last_queued {
            ReplanReason::QueueChanged
        } else if cleared {
            ReplanReason::PlanCleared
        } else if cooled {
            ReplanReason::Cooldown
        } else {
            return;
        };
        self.dispatch(now, reason);
    }

    /// Discard the current plan and dispatch immediately.
    ///
    /// Every in-flight job goes back to the queue first (payloads are
    /// dropped, as on a battery abort) and agents that were working become
    /// idle, so the new plan sees the whole fleet.  Agents heading to or
    /// sitting at a charger are left alone.  The cooldown is not consulted.
    pub fn replan_now(&mut self) -> ReplanImpact {
        let now = self.clock.now;

        let in_flight: Vec<(JobId, Option<AgentId>)> = self
            .jobs
            .iter()
            .filter(|j| j.state.is_in_flight())
            .map(|j| (j.id, j.assigned_agent))
            .collect();
        for (job, agent) in in_flight {
            if self.jobs.release(job).is_ok() {
                if let Some(agent) = agent {
                    self.emit(SimEvent::JobReleased { job, agent });
                }
            }
        }

        let working: Vec<_> = self
            .fleet
            .iter()
            .filter(|a| {
                matches!(
                    a.status,
                    AgentStatus::Moving | AgentStatus::PickingUp | AgentStatus::DroppingOff
                ) || a.current_job.is_some()
            })
            .map(|a| a.id)
            .filter(|id| !self.motion.store.is_diverting(*id))
            .collect();
        for id in working {
            let _ = self.fleet.clear_job(id);
            let _ = self.fleet.set_payload(id, 0.0);
            let _ = self.fleet.set_status(id, AgentStatus::Idle);
        }

        self.plan = None;
        self.dispatch(now, ReplanReason::Manual)
    }

    fn dispatch(&mut self, now: SimTime, reason: ReplanReason) -> ReplanImpact {
        let plan = {
            let ctx = DispatchContext::new(&self.jobs, &self.fleet, &self.map, &self.config, now);
            self.dispatcher.create_plan(&ctx)
        };
        self.replan.last_at = Some(now);

        if let Err(e) = plan.validate() {
            warn!(%e, "dispatcher returned an invalid route; plan discarded");
            self.replan.last_queued = self.jobs.queued_ids();
            return ReplanImpact::default();
        }

        for (job, agent) in plan.assignments() {
            if let Err(e) = self.jobs.assign(job, agent) {
                warn!(%job, %agent, %e, "assignment not applied");
                continue;
            }
            let _ = self.fleet.assign_job(agent, job);
            debug!(%job, %agent, "assigned");
        }
        self.motion.store.reset_for_plan();

        let impact = ReplanImpact {
            assigned:    plan.agent_plans.iter().map(|p| p.job_ids.len()).sum(),
            unassigned:  plan.unassigned.len(),
            likely_late: plan.etas.iter().filter(|e| e.likely_late).count(),
        };
        self.metrics.replans += 1;
        self.replan.last_queued = self.jobs.queued_ids();
        self.plan = Some(plan);

        info!(
            %reason,
            assigned = impact.assigned,
            unassigned = impact.unassigned,
            likely_late = impact.likely_late,
            at = %now,
            "replan completed"
        );
        self.emit(SimEvent::ReplanCompleted { reason, impact });
        impact
    }
}
