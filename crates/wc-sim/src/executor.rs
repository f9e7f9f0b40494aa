//! Per-agent executor rules.
//!
//! Each tick every agent is run through the rules below; the first that
//! matches wins:
//!
//! 1. charging at a dock;
//! 2. critical battery: release held jobs, report, divert to a charger;
//! 3. diverting: step toward the charger;
//! 4. nothing to do: accumulate idle time, seek a charger when low;
//! 5. following the current route.
//!
//! Fleet point mutators only fail for unknown ids.  The executor walks the
//! roster, so their results are discarded here.

use std::time::Duration;

use tracing::{debug, info, warn};

use wc_core::{AgentId, GridPos, JobId, Location, SimTime};
use wc_dispatch::{Dispatcher, RouteAction, RouteStep};
use wc_floor::Pathfinder;
use wc_fleet::AgentStatus;
use wc_jobs::JobState;
use wc_motion::StepOutcome;

use crate::{Sim, SimEvent};

impl<D: Dispatcher, P: Pathfinder> Sim<D, P> {
    pub(crate) fn advance_agent(&mut self, id: AgentId, now: SimTime, slice: Duration) {
        let Some(agent) = self.fleet.get(id) else {
            return;
        };
        let status = agent.status;
        let pct = agent.battery_pct();
        let holds_job = agent.current_job.is_some();

        if status == AgentStatus::Charging {
            self.charge(id, slice);
            return;
        }

        if pct <= self.config.battery.critical_pct && !self.motion.store.is_diverting(id) {
            if self.low_battery.insert(id) {
                self.abort_for_battery(id, pct);
            } else if !self.seek_charger(id) {
                let _ = self.fleet.set_status(id, AgentStatus::Idle);
            }
            return;
        }

        if let Some(target) = self.motion.store.get(id).and_then(|s| s.charge_target) {
            self.travel_to_charger(id, target, slice);
            return;
        }

        if !self.has_active_route(id) {
            self.motion.drop_credit(id);
            if status != AgentStatus::Idle {
                let _ = self.fleet.set_status(id, AgentStatus::Idle);
            }
            if !holds_job {
                self.metrics.idle_waiting_secs += slice.as_secs_f64();
                if pct < self.config.battery.seek_charge_pct {
                    self.seek_charger(id);
                }
            }
            return;
        }

        self.follow_route(id, now, slice);
    }

    // ── Charging ──────────────────────────────────────────────────────────

    fn charge(&mut self, id: AgentId, slice: Duration) {
        let secs = slice.as_secs_f64();
        self.metrics.idle_charging_secs += secs;

        let Some(agent) = self.fleet.get(id) else {
            return;
        };
        let rate = self
            .map
            .charger_at(agent.location)
            .map_or(self.config.default_charge_rate_per_sec, |c| c.charge_rate_per_sec);
        let _ = self.fleet.charge_battery(id, rate * secs);

        let full = self
            .fleet
            .get(id)
            .is_some_and(|a| a.battery_pct() >= self.config.battery.full_pct);
        if full {
            debug!(agent = %id, "charged");
            let _ = self.fleet.set_status(id, AgentStatus::Idle);
            self.motion.end_diversion(id);
            self.low_battery.remove(&id);
        }
    }

    /// Start a charger diversion.  `false` when no charger is reachable.
    fn seek_charger(&mut self, id: AgentId) -> bool {
        let Some(agent) = self.fleet.get(id) else {
            return false;
        };
        match self.motion.divert_to_charger(agent, &self.map) {
            Ok(_) => {
                let _ = self.fleet.set_status(id, AgentStatus::Moving);
                true
            }
            Err(e) => {
                debug!(agent = %id, %e, "cannot reach a charger");
                false
            }
        }
    }

    fn abort_for_battery(&mut self, id: AgentId, pct: f64) {
        let mut held = self.route_jobs(id);
        if let Some(job) = self.fleet.get(id).and_then(|a| a.current_job) {
            if !held.contains(&job) {
                held.push(job);
            }
        }

        let mut released = Vec::new();
        for job in held {
            let in_flight = self
                .jobs
                .get(job)
                .is_some_and(|j| j.state.is_in_flight() && j.assigned_agent == Some(id));
            if in_flight && self.jobs.release(job).is_ok() {
                released.push(job);
                self.emit(SimEvent::JobReleased { job, agent: id });
            }
        }
        let _ = self.fleet.clear_job(id);
        let _ = self.fleet.set_payload(id, 0.0);

        let state = self.motion.store.entry(id);
        state.completed = true;
        state.action_started = None;

        warn!(agent = %id, battery_pct = pct, released = released.len(), "critical battery, route abandoned");
        self.emit(SimEvent::LowBattery { agent: id, battery_pct: pct, released });

        if !self.seek_charger(id) {
            let _ = self.fleet.set_status(id, AgentStatus::Idle);
            if let Some(pos) = self.fleet.get(id).map(|a| a.location.pos) {
                self.report_stuck(id, pos);
            }
        }
    }

    fn travel_to_charger(&mut self, id: AgentId, target: Location, slice: Duration) {
        let mut accrued = false;
        loop {
            let Some(agent) = self.fleet.get(id) else {
                return;
            };
            if agent.location == target {
                debug!(agent = %id, charger = %target, "docked");
                let _ = self.fleet.set_status(id, AgentStatus::Charging);
                self.motion.drop_credit(id);
                return;
            }
            let floor = match self.map.floor(target.floor) {
                Some(f) if agent.location.floor == target.floor => f,
                _ => {
                    self.motion.end_diversion(id);
                    self.report_stuck(id, target.pos);
                    return;
                }
            };

            match self.motion.step_toward(agent, floor, target.pos, slice, &mut accrued) {
                StepOutcome::Moved(pos) => self.apply_move(id, pos),
                StepOutcome::Arrived => {
                    let _ = self.fleet.set_status(id, AgentStatus::Charging);
                    return;
                }
                StepOutcome::OutOfCredit => {
                    let _ = self.fleet.set_status(id, AgentStatus::Moving);
                    return;
                }
                StepOutcome::Blocked => {
                    self.report_stuck(id, target.pos);
                    return;
                }
            }
        }
    }

    // ── Route following ───────────────────────────────────────────────────

    pub(crate) fn has_active_route(&self, id: AgentId) -> bool {
        self.plan.as_ref().is_some_and(|p| p.for_agent(id).is_some())
            && !self.motion.store.is_completed(id)
    }

    fn route_step(&self, id: AgentId, cursor: usize) -> Option<RouteStep> {
        self.plan.as_ref()?.for_agent(id)?.steps.get(cursor).cloned()
    }

    fn route_jobs(&self, id: AgentId) -> Vec<JobId> {
        self.plan
            .as_ref()
            .and_then(|p| p.for_agent(id))
            .map(|p| p.job_ids.clone())
            .unwrap_or_default()
    }

    fn follow_route(&mut self, id: AgentId, now: SimTime, slice: Duration) {
        let mut accrued = false;
        loop {
            let cursor = self.motion.store.entry(id).cursor;
            let Some(step) = self.route_step(id, cursor) else {
                self.finish_route(id);
                return;
            };
            let Some(agent) = self.fleet.get(id) else {
                return;
            };

            if agent.location.pos != step.pos {
                let Some(floor) = self.map.floor(agent.location.floor) else {
                    self.report_stuck(id, step.pos);
                    return;
                };
                match self.motion.step_toward(agent, floor, step.pos, slice, &mut accrued) {
                    StepOutcome::Moved(pos) => {
                        self.apply_move(id, pos);
                        continue;
                    }
                    StepOutcome::Arrived => {}
                    StepOutcome::OutOfCredit => {
                        let _ = self.fleet.set_status(id, AgentStatus::Moving);
                        return;
                    }
                    StepOutcome::Blocked => {
                        self.report_stuck(id, step.pos);
                        return;
                    }
                }
            }

            let Some(action) = step.action else {
                self.motion.store.entry(id).cursor += 1;
                continue;
            };

            let state = self.motion.store.entry(id);
            let started = *state.action_started.get_or_insert(now);
            state.move_credit = 0;
            let dwelling = match action {
                RouteAction::Pickup  => AgentStatus::PickingUp,
                RouteAction::Dropoff => AgentStatus::DroppingOff,
            };
            let _ = self.fleet.set_status(id, dwelling);
            if now.since(started) < step.dwell {
                return;
            }

            let state = self.motion.store.entry(id);
            state.action_started = None;
            state.cursor += 1;
            match action {
                RouteAction::Pickup  => self.complete_pickup(id, now),
                RouteAction::Dropoff => self.complete_dropoff(id, now),
            }
        }
    }

    fn finish_route(&mut self, id: AgentId) {
        let state = self.motion.store.entry(id);
        state.completed = true;
        state.move_credit = 0;
        let _ = self.fleet.set_status(id, AgentStatus::Idle);
        debug!(agent = %id, "route finished");
    }

    fn complete_pickup(&mut self, id: AgentId, now: SimTime) {
        let Some(job) = self
            .route_jobs(id)
            .into_iter()
            .find(|j| self.jobs.get(*j).is_some_and(|j| !j.progress.picked_up))
        else {
            return;
        };
        if let Err(e) = self.jobs.mark_picked_up(job, now) {
            warn!(agent = %id, %job, %e, "pickup not recorded");
            return;
        }
        let weight = self.jobs.get(job).map_or(0.0, |j| j.weight_kg());
        let payload = self.fleet.get(id).map_or(0.0, |a| a.payload) + weight;
        if let Err(e) = self.fleet.set_payload(id, payload) {
            warn!(agent = %id, %job, %e, "payload rejected");
        }
        debug!(agent = %id, %job, "picked up");
    }

    fn complete_dropoff(&mut self, id: AgentId, now: SimTime) {
        let route_jobs = self.route_jobs(id);
        let Some(job) = route_jobs.iter().copied().find(|j| {
            self.jobs
                .get(*j)
                .is_some_and(|j| j.progress.picked_up && j.progress.delivered_at.is_none())
        }) else {
            return;
        };
        let weight = self.jobs.get(job).map_or(0.0, |j| j.weight_kg());

        let late = match self.jobs.mark_delivered(job, now) {
            Ok(late) => late,
            Err(e) => {
                warn!(agent = %id, %job, %e, "delivery not recorded");
                return;
            }
        };
        self.metrics.record_delivery(late);
        if let Some(plan) = self.plan.as_mut() {
            if late {
                plan.metrics.delivered_late += 1;
            } else {
                plan.metrics.delivered_on_time += 1;
            }
        }
        info!(agent = %id, %job, at = %now, late, "job delivered");
        self.emit(SimEvent::JobCompleted { job, agent: id, at: now, late });

        let payload = self.fleet.get(id).map_or(0.0, |a| a.payload) - weight;
        let _ = self.fleet.set_payload(id, payload);

        let all_done = route_jobs
            .iter()
            .all(|j| self.jobs.get(*j).is_some_and(|j| j.state == JobState::Delivered));
        if all_done {
            let _ = self.fleet.clear_job(id);
            let _ = self.fleet.set_payload(id, 0.0);
        }
    }

    // ── Shared helpers ────────────────────────────────────────────────────

    /// Move one cell: position, battery, status and energy accounting.
    fn apply_move(&mut self, id: AgentId, pos: GridPos) {
        let Some(agent) = self.fleet.get(id) else {
            return;
        };
        let to = Location::new(agent.location.floor, pos);
        let loaded = agent.is_loaded();
        let drain = agent.drain_per_cell;

        let _ = self.fleet.set_position(id, to);
        let _ = self.fleet.drain_battery(id, drain);
        let _ = self.fleet.set_status(id, AgentStatus::Moving);

        self.metrics.record_move(loaded, &self.config);
        if let Some(plan) = self.plan.as_mut().filter(|p| p.for_agent(id).is_some()) {
            let wh = self.config.energy_wh_per_cell;
            plan.metrics.cells_moved += 1;
            if loaded {
                plan.metrics.cells_loaded += 1;
            }
            plan.metrics.energy_wh += wh;
            plan.metrics.co2_g += self.config.co2_for(wh);
        }
    }

    fn report_stuck(&mut self, id: AgentId, target: GridPos) {
        if !self.motion.mark_stuck(id) {
            return;
        }
        let Some(at) = self.fleet.get(id).map(|a| a.location) else {
            return;
        };
        warn!(agent = %id, %at, %target, "agent stuck");
        self.emit(SimEvent::AgentStuck { agent: id, at, target });
    }
}
