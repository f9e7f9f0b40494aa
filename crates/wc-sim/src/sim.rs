//! The `Sim` struct, its tick loop and job intake.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{debug, warn};

use wc_core::{AgentId, IdAllocator, JobId, Location, SimClock, SimConfig, SimTime, Tick};
use wc_dispatch::{Dispatcher, Plan, check_feasibility};
use wc_floor::{HospitalMap, Pathfinder};
use wc_fleet::Fleet;
use wc_jobs::{DemandGenerator, ItemSpec, Job, JobBoard, JobState, Priority, TriageCase};
use wc_motion::MotionEngine;

use crate::{RunState, SessionMetrics, SimError, SimEvent, SimObserver, SimResult};

#[cfg(feature = "fx-hash")]
pub(crate) type IdSet = rustc_hash::FxHashSet<AgentId>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type IdSet = std::collections::HashSet<AgentId>;

// ── Job requests ──────────────────────────────────────────────────────────────

/// A job as submitted from outside, before an id is allocated.
#[derive(Clone, Debug, PartialEq)]
pub struct JobRequest {
    pub pickup:        Option<Location>,
    pub dropoff:       Location,
    pub item:          ItemSpec,
    pub priority:      Priority,
    /// Seconds from submission to deadline; `None` uses the tier default.
    pub deadline_secs: Option<f64>,
    /// `(pickup, dropoff)` service seconds; `None` uses the config defaults.
    pub service_secs:  Option<(f64, f64)>,
}

impl JobRequest {
    pub fn new(dropoff: Location, item: ItemSpec, priority: Priority) -> Self {
        Self { pickup: None, dropoff, item, priority, deadline_secs: None, service_secs: None }
    }

    pub fn pickup(mut self, at: Location) -> Self {
        self.pickup = Some(at);
        self
    }

    pub fn deadline_in(mut self, secs: f64) -> Self {
        self.deadline_secs = Some(secs);
        self
    }

    pub fn service(mut self, pickup_secs: f64, dropoff_secs: f64) -> Self {
        self.service_secs = Some((pickup_secs, dropoff_secs));
        self
    }

    fn into_job(self, id: JobId, now: SimTime, config: &SimConfig) -> Job {
        let (pickup_secs, dropoff_secs) = self.service_secs.unwrap_or((
            config.default_pickup_service_secs,
            config.default_dropoff_service_secs,
        ));
        let mut job = Job::new(id, self.dropoff, self.item, self.priority, now)
            .with_service_secs(pickup_secs, dropoff_secs);
        if let Some(secs) = self.deadline_secs {
            job = job.with_deadline(SimTime::from_secs_f64(now.as_secs_f64() + secs));
        }
        job.pickup = self.pickup;
        job
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// State captured at build time and restored by [`Sim::reset`].
#[derive(Clone)]
pub(crate) struct Snapshot {
    pub fleet:   Fleet,
    pub jobs:    JobBoard,
    pub ids:     IdAllocator,
    pub demand:  Option<DemandGenerator>,
    pub pending: Vec<SimEvent>,
}

/// Bookkeeping for the replan trigger.
#[derive(Clone, Debug, Default)]
pub(crate) struct ReplanState {
    pub last_at:     Option<SimTime>,
    pub last_queued: BTreeSet<JobId>,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The simulation context.
///
/// `Sim<D, P>` owns every piece of mutable state (roster, job board, current
/// plan, execution cursors, id allocator) and drives the tick loop:
///
/// 1. **Clock**: advance by one slice (`base_slice × speed`).
/// 2. **Demand**: poll the generator, if any; new jobs pass feasibility.
/// 3. **Agents**: advance each agent in roster order through the executor
///    rules (charging, critical battery, charger diversion, idle, route).
/// 4. **Deadlines**: in-flight jobs past their deadline become `Delayed`.
/// 5. **Replan**: drop a finished plan and dispatch when the trigger fires.
///
/// Nothing inside a tick returns an error; failures surface as job states
/// and [`SimEvent`]s.  Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<D: Dispatcher, P: Pathfinder> {
    pub config:     SimConfig,
    pub clock:      SimClock,
    pub ids:        IdAllocator,
    pub map:        HospitalMap,
    pub fleet:      Fleet,
    pub jobs:       JobBoard,
    /// The plan being executed; `None` between plans.
    pub plan:       Option<Plan>,
    pub motion:     MotionEngine<P>,
    pub dispatcher: D,
    pub metrics:    SessionMetrics,
    /// Triage templates that can be activated by id.
    pub triage:     Vec<TriageCase>,
    pub demand:     Option<DemandGenerator>,

    pub(crate) replan:      ReplanState,
    pub(crate) run_state:   RunState,
    /// Agents already reported at critical battery, until they recharge.
    pub(crate) low_battery: IdSet,
    pub(crate) pending:     Vec<SimEvent>,
    pub(crate) initial:     Snapshot,
}

impl<D: Dispatcher, P: Pathfinder> Sim<D, P> {
    #[inline]
    pub fn now(&self) -> SimTime {
        self.clock.now
    }

    #[inline]
    pub fn tick(&self) -> Tick {
        self.clock.current_tick
    }

    // ── Tick loop ─────────────────────────────────────────────────────────

    /// Advance one tick and return the events it produced (including any
    /// raised by submissions since the previous tick).
    pub fn step(&mut self) -> Vec<SimEvent> {
        self.clock.advance();
        let now = self.clock.now;
        let slice = self.clock.slice();

        self.poll_demand(now, slice);

        let roster: Vec<AgentId> = self.fleet.ids().collect();
        for id in roster {
            self.advance_agent(id, now, slice);
        }

        self.track_deadlines(now);
        self.replan_if_due(now);

        std::mem::take(&mut self.pending)
    }

    /// [`step`](Self::step), reporting to `observer`.  Returns the number of
    /// events.
    pub fn step_with<O: SimObserver>(&mut self, observer: &mut O) -> usize {
        let tick = self.clock.current_tick + 1;
        observer.on_tick_start(tick);

        let events = self.step();
        let now = self.clock.now;
        for event in &events {
            observer.on_event(tick, now, event);
        }
        observer.on_tick_end(tick, events.len());

        if tick.every(self.config.metrics_interval_ticks) {
            observer.on_metrics(tick, now, &self.metrics);
        }
        if tick.every(self.config.snapshot_interval_ticks) {
            observer.on_snapshot(tick, now, &self.fleet, &self.map);
        }
        events.len()
    }

    // ── Job intake ────────────────────────────────────────────────────────

    /// Allocate an id for `request`, check feasibility and queue it.
    ///
    /// An infeasible job is still recorded, in state `Infeasible`, and a
    /// [`SimEvent::JobInfeasible`] is delivered with the next tick's events.
    pub fn submit_job(&mut self, request: JobRequest) -> SimResult<JobId> {
        let id = self.ids.next_job();
        let job = request.into_job(id, self.clock.now, &self.config);
        self.enqueue(job)?;
        Ok(id)
    }

    /// Expand the triage case `case` at the current time and submit its jobs.
    pub fn activate_triage(&mut self, case: wc_core::TriageCaseId) -> SimResult<Vec<JobId>> {
        let template = self
            .triage
            .iter()
            .find(|c| c.id == case)
            .ok_or(SimError::UnknownTriageCase(case))?;
        let jobs = template.expand(self.clock.now, &mut self.ids, &self.config);
        debug!(%case, jobs = jobs.len(), "triage case activated");

        let mut ids = Vec::with_capacity(jobs.len());
        for job in jobs {
            ids.push(job.id);
            self.enqueue(job)?;
        }
        Ok(ids)
    }

    /// Insert `job` into the board.  Queued jobs are checked for feasibility
    /// first; anything else is taken as-is.
    pub(crate) fn enqueue(&mut self, job: Job) -> SimResult<()> {
        let id = job.id;
        let verdict = match job.state {
            JobState::Queued => check_feasibility(&job, &self.fleet, &self.map),
            _ => Ok(()),
        };
        self.ids.observe_job(id);
        self.jobs.insert(job)?;

        match verdict {
            Ok(()) => debug!(job = %id, "job queued"),
            Err(reason) => {
                warn!(job = %id, %reason, "job infeasible");
                self.jobs.mark_infeasible(id)?;
                self.metrics.infeasible += 1;
                self.pending.push(SimEvent::JobInfeasible { job: id, reason: reason.to_string() });
            }
        }
        Ok(())
    }

    fn poll_demand(&mut self, now: SimTime, slice: Duration) {
        let Some(generator) = self.demand.as_mut() else {
            return;
        };
        let jobs = generator.poll(now, slice, &mut self.ids, &self.config);
        for job in jobs {
            let id = job.id;
            if let Err(e) = self.enqueue(job) {
                warn!(job = %id, %e, "generated job rejected");
            }
        }
    }

    // ── Deadlines ─────────────────────────────────────────────────────────

    fn track_deadlines(&mut self, now: SimTime) {
        let overdue: Vec<(JobId, Option<AgentId>)> = self
            .jobs
            .iter()
            .filter(|j| matches!(j.state, JobState::Assigned | JobState::InProgress))
            .filter(|j| now > j.deadline)
            .map(|j| (j.id, j.assigned_agent))
            .collect();

        for (job, agent) in overdue {
            if self.jobs.set_state(job, JobState::Delayed).is_ok() {
                debug!(%job, "deadline passed in flight");
                self.pending.push(SimEvent::JobDelayed { job, agent });
            }
        }
    }

    #[inline]
    pub(crate) fn emit(&mut self, event: SimEvent) {
        self.pending.push(event);
    }
}
