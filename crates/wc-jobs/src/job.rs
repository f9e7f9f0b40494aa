//! The delivery job record and its enums.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use wc_core::{AgentId, JobId, Location, SimTime, TriageCaseId};

use crate::{JobError, JobResult};

// ── Priority ──────────────────────────────────────────────────────────────────

/// Five ordered urgency tiers, most urgent first.
///
/// The derived `Ord` follows declaration order, so `Immediate < NonUrgent`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Priority {
    Immediate,
    Emergency,
    Urgent,
    SemiUrgent,
    NonUrgent,
}

impl Priority {
    pub const ALL: [Priority; 5] = [
        Priority::Immediate,
        Priority::Emergency,
        Priority::Urgent,
        Priority::SemiUrgent,
        Priority::NonUrgent,
    ];

    /// 0 for `Immediate` through 4 for `NonUrgent`.
    #[inline]
    pub fn rank(self) -> u32 {
        self as u32
    }

    /// Tiers served preferentially by the urgent pool.
    #[inline]
    pub fn is_urgent(self) -> bool {
        matches!(self, Priority::Immediate | Priority::Emergency)
    }

    /// Deadline offset used when a job or triage case does not give one.
    pub fn default_deadline_secs(self) -> f64 {
        match self {
            Priority::Immediate  => 120.0,
            Priority::Emergency  => 300.0,
            Priority::Urgent     => 900.0,
            Priority::SemiUrgent => 1_800.0,
            Priority::NonUrgent  => 3_600.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Immediate  => "IMMEDIATE",
            Priority::Emergency  => "EMERGENCY",
            Priority::Urgent     => "URGENT",
            Priority::SemiUrgent => "SEMI_URGENT",
            Priority::NonUrgent  => "NON_URGENT",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = JobError;

    /// Case-insensitive; accepts `-` or `_` as the separator.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_uppercase().replace('-', "_");
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == norm)
            .ok_or_else(|| JobError::Parse(format!("unknown priority {s:?}")))
    }
}

// ── JobState ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum JobState {
    #[default]
    Queued,
    Assigned,
    InProgress,
    Delivered,
    Delayed,
    Infeasible,
}

impl JobState {
    /// Edges of the lifecycle graph (see crate docs).  Self-loops are not
    /// transitions.
    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Queued, Assigned)
                | (Queued, Infeasible)
                | (Assigned, InProgress)
                | (Assigned, Delayed)
                | (Assigned, Queued)
                | (InProgress, Delivered)
                | (InProgress, Delayed)
                | (InProgress, Queued)
                | (Delayed, Delivered)
                | (Delayed, Queued)
        )
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Delivered | JobState::Infeasible)
    }

    /// Held by an agent and not yet finished.
    #[inline]
    pub fn is_in_flight(self) -> bool {
        matches!(self, JobState::Assigned | JobState::InProgress | JobState::Delayed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Queued     => "QUEUED",
            JobState::Assigned   => "ASSIGNED",
            JobState::InProgress => "IN_PROGRESS",
            JobState::Delivered  => "DELIVERED",
            JobState::Delayed    => "DELAYED",
            JobState::Infeasible => "INFEASIBLE",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ItemSpec / JobProgress ────────────────────────────────────────────────────

/// What is being carried.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemSpec {
    pub item_type: String,
    pub quantity:  u32,
    /// Total weight of the line, not per unit.
    pub weight_kg: f64,
}

impl ItemSpec {
    pub fn new(item_type: impl Into<String>, quantity: u32, weight_kg: f64) -> Self {
        Self { item_type: item_type.into(), quantity, weight_kg }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JobProgress {
    pub picked_up:    bool,
    pub picked_up_at: Option<SimTime>,
    pub delivered_at: Option<SimTime>,
}

// ── Service times ─────────────────────────────────────────────────────────────

/// Longest dwell accepted at either end of a job (one day).
pub const MAX_SERVICE_SECS: f64 = 86_400.0;

/// `Ok` for a finite dwell in `[0, MAX_SERVICE_SECS]`.
pub fn check_service_secs(secs: f64) -> Result<(), String> {
    if !secs.is_finite() {
        return Err(format!("{secs} s is not a finite duration"));
    }
    if !(0.0..=MAX_SERVICE_SECS).contains(&secs) {
        return Err(format!("{secs} s lies outside [0, {MAX_SERVICE_SECS}]"));
    }
    Ok(())
}

fn clamp_service(secs: f64) -> f64 {
    if secs.is_nan() { 0.0 } else { secs.clamp(0.0, MAX_SERVICE_SECS) }
}

fn service_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(clamp_service(secs)).unwrap_or(Duration::ZERO)
}

// ── Job ───────────────────────────────────────────────────────────────────────

/// One delivery request.
///
/// A job without a pickup leg is loaded wherever the assigned cart happens
/// to be; its route starts with a pickup dwell at the cart's own cell.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Job {
    pub id:                   JobId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pickup:               Option<Location>,
    pub dropoff:              Location,
    pub item:                 ItemSpec,
    pub priority:             Priority,
    pub created_at:           SimTime,
    pub deadline:             SimTime,
    #[cfg_attr(feature = "serde", serde(default))]
    pub state:                JobState,
    #[cfg_attr(feature = "serde", serde(default))]
    pub assigned_agent:       Option<AgentId>,
    pub pickup_service_secs:  f64,
    pub dropoff_service_secs: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub progress:             JobProgress,
    /// Set when the job came from a triage bundle.
    #[cfg_attr(feature = "serde", serde(default))]
    pub triage_case:          Option<TriageCaseId>,
}

impl Job {
    /// A queued job with the tier's default deadline and 30 s service times.
    pub fn new(
        id:         JobId,
        dropoff:    Location,
        item:       ItemSpec,
        priority:   Priority,
        created_at: SimTime,
    ) -> Self {
        Self {
            id,
            pickup: None,
            dropoff,
            item,
            priority,
            created_at,
            deadline: SimTime::from_secs_f64(
                created_at.as_secs_f64() + priority.default_deadline_secs(),
            ),
            state: JobState::Queued,
            assigned_agent: None,
            pickup_service_secs: 30.0,
            dropoff_service_secs: 30.0,
            progress: JobProgress::default(),
            triage_case: None,
        }
    }

    pub fn with_pickup(mut self, pickup: Location) -> Self {
        self.pickup = Some(pickup);
        self
    }

    pub fn with_deadline(mut self, deadline: SimTime) -> Self {
        self.deadline = deadline;
        self
    }

    /// Dwell times at the two ends, clamped to `[0, MAX_SERVICE_SECS]`;
    /// NaN counts as zero.  Loaders reject such values before calling this.
    pub fn with_service_secs(mut self, pickup: f64, dropoff: f64) -> Self {
        self.pickup_service_secs = clamp_service(pickup);
        self.dropoff_service_secs = clamp_service(dropoff);
        self
    }

    /// Rejects figures the planner cannot use: a negative or non-finite
    /// weight, or service times outside `[0, MAX_SERVICE_SECS]`.
    pub fn validate(&self) -> JobResult<()> {
        let reject = |reason: String| Err(JobError::InvalidJob { job: self.id, reason });
        if !self.item.weight_kg.is_finite() || self.item.weight_kg < 0.0 {
            return reject(format!("weight {} kg is not a non-negative number", self.item.weight_kg));
        }
        for (leg, secs) in [("pickup", self.pickup_service_secs), ("dropoff", self.dropoff_service_secs)] {
            if let Err(reason) = check_service_secs(secs) {
                return reject(format!("{leg} service: {reason}"));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn weight_kg(&self) -> f64 {
        self.item.weight_kg
    }

    pub fn pickup_service(&self) -> Duration {
        service_duration(self.pickup_service_secs)
    }

    pub fn dropoff_service(&self) -> Duration {
        service_duration(self.dropoff_service_secs)
    }

    /// Seconds waited since creation at `now` (zero before creation).
    #[inline]
    pub fn wait_secs(&self, now: SimTime) -> f64 {
        now.secs_after(self.created_at).max(0.0)
    }

    /// `true` once delivered after the deadline.  Undelivered jobs are never
    /// "late" by this test; see [`Job::is_overdue`].
    pub fn was_late(&self) -> bool {
        self.progress.delivered_at.is_some_and(|t| t > self.deadline)
    }

    /// Deadline has passed and the job is still not delivered.
    pub fn is_overdue(&self, now: SimTime) -> bool {
        !self.state.is_terminal() && now > self.deadline
    }
}
