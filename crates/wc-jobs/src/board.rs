//! `JobBoard`: the job store and its point mutators.

use std::collections::BTreeSet;

use wc_core::{AgentId, JobId, SimTime};

use crate::{Job, JobError, JobProgress, JobResult, JobState, Priority};

/// All jobs in submission order.
///
/// Every state change goes through [`JobBoard::set_state`] (directly or via
/// the helpers), which rejects edges missing from the lifecycle graph.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct JobBoard {
    jobs: Vec<Job>,
}

impl JobBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, job: Job) -> JobResult<()> {
        if self.get(job.id).is_some() {
            return Err(JobError::DuplicateJob(job.id));
        }
        job.validate()?;
        self.jobs.push(job);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn as_slice(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn require(&self, id: JobId) -> JobResult<&Job> {
        self.get(id).ok_or(JobError::JobNotFound(id))
    }

    fn job_mut(&mut self, id: JobId) -> JobResult<&mut Job> {
        self.jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(JobError::JobNotFound(id))
    }

    /// Jobs currently in `state`, in submission order.
    pub fn in_state(&self, state: JobState) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(move |j| j.state == state)
    }

    pub fn has_queued(&self) -> bool {
        self.jobs.iter().any(|j| j.state == JobState::Queued)
    }

    /// Ids of every queued job, ordered.  Compared between replans to detect
    /// a changed queue.
    pub fn queued_ids(&self) -> BTreeSet<JobId> {
        self.in_state(JobState::Queued).map(|j| j.id).collect()
    }

    // ── Point mutators ────────────────────────────────────────────────────

    /// Move a job along one lifecycle edge.  Setting the current state again
    /// is accepted as a no-op.
    pub fn set_state(&mut self, id: JobId, next: JobState) -> JobResult<()> {
        let job = self.job_mut(id)?;
        if job.state == next {
            return Ok(());
        }
        if !job.state.can_transition_to(next) {
            return Err(JobError::InvalidTransition { job: id, from: job.state, to: next });
        }
        job.state = next;
        Ok(())
    }

    /// `Queued → Assigned` and record the agent.
    pub fn assign(&mut self, id: JobId, agent: AgentId) -> JobResult<()> {
        self.set_state(id, JobState::Assigned)?;
        self.job_mut(id)?.assigned_agent = Some(agent);
        Ok(())
    }

    /// Record the pickup.  An `Assigned` job becomes `InProgress`; a
    /// `Delayed` one stays delayed.
    pub fn mark_picked_up(&mut self, id: JobId, at: SimTime) -> JobResult<()> {
        if self.require(id)?.state == JobState::Assigned {
            self.set_state(id, JobState::InProgress)?;
        }
        let job = self.job_mut(id)?;
        job.progress.picked_up = true;
        job.progress.picked_up_at = Some(at);
        Ok(())
    }

    /// Record delivery and move to `Delivered`.  Returns `true` when the
    /// delivery missed the deadline.
    pub fn mark_delivered(&mut self, id: JobId, at: SimTime) -> JobResult<bool> {
        self.set_state(id, JobState::Delivered)?;
        let job = self.job_mut(id)?;
        job.progress.delivered_at = Some(at);
        Ok(job.was_late())
    }

    pub fn mark_infeasible(&mut self, id: JobId) -> JobResult<()> {
        self.set_state(id, JobState::Infeasible)
    }

    pub fn set_priority(&mut self, id: JobId, priority: Priority) -> JobResult<()> {
        self.job_mut(id)?.priority = priority;
        Ok(())
    }

    /// Return an in-flight job to the queue: unassigned, no progress.
    ///
    /// Items already picked up are not restored to the pickup point; the
    /// job simply starts over.
    pub fn release(&mut self, id: JobId) -> JobResult<()> {
        self.set_state(id, JobState::Queued)?;
        let job = self.job_mut(id)?;
        job.assigned_agent = None;
        job.progress = JobProgress::default();
        Ok(())
    }
}

impl FromIterator<Job> for JobBoard {
    /// Later duplicates of an id, and jobs failing [`Job::validate`], are
    /// dropped.
    fn from_iter<I: IntoIterator<Item = Job>>(iter: I) -> Self {
        let mut board = JobBoard::new();
        for job in iter {
            let _ = board.insert(job);
        }
        board
    }
}
