//! Effective priority score and queue ordering.
//!
//! ```text
//! score = rank × 1000
//!       + max(0, deadline − now)                      (seconds)
//!       − min(wait − S, 500)   if wait > S and tier ≠ Immediate
//! ```
//!
//! Lower scores are served first.  The tier term dominates: the starvation
//! discount is capped at 500, so it can reorder jobs near a tier boundary but
//! never lift a job past a tier whose deadlines are within 500 s of its own.

use wc_core::SimTime;

use crate::{Job, Priority};

/// Points per tier step.
pub const TIER_WEIGHT: f64 = 1_000.0;

/// Largest discount a starving job can earn.
pub const STARVATION_CAP: f64 = 500.0;

/// Discount earned by waiting longer than `threshold_secs`.
pub fn starvation_discount(job: &Job, now: SimTime, threshold_secs: f64) -> f64 {
    if job.priority == Priority::Immediate {
        return 0.0;
    }
    let wait = job.wait_secs(now);
    if wait > threshold_secs {
        (wait - threshold_secs).min(STARVATION_CAP)
    } else {
        0.0
    }
}

pub fn effective_score(job: &Job, now: SimTime, threshold_secs: f64) -> f64 {
    let slack = job.deadline.secs_after(now).max(0.0);
    job.priority.rank() as f64 * TIER_WEIGHT + slack - starvation_discount(job, now, threshold_secs)
}

/// Order `jobs` by ascending score.  The sort is stable, so equal scores keep
/// their input order.
pub fn sort_queue<'a, I>(jobs: I, now: SimTime, threshold_secs: f64) -> Vec<&'a Job>
where
    I: IntoIterator<Item = &'a Job>,
{
    let mut scored: Vec<(f64, &Job)> = jobs
        .into_iter()
        .map(|j| (effective_score(j, now, threshold_secs), j))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, j)| j).collect()
}
