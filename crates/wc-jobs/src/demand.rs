//! Seeded synthetic demand.
//!
//! Produces a deterministic stream of jobs between supply points and drop
//! cells.  Two generators built from the same profile and seed yield the same
//! jobs when polled with the same time steps.

use std::time::Duration;

use tracing::trace;

use wc_core::{IdAllocator, Location, SimConfig, SimRng, SimTime};

use crate::{ItemSpec, Job, Priority};

/// Shape of the generated stream.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DemandProfile {
    /// Pickup points.  Empty means every job is loaded at the cart.
    pub sources:       Vec<Location>,
    pub destinations:  Vec<Location>,
    pub items:         Vec<ItemSpec>,
    /// Mean arrivals per simulated hour.
    pub jobs_per_hour: f64,
    /// Relative weight of each tier, `Immediate` first.
    pub tier_weights:  [f64; 5],
}

impl DemandProfile {
    pub fn new(sources: Vec<Location>, destinations: Vec<Location>, items: Vec<ItemSpec>) -> Self {
        Self {
            sources,
            destinations,
            items,
            jobs_per_hour: 30.0,
            tier_weights: [0.05, 0.10, 0.20, 0.25, 0.40],
        }
    }

    pub fn rate(mut self, jobs_per_hour: f64) -> Self {
        self.jobs_per_hour = jobs_per_hour.max(0.0);
        self
    }
}

#[derive(Clone, Debug)]
pub struct DemandGenerator {
    profile: DemandProfile,
    rng:     SimRng,
}

impl DemandGenerator {
    pub fn new(profile: DemandProfile, seed: u64) -> Self {
        Self { profile, rng: SimRng::new(seed) }
    }

    pub fn profile(&self) -> &DemandProfile {
        &self.profile
    }

    /// Jobs arriving during one step of length `dt` ending at `now`.
    ///
    /// Arrivals are approximated per step: the whole part of the expected
    /// count is emitted outright and the fractional part as a Bernoulli draw.
    pub fn poll(
        &mut self,
        now:    SimTime,
        dt:     Duration,
        ids:    &mut IdAllocator,
        config: &SimConfig,
    ) -> Vec<Job> {
        let expected = self.profile.jobs_per_hour * dt.as_secs_f64() / 3_600.0;
        let count = self.rng.arrivals(expected);
        self.batch(count, now, ids, config)
    }

    /// Exactly `count` jobs created at `now`.
    pub fn batch(
        &mut self,
        count:  usize,
        now:    SimTime,
        ids:    &mut IdAllocator,
        config: &SimConfig,
    ) -> Vec<Job> {
        (0..count).filter_map(|_| self.one(now, ids, config)).collect()
    }

    fn one(&mut self, now: SimTime, ids: &mut IdAllocator, config: &SimConfig) -> Option<Job> {
        let dropoff = *self.rng.pick(&self.profile.destinations)?;
        let item = self.rng.pick(&self.profile.items)?.clone();
        let pickup = self.rng.pick(&self.profile.sources).copied();
        let priority = self.pick_tier();

        let job = Job::new(ids.next_job(), dropoff, item, priority, now).with_service_secs(
            config.default_pickup_service_secs,
            config.default_dropoff_service_secs,
        );
        trace!(job = %job.id, %priority, dropoff = %dropoff.pos, "generated job");
        Some(match pickup {
            Some(p) => job.with_pickup(p),
            None => job,
        })
    }

    fn pick_tier(&mut self) -> Priority {
        self.rng
            .weighted_index(&self.profile.tier_weights)
            .and_then(|i| Priority::ALL.get(i).copied())
            .unwrap_or(Priority::NonUrgent)
    }
}
