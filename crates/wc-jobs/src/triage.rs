//! Triage bundles: one clinical case that needs several supplies at once.
//!
//! A case names a destination and a tier; each item line becomes its own job
//! sharing that destination, tier and deadline.  Lines may name their own
//! pickup point (e.g. blood from the lab, drugs from pharmacy).

use wc_core::{IdAllocator, Location, SimConfig, SimTime, TriageCaseId};

use crate::{ItemSpec, Job, Priority};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriageItem {
    pub item:   ItemSpec,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pickup: Option<Location>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriageCase {
    pub id:          TriageCaseId,
    pub label:       String,
    pub priority:    Priority,
    pub destination: Location,
    /// Seconds from expansion to deadline; `None` uses the tier default.
    #[cfg_attr(feature = "serde", serde(default))]
    pub deadline_offset_secs: Option<f64>,
    pub items:       Vec<TriageItem>,
}

impl TriageCase {
    /// Expand into one queued job per item line, created at `now`.
    ///
    /// Service times come from `config`'s defaults.  Ids are drawn from
    /// `ids` in line order.
    pub fn expand(&self, now: SimTime, ids: &mut IdAllocator, config: &SimConfig) -> Vec<Job> {
        let offset = self
            .deadline_offset_secs
            .unwrap_or_else(|| self.priority.default_deadline_secs());
        let deadline = SimTime::from_secs_f64(now.as_secs_f64() + offset);

        self.items
            .iter()
            .map(|line| {
                let mut job = Job::new(ids.next_job(), self.destination, line.item.clone(), self.priority, now)
                    .with_deadline(deadline)
                    .with_service_secs(
                        config.default_pickup_service_secs,
                        config.default_dropoff_service_secs,
                    );
                job.pickup = line.pickup;
                job.triage_case = Some(self.id);
                job
            })
            .collect()
    }

    pub fn total_weight_kg(&self) -> f64 {
        self.items.iter().map(|l| l.item.weight_kg).sum()
    }
}
