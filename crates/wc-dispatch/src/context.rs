//! Read-only inputs to one planning pass.

use wc_core::{SimConfig, SimTime};
use wc_floor::HospitalMap;
use wc_fleet::Fleet;
use wc_jobs::JobBoard;

/// Everything a [`Dispatcher`][crate::Dispatcher] may look at.
///
/// Built by the caller for each replan; all borrows end when the plan is
/// returned, so the caller is free to apply it right after.
pub struct DispatchContext<'a> {
    pub jobs:   &'a JobBoard,
    pub fleet:  &'a Fleet,
    pub map:    &'a HospitalMap,
    pub config: &'a SimConfig,
    pub now:    SimTime,
}

impl<'a> DispatchContext<'a> {
    #[inline]
    pub fn new(
        jobs:   &'a JobBoard,
        fleet:  &'a Fleet,
        map:    &'a HospitalMap,
        config: &'a SimConfig,
        now:    SimTime,
    ) -> Self {
        Self { jobs, fleet, map, config, now }
    }
}
