//! Structural feasibility of a job.
//!
//! These are necessary conditions only: a job that passes may still go
//! unassigned for a while (no free agent, path closed by access rules), but a
//! job that fails can never be served and is marked infeasible.

use thiserror::Error;

use wc_core::{FloorId, GridPos, Location};
use wc_floor::HospitalMap;
use wc_fleet::Fleet;
use wc_jobs::Job;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InfeasibleReason {
    #[error("floor {0} does not exist")]
    FloorMissing(FloorId),

    #[error("dropoff cell {0} is not walkable")]
    DropoffBlocked(GridPos),

    #[error("pickup cell {0} is not walkable")]
    PickupBlocked(GridPos),

    #[error("no agent can carry {weight_kg} kg")]
    TooHeavy { weight_kg: f64 },
}

/// Check, in order: dropoff floor exists, dropoff walkable, some agent can
/// carry the weight, pickup (if any) walkable.
///
/// Walkability is agent-agnostic: restricted cells pass.
pub fn check_feasibility(job: &Job, fleet: &Fleet, map: &HospitalMap) -> Result<(), InfeasibleReason> {
    open_cell(map, job.dropoff, InfeasibleReason::DropoffBlocked)?;

    let can_carry = fleet.iter().any(|a| a.can_carry(job.weight_kg()));
    if !can_carry {
        return Err(InfeasibleReason::TooHeavy { weight_kg: job.weight_kg() });
    }

    if let Some(pickup) = job.pickup {
        open_cell(map, pickup, InfeasibleReason::PickupBlocked)?;
    }
    Ok(())
}

fn open_cell(
    map:     &HospitalMap,
    loc:     Location,
    blocked: fn(GridPos) -> InfeasibleReason,
) -> Result<(), InfeasibleReason> {
    let floor = map.floor(loc.floor).ok_or(InfeasibleReason::FloorMissing(loc.floor))?;
    if floor.is_walkable(loc.pos) {
        Ok(())
    } else {
        Err(blocked(loc.pos))
    }
}
