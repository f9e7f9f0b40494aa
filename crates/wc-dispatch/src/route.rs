//! Route construction: two grid paths become one timed `AgentPlan`.

use std::time::Duration;

use wc_core::{SimConfig, SimTime};
use wc_floor::GridPath;
use wc_fleet::Agent;
use wc_jobs::Job;

use crate::{AgentPlan, DispatchError, DispatchResult, RouteAction, RouteStep};

/// Time to cross one cell at `speed` cells/s.  `None` for a stationary
/// cart or a speed whose crossing time is not a representable `Duration`.
pub fn step_duration(speed: f64) -> Option<Duration> {
    if !speed.is_finite() || speed <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / speed).ok()
}

/// Build the route for `agent` serving `job`.
///
/// `pickup_leg` runs from the agent to the pickup cell (a single cell when
/// the agent is already there or the job has no pickup point);
/// `dropoff_leg` runs from the pickup cell to the dropoff.  Each moved cell
/// advances the expected clock by `1 / speed` seconds; each action advances
/// it by its dwell.  The dropoff leg's first cell is the pickup cell and is
/// not repeated.
///
/// Fails when the cart's speed gives no usable step time.
pub fn build_agent_plan(
    agent:       &Agent,
    job:         &Job,
    pickup_leg:  &GridPath,
    dropoff_leg: &GridPath,
    now:         SimTime,
    config:      &SimConfig,
) -> DispatchResult<AgentPlan> {
    let step_time = step_duration(agent.speed)
        .ok_or(DispatchError::UntimedRoute { agent: agent.id, speed: agent.speed })?;

    let mut steps = Vec::with_capacity(pickup_leg.cells.len() + dropoff_leg.cells.len() + 1);
    let mut eta = now;

    for (i, &pos) in pickup_leg.cells.iter().enumerate() {
        if i > 0 {
            eta = eta + step_time;
        }
        steps.push(RouteStep::travel(pos, eta));
    }
    let pickup_pos = pickup_leg.goal().unwrap_or(agent.location.pos);
    steps.push(RouteStep::action(pickup_pos, eta, RouteAction::Pickup, job.pickup_service()));
    eta = eta + job.pickup_service();

    for &pos in dropoff_leg.cells.iter().skip(1) {
        eta = eta + step_time;
        steps.push(RouteStep::travel(pos, eta));
    }
    let dropoff_pos = dropoff_leg.goal().unwrap_or(pickup_pos);
    steps.push(RouteStep::action(dropoff_pos, eta, RouteAction::Dropoff, job.dropoff_service()));

    let cells = (pickup_leg.len_steps() + dropoff_leg.len_steps()) as f64;
    let energy_wh = cells * config.energy_wh_per_cell;

    Ok(AgentPlan {
        agent:   agent.id,
        floor:   job.dropoff.floor,
        steps,
        job_ids: vec![job.id],
        energy_wh,
        co2_g:   config.co2_for(energy_wh),
    })
}
