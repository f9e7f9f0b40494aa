//! `MotionEngine`: moves carts one cell at a time.

use std::time::Duration;

use tracing::debug;

use wc_core::{AgentId, GridPos, Location};
use wc_floor::{Floor, GridPath, HospitalMap, Pathfinder, StagingArea, nearest_reachable};
use wc_fleet::Agent;

use crate::{ExecStore, MotionError, MotionResult};

/// Credit spent by one cell of movement, in milli-cells.
pub const CELL_CREDIT: u64 = 1_000;

/// Result of one [`MotionEngine::step_toward`] call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The cart already stands on the target.
    Arrived,
    /// The cart moved one cell to this position.
    Moved(GridPos),
    /// Not enough credit left this tick.
    OutOfCredit,
    /// No path to the target exists for this cart right now.
    Blocked,
}

/// Stepping and credit bookkeeping for the whole fleet.
///
/// Generic over the pathfinder so tests and alternative search strategies can
/// be swapped in without touching the executor.
pub struct MotionEngine<P: Pathfinder> {
    pub pathfinder: P,
    pub store:      ExecStore,
}

impl<P: Pathfinder> MotionEngine<P> {
    pub fn new(pathfinder: P) -> Self {
        Self { pathfinder, store: ExecStore::new() }
    }

    /// Credit earned in one slice at `speed` cells per second.
    #[inline]
    pub fn credit_for(speed: f64, slice: Duration) -> u64 {
        if speed <= 0.0 {
            return 0;
        }
        (speed * slice.as_millis() as f64).round() as u64
    }

    /// Forget any unspent credit.  Called whenever a cart is not trying to
    /// move, so waiting never turns into a burst of movement later.
    pub fn drop_credit(&mut self, agent: AgentId) {
        if let Some(state) = self.store.get_mut(agent) {
            state.move_credit = 0;
        }
    }

    /// Point `agent` at its nearest reachable charger and remember it as the
    /// diversion target.
    pub fn divert_to_charger(&mut self, agent: &Agent, map: &HospitalMap) -> MotionResult<Location> {
        map.require_floor(agent.location.floor)?;
        let (target, path) = self
            .nearest_charger(agent, map)
            .ok_or(MotionError::NoCharger { agent: agent.id, floor: agent.location.floor })?;
        debug!(agent = %agent.id, charger = %target, cells = path.len_steps(), "diverting to charger");
        let state = self.store.entry(agent.id);
        state.charge_target = Some(target);
        state.move_credit = 0;
        Ok(target)
    }

    /// Drop the diversion target once the cart has docked.
    pub fn end_diversion(&mut self, agent: AgentId) {
        if let Some(state) = self.store.get_mut(agent) {
            state.charge_target = None;
        }
    }

    /// Try to move `agent` one cell toward `target`.
    ///
    /// `accrued` tracks whether this tick's credit has already been granted;
    /// the first call that needs credit grants it, later calls in the same
    /// tick only spend what is left.  A cart next to the target steps straight
    /// in; otherwise the first cell of a fresh path is taken.
    pub fn step_toward(
        &mut self,
        agent:   &Agent,
        floor:   &Floor,
        target:  GridPos,
        slice:   Duration,
        accrued: &mut bool,
    ) -> StepOutcome {
        let from = agent.location.pos;
        if from == target {
            return StepOutcome::Arrived;
        }

        let state = self.store.entry(agent.id);
        if !*accrued {
            state.move_credit += Self::credit_for(agent.speed, slice);
            *accrued = true;
        }
        if state.move_credit < CELL_CREDIT {
            return StepOutcome::OutOfCredit;
        }

        let access = Some(&agent.access);
        let next = if from.is_adjacent(target) && floor.is_traversable(target, access) {
            Some(target)
        } else {
            self.pathfinder
                .find_path(floor, from, target, access)
                .ok()
                .and_then(|p| p.next_step())
        };

        let state = self.store.entry(agent.id);
        match next {
            Some(pos) => {
                state.move_credit -= CELL_CREDIT;
                state.stuck = false;
                StepOutcome::Moved(pos)
            }
            None => {
                debug!(agent = %agent.id, %from, %target, "no path this tick");
                state.move_credit = 0;
                StepOutcome::Blocked
            }
        }
    }

    /// The charger with the shortest reachable path from the cart, on its
    /// own floor.
    pub fn nearest_charger(&self, agent: &Agent, map: &HospitalMap) -> Option<(Location, GridPath)> {
        let floor = map.floor(agent.location.floor)?;
        nearest_reachable(
            &self.pathfinder,
            floor,
            agent.location.pos,
            map.chargers_on(agent.location.floor).map(|c| (c.location, c.location.pos)),
            Some(&agent.access),
        )
    }

    /// The staging area with the shortest reachable path from the cart, on
    /// its own floor.  Ties keep declaration order.
    pub fn nearest_staging<'m>(
        &self,
        agent: &Agent,
        map:   &'m HospitalMap,
    ) -> Option<(&'m StagingArea, GridPath)> {
        let floor = map.floor(agent.location.floor)?;
        nearest_reachable(
            &self.pathfinder,
            floor,
            agent.location.pos,
            map.staging_on(agent.location.floor).map(|s| (s, s.location.pos)),
            Some(&agent.access),
        )
    }

    /// Record a blocked step.  Returns `true` the first time in a stuck
    /// episode, so the caller reports it once.
    pub fn mark_stuck(&mut self, agent: AgentId) -> bool {
        let state = self.store.entry(agent);
        let first = !state.stuck;
        state.stuck = true;
        first
    }
}
