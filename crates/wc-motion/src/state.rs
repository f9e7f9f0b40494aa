//! Per-agent execution state.

use wc_core::{Location, SimTime};

/// Where a cart is within its current route.
///
/// Rebuilt from scratch on every new plan; only a pending charger diversion
/// carries over (see [`ExecStore::reset_for_plan`][crate::ExecStore::reset_for_plan]).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AgentExecutionState {
    /// Index of the next route step to satisfy.
    pub cursor:         usize,
    /// When the dwell at the current action step began.
    pub action_started: Option<SimTime>,
    /// Charger the cart is diverting to, if any.
    pub charge_target:  Option<Location>,
    /// The route has been consumed or abandoned.
    pub completed:      bool,
    /// Movement credit in milli-cells.
    pub move_credit:    u64,
    /// Set while the cart cannot find a path; cleared on the next move.  Used
    /// to report a stuck episode once instead of every tick.
    pub stuck:          bool,
}

impl AgentExecutionState {
    /// Clear dwell and route progress, keep the diversion target.
    pub fn restart_route(&mut self) {
        let target = self.charge_target.take();
        *self = Self { charge_target: target, ..Self::default() };
    }

    #[inline]
    pub fn is_diverting(&self) -> bool {
        self.charge_target.is_some()
    }
}
