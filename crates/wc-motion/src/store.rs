//! The `ExecStore`: sparse execution state keyed by agent.

use wc_core::AgentId;

use crate::AgentExecutionState;

#[cfg(feature = "fx-hash")]
type StateMap = rustc_hash::FxHashMap<AgentId, AgentExecutionState>;
#[cfg(not(feature = "fx-hash"))]
type StateMap = std::collections::HashMap<AgentId, AgentExecutionState>;

/// Execution state for every agent the executor has touched.
///
/// Agents with no entry behave as [`AgentExecutionState::default`].
#[derive(Clone, Debug, Default)]
pub struct ExecStore {
    states: StateMap,
}

impl ExecStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, agent: AgentId) -> Option<&AgentExecutionState> {
        self.states.get(&agent)
    }

    pub fn get_mut(&mut self, agent: AgentId) -> Option<&mut AgentExecutionState> {
        self.states.get_mut(&agent)
    }

    /// Mutable state for `agent`, created on first use.
    pub fn entry(&mut self, agent: AgentId) -> &mut AgentExecutionState {
        self.states.entry(agent).or_default()
    }

    pub fn is_completed(&self, agent: AgentId) -> bool {
        self.get(agent).is_some_and(|s| s.completed)
    }

    pub fn is_diverting(&self, agent: AgentId) -> bool {
        self.get(agent).is_some_and(AgentExecutionState::is_diverting)
    }

    /// Discard every cursor for a fresh plan.  Charger diversions survive:
    /// an agent on its way to charge is not part of any plan.
    pub fn reset_for_plan(&mut self) {
        self.states.retain(|_, s| s.is_diverting());
        for s in self.states.values_mut() {
            s.restart_route();
        }
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
