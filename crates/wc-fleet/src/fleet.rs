//! Roster storage and the point mutators the core writes through.

use wc_core::{AgentId, JobId, Location};

use crate::{Agent, AgentStatus, FleetError, FleetResult};

/// All carts, in roster order.
///
/// Roster order is the processing order for both dispatch tie-breaks and the
/// tick executor, so it is preserved exactly as agents are added.  Lookups
/// are linear: fleets are a handful to a few dozen carts.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Fleet {
    agents: Vec<Agent>,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `agent` at the end of the roster.
    pub fn push(&mut self, agent: Agent) -> FleetResult<()> {
        if self.get(agent.id).is_some() {
            return Err(FleetError::DuplicateAgent(agent.id));
        }
        self.agents.push(agent);
        Ok(())
    }

    pub fn remove(&mut self, id: AgentId) -> FleetResult<Agent> {
        let idx = self.position(id)?;
        Ok(self.agents.remove(idx))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn as_slice(&self) -> &[Agent] {
        &self.agents
    }

    /// Ids in roster order.
    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.iter().map(|a| a.id)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn require(&self, id: AgentId) -> FleetResult<&Agent> {
        self.get(id).ok_or(FleetError::AgentNotFound(id))
    }

    /// Largest payload limit in the fleet, `None` for an empty fleet.
    pub fn max_payload_limit(&self) -> Option<f64> {
        self.agents.iter().map(|a| a.payload_limit).reduce(f64::max)
    }

    fn position(&self, id: AgentId) -> FleetResult<usize> {
        self.agents
            .iter()
            .position(|a| a.id == id)
            .ok_or(FleetError::AgentNotFound(id))
    }

    fn agent_mut(&mut self, id: AgentId) -> FleetResult<&mut Agent> {
        let idx = self.position(id)?;
        Ok(&mut self.agents[idx])
    }

    // ── Point mutators ────────────────────────────────────────────────────

    pub fn set_position(&mut self, id: AgentId, location: Location) -> FleetResult<()> {
        self.agent_mut(id)?.location = location;
        Ok(())
    }

    pub fn set_status(&mut self, id: AgentId, status: AgentStatus) -> FleetResult<()> {
        self.agent_mut(id)?.status = status;
        Ok(())
    }

    /// Remove `amount` of charge, never going below zero.  Returns the new
    /// level.
    pub fn drain_battery(&mut self, id: AgentId, amount: f64) -> FleetResult<f64> {
        let a = self.agent_mut(id)?;
        a.battery = (a.battery - amount.max(0.0)).max(0.0);
        Ok(a.battery)
    }

    /// Add `amount` of charge, never exceeding `max_battery`.  Returns the new
    /// level.
    pub fn charge_battery(&mut self, id: AgentId, amount: f64) -> FleetResult<f64> {
        let a = self.agent_mut(id)?;
        a.battery = (a.battery + amount.max(0.0)).min(a.max_battery);
        Ok(a.battery)
    }

    /// Set the carried weight.  Negative values clamp to zero; anything above
    /// the agent's limit is rejected and leaves the payload unchanged.
    pub fn set_payload(&mut self, id: AgentId, kg: f64) -> FleetResult<()> {
        let a = self.agent_mut(id)?;
        let kg = kg.max(0.0);
        if kg > a.payload_limit {
            return Err(FleetError::PayloadExceeded { agent: id, payload: kg, limit: a.payload_limit });
        }
        a.payload = kg;
        Ok(())
    }

    pub fn assign_job(&mut self, id: AgentId, job: JobId) -> FleetResult<()> {
        self.agent_mut(id)?.current_job = Some(job);
        Ok(())
    }

    /// Drop the current job reference.  Returns the job that was held.
    pub fn clear_job(&mut self, id: AgentId) -> FleetResult<Option<JobId>> {
        Ok(self.agent_mut(id)?.current_job.take())
    }
}

impl FromIterator<Agent> for Fleet {
    /// Later duplicates of an id are dropped.
    fn from_iter<I: IntoIterator<Item = Agent>>(iter: I) -> Self {
        let mut fleet = Fleet::new();
        for agent in iter {
            let _ = fleet.push(agent);
        }
        fleet
    }
}
