//! Plain data row types written by output backends.

use wc_core::{SimTime, Tick};
use wc_fleet::Agent;
use wc_floor::HospitalMap;
use wc_sim::{SessionMetrics, SimEvent};

/// One cart's state at a snapshot tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSnapshotRow {
    pub tick:        u64,
    pub time_ms:     u64,
    pub agent_id:    u32,
    pub name:        String,
    pub floor:       u16,
    pub x:           i32,
    pub y:           i32,
    pub status:      &'static str,
    pub battery_pct: f64,
    pub payload_kg:  f64,
    pub job_id:      Option<u32>,
    /// Name of the room the cart stands in, if any.
    pub room:        Option<String>,
}

impl AgentSnapshotRow {
    pub fn from_agent(tick: Tick, now: SimTime, agent: &Agent, map: &HospitalMap) -> Self {
        Self {
            tick:        tick.0,
            time_ms:     now.as_millis(),
            agent_id:    agent.id.0,
            name:        agent.name.clone(),
            floor:       agent.location.floor.0,
            x:           agent.location.pos.x,
            y:           agent.location.pos.y,
            status:      agent.status.as_str(),
            battery_pct: agent.battery_pct(),
            payload_kg:  agent.payload,
            job_id:      agent.current_job.map(|j| j.0),
            room:        map.room_at(agent.location).map(|r| r.name.clone()),
        }
    }
}

/// Session metrics at a push tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsRow {
    pub tick:               u64,
    pub time_ms:            u64,
    pub energy_wh:          f64,
    pub co2_g:              f64,
    pub idle_waiting_secs:  f64,
    pub idle_charging_secs: f64,
    pub cells_moved:        u64,
    pub deadhead_pct:       f64,
    pub delivered_on_time:  u32,
    pub delivered_late:     u32,
    pub on_time_pct:        f64,
    pub replans:            u32,
    pub infeasible:         u32,
}

impl MetricsRow {
    pub fn from_metrics(tick: Tick, now: SimTime, m: &SessionMetrics) -> Self {
        Self {
            tick:               tick.0,
            time_ms:            now.as_millis(),
            energy_wh:          m.energy_wh,
            co2_g:              m.co2_g,
            idle_waiting_secs:  m.idle_waiting_secs,
            idle_charging_secs: m.idle_charging_secs,
            cells_moved:        m.cells_moved,
            deadhead_pct:       m.deadhead_pct(),
            delivered_on_time:  m.delivered_on_time,
            delivered_late:     m.delivered_late,
            on_time_pct:        m.on_time_pct(),
            replans:            m.replans,
            infeasible:         m.infeasible,
        }
    }
}

/// One simulation event, flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub tick:     u64,
    pub time_ms:  u64,
    /// Snake-case tag, e.g. `job_completed`.
    pub kind:     &'static str,
    pub agent_id: Option<u32>,
    pub job_id:   Option<u32>,
    /// Human-readable description.
    pub detail:   String,
}

impl EventRow {
    pub fn from_event(tick: Tick, now: SimTime, event: &SimEvent) -> Self {
        Self {
            tick:     tick.0,
            time_ms:  now.as_millis(),
            kind:     event.kind(),
            agent_id: event.agent().map(|a| a.0),
            job_id:   event.job().map(|j| j.0),
            detail:   event.to_string(),
        }
    }
}
