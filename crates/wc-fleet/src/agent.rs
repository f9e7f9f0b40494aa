//! A single delivery cart.

use std::fmt;

use wc_core::{AgentId, JobId, Location};
use wc_floor::AccessProfiles;

use crate::{FleetError, FleetResult};

// ── AgentStatus ───────────────────────────────────────────────────────────────

/// What a cart is doing this tick.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum AgentStatus {
    #[default]
    Idle,
    Moving,
    PickingUp,
    DroppingOff,
    Charging,
}

impl AgentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentStatus::Idle        => "IDLE",
            AgentStatus::Moving      => "MOVING",
            AgentStatus::PickingUp   => "PICKING_UP",
            AgentStatus::DroppingOff => "DROPPING_OFF",
            AgentStatus::Charging    => "CHARGING",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Pool ──────────────────────────────────────────────────────────────────────

/// Fleet partition a cart preferentially serves.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Pool {
    Urgent,
    #[default]
    NonUrgent,
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pool::Urgent    => "URGENT",
            Pool::NonUrgent => "NON_URGENT",
        })
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// One cart.
///
/// Battery is in the same units as `max_battery` (normally percent, so
/// `max_battery = 100`).  `speed` is cells per simulated second.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub id:             AgentId,
    pub name:           String,
    pub location:       Location,
    pub speed:          f64,
    pub battery:        f64,
    pub max_battery:    f64,
    pub drain_per_cell: f64,
    /// Kilograms.
    pub payload_limit:  f64,
    pub payload:        f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub access:         AccessProfiles,
    #[cfg_attr(feature = "serde", serde(default))]
    pub current_job:    Option<JobId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status:         AgentStatus,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pool:           Pool,
}

impl Agent {
    /// Rejects agents whose figures the planner cannot use: non-finite
    /// values, battery outside `[0, max_battery]`, payload above the limit.
    ///
    /// Agents built through [`FleetBuilder`][crate::FleetBuilder] already
    /// pass; deserialized ones should be checked before joining a fleet.
    pub fn validate(&self) -> FleetResult<()> {
        check_figures(self.speed, self.battery, self.max_battery, self.drain_per_cell, self.payload_limit)
            .and_then(|()| {
                if self.payload.is_finite() && (0.0..=self.payload_limit).contains(&self.payload) {
                    Ok(())
                } else {
                    Err("payload must lie in [0, payload limit]")
                }
            })
            .map_err(|reason| FleetError::InvalidAgent { name: self.name.clone(), reason: reason.into() })
    }

    /// Battery as a percentage of `max_battery`.
    #[inline]
    pub fn battery_pct(&self) -> f64 {
        if self.max_battery <= 0.0 {
            return 0.0;
        }
        self.battery / self.max_battery * 100.0
    }

    /// Battery level corresponding to `pct` percent of capacity.
    #[inline]
    pub fn battery_at_pct(&self, pct: f64) -> f64 {
        self.max_battery * pct / 100.0
    }

    /// Idle with nothing assigned.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.status == AgentStatus::Idle && self.current_job.is_none()
    }

    #[inline]
    pub fn can_carry(&self, weight_kg: f64) -> bool {
        self.payload_limit >= weight_kg
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.payload > 0.0
    }
}

/// Range checks shared by [`Agent::validate`] and the fleet builder.
pub(crate) fn check_figures(
    speed:          f64,
    battery:        f64,
    max_battery:    f64,
    drain_per_cell: f64,
    payload_limit:  f64,
) -> Result<(), &'static str> {
    if !speed.is_finite() || speed < 0.0 {
        return Err("speed must be finite and non-negative");
    }
    if !max_battery.is_finite() || max_battery <= 0.0 {
        return Err("max battery must be finite and positive");
    }
    if !(0.0..=max_battery).contains(&battery) {
        return Err("battery must lie in [0, max battery]");
    }
    if !drain_per_cell.is_finite() || drain_per_cell < 0.0 {
        return Err("drain per cell must be finite and non-negative");
    }
    if !payload_limit.is_finite() || payload_limit < 0.0 {
        return Err("payload limit must be finite and non-negative");
    }
    Ok(())
}
