use thiserror::Error;

use wc_core::{AgentId, TriageCaseId};
use wc_fleet::FleetError;
use wc_jobs::JobError;

use crate::ScenarioError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("agent {agent} is placed off the map: {reason}")]
    Placement { agent: AgentId, reason: String },

    #[error("unknown triage case {0}")]
    UnknownTriageCase(TriageCaseId),

    #[error("fleet error: {0}")]
    Fleet(#[from] FleetError),

    #[error("job error: {0}")]
    Jobs(#[from] JobError),

    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),
}

pub type SimResult<T> = Result<T, SimError>;
