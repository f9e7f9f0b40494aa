//! Fleet error type.

use thiserror::Error;

use wc_core::AgentId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FleetError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("agent {0} already in the roster")]
    DuplicateAgent(AgentId),

    #[error("agent {agent}: payload {payload} kg exceeds limit {limit} kg")]
    PayloadExceeded { agent: AgentId, payload: f64, limit: f64 },

    #[error("invalid agent {name:?}: {reason}")]
    InvalidAgent { name: String, reason: String },
}

pub type FleetResult<T> = Result<T, FleetError>;
