use thiserror::Error;

use wc_core::{AgentId, GridPos};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    #[error("route for agent {agent} jumps from {from} to {to} at step {index}")]
    DisjointRoute { agent: AgentId, index: usize, from: GridPos, to: GridPos },

    #[error("route for agent {agent} goes back in time at step {index}")]
    NonMonotonicEta { agent: AgentId, index: usize },

    #[error("agent {agent} has no usable step time at speed {speed} cells/s")]
    UntimedRoute { agent: AgentId, speed: f64 },
}

pub type DispatchResult<T> = Result<T, DispatchError>;
