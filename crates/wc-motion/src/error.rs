use thiserror::Error;

use wc_core::{AgentId, FloorId};
use wc_floor::FloorError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MotionError {
    #[error("no reachable charger for agent {agent} on floor {floor}")]
    NoCharger { agent: AgentId, floor: FloorId },

    #[error("routing failed: {0}")]
    Routing(#[from] FloorError),
}

pub type MotionResult<T> = Result<T, MotionError>;
