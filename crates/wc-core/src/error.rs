//! Framework error type.
//!
//! Sub-crates define their own error enums and either wrap `WcError` as one
//! variant or keep them separate; prefer whichever keeps error sites clean.

use thiserror::Error;

use crate::{AgentId, FloorId, GridPos, JobId};

/// The top-level error type for `wc-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum WcError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("job {0} not found")]
    JobNotFound(JobId),

    #[error("floor {0} not found")]
    FloorNotFound(FloorId),

    #[error("position {pos} is outside floor {floor}")]
    OutOfBounds { floor: FloorId, pos: GridPos },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `wc-*` crates.
pub type WcResult<T> = Result<T, WcError>;
