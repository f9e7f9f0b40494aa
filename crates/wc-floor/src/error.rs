//! Floor-subsystem error type.

use thiserror::Error;

use wc_core::{FloorId, GridPos};

/// Errors produced by `wc-floor`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FloorError {
    #[error("no path from {from} to {to}")]
    NoPath { from: GridPos, to: GridPos },

    #[error("position {0} is outside the floor")]
    OutOfBounds(GridPos),

    #[error("goal {0} is not traversable")]
    GoalBlocked(GridPos),

    #[error("floor {0} not found")]
    FloorNotFound(FloorId),

    #[error("floor layout error: {0}")]
    Layout(String),
}

pub type FloorResult<T> = Result<T, FloorError>;
