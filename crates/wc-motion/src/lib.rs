//! `wc-motion`: execution cursors and grid movement for carts.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                         |
//! |------------|------------------------------------------------------------------|
//! | [`state`]  | `AgentExecutionState`: route cursor, dwell start, charger target |
//! | [`store`]  | `ExecStore`: sparse `AgentId → AgentExecutionState` map          |
//! | [`engine`] | `MotionEngine<P>`: speed credit, one-cell steps, local repath    |
//! | [`error`]  | `MotionError`, `MotionResult<T>`                                  |
//!
//! # Movement model
//!
//! Carts move one whole cell at a time.  Each tick in which a cart wants to
//! move it earns `speed × slice` cells of credit (tracked in milli-cells so
//! the arithmetic is exact); a move spends one cell.  Credit is only earned
//! while moving, so a cart that waited or dwelt does not sprint afterwards.
//!
//! A cart already next to its target steps straight in.  Anywhere else the
//! engine runs a fresh A* search and takes its first step, which is how carts
//! recover after being pushed off their planned route.
//!
//! The engine never writes the fleet: it reports where a cart moved and the
//! caller applies position and battery changes.

pub mod engine;
pub mod error;
pub mod state;
pub mod store;


pub use engine::{CELL_CREDIT, MotionEngine, StepOutcome};
pub use error::{MotionError, MotionResult};
pub use state::AgentExecutionState;
pub use store::ExecStore;
