//! `wc-fleet`: the delivery-cart roster.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`agent`]   | `Agent`, `AgentStatus`, `Pool`                            |
//! | [`fleet`]   | `Fleet`: roster-ordered storage plus point mutators      |
//! | [`builder`] | `FleetBuilder`, `AgentSpec` (fluent construction)         |
//! | [`error`]   | `FleetError`, `FleetResult<T>`                            |
//!
//! # Ownership
//!
//! Position, battery, status and payload are written only by the tick
//! executor; `current_job` is written by the dispatch glue.  Both go through
//! the mutators on [`Fleet`] so every write is checked against the roster.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                 |
//! |---------|--------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on all public types. |

pub mod agent;
pub mod builder;
pub mod error;
pub mod fleet;

#[cfg(test)]
mod tests;

pub use agent::{Agent, AgentStatus, Pool};
pub use builder::{AgentSpec, FleetBuilder};
pub use error::{FleetError, FleetResult};
pub use fleet::Fleet;
