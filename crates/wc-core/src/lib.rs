//! `wc-core`: foundational types for the `wardcart` fleet simulator.
//!
//! This crate is a dependency of every other `wc-*` crate.  It has no `wc-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                      |
//! |------------|---------------------------------------------------------------|
//! | [`ids`]    | `AgentId`, `JobId`, `FloorId`, `ChargerId`, …, `IdAllocator`  |
//! | [`grid`]   | `GridPos`, `Location`, Manhattan distance, 4-neighbourhood    |
//! | [`time`]   | `Tick`, `SimTime`, `SimClock`, `SimConfig`, `BatteryPolicy`   |
//! | [`rng`]    | `SimRng` (seeded, deterministic)                              |
//! | [`error`]  | `WcError`, `WcResult`                                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod grid;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{WcError, WcResult};
pub use grid::{GridPos, Location};
pub use ids::{AgentId, ChargerId, FloorId, IdAllocator, JobId, RoomId, StagingId, TriageCaseId};
pub use rng::SimRng;
pub use time::{BatteryPolicy, SimClock, SimConfig, SimTime, Tick};
