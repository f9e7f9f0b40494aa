//! `wc-floor`: floor grids, facilities, and pathfinding.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                    |
//! |----------------|-------------------------------------------------------------|
//! | [`access`]     | `AccessProfiles`: an agent's restricted-area permissions   |
//! | [`floor`]      | `GridCell`, `Floor`, `FloorBuilder` (incl. legend rows)     |
//! | [`facility`]   | `Charger`, `StoragePoint`, `StagingArea`, `Room`, `Connector`, `RoomIndex` |
//! | [`map`]        | `HospitalMap`: floors plus facilities, read-only to the core |
//! | [`pathfinder`] | `Pathfinder` trait, `GridPath`, `AStarPathfinder`, nearest-facility search |
//! | [`error`]      | `FloorError`, `FloorResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public data types.      |

pub mod access;
pub mod error;
pub mod facility;
pub mod floor;
pub mod map;
pub mod pathfinder;


pub use access::AccessProfiles;
pub use error::{FloorError, FloorResult};
pub use facility::{Charger, Connector, Room, RoomIndex, StagingArea, StoragePoint};
pub use floor::{Floor, FloorBuilder, GridCell};
pub use map::HospitalMap;
pub use pathfinder::{AStarPathfinder, GridPath, Pathfinder, nearest_reachable};
