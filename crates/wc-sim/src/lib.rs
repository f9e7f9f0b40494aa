//! `wc-sim`: the tick executor and simulation context for wardcart.
//!
//! # Tick
//!
//! ```text
//! step():
//!   ① Clock   : advance by base_slice × speed (clamped to [0.1, 100]).
//!   ② Demand  : poll the seeded generator; new jobs pass feasibility.
//!   ③ Agents  : in roster order, first matching rule wins:
//!                  Charging          → charge, idle at ≥ full
//!                  battery ≤ critical → release jobs, LowBattery, divert
//!                  diverting         → step toward the charger
//!                  nothing to do     → idle time, seek charger when low
//!                  route             → move / dwell / pick up / drop off
//!   ④ Deadlines: in-flight jobs past their deadline become Delayed.
//!   ⑤ Replan  : drop a finished plan; dispatch when the trigger fires.
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`sim`]      | `Sim`, `JobRequest`, the tick loop and job intake          |
//! | [`builder`]  | `SimBuilder`                                               |
//! | `executor`   | per-agent rules                                            |
//! | `replan`     | replan trigger, `replan_now`                               |
//! | [`control`]  | `RunState`, start/pause/resume/stop/reset, run drivers     |
//! | [`event`]    | `SimEvent`, `ReplanReason`, `ReplanImpact`                 |
//! | [`metrics`]  | `SessionMetrics`                                           |
//! | [`observer`] | `SimObserver`, `NoopObserver`, `EventLog`                  |
//! | [`scenario`] | versioned JSON `Scenario` import/export                    |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                       |
//! |------------|--------------------------------------------------------------|
//! | `parallel` | Dispatch candidates are evaluated on Rayon's thread pool.    |
//! | `fx-hash`  | FxHash for agent-id sets and execution state.                |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use wc_dispatch::GreedyDispatcher;
//! use wc_floor::AStarPathfinder;
//! use wc_sim::{NoopObserver, Scenario};
//!
//! let scenario = Scenario::from_path("ward.json".as_ref())?;
//! let mut sim = scenario
//!     .into_builder(GreedyDispatcher::new(AStarPathfinder), AStarPathfinder)?
//!     .build()?;
//! sim.run(&mut NoopObserver);
//! ```

pub mod builder;
pub mod control;
pub mod error;
pub mod event;
mod executor;
pub mod metrics;
pub mod observer;
mod replan;
pub mod scenario;
pub mod sim;


pub use builder::SimBuilder;
pub use control::RunState;
pub use error::{SimError, SimResult};
pub use event::{ReplanImpact, ReplanReason, SimEvent};
pub use metrics::SessionMetrics;
pub use observer::{EventLog, NoopObserver, SimObserver};
pub use scenario::{FloorDoc, SCENARIO_VERSION, Scenario, ScenarioError, ScenarioResult, ZoneDoc};
pub use sim::{JobRequest, Sim};

pub(crate) use sim::{IdSet, ReplanState, Snapshot};
