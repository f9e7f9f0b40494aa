//! `wc-dispatch`: turn the job queue and the fleet into a `Plan`.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                    |
//! |-----------------|-------------------------------------------------------------|
//! | [`plan`]        | `Plan`, `AgentPlan`, `RouteStep`, `RouteAction`, `UnassignedEta`, `PlanMetrics` |
//! | [`context`]     | `DispatchContext<'a>`: read-only inputs to one planning pass |
//! | [`dispatcher`]  | `Dispatcher` trait, `GreedyDispatcher<P>`                   |
//! | [`route`]       | `build_agent_plan`: paths to timed route steps             |
//! | [`feasibility`] | `check_feasibility`, `InfeasibleReason`                     |
//! | [`error`]       | `DispatchError`, `DispatchResult<T>`                        |
//!
//! # Purity
//!
//! A dispatcher reads its inputs through `&DispatchContext` and returns a
//! fresh `Plan`.  It never writes job or agent records; the caller applies
//! the assignments.  Calling it twice on the same inputs yields the same
//! assignments, so speculative planning is safe.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | Candidate paths are searched on the Rayon pool; the pick is still made in roster order. |
//! | `serde`    | Derives `Serialize`/`Deserialize` on plan types.            |

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod feasibility;
pub mod plan;
pub mod route;

#[cfg(test)]
mod tests;

pub use context::DispatchContext;
pub use dispatcher::{Dispatcher, GreedyDispatcher};
pub use error::{DispatchError, DispatchResult};
pub use feasibility::{InfeasibleReason, check_feasibility};
pub use plan::{AgentPlan, Plan, PlanMetrics, RouteAction, RouteStep, UnassignedEta, UnassignedReason};
pub use route::{build_agent_plan, step_duration};
