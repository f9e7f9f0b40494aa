//! `wc-jobs`: delivery jobs and everything that orders or creates them.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`job`]      | `Job`, `JobState` (lifecycle graph), `Priority`, `ItemSpec`, `JobProgress` |
//! | [`board`]    | `JobBoard`: insertion-ordered store plus point mutators   |
//! | [`priority`] | effective priority score, starvation discount, queue sort  |
//! | [`triage`]   | `TriageCase` bundle expansion into jobs                    |
//! | [`loader`]   | `load_jobs_csv`, `load_jobs_reader`                        |
//! | [`demand`]   | `DemandGenerator`: seeded synthetic job stream            |
//! | [`error`]    | `JobError`, `JobResult<T>`                                 |
//!
//! # Lifecycle
//!
//! ```text
//! Queued     -> Assigned | Infeasible
//! Assigned   -> InProgress | Delayed | Queued
//! InProgress -> Delivered | Delayed | Queued
//! Delayed    -> Delivered | Queued
//! ```
//!
//! `Delivered` and `Infeasible` are terminal.  In-flight jobs fall back to
//! `Queued` only when released (battery abort, forced replan).

pub mod board;
pub mod demand;
pub mod error;
pub mod job;
pub mod loader;
pub mod priority;
pub mod triage;

#[cfg(test)]
mod tests;

pub use board::JobBoard;
pub use demand::{DemandGenerator, DemandProfile};
pub use error::{JobError, JobResult};
pub use job::{ItemSpec, Job, JobProgress, JobState, MAX_SERVICE_SECS, Priority};
pub use loader::{load_jobs_csv, load_jobs_reader};
pub use priority::{effective_score, sort_queue, starvation_discount};
pub use triage::{TriageCase, TriageItem};
