//! Strongly typed, zero-cost identifier wrappers and the id allocator.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Agent and job ids are *not* dense
//! indices: rosters may be reordered or extended mid-run, so collections look
//! them up rather than index by them.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for use as a `Vec` index where ids are dense.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// A delivery cart.
    pub struct AgentId(u32);
}

typed_id! {
    /// A delivery job.
    pub struct JobId(u32);
}

typed_id! {
    /// A hospital floor.  `u16` is plenty: buildings rarely exceed a few dozen.
    pub struct FloorId(u16);
}

typed_id! {
    /// A charging dock.
    pub struct ChargerId(u32);
}

typed_id! {
    /// A staging area where idle carts park.
    pub struct StagingId(u32);
}

typed_id! {
    /// A named room (ward, pharmacy, lab, …).
    pub struct RoomId(u32);
}

typed_id! {
    /// A triage case whose supply bundle expands into jobs.
    pub struct TriageCaseId(u32);
}

// ── IdAllocator ───────────────────────────────────────────────────────────────

/// Monotonic id source owned by the simulation context.
///
/// Replaces module-level counters: every `Sim` owns exactly one allocator, so
/// two simulations in the same process never share id space.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdAllocator {
    next_agent: u32,
    next_job:   u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume allocation after ids already present in a loaded scenario.
    pub fn resume_after(max_agent: Option<AgentId>, max_job: Option<JobId>) -> Self {
        Self {
            next_agent: max_agent.map_or(0, |a| a.0 + 1),
            next_job:   max_job.map_or(0, |j| j.0 + 1),
        }
    }

    pub fn next_agent(&mut self) -> AgentId {
        let id = AgentId(self.next_agent);
        self.next_agent += 1;
        id
    }

    pub fn next_job(&mut self) -> JobId {
        let id = JobId(self.next_job);
        self.next_job += 1;
        id
    }

    /// Make sure a later `next_job` never collides with `seen`.
    pub fn observe_job(&mut self, seen: JobId) {
        if seen.is_valid() && seen.0 >= self.next_job {
            self.next_job = seen.0 + 1;
        }
    }

    /// Make sure a later `next_agent` never collides with `seen`.
    pub fn observe_agent(&mut self, seen: AgentId) {
        if seen.is_valid() && seen.0 >= self.next_agent {
            self.next_agent = seen.0 + 1;
        }
    }
}
