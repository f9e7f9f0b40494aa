//! Simulation time model.
//!
//! # Design
//!
//! Two clocks run side by side:
//!
//! - `Tick` counts executor iterations.  It drives throttled work (metric
//!   pushes every N ticks, snapshots) and never depends on the speed setting.
//! - `SimTime` is simulated wall time in **integer milliseconds**.  Each tick
//!   advances it by one slice: `base_slice_ms × speed_multiplier`.
//!
//! Keeping simulated time integral means dwell, deadline and cooldown
//! comparisons are exact: ten 100 ms slices are exactly one second, with no
//! floating-point drift deciding whether an action finished this tick or the
//! next.

use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute executor iteration counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// `true` every `interval` ticks, counting from tick 0.  An interval of 0
    /// never fires.
    #[inline]
    pub fn every(self, interval: u64) -> bool {
        interval > 0 && self.0.is_multiple_of(interval)
    }
}

impl Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimTime ───────────────────────────────────────────────────────────────────

/// Absolute simulated time in milliseconds since the start of the run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    #[inline]
    pub const fn from_millis(ms: u64) -> Self {
        SimTime(ms)
    }

    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        SimTime(secs * 1_000)
    }

    /// Negative and NaN inputs clamp to zero.
    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        if secs.is_nan() || secs <= 0.0 {
            return SimTime::ZERO;
        }
        SimTime((secs * 1_000.0).round() as u64)
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later.
    #[inline]
    pub fn since(self, earlier: SimTime) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// Signed difference `self − other` in seconds.
    #[inline]
    pub fn secs_after(self, other: SimTime) -> f64 {
        (self.0 as f64 - other.0 as f64) / 1_000.0
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;
    /// Saturates at `u64::MAX` ms.
    #[inline]
    fn add(self, rhs: Duration) -> SimTime {
        let ms = u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX);
        SimTime(self.0.saturating_add(ms))
    }
}

impl Sub for SimTime {
    type Output = Duration;
    /// Saturating: a later `rhs` yields a zero duration.
    #[inline]
    fn sub(self, rhs: SimTime) -> Duration {
        self.since(rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}s", self.as_secs_f64())
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Advances `Tick` and `SimTime` together.
///
/// The slice length is `base_slice_ms × speed_multiplier`, rounded to whole
/// milliseconds and never shorter than 1 ms.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    pub current_tick: Tick,
    pub now:          SimTime,
    base_slice_ms:    u64,
    speed_multiplier: f64,
}

impl SimClock {
    /// Slowest allowed playback multiplier.
    pub const MIN_SPEED: f64 = 0.1;
    /// Fastest allowed playback multiplier.
    pub const MAX_SPEED: f64 = 100.0;

    pub fn new(base_slice_ms: u64, speed_multiplier: f64) -> Self {
        Self {
            current_tick:     Tick::ZERO,
            now:              SimTime::ZERO,
            base_slice_ms:    base_slice_ms.max(1),
            speed_multiplier: Self::clamp_speed(speed_multiplier),
        }
    }

    /// Clamp a requested multiplier into `[MIN_SPEED, MAX_SPEED]`.  NaN maps
    /// to 1×.
    pub fn clamp_speed(multiplier: f64) -> f64 {
        if multiplier.is_nan() {
            return 1.0;
        }
        multiplier.clamp(Self::MIN_SPEED, Self::MAX_SPEED)
    }

    /// Change the playback multiplier; returns the value actually applied.
    pub fn set_speed(&mut self, multiplier: f64) -> f64 {
        self.speed_multiplier = Self::clamp_speed(multiplier);
        self.speed_multiplier
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed_multiplier
    }

    /// Length of one tick in simulated time at the current speed.
    #[inline]
    pub fn slice(&self) -> Duration {
        let ms = (self.base_slice_ms as f64 * self.speed_multiplier).round() as u64;
        Duration::from_millis(ms.max(1))
    }

    /// Advance by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.now = self.now + self.slice();
        self.current_tick = self.current_tick + 1;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, x{})", self.current_tick, self.now, self.speed_multiplier)
    }
}

// ── BatteryPolicy ─────────────────────────────────────────────────────────────

/// Battery thresholds, all in percent of an agent's `max_battery`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BatteryPolicy {
    /// Dispatch only considers agents strictly above this level.
    pub dispatch_min_pct: f64,
    /// A candidate route may not leave the agent below this level.
    pub reserve_pct:      f64,
    /// At or below this level the agent aborts its job and diverts.
    pub critical_pct:     f64,
    /// Charging stops once the agent reaches this level.
    pub full_pct:         f64,
    /// Idle agents below this level go charging on their own.
    pub seek_charge_pct:  f64,
}

impl Default for BatteryPolicy {
    fn default() -> Self {
        Self {
            dispatch_min_pct: 20.0,
            reserve_pct:      10.0,
            critical_pct:     5.0,
            full_pct:         95.0,
            seek_charge_pct:  20.0,
        }
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically carried inside a scenario document; any field missing there
/// falls back to [`SimConfig::default`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Nominal tick length before the speed multiplier.  Default: 100 ms.
    pub base_slice_ms: u64,

    /// Playback multiplier, clamped to `[0.1, 100]` when the clock is built.
    pub speed_multiplier: f64,

    /// Ticks executed by `Sim::run`.
    pub total_ticks: u64,

    /// Master RNG seed for generated demand.
    pub seed: u64,

    /// Agent snapshots are handed to observers every N ticks (0 = never).
    pub snapshot_interval_ticks: u64,

    /// Cumulative metrics are pushed to observers every N ticks.
    pub metrics_interval_ticks: u64,

    /// Minimum simulated time between two replans triggered by the cooldown
    /// alone.
    pub replan_cooldown_secs: f64,

    /// Waiting longer than this earns a bounded priority discount.
    pub starvation_threshold_secs: f64,

    /// Grams of CO₂ per watt-hour drawn from the grid.
    pub co2_g_per_wh: f64,

    /// Energy drawn per cell moved.
    pub energy_wh_per_cell: f64,

    /// Service time used when a job does not specify its own.
    pub default_pickup_service_secs: f64,
    pub default_dropoff_service_secs: f64,

    /// Unassigned jobs due within this window are flagged "likely late".
    pub late_buffer_secs: f64,

    /// Battery gained per second at a charger that declares no rate.
    pub default_charge_rate_per_sec: f64,

    pub battery: BatteryPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            base_slice_ms:                100,
            speed_multiplier:             1.0,
            total_ticks:                  36_000, // one simulated hour at 1x
            seed:                         42,
            snapshot_interval_ticks:      10,
            metrics_interval_ticks:       10,
            replan_cooldown_secs:         5.0,
            starvation_threshold_secs:    300.0,
            co2_g_per_wh:                 0.233,
            energy_wh_per_cell:           0.5,
            default_pickup_service_secs:  30.0,
            default_dropoff_service_secs: 30.0,
            late_buffer_secs:             120.0,
            default_charge_rate_per_sec:  0.5,
            battery:                      BatteryPolicy::default(),
        }
    }
}

impl SimConfig {
    /// The tick at which `Sim::run` stops (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.base_slice_ms, self.speed_multiplier)
    }

    #[inline]
    pub fn replan_cooldown(&self) -> Duration {
        Duration::from_millis((self.replan_cooldown_secs.max(0.0) * 1_000.0).round() as u64)
    }

    /// Estimated CO₂ for `wh` watt-hours.
    #[inline]
    pub fn co2_for(&self, wh: f64) -> f64 {
        wh * self.co2_g_per_wh
    }
}
