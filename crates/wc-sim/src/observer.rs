//! Simulation observer trait for progress reporting and data collection.

use wc_core::{SimTime, Tick};
use wc_floor::HospitalMap;
use wc_fleet::Fleet;

use crate::{SessionMetrics, SimEvent};

/// Callbacks invoked by the [`Sim`][crate::Sim] drivers at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: delivery ticker
///
/// ```rust,ignore
/// struct Deliveries(u32);
///
/// impl SimObserver for Deliveries {
///     fn on_event(&mut self, _tick: Tick, _now: SimTime, event: &SimEvent) {
///         if let SimEvent::JobCompleted { .. } = event {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the start of each tick, before the clock advances.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per event, in emission order, after the tick ran.
    fn on_event(&mut self, _tick: Tick, _now: SimTime, _event: &SimEvent) {}

    /// Called at the end of each tick with the number of events it produced.
    fn on_tick_end(&mut self, _tick: Tick, _events: usize) {}

    /// Called every `config.metrics_interval_ticks` ticks with the running
    /// session totals.
    fn on_metrics(&mut self, _tick: Tick, _now: SimTime, _metrics: &SessionMetrics) {}

    /// Called every `config.snapshot_interval_ticks` ticks with read-only
    /// access to the fleet, so writers can record positions without the sim
    /// knowing any output format.
    fn on_snapshot(&mut self, _tick: Tick, _now: SimTime, _fleet: &Fleet, _map: &HospitalMap) {}

    /// Called once when a `run` driver finishes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Collects every event; handy in tests and small tools.
#[derive(Default)]
pub struct EventLog {
    pub events: Vec<(Tick, SimTime, SimEvent)>,
}

impl SimObserver for EventLog {
    fn on_event(&mut self, tick: Tick, now: SimTime, event: &SimEvent) {
        self.events.push((tick, now, event.clone()));
    }
}
