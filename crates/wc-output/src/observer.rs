//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use wc_core::{SimTime, Tick};
use wc_fleet::Fleet;
use wc_floor::HospitalMap;
use wc_sim::{SessionMetrics, SimEvent, SimObserver};

use crate::row::{AgentSnapshotRow, EventRow, MetricsRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes cart snapshots, metrics rows and events to
/// any [`OutputWriter`] backend (CSV, SQLite, Parquet, …).
///
/// Events are buffered for the current tick and written as one batch when
/// the tick ends.  Errors from the writer are stored internally because
/// `SimObserver` methods have no return value; check them with
/// [`take_error`][Self::take_error] after the run.
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    events:     Vec<EventRow>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, events: Vec::new(), last_error: None }
    }

    /// Take the stored write error (if any) after the run.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Write any buffered events and close the writer.  Called by
    /// `on_sim_end`; needed only when the sim is driven tick by tick.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.flush_events();
        self.writer.finish()
    }

    fn flush_events(&mut self) {
        if self.events.is_empty() {
            return;
        }
        let rows = std::mem::take(&mut self.events);
        let result = self.writer.write_events(&rows);
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_event(&mut self, tick: Tick, now: SimTime, event: &SimEvent) {
        self.events.push(EventRow::from_event(tick, now, event));
    }

    fn on_tick_end(&mut self, _tick: Tick, _events: usize) {
        self.flush_events();
    }

    fn on_metrics(&mut self, tick: Tick, now: SimTime, metrics: &SessionMetrics) {
        let result = self.writer.write_metrics(&MetricsRow::from_metrics(tick, now, metrics));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, now: SimTime, fleet: &Fleet, map: &HospitalMap) {
        let rows: Vec<AgentSnapshotRow> =
            fleet.iter().map(|a| AgentSnapshotRow::from_agent(tick, now, a, map)).collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.finish();
        self.store_err(result);
    }
}
