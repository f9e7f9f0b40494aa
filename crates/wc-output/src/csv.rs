//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `metric_summaries.csv`
//! - `events.csv`
//!
//! Absent optional values are written as empty fields.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::{OutputWriter, ensure_dir};
use crate::{AgentSnapshotRow, EventRow, MetricsRow, OutputResult};

pub const SNAPSHOT_HEADER: [&str; 12] = [
    "tick", "time_ms", "agent_id", "name", "floor", "x", "y", "status", "battery_pct", "payload_kg", "job_id", "room",
];

pub const METRICS_HEADER: [&str; 13] = [
    "tick",
    "time_ms",
    "energy_wh",
    "co2_g",
    "idle_waiting_secs",
    "idle_charging_secs",
    "cells_moved",
    "deadhead_pct",
    "delivered_on_time",
    "delivered_late",
    "on_time_pct",
    "replans",
    "infeasible",
];

pub const EVENT_HEADER: [&str; 6] = ["tick", "time_ms", "kind", "agent_id", "job_id", "detail"];

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    metrics:   Writer<File>,
    events:    Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the three CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        ensure_dir(dir)?;
        let mut snapshots = Writer::from_path(dir.join("agent_snapshots.csv"))?;
        snapshots.write_record(SNAPSHOT_HEADER)?;

        let mut metrics = Writer::from_path(dir.join("metric_summaries.csv"))?;
        metrics.write_record(METRICS_HEADER)?;

        let mut events = Writer::from_path(dir.join("events.csv"))?;
        events.write_record(EVENT_HEADER)?;

        Ok(Self { snapshots, metrics, events, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.tick.to_string(),
                row.time_ms.to_string(),
                row.agent_id.to_string(),
                row.name.clone(),
                row.floor.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.status.to_string(),
                format!("{:.2}", row.battery_pct),
                row.payload_kg.to_string(),
                opt(row.job_id),
                opt(row.room.as_deref()),
            ])?;
        }
        Ok(())
    }

    fn write_metrics(&mut self, row: &MetricsRow) -> OutputResult<()> {
        self.metrics.write_record(&[
            row.tick.to_string(),
            row.time_ms.to_string(),
            format!("{:.3}", row.energy_wh),
            format!("{:.3}", row.co2_g),
            format!("{:.1}", row.idle_waiting_secs),
            format!("{:.1}", row.idle_charging_secs),
            row.cells_moved.to_string(),
            format!("{:.1}", row.deadhead_pct),
            row.delivered_on_time.to_string(),
            row.delivered_late.to_string(),
            format!("{:.1}", row.on_time_pct),
            row.replans.to_string(),
            row.infeasible.to_string(),
        ])?;
        Ok(())
    }

    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        for row in rows {
            self.events.write_record(&[
                row.tick.to_string(),
                row.time_ms.to_string(),
                row.kind.to_string(),
                opt(row.agent_id),
                opt(row.job_id),
                row.detail.clone(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.metrics.flush()?;
        self.events.flush()?;
        Ok(())
    }
}
