//! Parquet output backend (feature `parquet`).
//!
//! Creates three files in the configured output directory:
//! - `agent_snapshots.parquet`
//! - `metric_summaries.parquet`
//! - `events.parquet`
//!
//! Optional values become nullable columns.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, Float64Builder, Int32Builder, StringBuilder, UInt16Builder, UInt32Builder, UInt64Builder,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::{OutputWriter, ensure_dir};
use crate::{AgentSnapshotRow, EventRow, MetricsRow, OutputResult};

fn snapshot_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick",        DataType::UInt64,  false),
        Field::new("time_ms",     DataType::UInt64,  false),
        Field::new("agent_id",    DataType::UInt32,  false),
        Field::new("name",        DataType::Utf8,    false),
        Field::new("floor",       DataType::UInt16,  false),
        Field::new("x",           DataType::Int32,   false),
        Field::new("y",           DataType::Int32,   false),
        Field::new("status",      DataType::Utf8,    false),
        Field::new("battery_pct", DataType::Float64, false),
        Field::new("payload_kg",  DataType::Float64, false),
        Field::new("job_id",      DataType::UInt32,  true),
        Field::new("room",        DataType::Utf8,    true),
    ]))
}

fn metrics_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick",               DataType::UInt64,  false),
        Field::new("time_ms",            DataType::UInt64,  false),
        Field::new("energy_wh",          DataType::Float64, false),
        Field::new("co2_g",              DataType::Float64, false),
        Field::new("idle_waiting_secs",  DataType::Float64, false),
        Field::new("idle_charging_secs", DataType::Float64, false),
        Field::new("cells_moved",        DataType::UInt64,  false),
        Field::new("deadhead_pct",       DataType::Float64, false),
        Field::new("delivered_on_time",  DataType::UInt32,  false),
        Field::new("delivered_late",     DataType::UInt32,  false),
        Field::new("on_time_pct",        DataType::Float64, false),
        Field::new("replans",            DataType::UInt32,  false),
        Field::new("infeasible",         DataType::UInt32,  false),
    ]))
}

fn event_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick",     DataType::UInt64, false),
        Field::new("time_ms",  DataType::UInt64, false),
        Field::new("kind",     DataType::Utf8,   false),
        Field::new("agent_id", DataType::UInt32, true),
        Field::new("job_id",   DataType::UInt32, true),
        Field::new("detail",   DataType::Utf8,   false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

fn open(dir: &Path, file: &str, schema: &Arc<Schema>) -> OutputResult<ArrowWriter<File>> {
    let f = File::create(dir.join(file))?;
    Ok(ArrowWriter::try_new(f, Arc::clone(schema), Some(snappy_props()))?)
}

/// Writes simulation output to three Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footers; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    snapshots:      Option<ArrowWriter<File>>,
    metrics:        Option<ArrowWriter<File>>,
    events:         Option<ArrowWriter<File>>,
    snap_schema:    Arc<Schema>,
    metrics_schema: Arc<Schema>,
    event_schema:   Arc<Schema>,
}

impl ParquetWriter {
    /// Create all three Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        ensure_dir(dir)?;
        let snap_schema = snapshot_schema();
        let metrics_schema = metrics_schema();
        let event_schema = event_schema();

        Ok(Self {
            snapshots: Some(open(dir, "agent_snapshots.parquet", &snap_schema)?),
            metrics:   Some(open(dir, "metric_summaries.parquet", &metrics_schema)?),
            events:    Some(open(dir, "events.parquet", &event_schema)?),
            snap_schema,
            metrics_schema,
            event_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.snapshots.as_mut() else {
            return Ok(());
        };

        let mut ticks     = UInt64Builder::new();
        let mut times     = UInt64Builder::new();
        let mut agent_ids = UInt32Builder::new();
        let mut names     = StringBuilder::new();
        let mut floors    = UInt16Builder::new();
        let mut xs        = Int32Builder::new();
        let mut ys        = Int32Builder::new();
        let mut statuses  = StringBuilder::new();
        let mut batteries = Float64Builder::new();
        let mut payloads  = Float64Builder::new();
        let mut job_ids   = UInt32Builder::new();
        let mut rooms     = StringBuilder::new();

        for row in rows {
            ticks.append_value(row.tick);
            times.append_value(row.time_ms);
            agent_ids.append_value(row.agent_id);
            names.append_value(&row.name);
            floors.append_value(row.floor);
            xs.append_value(row.x);
            ys.append_value(row.y);
            statuses.append_value(row.status);
            batteries.append_value(row.battery_pct);
            payloads.append_value(row.payload_kg);
            job_ids.append_option(row.job_id);
            rooms.append_option(row.room.as_deref());
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.snap_schema),
            vec![
                Arc::new(ticks.finish()),
                Arc::new(times.finish()),
                Arc::new(agent_ids.finish()),
                Arc::new(names.finish()),
                Arc::new(floors.finish()),
                Arc::new(xs.finish()),
                Arc::new(ys.finish()),
                Arc::new(statuses.finish()),
                Arc::new(batteries.finish()),
                Arc::new(payloads.finish()),
                Arc::new(job_ids.finish()),
                Arc::new(rooms.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_metrics(&mut self, row: &MetricsRow) -> OutputResult<()> {
        let Some(writer) = self.metrics.as_mut() else {
            return Ok(());
        };

        let u64_col = |v: u64| -> ArrayRef {
            let mut b = UInt64Builder::new();
            b.append_value(v);
            Arc::new(b.finish())
        };
        let u32_col = |v: u32| -> ArrayRef {
            let mut b = UInt32Builder::new();
            b.append_value(v);
            Arc::new(b.finish())
        };
        let f64_col = |v: f64| -> ArrayRef {
            let mut b = Float64Builder::new();
            b.append_value(v);
            Arc::new(b.finish())
        };

        let batch = RecordBatch::try_new(
            Arc::clone(&self.metrics_schema),
            vec![
                u64_col(row.tick),
                u64_col(row.time_ms),
                f64_col(row.energy_wh),
                f64_col(row.co2_g),
                f64_col(row.idle_waiting_secs),
                f64_col(row.idle_charging_secs),
                u64_col(row.cells_moved),
                f64_col(row.deadhead_pct),
                u32_col(row.delivered_on_time),
                u32_col(row.delivered_late),
                f64_col(row.on_time_pct),
                u32_col(row.replans),
                u32_col(row.infeasible),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.events.as_mut() else {
            return Ok(());
        };

        let mut ticks     = UInt64Builder::new();
        let mut times     = UInt64Builder::new();
        let mut kinds     = StringBuilder::new();
        let mut agent_ids = UInt32Builder::new();
        let mut job_ids   = UInt32Builder::new();
        let mut details   = StringBuilder::new();

        for row in rows {
            ticks.append_value(row.tick);
            times.append_value(row.time_ms);
            kinds.append_value(row.kind);
            agent_ids.append_option(row.agent_id);
            job_ids.append_option(row.job_id);
            details.append_value(&row.detail);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.event_schema),
            vec![
                Arc::new(ticks.finish()),
                Arc::new(times.finish()),
                Arc::new(kinds.finish()),
                Arc::new(agent_ids.finish()),
                Arc::new(job_ids.finish()),
                Arc::new(details.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.snapshots.take() {
            w.close()?;
        }
        if let Some(w) = self.metrics.take() {
            w.close()?;
        }
        if let Some(w) = self.events.take() {
            w.close()?;
        }
        Ok(())
    }
}
