//! The `OutputWriter` trait implemented by all backend writers.

use crate::{AgentSnapshotRow, EventRow, MetricsRow, OutputResult};

/// Trait implemented by CSV, SQLite, and Parquet writers.
///
/// Errors are returned to the caller; [`SimOutputObserver`][crate::SimOutputObserver]
/// keeps the first one for [`take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of cart snapshots taken at one tick.
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()>;

    /// Write one metrics row.
    fn write_metrics(&mut self, row: &MetricsRow) -> OutputResult<()>;

    /// Write the events raised during one tick.
    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}

/// Every backend writes into an existing directory; none of them creates it.
pub(crate) fn ensure_dir(dir: &std::path::Path) -> OutputResult<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(crate::OutputError::NotADirectory(dir.to_path_buf()))
    }
}
