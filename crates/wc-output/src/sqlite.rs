//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `agent_snapshots`, `metric_summaries` and `events`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::{OutputWriter, ensure_dir};
use crate::{AgentSnapshotRow, EventRow, MetricsRow, OutputResult};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        ensure_dir(dir)?;
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS agent_snapshots (
                 tick        INTEGER NOT NULL,
                 time_ms     INTEGER NOT NULL,
                 agent_id    INTEGER NOT NULL,
                 name        TEXT    NOT NULL,
                 floor       INTEGER NOT NULL,
                 x           INTEGER NOT NULL,
                 y           INTEGER NOT NULL,
                 status      TEXT    NOT NULL,
                 battery_pct REAL    NOT NULL,
                 payload_kg  REAL    NOT NULL,
                 job_id      INTEGER,
                 room        TEXT
             );
             CREATE TABLE IF NOT EXISTS metric_summaries (
                 tick               INTEGER PRIMARY KEY,
                 time_ms            INTEGER NOT NULL,
                 energy_wh          REAL    NOT NULL,
                 co2_g              REAL    NOT NULL,
                 idle_waiting_secs  REAL    NOT NULL,
                 idle_charging_secs REAL    NOT NULL,
                 cells_moved        INTEGER NOT NULL,
                 deadhead_pct       REAL    NOT NULL,
                 delivered_on_time  INTEGER NOT NULL,
                 delivered_late     INTEGER NOT NULL,
                 on_time_pct        REAL    NOT NULL,
                 replans            INTEGER NOT NULL,
                 infeasible         INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS events (
                 tick     INTEGER NOT NULL,
                 time_ms  INTEGER NOT NULL,
                 kind     TEXT    NOT NULL,
                 agent_id INTEGER,
                 job_id   INTEGER,
                 detail   TEXT    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO agent_snapshots \
                 (tick, time_ms, agent_id, name, floor, x, y, status, battery_pct, payload_kg, job_id, room) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick,
                    row.time_ms,
                    row.agent_id,
                    row.name,
                    row.floor,
                    row.x,
                    row.y,
                    row.status,
                    row.battery_pct,
                    row.payload_kg,
                    row.job_id,
                    row.room,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_metrics(&mut self, row: &MetricsRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO metric_summaries \
             (tick, time_ms, energy_wh, co2_g, idle_waiting_secs, idle_charging_secs, cells_moved, \
              deadhead_pct, delivered_on_time, delivered_late, on_time_pct, replans, infeasible) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            rusqlite::params![
                row.tick,
                row.time_ms,
                row.energy_wh,
                row.co2_g,
                row.idle_waiting_secs,
                row.idle_charging_secs,
                row.cells_moved,
                row.deadhead_pct,
                row.delivered_on_time,
                row.delivered_late,
                row.on_time_pct,
                row.replans,
                row.infeasible,
            ],
        )?;
        Ok(())
    }

    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO events (tick, time_ms, kind, agent_id, job_id, detail) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick,
                    row.time_ms,
                    row.kind,
                    row.agent_id,
                    row.job_id,
                    row.detail,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
