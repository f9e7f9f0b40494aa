//! Integration tests for wc-output.

#[cfg(test)]
mod fixtures {
    use wc_core::{FloorId, GridPos, IdAllocator, Location, RoomId, SimConfig, SimTime, Tick};
    use wc_dispatch::GreedyDispatcher;
    use wc_floor::{AStarPathfinder, FloorBuilder, HospitalMap, Room};
    use wc_fleet::{AgentSpec, FleetBuilder};
    use wc_jobs::{ItemSpec, Priority};
    use wc_sim::{JobRequest, Sim, SimBuilder};

    use crate::row::{AgentSnapshotRow, EventRow, MetricsRow};

    pub type TestSim = Sim<GreedyDispatcher<AStarPathfinder>, AStarPathfinder>;

    pub fn snap_row(agent_id: u32, tick: u64) -> AgentSnapshotRow {
        AgentSnapshotRow {
            tick,
            time_ms:     tick * 100,
            agent_id,
            name:        format!("cart-{agent_id}"),
            floor:       0,
            x:           agent_id as i32,
            y:           2,
            status:      "IDLE",
            battery_pct: 87.5,
            payload_kg:  0.0,
            job_id:      None,
            room:        Some("Ward 3".into()),
        }
    }

    pub fn metrics_row(tick: u64) -> MetricsRow {
        MetricsRow {
            tick,
            time_ms:            tick * 100,
            energy_wh:          4.5,
            co2_g:              1.25,
            idle_waiting_secs:  12.0,
            idle_charging_secs: 0.0,
            cells_moved:        9,
            deadhead_pct:       0.0,
            delivered_on_time:  1,
            delivered_late:     0,
            on_time_pct:        100.0,
            replans:            1,
            infeasible:         0,
        }
    }

    pub fn event_row(tick: u64, job: Option<u32>) -> EventRow {
        EventRow {
            tick,
            time_ms:  tick * 100,
            kind:     "job_completed",
            agent_id: Some(0),
            job_id:   job,
            detail:   "delivered".into(),
        }
    }

    /// A corridor whose east end is the room "Ward 3", one cart at the west
    /// end and one 2 s / 2 s delivery into the ward.
    pub fn corridor_sim(total_ticks: u64) -> TestSim {
        let f0 = FloorId(0);
        let loc = |x| Location::new(f0, GridPos::new(x, 0));
        let map = HospitalMap::single(FloorBuilder::new(f0, 10, 1).build()).with_rooms(vec![Room {
            id:    RoomId(0),
            name:  "Ward 3".into(),
            floor: f0,
            min:   GridPos::new(7, 0),
            max:   GridPos::new(9, 0),
        }]);
        let config = SimConfig {
            total_ticks,
            snapshot_interval_ticks: 10,
            metrics_interval_ticks: 10,
            ..SimConfig::default()
        };

        let mut ids = IdAllocator::new();
        let fleet = FleetBuilder::new().agent(AgentSpec::new("porter", loc(0))).build(&mut ids).unwrap();
        let mut sim = SimBuilder::new(config, map, fleet, GreedyDispatcher::new(AStarPathfinder), AStarPathfinder)
            .ids(ids)
            .build()
            .unwrap();
        sim.submit_job(
            JobRequest::new(loc(9), ItemSpec::new("saline", 1, 2.0), Priority::Emergency).service(2.0, 2.0),
        )
        .unwrap();
        assert_eq!(sim.tick(), Tick(0));
        assert_eq!(sim.now(), SimTime::ZERO);
        sim
    }
}

// ── CSV tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::fixtures::{corridor_sim, event_row, metrics_row, snap_row};
    use crate::csv::{CsvWriter, EVENT_HEADER, METRICS_HEADER, SNAPSHOT_HEADER};
    use crate::observer::SimOutputObserver;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn read(dir: &TempDir, file: &str) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    fn headers(dir: &TempDir, file: &str) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("agent_snapshots.csv").exists());
        assert!(dir.path().join("metric_summaries.csv").exists());
        assert!(dir.path().join("events.csv").exists());
    }

    #[test]
    fn missing_directory_rejected() {
        let dir = tmp();
        let missing = dir.path().join("not-there");
        assert!(matches!(
            CsvWriter::new(&missing),
            Err(crate::OutputError::NotADirectory(p)) if p == missing
        ));
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(headers(&dir, "agent_snapshots.csv"), SNAPSHOT_HEADER);
        assert_eq!(headers(&dir, "metric_summaries.csv"), METRICS_HEADER);
        assert_eq!(headers(&dir, "events.csv"), EVENT_HEADER);
    }

    #[test]
    fn csv_snapshot_fields() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 5), snap_row(1, 5), snap_row(2, 5)]).unwrap();
        w.finish().unwrap();

        let rows = read(&dir, "agent_snapshots.csv");
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "5"); // tick
        assert_eq!(&rows[0][1], "500"); // time_ms
        assert_eq!(&rows[1][2], "1"); // agent_id
        assert_eq!(&rows[1][3], "cart-1");
        assert_eq!(&rows[2][5], "2"); // x
        assert_eq!(&rows[0][8], "87.50"); // battery_pct
        assert_eq!(&rows[0][10], ""); // no job
        assert_eq!(&rows[0][11], "Ward 3");
    }

    #[test]
    fn csv_metrics_fields() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_metrics(&metrics_row(30)).unwrap();
        w.finish().unwrap();

        let rows = read(&dir, "metric_summaries.csv");
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "30");
        assert_eq!(&rows[0][2], "4.500"); // energy_wh
        assert_eq!(&rows[0][3], "1.250"); // co2_g
        assert_eq!(&rows[0][6], "9"); // cells_moved
        assert_eq!(&rows[0][10], "100.0"); // on_time_pct
    }

    #[test]
    fn csv_event_optional_ids() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_events(&[event_row(1, Some(4)), event_row(2, None)]).unwrap();
        w.finish().unwrap();

        let rows = read(&dir, "events.csv");
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "job_completed");
        assert_eq!(&rows[0][4], "4");
        assert_eq!(&rows[1][4], "");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_empty_batches_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[]).unwrap();
        w.write_events(&[]).unwrap();
    }

    #[test]
    fn integration_csv() {
        let mut sim = corridor_sim(150);
        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = SimOutputObserver::new(writer);
        sim.run(&mut obs);
        assert!(obs.take_error().is_none(), "no write errors expected");

        // Interval 10 over 150 ticks → 15 pushes, one cart.
        let snaps = read(&dir, "agent_snapshots.csv");
        assert_eq!(snaps.len(), 15);
        assert_eq!(read(&dir, "metric_summaries.csv").len(), 15);

        // Delivered at 13.1 s, standing in the ward from then on.
        let last = snaps.last().unwrap();
        assert_eq!(&last[5], "9");
        assert_eq!(&last[11], "Ward 3");
        assert_eq!(&snaps[0][11], "");

        let events = read(&dir, "events.csv");
        let kinds: Vec<&str> = events.iter().map(|r| r.get(2).unwrap()).collect();
        assert_eq!(kinds.first(), Some(&"replan_completed"));
        assert!(kinds.contains(&"job_completed"));

        let metrics = read(&dir, "metric_summaries.csv");
        assert_eq!(&metrics.last().unwrap()[8], "1"); // delivered_on_time
    }

    #[test]
    fn observer_finish_flushes_when_stepping() {
        use wc_sim::SimObserver;

        let mut sim = corridor_sim(150);
        let dir = tmp();
        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap());
        for _ in 0..10 {
            sim.step_with(&mut obs);
        }
        obs.on_sim_end(sim.tick());
        assert!(obs.take_error().is_none());
        assert_eq!(read(&dir, "agent_snapshots.csv").len(), 1);
        assert_eq!(read(&dir, "events.csv").len(), 1);
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use super::fixtures::{corridor_sim, event_row, metrics_row, snap_row};
    use crate::observer::SimOutputObserver;
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn count(dir: &TempDir, table: &str) -> i64 {
        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0)).unwrap()
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_snapshot_count() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 1), snap_row(1, 1), snap_row(2, 1)]).unwrap();
        w.finish().unwrap();
        assert_eq!(count(&dir, "agent_snapshots"), 3);
    }

    #[test]
    fn sqlite_missing_job_is_null() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 1)]).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (job, room): (Option<i64>, Option<String>) = conn
            .query_row("SELECT job_id, room FROM agent_snapshots WHERE agent_id = 0", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(job, None);
        assert_eq!(room.as_deref(), Some("Ward 3"));
    }

    #[test]
    fn sqlite_metrics_row() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_metrics(&metrics_row(7)).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (tick, cells, on_time): (i64, i64, f64) = conn
            .query_row(
                "SELECT tick, cells_moved, on_time_pct FROM metric_summaries WHERE tick = 7",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(tick, 7);
        assert_eq!(cells, 9);
        assert_eq!(on_time, 100.0);
    }

    #[test]
    fn sqlite_events() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_events(&[event_row(1, Some(3)), event_row(1, None)]).unwrap();
        w.finish().unwrap();
        assert_eq!(count(&dir, "events"), 2);
    }

    #[test]
    fn integration_sqlite() {
        let mut sim = corridor_sim(60);
        let dir = tmp();
        let mut obs = SimOutputObserver::new(SqliteWriter::new(dir.path()).unwrap());
        sim.run(&mut obs);
        assert!(obs.take_error().is_none());
        assert_eq!(count(&dir, "agent_snapshots"), 6);
        assert_eq!(count(&dir, "metric_summaries"), 6);
        assert!(count(&dir, "events") >= 1);
    }
}

// ── Parquet tests ─────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "parquet"))]
mod parquet_tests {
    use tempfile::TempDir;

    use arrow::datatypes::DataType;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use super::fixtures::{event_row, metrics_row, snap_row};
    use crate::parquet::ParquetWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn rows_in(dir: &TempDir, file: &str) -> usize {
        let f = std::fs::File::open(dir.path().join(file)).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(f).unwrap().build().unwrap();
        reader.map(|b| b.unwrap().num_rows()).sum()
    }

    #[test]
    fn parquet_files_created() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert!(dir.path().join("agent_snapshots.parquet").exists());
        assert!(dir.path().join("metric_summaries.parquet").exists());
        assert!(dir.path().join("events.parquet").exists());
    }

    #[test]
    fn parquet_round_trip_counts() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 2), snap_row(1, 2)]).unwrap();
        w.write_metrics(&metrics_row(2)).unwrap();
        w.write_metrics(&metrics_row(4)).unwrap();
        w.write_events(&[event_row(2, None)]).unwrap();
        w.finish().unwrap();

        assert_eq!(rows_in(&dir, "agent_snapshots.parquet"), 2);
        assert_eq!(rows_in(&dir, "metric_summaries.parquet"), 2);
        assert_eq!(rows_in(&dir, "events.parquet"), 1);
    }

    #[test]
    fn parquet_optional_columns_nullable() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 0)]).unwrap();
        w.finish().unwrap();

        let f = std::fs::File::open(dir.path().join("agent_snapshots.parquet")).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(f).unwrap();
        let schema = builder.schema().clone();

        let job = schema.field_with_name("job_id").unwrap();
        assert!(job.is_nullable());
        assert_eq!(*job.data_type(), DataType::UInt32);
        let battery = schema.field_with_name("battery_pct").unwrap();
        assert_eq!(*battery.data_type(), DataType::Float64);
    }

    #[test]
    fn parquet_finish_required() {
        let dir = tmp();
        {
            let mut w = ParquetWriter::new(dir.path()).unwrap();
            w.write_snapshots(&[snap_row(0, 0)]).unwrap();
            // Dropped without finish(): no footer.
        }
        let f = std::fs::File::open(dir.path().join("agent_snapshots.parquet")).unwrap();
        assert!(ParquetRecordBatchReaderBuilder::try_new(f).is_err());
    }
}
