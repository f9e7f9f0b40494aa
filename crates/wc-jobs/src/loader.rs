//! CSV job loader.
//!
//! # CSV format
//!
//! One row per job.  Pickup columns may be left empty for jobs loaded at the
//! cart's position; `id`, `deadline_secs` and the service columns are
//! optional too.
//!
//! ```csv
//! id,pickup_floor,pickup_x,pickup_y,dropoff_floor,dropoff_x,dropoff_y,item_type,quantity,weight_kg,priority,created_secs,deadline_secs,pickup_service_secs,dropoff_service_secs
//! 0,0,1,1,0,8,3,blood,2,1.5,IMMEDIATE,0,120,20,20
//! 1,,,,0,5,5,linen,10,8.0,non_urgent,30,,,
//! ```
//!
//! Rows without an `id` get one from the allocator; rows with one are
//! reported to the allocator so later ids never collide.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use wc_core::{FloorId, GridPos, IdAllocator, JobId, Location, SimConfig, SimTime};

use crate::job::check_service_secs;
use crate::{ItemSpec, Job, JobError, JobResult, Priority};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct JobRecord {
    id:                   Option<u32>,
    pickup_floor:         Option<u16>,
    pickup_x:             Option<i32>,
    pickup_y:             Option<i32>,
    dropoff_floor:        u16,
    dropoff_x:            i32,
    dropoff_y:            i32,
    item_type:            String,
    quantity:             u32,
    weight_kg:            f64,
    priority:             String,
    created_secs:         f64,
    deadline_secs:        Option<f64>,
    pickup_service_secs:  Option<f64>,
    dropoff_service_secs: Option<f64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load jobs from a CSV file.
pub fn load_jobs_csv(path: &Path, ids: &mut IdAllocator, config: &SimConfig) -> JobResult<Vec<Job>> {
    let file = std::fs::File::open(path)?;
    load_jobs_reader(file, ids, config)
}

/// Like [`load_jobs_csv`] but accepts any `Read` source.
pub fn load_jobs_reader<R: Read>(
    reader: R,
    ids:    &mut IdAllocator,
    config: &SimConfig,
) -> JobResult<Vec<Job>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut jobs = Vec::new();

    for (line, result) in csv_reader.deserialize::<JobRecord>().enumerate() {
        let row = result.map_err(|e| JobError::Parse(e.to_string()))?;
        jobs.push(record_to_job(row, line + 2, ids, config)?);
    }

    debug!(count = jobs.len(), "loaded jobs from csv");
    Ok(jobs)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn record_to_job(
    r:      JobRecord,
    line:   usize,
    ids:    &mut IdAllocator,
    config: &SimConfig,
) -> JobResult<Job> {
    let priority: Priority = r
        .priority
        .parse()
        .map_err(|_| JobError::Parse(format!("line {line}: unknown priority {:?}", r.priority)))?;

    if !r.weight_kg.is_finite() || r.weight_kg < 0.0 {
        return Err(JobError::Parse(format!("line {line}: weight must be finite and non-negative")));
    }
    for (column, secs) in [("created_secs", Some(r.created_secs)), ("deadline_secs", r.deadline_secs)] {
        if secs.is_some_and(|s| !s.is_finite() || s < 0.0) {
            return Err(JobError::Parse(format!("line {line}: {column} must be finite and non-negative")));
        }
    }
    let pickup_service = r.pickup_service_secs.unwrap_or(config.default_pickup_service_secs);
    let dropoff_service = r.dropoff_service_secs.unwrap_or(config.default_dropoff_service_secs);
    for (column, secs) in [("pickup_service_secs", pickup_service), ("dropoff_service_secs", dropoff_service)] {
        check_service_secs(secs).map_err(|reason| JobError::Parse(format!("line {line}: {column}: {reason}")))?;
    }

    let pickup = match (r.pickup_floor, r.pickup_x, r.pickup_y) {
        (Some(f), Some(x), Some(y)) => Some(Location::new(FloorId(f), GridPos::new(x, y))),
        (None, None, None) => None,
        _ => {
            return Err(JobError::Parse(format!(
                "line {line}: pickup needs all of floor, x and y or none"
            )));
        }
    };

    let id = match r.id {
        Some(n) => {
            let id = JobId(n);
            ids.observe_job(id);
            id
        }
        None => ids.next_job(),
    };

    let created = SimTime::from_secs_f64(r.created_secs);
    let dropoff = Location::new(FloorId(r.dropoff_floor), GridPos::new(r.dropoff_x, r.dropoff_y));
    let mut job = Job::new(id, dropoff, ItemSpec::new(r.item_type, r.quantity, r.weight_kg), priority, created)
        .with_service_secs(pickup_service, dropoff_service);
    if let Some(deadline) = r.deadline_secs {
        job = job.with_deadline(SimTime::from_secs_f64(deadline));
    }
    job.pickup = pickup;
    Ok(job)
}
