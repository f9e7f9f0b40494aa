//! ward-rounds: one simulated hour of delivery carts on a hospital wing.
//!
//! Loads a scenario (the built-in east wing, or a JSON document given as the
//! first argument), adds the morning CSV orders and a seeded demand stream,
//! raises an ICU triage case ten minutes in, and writes CSV output to
//! `output/ward-rounds/`.
//!
//! Logging goes through `tracing`; set `RUST_LOG=debug` for dispatch detail.

mod ward;

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use wc_core::{SimConfig, SimTime, Tick};
use wc_dispatch::GreedyDispatcher;
use wc_floor::{AStarPathfinder, HospitalMap};
use wc_fleet::Fleet;
use wc_jobs::{DemandProfile, ItemSpec, load_jobs_reader};
use wc_output::{CsvWriter, OutputWriter, SimOutputObserver};
use wc_sim::{Scenario, SessionMetrics, SimEvent, SimObserver};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:             u64 = 42;
const SIM_MINUTES:      u64 = 60;
const TRIAGE_AT_MINUTE: u64 = 10;
const JOBS_PER_HOUR:    f64 = 40.0;
const OUTPUT_DIR:       &str = "output/ward-rounds";

fn ticks_for_minutes(minutes: u64, config: &SimConfig) -> u64 {
    minutes * 60_000 / config.base_slice_ms
}

// ── Observer wrapper to count rows ───────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:         SimOutputObserver<W>,
    snapshot_rows: usize,
    metrics_rows:  usize,
    event_rows:    usize,
    deliveries:    usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, snapshot_rows: 0, metrics_rows: 0, event_rows: 0, deliveries: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_event(&mut self, tick: Tick, now: SimTime, event: &SimEvent) {
        self.event_rows += 1;
        if matches!(event, SimEvent::JobCompleted { .. }) {
            self.deliveries += 1;
        }
        self.inner.on_event(tick, now, event);
    }

    fn on_tick_end(&mut self, tick: Tick, events: usize) {
        self.inner.on_tick_end(tick, events);
    }

    fn on_metrics(&mut self, tick: Tick, now: SimTime, metrics: &SessionMetrics) {
        self.metrics_rows += 1;
        self.inner.on_metrics(tick, now, metrics);
    }

    fn on_snapshot(&mut self, tick: Tick, now: SimTime, fleet: &Fleet, map: &HospitalMap) {
        self.snapshot_rows += fleet.len();
        self.inner.on_snapshot(tick, now, fleet, map);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    match path {
        Some(p) => Scenario::from_path(p).with_context(|| format!("loading {}", p.display())),
        None => {
            let config = SimConfig {
                seed: SEED,
                default_pickup_service_secs: 20.0,
                default_dropoff_service_secs: 20.0,
                snapshot_interval_ticks: 50,
                metrics_interval_ticks: 100,
                ..SimConfig::default()
            };
            ward::scenario(config)
        }
    }
}

/// Storage points to room centres, when the map has both.
fn demand_for(scenario: &Scenario) -> Option<DemandProfile> {
    let sources: Vec<_> = scenario.storage.iter().map(|s| s.location).collect();
    let destinations: Vec<_> = scenario
        .rooms
        .iter()
        .map(|r| wc_core::Location::new(r.floor, r.center()))
        .collect();
    if destinations.is_empty() {
        return None;
    }
    let items = vec![
        ItemSpec::new("linen", 6, 5.0),
        ItemSpec::new("meds", 1, 0.4),
        ItemSpec::new("IV fluids", 2, 2.0),
        ItemSpec::new("dressings", 10, 1.0),
    ];
    Some(DemandProfile::new(sources, destinations, items).rate(JOBS_PER_HOUR))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    let arg = std::env::args().nth(1).map(PathBuf::from);
    let mut scenario = load_scenario(arg.as_deref())?;
    println!("=== ward-rounds: {} ===", if scenario.name.is_empty() { "scenario" } else { scenario.name.as_str() });

    // 1. Morning orders from CSV, ids continuing after any in the document.
    let mut ids = wc_core::IdAllocator::resume_after(
        scenario.agents.iter().map(|a| a.id).max(),
        scenario.jobs.iter().map(|j| j.id).max(),
    );
    let morning = load_jobs_reader(Cursor::new(ward::MORNING_JOBS_CSV), &mut ids, &scenario.config)?;
    println!("Loaded {} morning orders", morning.len());
    scenario.jobs.extend(morning);

    // 2. Build.
    let demand = demand_for(&scenario);
    let config = scenario.config.clone();
    let mut builder = scenario
        .clone()
        .into_builder(GreedyDispatcher::new(AStarPathfinder), AStarPathfinder)?;
    if let Some(profile) = demand {
        builder = builder.demand(profile);
    }
    let mut sim = builder.build()?;
    println!(
        "Map: {} floor(s), {} charger(s), {} room(s)  |  Fleet: {} carts  |  Jobs: {}",
        sim.map.floors.len(),
        sim.map.chargers.len(),
        sim.map.rooms().len(),
        sim.fleet.len(),
        sim.jobs.len(),
    );

    // 3. Output.
    let out = Path::new(OUTPUT_DIR);
    std::fs::create_dir_all(out)?;
    Scenario::from_sim(&sim, scenario.name.clone()).write_path(&out.join("scenario.json"))?;
    let mut obs = CountingObserver::new(SimOutputObserver::new(CsvWriter::new(out)?));

    // 4. Run, with the triage case raised part-way.
    let total = ticks_for_minutes(SIM_MINUTES, &config);
    let triage_at = ticks_for_minutes(TRIAGE_AT_MINUTE, &config).min(total);
    let t0 = Instant::now();

    sim.start();
    sim.run_ticks(triage_at, &mut obs);
    if sim.triage.iter().any(|c| c.id == ward::ICU_TRIAGE) {
        let jobs = sim.activate_triage(ward::ICU_TRIAGE)?;
        info!(at = %sim.now(), jobs = jobs.len(), "triage case raised");
    }
    sim.run_ticks(total - triage_at, &mut obs);
    sim.stop();
    obs.on_sim_end(sim.tick());

    let elapsed = t0.elapsed();
    if let Some(e) = obs.inner.take_error() {
        warn!(%e, "output error");
    }

    // 5. Summary.
    let m = &sim.metrics;
    println!();
    println!("Simulated {} in {:.3} s wall time", sim.now(), elapsed.as_secs_f64());
    println!("  agent_snapshots.csv  : {} rows", obs.snapshot_rows);
    println!("  metric_summaries.csv : {} rows", obs.metrics_rows);
    println!("  events.csv           : {} rows ({} deliveries)", obs.event_rows, obs.deliveries);
    println!();

    println!("{:<8} {:<14} {:<12} {:>8} {:>8}", "Cart", "Status", "Where", "Battery", "Payload");
    println!("{}", "-".repeat(54));
    for a in sim.fleet.iter() {
        println!(
            "{:<8} {:<14} {:<12} {:>7.1}% {:>6.1}kg",
            a.name,
            a.status.as_str(),
            sim.map.describe(a.location),
            a.battery_pct(),
            a.payload,
        );
    }

    let summary = serde_json::json!({
        "scenario":           scenario.name,
        "sim_secs":           sim.now().as_secs_f64(),
        "jobs":               sim.jobs.len(),
        "delivered_on_time":  m.delivered_on_time,
        "delivered_late":     m.delivered_late,
        "on_time_pct":        m.on_time_pct(),
        "infeasible":         m.infeasible,
        "replans":            m.replans,
        "energy_wh":          m.energy_wh,
        "co2_g":              m.co2_g,
        "deadhead_pct":       m.deadhead_pct(),
        "idle_waiting_secs":  m.idle_waiting_secs,
        "idle_charging_secs": m.idle_charging_secs,
    });
    let text = serde_json::to_string_pretty(&summary)?;
    std::fs::write(out.join("summary.json"), &text)?;
    println!();
    println!("{text}");

    Ok(())
}
