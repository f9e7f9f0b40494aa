//! The built-in east-wing layout: one floor, two docks, pharmacy and supply
//! stores, four rooms and an ICU bay.

use anyhow::Result;

use wc_core::{ChargerId, FloorId, GridPos, IdAllocator, Location, RoomId, SimConfig, StagingId, TriageCaseId};
use wc_floor::{Charger, Connector, Room, StagingArea, StoragePoint};
use wc_fleet::{AgentSpec, FleetBuilder, Pool};
use wc_jobs::{ItemSpec, Priority, TriageCase, TriageItem};
use wc_sim::{FloorDoc, SCENARIO_VERSION, Scenario};

pub const FLOOR: FloorId = FloorId(0);

/// `C` dock, `S` store, `T` staging, `X` lift, `R` ICU bay.
const ROWS: [&str; 12] = [
    "########################",
    "#C....S.......#........#",
    "#.....S.......#...RRR..#",
    "#.............#...RRR..#",
    "#......................#",
    "#..####....####....##..#",
    "#..#..........#....#...#",
    "#..#..........#....#...#",
    "#..............T.......#",
    "#C...........X.........#",
    "#......................#",
    "########################",
];

pub fn at(x: i32, y: i32) -> Location {
    Location::new(FLOOR, GridPos::new(x, y))
}

fn room(id: u32, name: &str, min: (i32, i32), max: (i32, i32)) -> Room {
    Room {
        id:    RoomId(id),
        name:  name.into(),
        floor: FLOOR,
        min:   GridPos::new(min.0, min.1),
        max:   GridPos::new(max.0, max.1),
    }
}

pub const ICU_TRIAGE: TriageCaseId = TriageCaseId(1);

/// Sepsis on ICU bed 2: blood and antibiotics from pharmacy, fluids from
/// supplies.
fn sepsis_case() -> TriageCase {
    TriageCase {
        id:                   ICU_TRIAGE,
        label:                "sepsis, ICU bed 2".into(),
        priority:             Priority::Immediate,
        destination:          at(19, 2),
        deadline_offset_secs: Some(180.0),
        items:                vec![
            TriageItem { item: ItemSpec::new("O-neg blood", 2, 1.0), pickup: Some(at(6, 1)) },
            TriageItem { item: ItemSpec::new("antibiotics", 1, 0.3), pickup: Some(at(6, 1)) },
            TriageItem { item: ItemSpec::new("IV fluids", 4, 4.0), pickup: Some(at(6, 2)) },
        ],
    }
}

pub fn scenario(config: SimConfig) -> Result<Scenario> {
    let mut ids = IdAllocator::new();
    let fleet = FleetBuilder::new()
        .agent(AgentSpec::new("cart-1", at(2, 1)).pool(Pool::Urgent).access(["ICU"]).speed(1.5))
        .agent(AgentSpec::new("cart-2", at(2, 9)).pool(Pool::Urgent).access(["ICU"]))
        .agent(AgentSpec::new("cart-3", at(3, 4)))
        .agent(AgentSpec::new("cart-4", at(10, 10)).payload_limit(20.0).battery(35.0))
        .build(&mut ids)?;

    Ok(Scenario {
        version:    SCENARIO_VERSION,
        name:       "east wing".into(),
        config,
        floors:     vec![FloorDoc {
            id:                  FLOOR,
            name:                Some("East wing, level 0".into()),
            cell_size_m:         1.5,
            rows:                ROWS.iter().map(|r| r.to_string()).collect(),
            restricted_profiles: vec!["ICU".into()],
            zones:               Vec::new(),
        }],
        chargers:   vec![
            Charger { id: ChargerId(0), location: at(1, 1), charge_rate_per_sec: 1.0 },
            Charger { id: ChargerId(1), location: at(1, 9), charge_rate_per_sec: 0.5 },
        ],
        storage:    vec![
            StoragePoint { name: "Pharmacy".into(), location: at(6, 1) },
            StoragePoint { name: "Supplies".into(), location: at(6, 2) },
        ],
        staging:    vec![StagingArea { id: StagingId(0), name: "Bay T".into(), location: at(15, 8) }],
        connectors: vec![Connector { name: "Lift 1".into(), location: at(13, 9), links_to: Vec::new() }],
        rooms:      vec![
            room(0, "ICU", (18, 2), (20, 3)),
            room(1, "Ward A", (4, 6), (13, 7)),
            room(2, "Ward B", (20, 6), (22, 7)),
            room(3, "Emergency", (15, 9), (22, 10)),
        ],
        agents:     fleet.as_slice().to_vec(),
        jobs:       Vec::new(),
        triage:     vec![sepsis_case()],
    })
}

/// Morning top-up orders, loaded through the job CSV reader.
pub const MORNING_JOBS_CSV: &str = "\
pickup_floor,pickup_x,pickup_y,dropoff_floor,dropoff_x,dropoff_y,item_type,quantity,weight_kg,priority,created_secs,deadline_secs,pickup_service_secs,dropoff_service_secs
0,6,2,0,8,6,linen,10,8.0,non_urgent,0,,,
0,6,1,0,21,6,insulin,2,0.2,urgent,0,600,10,10
0,6,2,0,18,9,suture kits,6,1.2,semi_urgent,0,,,
,,,0,8,7,patient notes,1,0.5,non_urgent,0,,5,5
0,6,1,0,19,3,sedatives,3,0.4,emergency,0,240,10,10
";
