//! Unit tests for wc-dispatch.

#[cfg(test)]
mod helpers {
    use wc_core::{FloorId, GridPos, IdAllocator, JobId, Location, SimConfig, SimTime};
    use wc_floor::{AStarPathfinder, FloorBuilder, HospitalMap};
    use wc_fleet::{AgentSpec, Fleet, FleetBuilder};
    use wc_jobs::{ItemSpec, Job, JobBoard, Priority};

    use crate::{DispatchContext, Dispatcher, GreedyDispatcher, Plan};

    pub const F0: FloorId = FloorId(0);

    pub fn loc(x: i32, y: i32) -> Location {
        Location::new(F0, GridPos::new(x, y))
    }

    /// 10×5 open ward with an ICU cell block at x = 7..=9, y = 0..=1.
    pub fn ward() -> HospitalMap {
        let mut b = FloorBuilder::new(F0, 10, 5);
        for x in 7..=9 {
            for y in 0..=1 {
                b.restrict(GridPos::new(x, y), ["ICU"]);
            }
        }
        HospitalMap::single(b.build())
    }

    pub fn fleet(specs: Vec<AgentSpec>) -> Fleet {
        let mut ids = IdAllocator::new();
        specs
            .into_iter()
            .fold(FleetBuilder::new(), FleetBuilder::agent)
            .build(&mut ids)
            .unwrap()
    }

    pub fn job(id: u32, priority: Priority, weight: f64, pickup: Option<Location>, dropoff: Location) -> Job {
        let mut j = Job::new(JobId(id), dropoff, ItemSpec::new("kit", 1, weight), priority, SimTime::ZERO)
            .with_service_secs(2.0, 2.0);
        j.pickup = pickup;
        j
    }

    pub fn plan(jobs: &JobBoard, fleet: &Fleet, map: &HospitalMap) -> Plan {
        let cfg = SimConfig::default();
        let ctx = DispatchContext::new(jobs, fleet, map, &cfg, SimTime::ZERO);
        GreedyDispatcher::new(AStarPathfinder).create_plan(&ctx)
    }
}

// ── Route construction ────────────────────────────────────────────────────────

#[cfg(test)]
mod route {
    use std::time::Duration;

    use wc_core::{GridPos, SimConfig, SimTime};
    use wc_floor::{AStarPathfinder, Pathfinder};
    use wc_jobs::{JobBoard, Priority};

    use super::helpers::{fleet, job, loc, plan, ward};
    use crate::{RouteAction, build_agent_plan};
    use wc_fleet::AgentSpec;

    #[test]
    fn steps_and_timing() {
        let map = ward();
        let floor = map.floor(super::helpers::F0).unwrap();
        let f = fleet(vec![AgentSpec::new("a", loc(0, 4))]);
        let agent = f.iter().next().unwrap();
        let j = job(0, Priority::Urgent, 1.0, Some(loc(2, 4)), loc(2, 2));

        let p1 = AStarPathfinder.find_path(floor, GridPos::new(0, 4), GridPos::new(2, 4), None).unwrap();
        let p2 = AStarPathfinder.find_path(floor, GridPos::new(2, 4), GridPos::new(2, 2), None).unwrap();
        let cfg = SimConfig::default();
        let ap = build_agent_plan(agent, &j, &p1, &p2, SimTime::ZERO, &cfg).unwrap();

        // 3 pickup-leg cells + pickup action + 2 new dropoff cells + dropoff action.
        assert_eq!(ap.steps.len(), 7);
        assert_eq!(ap.steps[3].action, Some(RouteAction::Pickup));
        assert_eq!(ap.steps[3].pos, GridPos::new(2, 4));
        assert_eq!(ap.steps[3].eta, SimTime::from_secs(2));
        assert_eq!(ap.steps[3].dwell, Duration::from_secs(2));
        assert_eq!(ap.steps[4].eta, SimTime::from_secs(5));
        let last = ap.steps.last().unwrap();
        assert_eq!(last.action, Some(RouteAction::Dropoff));
        assert_eq!(last.pos, GridPos::new(2, 2));
        assert_eq!(ap.finish_eta(), Some(SimTime::from_secs(8)));
        assert_eq!(ap.cells_moved(), 4);
        assert!((ap.energy_wh - 4.0 * cfg.energy_wh_per_cell).abs() < 1e-9);
        assert!(ap.validate().is_ok());
    }

    #[test]
    fn no_pickup_point_loads_in_place() {
        let map = ward();
        let f = fleet(vec![AgentSpec::new("a", loc(0, 4))]);
        let jobs: JobBoard = [job(0, Priority::Urgent, 1.0, None, loc(3, 4))].into_iter().collect();
        let p = plan(&jobs, &f, &map);
        let ap = &p.agent_plans[0];
        assert_eq!(ap.steps[0].pos, GridPos::new(0, 4));
        assert_eq!(ap.steps[1].action, Some(RouteAction::Pickup));
        assert_eq!(ap.steps[1].pos, GridPos::new(0, 4));
        assert_eq!(ap.cells_moved(), 3);
    }

    #[test]
    fn step_duration_edges() {
        use crate::step_duration;
        assert_eq!(step_duration(2.0), Some(Duration::from_millis(500)));
        assert_eq!(step_duration(0.0), None);
        assert_eq!(step_duration(f64::INFINITY), None);
        assert_eq!(step_duration(f64::NAN), None);
        // One cell would take longer than any Duration can hold.
        assert_eq!(step_duration(1e-25), None);
    }

    #[test]
    fn unusable_speed_is_an_error() {
        let map = ward();
        let floor = map.floor(super::helpers::F0).unwrap();
        let f = fleet(vec![AgentSpec::new("slow", loc(0, 4)).speed(1e-25)]);
        let agent = f.iter().next().unwrap();
        let j = job(0, Priority::Urgent, 1.0, None, loc(2, 4));
        let p = AStarPathfinder.find_path(floor, GridPos::new(0, 4), GridPos::new(2, 4), None).unwrap();
        let solo = AStarPathfinder.find_path(floor, GridPos::new(0, 4), GridPos::new(0, 4), None).unwrap();

        let err = build_agent_plan(agent, &j, &solo, &p, SimTime::ZERO, &SimConfig::default()).unwrap_err();
        assert!(matches!(err, crate::DispatchError::UntimedRoute { .. }));
    }

    #[test]
    fn unusable_speed_candidate_is_skipped() {
        let map = ward();
        let f = fleet(vec![
            AgentSpec::new("crawler", loc(1, 4)).speed(1e-25),
            AgentSpec::new("normal", loc(5, 4)),
        ]);
        let jobs: JobBoard = [job(0, Priority::Urgent, 1.0, None, loc(2, 4))].into_iter().collect();
        let p = plan(&jobs, &f, &map);
        assert_eq!(p.agent_plans.len(), 1);
        assert_eq!(p.agent_plans[0].agent, f.as_slice()[1].id);

        let only_crawler = fleet(vec![AgentSpec::new("crawler", loc(1, 4)).speed(1e-25)]);
        let p = plan(&jobs, &only_crawler, &map);
        assert!(p.agent_plans.is_empty());
        assert_eq!(p.unassigned.len(), 1);
        assert_eq!(p.etas[0].reason, crate::UnassignedReason::NoViableRoute);
    }
}

// ── Greedy assignment ─────────────────────────────────────────────────────────

#[cfg(test)]
mod greedy {
    use wc_core::{AgentId, JobId};
    use wc_fleet::{AgentSpec, AgentStatus, Pool};
    use wc_jobs::{JobBoard, Priority};

    use super::helpers::{fleet, job, loc, plan, ward};
    use crate::UnassignedReason;

    #[test]
    fn nearest_agent_wins() {
        let map = ward();
        let f = fleet(vec![
            AgentSpec::new("far", loc(0, 0)),
            AgentSpec::new("near", loc(5, 4)),
        ]);
        let jobs: JobBoard = [job(0, Priority::Urgent, 1.0, Some(loc(6, 4)), loc(6, 2))].into_iter().collect();
        let p = plan(&jobs, &f, &map);
        assert_eq!(p.assignments().collect::<Vec<_>>(), vec![(JobId(0), AgentId(1))]);
        assert!(p.unassigned.is_empty());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn ties_go_to_roster_order() {
        let map = ward();
        let f = fleet(vec![AgentSpec::new("left", loc(2, 2)), AgentSpec::new("right", loc(6, 2))]);
        let jobs: JobBoard = [job(0, Priority::Urgent, 1.0, None, loc(4, 2))].into_iter().collect();
        let p = plan(&jobs, &f, &map);
        assert_eq!(p.assignments().next(), Some((JobId(0), AgentId(0))));
    }

    #[test]
    fn identical_inputs_identical_plans() {
        let map = ward();
        let f = fleet(vec![
            AgentSpec::new("a", loc(0, 0)),
            AgentSpec::new("b", loc(9, 4)),
            AgentSpec::new("c", loc(4, 4)),
        ]);
        let jobs: JobBoard = [
            job(0, Priority::NonUrgent, 1.0, Some(loc(1, 1)), loc(5, 3)),
            job(1, Priority::Emergency, 1.0, Some(loc(8, 4)), loc(3, 3)),
            job(2, Priority::Urgent, 1.0, None, loc(2, 4)),
        ]
        .into_iter()
        .collect();
        let a = plan(&jobs, &f, &map);
        let b = plan(&jobs, &f, &map);
        assert_eq!(a.assignments().collect::<Vec<_>>(), b.assignments().collect::<Vec<_>>());
        assert_eq!(a, b);
    }

    #[test]
    fn one_job_per_agent_per_pass() {
        let map = ward();
        let f = fleet(vec![AgentSpec::new("solo", loc(0, 4))]);
        let jobs: JobBoard = [
            job(0, Priority::Urgent, 1.0, None, loc(1, 4)),
            job(1, Priority::Immediate, 1.0, None, loc(2, 4)),
        ]
        .into_iter()
        .collect();
        let p = plan(&jobs, &f, &map);
        // The Immediate job is served first and claims the only cart.
        assert_eq!(p.assignments().collect::<Vec<_>>(), vec![(JobId(1), AgentId(0))]);
        assert_eq!(p.unassigned, vec![JobId(0)]);
        assert_eq!(p.etas[0].reason, UnassignedReason::NoAvailableAgent);
    }

    #[test]
    fn urgent_jobs_prefer_urgent_pool() {
        let map = ward();
        let f = fleet(vec![
            AgentSpec::new("general", loc(3, 3)),
            AgentSpec::new("rapid", loc(9, 4)).pool(Pool::Urgent),
        ]);
        let jobs: JobBoard = [job(0, Priority::Emergency, 1.0, None, loc(3, 4))].into_iter().collect();
        let p = plan(&jobs, &f, &map);
        assert_eq!(p.assignments().next(), Some((JobId(0), AgentId(1))));
    }

    #[test]
    fn urgent_job_borrows_general_pool() {
        let map = ward();
        let f = fleet(vec![AgentSpec::new("general", loc(3, 3))]);
        let jobs: JobBoard = [job(0, Priority::Immediate, 1.0, None, loc(3, 4))].into_iter().collect();
        assert_eq!(plan(&jobs, &f, &map).assignments().count(), 1);
    }

    #[test]
    fn routine_job_falls_back_to_any_agent() {
        let map = ward();
        let f = fleet(vec![AgentSpec::new("rapid", loc(3, 3)).pool(Pool::Urgent)]);
        let jobs: JobBoard = [job(0, Priority::NonUrgent, 1.0, None, loc(3, 4))].into_iter().collect();
        assert_eq!(plan(&jobs, &f, &map).assignments().count(), 1);
    }

    #[test]
    fn routine_job_stays_in_own_pool_when_possible() {
        let map = ward();
        let f = fleet(vec![
            AgentSpec::new("rapid", loc(3, 3)).pool(Pool::Urgent),
            AgentSpec::new("general", loc(0, 0)),
        ]);
        let jobs: JobBoard = [job(0, Priority::SemiUrgent, 1.0, None, loc(3, 4))].into_iter().collect();
        assert_eq!(plan(&jobs, &f, &map).assignments().next(), Some((JobId(0), AgentId(1))));
    }

    #[test]
    fn capacity_filter() {
        let map = ward();
        let f = fleet(vec![
            AgentSpec::new("small", loc(3, 3)).payload_limit(5.0),
            AgentSpec::new("big", loc(0, 0)).payload_limit(80.0),
        ]);
        let jobs: JobBoard = [job(0, Priority::Urgent, 30.0, None, loc(3, 4))].into_iter().collect();
        assert_eq!(plan(&jobs, &f, &map).assignments().next(), Some((JobId(0), AgentId(1))));

        let small = fleet(vec![AgentSpec::new("small", loc(3, 3)).payload_limit(5.0)]);
        let p = plan(&jobs, &small, &map);
        assert_eq!(p.etas[0].reason, UnassignedReason::NoCapacity);
    }

    #[test]
    fn access_profile_required_for_icu_dropoff() {
        let map = ward();
        let f = fleet(vec![
            AgentSpec::new("porter", loc(6, 0)),
            AgentSpec::new("icu-cart", loc(0, 4)).access(["ICU"]),
        ]);
        let jobs: JobBoard = [job(0, Priority::Urgent, 1.0, None, loc(8, 0))].into_iter().collect();
        assert_eq!(plan(&jobs, &f, &map).assignments().next(), Some((JobId(0), AgentId(1))));

        let porter_only = fleet(vec![AgentSpec::new("porter", loc(6, 0))]);
        let p = plan(&jobs, &porter_only, &map);
        assert_eq!(p.etas[0].reason, UnassignedReason::NoViableRoute);
    }

    #[test]
    fn battery_gates() {
        let map = ward();
        // 20 % exactly is not enough to be considered.
        let flat = fleet(vec![AgentSpec::new("flat", loc(0, 4)).battery(20.0)]);
        let jobs: JobBoard = [job(0, Priority::Urgent, 1.0, None, loc(9, 4))].into_iter().collect();
        assert_eq!(plan(&jobs, &flat, &map).etas[0].reason, UnassignedReason::NoAvailableAgent);

        // 25 % but a thirsty cart: 9 cells × 2 = 18 would leave 7 % < 10 % reserve.
        let thirsty = fleet(vec![AgentSpec::new("thirsty", loc(0, 4)).battery(25.0).drain_per_cell(2.0)]);
        assert_eq!(plan(&jobs, &thirsty, &map).etas[0].reason, UnassignedReason::NoViableRoute);

        // Same cart with 30 %: leaves 12 %.
        let ok = fleet(vec![AgentSpec::new("ok", loc(0, 4)).battery(30.0).drain_per_cell(2.0)]);
        assert_eq!(plan(&jobs, &ok, &map).assignments().count(), 1);
    }

    #[test]
    fn busy_agents_skipped() {
        let map = ward();
        let mut f = fleet(vec![AgentSpec::new("busy", loc(0, 4))]);
        f.set_status(AgentId(0), AgentStatus::Charging).unwrap();
        let jobs: JobBoard = [job(0, Priority::Urgent, 1.0, None, loc(1, 4))].into_iter().collect();
        assert!(plan(&jobs, &f, &map).agent_plans.is_empty());
    }

    #[test]
    fn other_floor_not_attempted() {
        let map = ward();
        let mut f = fleet(vec![AgentSpec::new("upstairs", loc(0, 0))]);
        f.set_position(AgentId(0), wc_core::Location::new(wc_core::FloorId(1), wc_core::GridPos::new(0, 0)))
            .unwrap();
        let jobs: JobBoard = [job(0, Priority::Urgent, 1.0, None, loc(1, 4))].into_iter().collect();
        assert_eq!(plan(&jobs, &f, &map).etas[0].reason, UnassignedReason::NoAgentOnFloor);
    }

    #[test]
    fn likely_late_flag() {
        let map = ward();
        let f = fleet(vec![]);
        let soon = job(0, Priority::Immediate, 1.0, None, loc(1, 1)); // due at 120 s
        let later = job(1, Priority::NonUrgent, 1.0, None, loc(1, 1)); // due at 3600 s
        let jobs: JobBoard = [soon, later].into_iter().collect();
        let p = plan(&jobs, &f, &map);
        assert!(p.etas.iter().find(|e| e.job == JobId(0)).unwrap().likely_late);
        assert!(!p.etas.iter().find(|e| e.job == JobId(1)).unwrap().likely_late);
    }

    #[test]
    fn only_queued_jobs_considered() {
        let map = ward();
        let f = fleet(vec![AgentSpec::new("a", loc(0, 4))]);
        let mut jobs: JobBoard = [job(0, Priority::Urgent, 1.0, None, loc(1, 4))].into_iter().collect();
        jobs.mark_infeasible(JobId(0)).unwrap();
        let p = plan(&jobs, &f, &map);
        assert!(p.agent_plans.is_empty());
        assert!(p.unassigned.is_empty());
    }

    #[test]
    fn estimated_metrics_sum_routes() {
        let map = ward();
        let f = fleet(vec![AgentSpec::new("a", loc(0, 4)), AgentSpec::new("b", loc(0, 0))]);
        let jobs: JobBoard = [
            job(0, Priority::Urgent, 1.0, None, loc(4, 4)),
            job(1, Priority::Urgent, 1.0, None, loc(0, 3)),
        ]
        .into_iter()
        .collect();
        let p = plan(&jobs, &f, &map);
        let sum: f64 = p.agent_plans.iter().map(|a| a.energy_wh).sum();
        assert_eq!(p.agent_plans.len(), 2);
        assert!((p.metrics.estimated_energy_wh - sum).abs() < 1e-9);
        assert!(p.metrics.estimated_co2_g > 0.0);
    }
}

// ── Feasibility ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod feasibility {
    use wc_core::{FloorId, GridPos, Location};
    use wc_floor::{FloorBuilder, HospitalMap};
    use wc_fleet::AgentSpec;
    use wc_jobs::Priority;

    use super::helpers::{F0, fleet, job, loc};
    use crate::{InfeasibleReason, check_feasibility};

    fn map() -> HospitalMap {
        let mut b = FloorBuilder::new(F0, 5, 5);
        b.obstacle(GridPos::new(4, 4)).quarantine(GridPos::new(0, 4));
        b.restrict(GridPos::new(2, 2), ["ICU"]);
        HospitalMap::single(b.build())
    }

    #[test]
    fn reasons_in_order() {
        let m = map();
        let f = fleet(vec![AgentSpec::new("a", loc(0, 0)).payload_limit(10.0)]);

        let missing = job(0, Priority::Urgent, 1.0, None, Location::new(FloorId(3), GridPos::new(0, 0)));
        assert_eq!(check_feasibility(&missing, &f, &m), Err(InfeasibleReason::FloorMissing(FloorId(3))));

        let wall = job(1, Priority::Urgent, 1.0, None, loc(4, 4));
        assert_eq!(check_feasibility(&wall, &f, &m), Err(InfeasibleReason::DropoffBlocked(GridPos::new(4, 4))));

        let heavy = job(2, Priority::Urgent, 11.0, None, loc(1, 1));
        assert_eq!(check_feasibility(&heavy, &f, &m), Err(InfeasibleReason::TooHeavy { weight_kg: 11.0 }));

        let bad_pickup = job(3, Priority::Urgent, 1.0, Some(loc(0, 4)), loc(1, 1));
        assert_eq!(check_feasibility(&bad_pickup, &f, &m), Err(InfeasibleReason::PickupBlocked(GridPos::new(0, 4))));

        let outside = job(4, Priority::Urgent, 1.0, None, loc(7, 7));
        assert!(check_feasibility(&outside, &f, &m).is_err());
    }

    #[test]
    fn restricted_dropoff_is_feasible() {
        let f = fleet(vec![AgentSpec::new("a", loc(0, 0))]);
        let icu = job(0, Priority::Urgent, 1.0, Some(loc(1, 1)), loc(2, 2));
        assert_eq!(check_feasibility(&icu, &f, &map()), Ok(()));
    }

    #[test]
    fn empty_fleet_cannot_carry() {
        let f = fleet(vec![]);
        let j = job(0, Priority::Urgent, 0.5, None, loc(1, 1));
        assert!(matches!(check_feasibility(&j, &f, &map()), Err(InfeasibleReason::TooHeavy { .. })));
    }
}
