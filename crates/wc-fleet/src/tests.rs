//! Unit tests for wc-fleet.

#[cfg(test)]
mod helpers {
    use wc_core::{FloorId, GridPos, IdAllocator, Location};

    use crate::{AgentSpec, Fleet, FleetBuilder, Pool};

    pub fn loc(x: i32, y: i32) -> Location {
        Location::new(FloorId(0), GridPos::new(x, y))
    }

    pub fn two_carts() -> Fleet {
        let mut ids = IdAllocator::new();
        FleetBuilder::new()
            .agent(AgentSpec::new("alpha", loc(0, 0)).pool(Pool::Urgent).access(["ICU"]))
            .agent(AgentSpec::new("bravo", loc(3, 3)).payload_limit(20.0))
            .build(&mut ids)
            .unwrap()
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use wc_core::{AgentId, IdAllocator};

    use super::helpers::{loc, two_carts};
    use crate::{AgentSpec, AgentStatus, FleetBuilder, FleetError, Pool};

    #[test]
    fn ids_follow_roster_order() {
        let fleet = two_carts();
        assert_eq!(fleet.ids().collect::<Vec<_>>(), vec![AgentId(0), AgentId(1)]);
        let a = fleet.get(AgentId(0)).unwrap();
        assert_eq!(a.name, "alpha");
        assert_eq!(a.pool, Pool::Urgent);
        assert!(a.access.contains("ICU"));
        assert_eq!(a.status, AgentStatus::Idle);
        assert_eq!(a.payload, 0.0);
    }

    #[test]
    fn invalid_spec_allocates_nothing() {
        let mut ids = IdAllocator::new();
        let err = FleetBuilder::new()
            .agent(AgentSpec::new("ok", loc(0, 0)))
            .agent(AgentSpec::new("overcharged", loc(0, 0)).battery(120.0))
            .build(&mut ids)
            .unwrap_err();
        assert!(matches!(err, FleetError::InvalidAgent { ref name, .. } if name == "overcharged"));
        assert_eq!(ids.next_agent(), AgentId(0));
    }

    #[test]
    fn negative_speed_rejected() {
        let mut ids = IdAllocator::new();
        let res = FleetBuilder::new()
            .agent(AgentSpec::new("reverse", loc(0, 0)).speed(-1.0))
            .build(&mut ids);
        assert!(res.is_err());
    }

    #[test]
    fn non_finite_figures_rejected() {
        for spec in [
            AgentSpec::new("warp", loc(0, 0)).speed(f64::INFINITY),
            AgentSpec::new("leaky", loc(0, 0)).drain_per_cell(f64::NAN),
            AgentSpec::new("bottomless", loc(0, 0)).payload_limit(f64::INFINITY),
        ] {
            let res = FleetBuilder::new().agent(spec).build(&mut IdAllocator::new());
            assert!(matches!(res, Err(FleetError::InvalidAgent { .. })));
        }
    }
}

// ── Point mutators ────────────────────────────────────────────────────────────

#[cfg(test)]
mod mutators {
    use wc_core::{AgentId, JobId};

    use super::helpers::{loc, two_carts};
    use crate::{AgentStatus, FleetError};

    #[test]
    fn battery_never_leaves_bounds() {
        let mut fleet = two_carts();
        let id = AgentId(0);
        assert_eq!(fleet.drain_battery(id, 250.0).unwrap(), 0.0);
        assert_eq!(fleet.drain_battery(id, 1.0).unwrap(), 0.0);
        assert_eq!(fleet.charge_battery(id, 40.0).unwrap(), 40.0);
        assert_eq!(fleet.charge_battery(id, 500.0).unwrap(), 100.0);
        // Negative amounts are no-ops rather than reversals.
        assert_eq!(fleet.drain_battery(id, -10.0).unwrap(), 100.0);
    }

    #[test]
    fn payload_limit_enforced() {
        let mut fleet = two_carts();
        let id = AgentId(1);
        fleet.set_payload(id, 15.0).unwrap();
        let err = fleet.set_payload(id, 25.0).unwrap_err();
        assert_eq!(err, FleetError::PayloadExceeded { agent: id, payload: 25.0, limit: 20.0 });
        assert_eq!(fleet.get(id).unwrap().payload, 15.0);
        fleet.set_payload(id, -3.0).unwrap();
        assert_eq!(fleet.get(id).unwrap().payload, 0.0);
    }

    #[test]
    fn job_assignment_round_trip() {
        let mut fleet = two_carts();
        let id = AgentId(1);
        fleet.assign_job(id, JobId(7)).unwrap();
        assert!(!fleet.get(id).unwrap().is_free());
        assert_eq!(fleet.clear_job(id).unwrap(), Some(JobId(7)));
        assert_eq!(fleet.clear_job(id).unwrap(), None);
        assert!(fleet.get(id).unwrap().is_free());
    }

    #[test]
    fn position_and_status() {
        let mut fleet = two_carts();
        fleet.set_position(AgentId(0), loc(5, 1)).unwrap();
        fleet.set_status(AgentId(0), AgentStatus::Moving).unwrap();
        let a = fleet.get(AgentId(0)).unwrap();
        assert_eq!(a.location, loc(5, 1));
        assert!(!a.is_free());
    }

    #[test]
    fn unknown_agent_is_an_error() {
        let mut fleet = two_carts();
        let ghost = AgentId(9);
        assert_eq!(fleet.set_status(ghost, AgentStatus::Idle), Err(FleetError::AgentNotFound(ghost)));
        assert!(fleet.drain_battery(ghost, 1.0).is_err());
        assert!(fleet.require(ghost).is_err());
    }
}

// ── Roster ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod roster {
    use wc_core::AgentId;

    use super::helpers::two_carts;
    use crate::{Fleet, FleetError};

    #[test]
    fn duplicate_ids_rejected() {
        let mut fleet = two_carts();
        let dup = fleet.get(AgentId(0)).unwrap().clone();
        assert_eq!(fleet.push(dup), Err(FleetError::DuplicateAgent(AgentId(0))));
        assert_eq!(fleet.len(), 2);
    }

    #[test]
    fn remove_preserves_order() {
        let mut fleet = two_carts();
        let mut extra = fleet.get(AgentId(1)).unwrap().clone();
        extra.id = AgentId(2);
        fleet.push(extra).unwrap();
        fleet.remove(AgentId(1)).unwrap();
        assert_eq!(fleet.ids().collect::<Vec<_>>(), vec![AgentId(0), AgentId(2)]);
    }

    #[test]
    fn largest_payload_limit() {
        assert_eq!(two_carts().max_payload_limit(), Some(50.0));
        assert_eq!(Fleet::new().max_payload_limit(), None);
    }

    #[test]
    fn validate_built_agents() {
        let fleet = two_carts();
        for a in fleet.iter() {
            assert_eq!(a.validate(), Ok(()));
        }
    }

    #[test]
    fn validate_rejects_overcharged_agent() {
        let mut a = two_carts().get(AgentId(0)).unwrap().clone();
        a.battery = a.max_battery * 2.5;
        assert!(matches!(a.validate(), Err(FleetError::InvalidAgent { ref name, .. }) if name == "alpha"));
    }

    #[test]
    fn validate_rejects_overloaded_agent() {
        let mut a = two_carts().get(AgentId(0)).unwrap().clone();
        a.payload = a.payload_limit + 1.0;
        assert!(a.validate().is_err());
        a.payload = 0.0;
        a.speed = f64::NAN;
        assert!(a.validate().is_err());
    }

    #[test]
    fn battery_percent() {
        let mut a = two_carts().get(AgentId(0)).unwrap().clone();
        a.max_battery = 200.0;
        a.battery = 50.0;
        assert!((a.battery_pct() - 25.0).abs() < 1e-12);
        assert!((a.battery_at_pct(10.0) - 20.0).abs() < 1e-12);
    }
}
