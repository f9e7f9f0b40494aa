//! Unit tests for wc-jobs.

#[cfg(test)]
mod helpers {
    use wc_core::{FloorId, GridPos, JobId, Location, SimTime};

    use crate::{ItemSpec, Job, Priority};

    pub fn loc(x: i32, y: i32) -> Location {
        Location::new(FloorId(0), GridPos::new(x, y))
    }

    pub fn secs(s: u64) -> SimTime {
        SimTime::from_secs(s)
    }

    /// Job created at `created` with an absolute deadline.
    pub fn job(id: u32, priority: Priority, created: u64, deadline: u64) -> Job {
        Job::new(JobId(id), loc(1, 1), ItemSpec::new("gauze", 1, 1.0), priority, secs(created))
            .with_deadline(secs(deadline))
    }
}

// ── Priority & lifecycle enums ────────────────────────────────────────────────

#[cfg(test)]
mod enums {
    use crate::{JobState, Priority};

    #[test]
    fn tier_ranks() {
        let ranks: Vec<u32> = Priority::ALL.iter().map(|p| p.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4]);
        assert!(Priority::Immediate.is_urgent());
        assert!(Priority::Emergency.is_urgent());
        assert!(!Priority::Urgent.is_urgent());
    }

    #[test]
    fn priority_parses_loosely() {
        assert_eq!("semi-urgent".parse::<Priority>().unwrap(), Priority::SemiUrgent);
        assert_eq!(" IMMEDIATE ".parse::<Priority>().unwrap(), Priority::Immediate);
        assert!("whenever".parse::<Priority>().is_err());
    }

    #[test]
    fn lifecycle_edges() {
        use JobState::*;
        assert!(Queued.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Delivered));
        assert!(Delayed.can_transition_to(Delivered));
        assert!(InProgress.can_transition_to(Queued));
        assert!(!Queued.can_transition_to(Delivered));
        assert!(!Infeasible.can_transition_to(Queued));
        for next in [Queued, Assigned, InProgress, Delayed, Infeasible] {
            assert!(!Delivered.can_transition_to(next), "Delivered -> {next}");
        }
    }
}

// ── Board mutators ────────────────────────────────────────────────────────────

#[cfg(test)]
mod board {
    use wc_core::{AgentId, JobId};

    use super::helpers::{job, secs};
    use crate::{JobBoard, JobError, JobState, Priority};

    fn board() -> JobBoard {
        [job(0, Priority::Urgent, 0, 100), job(1, Priority::NonUrgent, 0, 500)]
            .into_iter()
            .collect()
    }

    #[test]
    fn full_delivery_cycle() {
        let mut b = board();
        let id = JobId(0);
        b.assign(id, AgentId(3)).unwrap();
        assert_eq!(b.get(id).unwrap().assigned_agent, Some(AgentId(3)));
        b.mark_picked_up(id, secs(10)).unwrap();
        assert_eq!(b.get(id).unwrap().state, JobState::InProgress);
        let late = b.mark_delivered(id, secs(50)).unwrap();
        assert!(!late);
        let j = b.get(id).unwrap();
        assert_eq!(j.state, JobState::Delivered);
        assert_eq!(j.progress.delivered_at, Some(secs(50)));
    }

    #[test]
    fn late_delivery_reported() {
        let mut b = board();
        let id = JobId(0);
        b.assign(id, AgentId(0)).unwrap();
        b.mark_picked_up(id, secs(10)).unwrap();
        b.set_state(id, JobState::Delayed).unwrap();
        assert!(b.mark_delivered(id, secs(101)).unwrap());
    }

    #[test]
    fn delivered_is_final() {
        let mut b = board();
        let id = JobId(0);
        b.assign(id, AgentId(0)).unwrap();
        b.mark_picked_up(id, secs(1)).unwrap();
        b.mark_delivered(id, secs(2)).unwrap();
        let err = b.release(id).unwrap_err();
        assert!(matches!(err, JobError::InvalidTransition { from: JobState::Delivered, .. }));
    }

    #[test]
    fn release_clears_progress() {
        let mut b = board();
        let id = JobId(1);
        b.assign(id, AgentId(0)).unwrap();
        b.mark_picked_up(id, secs(5)).unwrap();
        b.release(id).unwrap();
        let j = b.get(id).unwrap();
        assert_eq!(j.state, JobState::Queued);
        assert_eq!(j.assigned_agent, None);
        assert!(!j.progress.picked_up);
    }

    #[test]
    fn pickup_while_delayed_stays_delayed() {
        let mut b = board();
        let id = JobId(0);
        b.assign(id, AgentId(0)).unwrap();
        b.set_state(id, JobState::Delayed).unwrap();
        b.mark_picked_up(id, secs(200)).unwrap();
        assert_eq!(b.get(id).unwrap().state, JobState::Delayed);
        assert!(b.get(id).unwrap().progress.picked_up);
    }

    #[test]
    fn queued_ids_and_duplicates() {
        let mut b = board();
        assert_eq!(b.queued_ids().into_iter().collect::<Vec<_>>(), vec![JobId(0), JobId(1)]);
        b.mark_infeasible(JobId(1)).unwrap();
        assert_eq!(b.queued_ids().len(), 1);
        assert!(matches!(b.insert(job(0, Priority::Urgent, 0, 1)), Err(JobError::DuplicateJob(_))));
        assert!(matches!(b.set_state(JobId(9), JobState::Assigned), Err(JobError::JobNotFound(_))));
    }

    #[test]
    fn insert_rejects_untimeable_job() {
        let mut b = JobBoard::new();
        let mut j = job(3, Priority::Urgent, 0, 100);
        j.pickup_service_secs = f64::INFINITY;
        assert!(matches!(b.insert(j), Err(JobError::InvalidJob { job: JobId(3), .. })));

        let mut heavy = job(4, Priority::Urgent, 0, 100);
        heavy.item.weight_kg = f64::NAN;
        assert!(b.insert(heavy).is_err());
        assert!(b.is_empty());
    }

    #[test]
    fn service_durations_never_panic() {
        let j = job(0, Priority::Urgent, 0, 100).with_service_secs(f64::INFINITY, f64::NAN);
        assert_eq!(j.pickup_service(), std::time::Duration::from_secs(86_400));
        assert_eq!(j.dropoff_service(), std::time::Duration::ZERO);
        assert!(j.validate().is_ok());

        let mut raw = job(1, Priority::Urgent, 0, 100);
        raw.pickup_service_secs = f64::INFINITY;
        raw.dropoff_service_secs = -3.0;
        assert_eq!(raw.pickup_service(), std::time::Duration::from_secs(86_400));
        assert_eq!(raw.dropoff_service(), std::time::Duration::ZERO);
    }

    #[test]
    fn priority_can_change() {
        let mut b = board();
        b.set_priority(JobId(1), Priority::Emergency).unwrap();
        assert_eq!(b.get(JobId(1)).unwrap().priority, Priority::Emergency);
    }
}

// ── Priority score ────────────────────────────────────────────────────────────

#[cfg(test)]
mod score {
    use super::helpers::{job, secs};
    use crate::{Priority, effective_score, sort_queue, starvation_discount};

    const S: f64 = 300.0;

    #[test]
    fn starvation_cap() {
        let j = job(0, Priority::Urgent, 0, 10_000);
        assert_eq!(starvation_discount(&j, secs(300), S), 0.0);
        assert_eq!(starvation_discount(&j, secs(500), S), 200.0);
        assert_eq!(starvation_discount(&j, secs(900), S), 500.0);
        assert_eq!(starvation_discount(&j, secs(5_000), S), 500.0);
    }

    #[test]
    fn immediate_never_discounted() {
        let j = job(0, Priority::Immediate, 0, 10_000);
        assert_eq!(starvation_discount(&j, secs(5_000), S), 0.0);
    }

    #[test]
    fn score_components() {
        // Urgent (rank 2), 40 s of slack, no starvation.
        let j = job(0, Priority::Urgent, 0, 140);
        assert_eq!(effective_score(&j, secs(100), S), 2_040.0);
        // Past the deadline the slack term is zero, not negative.
        assert_eq!(effective_score(&j, secs(200), S), 2_000.0);
    }

    #[test]
    fn tier_dominates() {
        // Deadline differences below 500 s: the more urgent tier must always
        // score lower, even against a maximally starved lower tier.
        let now = secs(2_000);
        for (hi, lo) in Priority::ALL.iter().zip(Priority::ALL.iter().skip(1)) {
            let urgent = job(0, *hi, 1_990, now.as_millis() / 1_000 + 499);
            let starved = job(1, *lo, 0, now.as_millis() / 1_000);
            assert!(
                effective_score(&urgent, now, S) < effective_score(&starved, now, S),
                "{hi} should beat {lo}"
            );
        }
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let a = job(0, Priority::Urgent, 0, 100);
        let b = job(1, Priority::Urgent, 0, 100);
        let c = job(2, Priority::Emergency, 0, 100);
        let order: Vec<u32> = sort_queue([&a, &b, &c], secs(0), S).iter().map(|j| j.id.0).collect();
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn earlier_deadline_first_within_tier() {
        let late = job(0, Priority::SemiUrgent, 0, 900);
        let soon = job(1, Priority::SemiUrgent, 0, 60);
        let order: Vec<u32> = sort_queue([&late, &soon], secs(0), S).iter().map(|j| j.id.0).collect();
        assert_eq!(order, vec![1, 0]);
    }
}

// ── Triage expansion ──────────────────────────────────────────────────────────

#[cfg(test)]
mod triage {
    use wc_core::{IdAllocator, JobId, SimConfig, TriageCaseId};

    use super::helpers::{loc, secs};
    use crate::{ItemSpec, JobState, Priority, TriageCase, TriageItem};

    #[test]
    fn one_job_per_line() {
        let case = TriageCase {
            id:          TriageCaseId(4),
            label:       "trauma bay 2".into(),
            priority:    Priority::Emergency,
            destination: loc(9, 2),
            deadline_offset_secs: Some(240.0),
            items: vec![
                TriageItem { item: ItemSpec::new("o-neg", 2, 1.0), pickup: Some(loc(0, 5)) },
                TriageItem { item: ItemSpec::new("saline", 4, 4.0), pickup: None },
            ],
        };
        let mut ids = IdAllocator::new();
        let cfg = SimConfig::default();
        let jobs = case.expand(secs(60), &mut ids, &cfg);

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs.iter().map(|j| j.id).collect::<Vec<_>>(), vec![JobId(0), JobId(1)]);
        for j in &jobs {
            assert_eq!(j.dropoff, loc(9, 2));
            assert_eq!(j.priority, Priority::Emergency);
            assert_eq!(j.deadline, secs(300));
            assert_eq!(j.created_at, secs(60));
            assert_eq!(j.state, JobState::Queued);
            assert_eq!(j.triage_case, Some(TriageCaseId(4)));
            assert_eq!(j.pickup_service_secs, cfg.default_pickup_service_secs);
        }
        assert_eq!(jobs[0].pickup, Some(loc(0, 5)));
        assert_eq!(jobs[1].pickup, None);
        assert_eq!(case.total_weight_kg(), 5.0);
    }

    #[test]
    fn default_deadline_from_tier() {
        let case = TriageCase {
            id:          TriageCaseId(0),
            label:       "ward round".into(),
            priority:    Priority::NonUrgent,
            destination: loc(1, 1),
            deadline_offset_secs: None,
            items: vec![TriageItem { item: ItemSpec::new("linen", 1, 2.0), pickup: None }],
        };
        let jobs = case.expand(secs(0), &mut IdAllocator::new(), &SimConfig::default());
        assert_eq!(jobs[0].deadline, secs(3_600));
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use wc_core::{IdAllocator, JobId, SimConfig};

    use super::helpers::{loc, secs};
    use crate::{JobError, Priority, load_jobs_reader};

    const HEADER: &str = "id,pickup_floor,pickup_x,pickup_y,dropoff_floor,dropoff_x,dropoff_y,item_type,quantity,weight_kg,priority,created_secs,deadline_secs,pickup_service_secs,dropoff_service_secs\n";

    #[test]
    fn parses_rows() {
        let csv = format!(
            "{HEADER}\
             5,0,1,1,0,8,3,blood,2,1.5,IMMEDIATE,0,120,20,20\n\
             ,,,,0,5,5,linen,10,8.0,non_urgent,30,,,\n"
        );
        let mut ids = IdAllocator::new();
        let cfg = SimConfig::default();
        let jobs = load_jobs_reader(Cursor::new(csv), &mut ids, &cfg).unwrap();

        assert_eq!(jobs.len(), 2);
        let a = &jobs[0];
        assert_eq!(a.id, JobId(5));
        assert_eq!(a.pickup, Some(loc(1, 1)));
        assert_eq!(a.dropoff, loc(8, 3));
        assert_eq!(a.priority, Priority::Immediate);
        assert_eq!(a.deadline, secs(120));
        assert_eq!(a.pickup_service_secs, 20.0);

        let b = &jobs[1];
        // Allocated after the explicit id 5.
        assert_eq!(b.id, JobId(6));
        assert_eq!(b.pickup, None);
        assert_eq!(b.priority, Priority::NonUrgent);
        assert_eq!(b.deadline, secs(30 + 3_600));
        assert_eq!(b.dropoff_service_secs, cfg.default_dropoff_service_secs);
    }

    #[test]
    fn partial_pickup_rejected() {
        let csv = format!("{HEADER},0,1,,0,8,3,blood,1,1.0,URGENT,0,,,\n");
        let err = load_jobs_reader(Cursor::new(csv), &mut IdAllocator::new(), &SimConfig::default())
            .unwrap_err();
        assert!(matches!(err, JobError::Parse(msg) if msg.contains("pickup")));
    }

    #[test]
    fn bad_priority_rejected() {
        let csv = format!("{HEADER},,,,0,8,3,blood,1,1.0,SOONISH,0,,,\n");
        assert!(load_jobs_reader(Cursor::new(csv), &mut IdAllocator::new(), &SimConfig::default()).is_err());
    }

    #[test]
    fn infinite_service_rejected() {
        let csv = format!("{HEADER}0,,,,0,8,3,blood,1,1.0,URGENT,0,,inf,20\n");
        let mut ids = IdAllocator::new();
        let err = load_jobs_reader(Cursor::new(csv), &mut ids, &SimConfig::default()).unwrap_err();
        assert!(matches!(err, JobError::Parse(ref msg) if msg.contains("line 2") && msg.contains("pickup_service_secs")));
        // Nothing was allocated for the rejected row.
        assert_eq!(ids.next_job(), JobId(0));
    }

    #[test]
    fn out_of_range_times_rejected() {
        let cfg = SimConfig::default();
        for row in [
            ",,,,0,8,3,blood,1,1.0,URGENT,0,,20,-5\n",
            ",,,,0,8,3,blood,1,1.0,URGENT,0,,20,1e9\n",
            ",,,,0,8,3,blood,1,1.0,URGENT,0,NaN,20,20\n",
            ",,,,0,8,3,blood,1,1.0,URGENT,-inf,,20,20\n",
            ",,,,0,8,3,blood,1,inf,URGENT,0,,20,20\n",
        ] {
            let csv = format!("{HEADER}{row}");
            let res = load_jobs_reader(Cursor::new(csv), &mut IdAllocator::new(), &cfg);
            assert!(matches!(res, Err(JobError::Parse(_))), "accepted {row:?}");
        }
    }
}

// ── Generated demand ──────────────────────────────────────────────────────────

#[cfg(test)]
mod demand {
    use std::time::Duration;

    use wc_core::{IdAllocator, SimConfig};

    use super::helpers::{loc, secs};
    use crate::{DemandGenerator, DemandProfile, ItemSpec};

    fn profile() -> DemandProfile {
        DemandProfile::new(
            vec![loc(0, 0), loc(0, 9)],
            vec![loc(5, 5), loc(9, 9), loc(3, 7)],
            vec![ItemSpec::new("meds", 1, 0.5), ItemSpec::new("linen", 5, 6.0)],
        )
        .rate(360.0)
    }

    fn run(seed: u64) -> Vec<(u32, i32, i32)> {
        let mut generator = DemandGenerator::new(profile(), seed);
        let mut ids = IdAllocator::new();
        let cfg = SimConfig::default();
        let mut out = Vec::new();
        for step in 1..=600u64 {
            for j in generator.poll(secs(step), Duration::from_secs(1), &mut ids, &cfg) {
                out.push((j.priority.rank(), j.dropoff.pos.x, j.dropoff.pos.y));
            }
        }
        out
    }

    #[test]
    fn same_seed_same_stream() {
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn rate_is_roughly_honoured() {
        // 360/h over 600 s → about 60 jobs.
        let n = run(11).len();
        assert!((30..=90).contains(&n), "got {n}");
    }

    #[test]
    fn batch_draws_from_profile() {
        let mut generator = DemandGenerator::new(profile(), 1);
        let jobs = generator.batch(20, secs(0), &mut IdAllocator::new(), &SimConfig::default());
        assert_eq!(jobs.len(), 20);
        for j in &jobs {
            assert!(generator.profile().destinations.contains(&j.dropoff));
            assert!(j.pickup.is_some());
        }
    }

    #[test]
    fn empty_destinations_yield_nothing() {
        let mut p = profile();
        p.destinations.clear();
        let mut generator = DemandGenerator::new(p, 1);
        assert!(generator.batch(5, secs(0), &mut IdAllocator::new(), &SimConfig::default()).is_empty());
    }
}
