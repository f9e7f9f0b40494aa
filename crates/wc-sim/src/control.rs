//! Run-state control and the drivers that honour it.

use std::time::Duration;

use wc_dispatch::Dispatcher;
use wc_floor::Pathfinder;

use crate::{ReplanState, Sim, SimObserver};

/// Playback state of a [`Sim`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl<D: Dispatcher, P: Pathfinder> Sim<D, P> {
    #[inline]
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Stopped or paused → running.
    pub fn start(&mut self) {
        self.run_state = RunState::Running;
    }

    pub fn pause(&mut self) {
        if self.run_state == RunState::Running {
            self.run_state = RunState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.run_state == RunState::Paused {
            self.run_state = RunState::Running;
        }
    }

    /// Stop without discarding state; see [`reset`](Self::reset).
    pub fn stop(&mut self) {
        self.run_state = RunState::Stopped;
    }

    /// Restore the state captured at build time and stop.
    ///
    /// The clock returns to zero at the configured speed, the plan and all
    /// execution cursors are dropped and metrics start over.
    pub fn reset(&mut self) {
        let snap = self.initial.clone();
        self.fleet = snap.fleet;
        self.jobs = snap.jobs;
        self.ids = snap.ids;
        self.demand = snap.demand;
        self.pending = snap.pending;

        self.clock = self.config.make_clock();
        self.plan = None;
        self.motion.store.clear();
        self.metrics = Default::default();
        self.replan = ReplanState::default();
        self.low_battery.clear();
        self.run_state = RunState::Stopped;
    }

    /// Change the playback multiplier, clamped to `[0.1, 100]`.  Returns the
    /// value applied.  Takes effect from the next tick.
    pub fn set_speed(&mut self, multiplier: f64) -> f64 {
        self.clock.set_speed(multiplier)
    }

    // ── Drivers ───────────────────────────────────────────────────────────

    /// Start and run until `config.end_tick()`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        self.start();
        while self.run_state == RunState::Running && self.clock.current_tick < self.config.end_tick() {
            self.step_with(observer);
        }
        if self.run_state == RunState::Running {
            self.run_state = RunState::Stopped;
        }
        observer.on_sim_end(self.clock.current_tick);
    }

    /// Run up to `n` ticks while running; ignores `end_tick`.  Returns the
    /// ticks actually executed (0 when stopped or paused).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> u64 {
        let mut done = 0;
        while done < n && self.run_state == RunState::Running {
            self.step_with(observer);
            done += 1;
        }
        done
    }

    /// Run while running until `span` of simulated time has passed.  Returns
    /// the ticks executed.
    pub fn run_for<O: SimObserver>(&mut self, span: Duration, observer: &mut O) -> u64 {
        let until = self.clock.now + span;
        let mut done = 0;
        while self.clock.now < until && self.run_state == RunState::Running {
            self.step_with(observer);
            done += 1;
        }
        done
    }
}
