//! Session-wide metrics accumulated by the executor.

use wc_core::SimConfig;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionMetrics {
    pub energy_wh:          f64,
    pub co2_g:              f64,
    /// Seconds agents spent idle with nothing to do.
    pub idle_waiting_secs:  f64,
    /// Seconds agents spent docked at a charger.
    pub idle_charging_secs: f64,
    pub cells_moved:        u64,
    /// Cells moved while carrying a payload.
    pub cells_loaded:       u64,
    pub delivered_on_time:  u32,
    pub delivered_late:     u32,
    pub replans:            u32,
    pub infeasible:         u32,
}

impl SessionMetrics {
    pub(crate) fn record_move(&mut self, loaded: bool, config: &SimConfig) {
        self.cells_moved += 1;
        if loaded {
            self.cells_loaded += 1;
        }
        self.energy_wh += config.energy_wh_per_cell;
        self.co2_g += config.co2_for(config.energy_wh_per_cell);
    }

    pub(crate) fn record_delivery(&mut self, late: bool) {
        if late {
            self.delivered_late += 1;
        } else {
            self.delivered_on_time += 1;
        }
    }

    pub fn delivered(&self) -> u32 {
        self.delivered_on_time + self.delivered_late
    }

    /// Share of movement made empty, in percent.
    pub fn deadhead_pct(&self) -> f64 {
        if self.cells_moved == 0 {
            return 0.0;
        }
        (self.cells_moved - self.cells_loaded) as f64 / self.cells_moved as f64 * 100.0
    }

    /// 100 when nothing has been delivered yet.
    pub fn on_time_pct(&self) -> f64 {
        let total = self.delivered();
        if total == 0 {
            return 100.0;
        }
        self.delivered_on_time as f64 / total as f64 * 100.0
    }
}
