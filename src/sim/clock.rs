use crate::temp_utils::days_to_seconds;
use serde::{Deserialize, Serialize};

/// Model time. `day` is fractional days since the start of the calendar year
/// (not wrapped), `step` counts committed steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationClock {
    pub day: f64,
    pub dt_days: f64,
    pub step: u32,
}

impl SimulationClock {
    pub fn new(start_day: f64, dt_days: f64) -> Self {
        Self {
            day: start_day,
            dt_days,
            step: 0,
        }
    }

    pub fn dt_seconds(&self) -> f64 {
        days_to_seconds(self.dt_days)
    }

    pub fn advance(&mut self) {
        self.step += 1;
        self.day += self.dt_days;
    }
}
