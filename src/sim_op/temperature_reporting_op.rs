/// Temperature reporting operation
/// Reports area-weighted surface temperature and ice cover every N% of the run

use crate::error::EbmResult;
use crate::grid::GridStatistics;
use crate::sim::simulation::Simulation;
use crate::sim_op::{SimOp, SimOpHandle};
use crate::temp_utils::kelvin_to_celsius;
use colored::{ColoredString, Colorize};

pub struct TemperatureReportingOp {
    pub report_frequency_percent: f64,
    last_reported_step: Option<u32>,
}

impl Default for TemperatureReportingOp {
    fn default() -> Self {
        Self::new()
    }
}

impl TemperatureReportingOp {
    pub fn new() -> Self {
        Self::with_frequency(10.0)
    }

    pub fn with_frequency(report_frequency_percent: f64) -> Self {
        Self {
            report_frequency_percent,
            last_reported_step: None,
        }
    }

    pub fn handle(report_frequency_percent: f64) -> SimOpHandle {
        SimOpHandle::new(Box::new(Self::with_frequency(report_frequency_percent)))
    }

    fn milestone(&self, step: u32, sim_steps: u32) -> i64 {
        let progress_percent = step as f64 / sim_steps as f64 * 100.0;
        (progress_percent / self.report_frequency_percent.max(f64::EPSILON)).floor() as i64
    }

    pub fn should_report(&self, step: u32, sim_steps: u32) -> bool {
        if sim_steps == 0 {
            return false;
        }
        let last = self
            .last_reported_step
            .map_or(-1, |last| self.milestone(last, sim_steps));
        self.milestone(step, sim_steps) > last
    }

    fn colored_temperature(temp_k: f64) -> ColoredString {
        let text = format!("{:.1}K ({:.1}°C)", temp_k, kelvin_to_celsius(temp_k));
        if temp_k < 263.15 {
            text.bright_blue()
        } else if temp_k < 288.15 {
            text.cyan()
        } else {
            text.yellow()
        }
    }

    fn print_statistics(stats: &GridStatistics) {
        println!("   - Mean temperature: {}", Self::colored_temperature(stats.mean_temp_k));
        println!(
            "   - Temperature range: {} to {}",
            Self::colored_temperature(stats.min_temp_k),
            Self::colored_temperature(stats.max_temp_k)
        );
        println!(
            "   - Ice cover: {:.1}% (mean thickness {:.2} m)",
            stats.ice_area_fraction * 100.0,
            stats.mean_ice_thickness_m
        );
        println!(
            "   - Mean insolation: {:.1} W/m², mean albedo {:.3}",
            stats.mean_insolation_w_m2, stats.mean_albedo
        );
    }
}

impl SimOp for TemperatureReportingOp {
    fn name(&self) -> &str {
        "TemperatureReporting"
    }

    fn init_sim(&mut self, sim: &mut Simulation) -> EbmResult<()> {
        println!(
            "📊 Temperature reporting initialized (every {:.1}% of simulation)",
            self.report_frequency_percent
        );
        println!("🌡️  {} day {:.2}:", "Initial Temperature Report".bold(), sim.clock.day);
        Self::print_statistics(&sim.grid.statistics());
        Ok(())
    }

    fn after_step(&mut self, sim: &mut Simulation) -> EbmResult<()> {
        let step = sim.current_step();
        if !self.should_report(step, sim.sim_steps) {
            return Ok(());
        }
        let progress = step as f64 / sim.sim_steps as f64 * 100.0;
        let stats = sim.grid.statistics();
        println!(
            "step {} of {}: {}% progress | day {:.2} | mean {} | ice {:.1}%",
            step,
            sim.sim_steps,
            progress.round() as i64,
            sim.clock.day,
            Self::colored_temperature(stats.mean_temp_k),
            stats.ice_area_fraction * 100.0
        );
        self.last_reported_step = Some(step);
        Ok(())
    }

    fn after_sim(&mut self, sim: &mut Simulation) -> EbmResult<()> {
        println!("🏁 {} day {:.2}:", "Final Temperature Report".bold(), sim.clock.day);
        Self::print_statistics(&sim.grid.statistics());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_milestone() {
        let mut op = TemperatureReportingOp::with_frequency(25.0);
        let mut reported = Vec::new();
        for step in 1..=100 {
            if op.should_report(step, 100) {
                op.last_reported_step = Some(step);
                reported.push(step);
            }
        }
        assert_eq!(reported, vec![1, 25, 50, 75, 100]);
    }

    #[test]
    fn empty_run_never_reports() {
        assert!(!TemperatureReportingOp::new().should_report(0, 0));
    }
}
