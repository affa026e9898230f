use crate::error::EbmResult;
use crate::sim::simulation::Simulation;
use crate::sim_op::{SimOp, SimOpHandle};
use std::fs::File;
use std::io::{BufWriter, Write};

const HEADER: &str = "step,day,mean_temp_k,min_temp_k,max_temp_k,mean_insolation_w_m2,mean_albedo,ice_area_fraction,mean_ice_thickness_m";

/// CSV Writer Operator
///
/// Writes one row of area-weighted grid statistics per committed step,
/// plus a row for the initial state (step 0).
pub struct CsvWriterOp {
    /// Path to the CSV file to write
    pub file_path: String,

    writer: Option<BufWriter<File>>,
}

impl CsvWriterOp {
    /// Create a new CSV writer operator; the file is created or truncated on init.
    pub fn new(file_path: String) -> Self {
        Self {
            file_path,
            writer: None,
        }
    }

    /// Create a handle for the CSV writer operator
    pub fn handle(file_path: String) -> SimOpHandle {
        SimOpHandle::new(Box::new(Self::new(file_path)))
    }

    fn write_header(&mut self) -> EbmResult<()> {
        let mut writer = BufWriter::new(File::create(&self.file_path)?);
        writeln!(writer, "{HEADER}")?;
        self.writer = Some(writer);
        Ok(())
    }

    fn write_row(&mut self, sim: &Simulation) -> EbmResult<()> {
        if self.writer.is_none() {
            self.write_header()?;
        }
        let stats = sim.grid.statistics();
        if let Some(writer) = self.writer.as_mut() {
            writeln!(
                writer,
                "{},{:.4},{:.4},{:.4},{:.4},{:.4},{:.5},{:.5},{:.5}",
                sim.current_step(),
                sim.clock.day,
                stats.mean_temp_k,
                stats.min_temp_k,
                stats.max_temp_k,
                stats.mean_insolation_w_m2,
                stats.mean_albedo,
                stats.ice_area_fraction,
                stats.mean_ice_thickness_m
            )?;
        }
        Ok(())
    }
}

impl SimOp for CsvWriterOp {
    fn name(&self) -> &str {
        "CsvWriter"
    }

    fn init_sim(&mut self, sim: &mut Simulation) -> EbmResult<()> {
        self.write_header()?;
        self.write_row(sim)
    }

    fn after_step(&mut self, sim: &mut Simulation) -> EbmResult<()> {
        self.write_row(sim)
    }

    fn after_sim(&mut self, _sim: &mut Simulation) -> EbmResult<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::config::EbmConfig;
    use std::fs;

    #[test]
    fn test_csv_writer_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");

        let mut config = EbmConfig::default();
        config.grid.nx = 8;
        config.grid.ny = 4;
        config.run.steps = 3;
        config.run.initial_temperature_k = 285.0;
        let mut sim = Simulation::from_config(
            &config,
            "csv_writer_test",
            vec![CsvWriterOp::handle(path.to_string_lossy().to_string())],
        )
        .unwrap();
        sim.run().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        // header + initial state + 3 steps
        assert_eq!(lines.len(), 5, "Should have header + 4 data rows");
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].starts_with("0,"));
        assert!(lines[2].starts_with("1,"));
        assert!(lines[3].starts_with("2,"));
        assert!(lines[4].starts_with("3,"));
        assert_eq!(lines[4].split(',').count(), HEADER.split(',').count());
    }
}
