use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use ebm_grid::{
    sim::{EbmConfig, Simulation},
    sim_op::{CsvWriterOp, SimOpHandle, SnapshotRecorderOp, TemperatureReportingOp},
};

// reference temperature for the explicit-step warning
const STABILITY_REFERENCE_TEMP_K: f64 = 288.15;

#[derive(Debug, Parser)]
#[command(author, version, about = "Grid-parallel energy-balance climate model")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the model
    Run {
        /// Path to a JSON config; defaults are used when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the number of steps
        #[arg(long)]
        steps: Option<u32>,

        /// Write per-step grid statistics to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write recorded snapshots to this JSON file
        #[arg(long)]
        snapshots: Option<PathBuf>,

        /// Record every k-th step when writing snapshots
        #[arg(long, default_value_t = 10)]
        snapshot_every: u32,

        /// Print a progress report every p percent of the run
        #[arg(long, default_value_t = 10.0)]
        report_percent: f64,

        /// Sample insolation from a precomputed table instead of the closed form
        #[arg(long)]
        table: bool,
    },
    /// Print the default configuration as JSON
    Defaults,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Defaults => {
            println!("{}", EbmConfig::default().to_json()?);
            Ok(())
        }
        Command::Run {
            config,
            steps,
            csv,
            snapshots,
            snapshot_every,
            report_percent,
            table,
        } => {
            let mut config = match config {
                Some(path) => EbmConfig::load_json(path)?,
                None => EbmConfig::default(),
            };
            if let Some(steps) = steps {
                config.run.steps = steps;
            }
            if table {
                config.run.use_insolation_table = true;
            }

            let mut ops: Vec<SimOpHandle> = vec![TemperatureReportingOp::handle(report_percent)];
            if let Some(path) = csv {
                ops.push(CsvWriterOp::handle(path.to_string_lossy().to_string()));
            }
            if let Some(path) = snapshots {
                ops.push(SnapshotRecorderOp::handle(snapshot_every, path));
            }

            let mut sim = Simulation::from_config(&config, "ebm-grid", ops)?;
            sim.report_timing = true;

            let limit = sim.kernel()?.max_stable_dt_seconds(STABILITY_REFERENCE_TEMP_K);
            if sim.clock.dt_seconds() > limit {
                println!(
                    "{} dt = {:.0}s exceeds the explicit transport limit of {:.0}s at {}K; expect instability",
                    "⚠️  warning:".yellow().bold(),
                    sim.clock.dt_seconds(),
                    limit,
                    STABILITY_REFERENCE_TEMP_K
                );
            }

            sim.run()?;
            println!(
                "{} {} steps over {:.2} days on a {}x{} grid",
                "✅ done:".green().bold(),
                sim.current_step(),
                sim.clock.dt_days * sim.current_step() as f64,
                sim.mapper.nx,
                sim.mapper.ny
            );
            Ok(())
        }
    }
}
