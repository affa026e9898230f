// End-to-end runs through the driver: config files in, CSV and snapshot
// files out, and the guarantees the driver gives about failed steps.

use approx::assert_abs_diff_eq;
use ebm_grid::error::EbmError;
use ebm_grid::sim::{EbmConfig, Simulation};
use ebm_grid::sim_op::{
    CsvWriterOp, InitialStateOp, InitialStateParams, SnapshotRecorderOp, TemperatureReportingOp,
};
use ebm_grid::solar::ForcingMode;
use more_asserts::{assert_gt, assert_lt};
use std::fs;

fn small_config() -> EbmConfig {
    let mut config = EbmConfig::default();
    config.grid.nx = 16;
    config.grid.ny = 8;
    config.run.steps = 24;
    config.run.initial_temperature_k = 285.0;
    config.run.initial_perturbation_k = 2.0;
    config.run.seed = 42;
    config
}

#[test]
fn json_config_drives_a_full_run_with_file_outputs() {
    println!("📄 Config file -> run -> CSV + snapshots");
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("ebm.json");
    let csv_path = dir.path().join("stats.csv");
    let frames_path = dir.path().join("frames.json");

    fs::write(
        &config_path,
        r#"{
            "grid": { "nx": 16, "ny": 8 },
            "radiation": { "forcing_mode": "daily_mean" },
            "run": { "steps": 10, "start_day": 172.0, "initial_temperature_k": 280.0 }
        }"#,
    )
    .unwrap();
    let config = EbmConfig::load_json(&config_path).unwrap();
    assert_eq!(config.radiation.forcing_mode, ForcingMode::DailyMean);

    let mut sim = Simulation::from_config(
        &config,
        "driver",
        vec![
            TemperatureReportingOp::handle(50.0),
            CsvWriterOp::handle(csv_path.to_string_lossy().to_string()),
            SnapshotRecorderOp::handle(5, frames_path.clone()),
        ],
    )
    .unwrap();
    sim.run().unwrap();

    assert_eq!(sim.current_step(), 10);
    assert_abs_diff_eq!(sim.clock.day, 172.0 + 10.0 * config.run.dt_days, epsilon = 1e-9);

    let csv = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 12);
    assert!(lines[0].starts_with("step,day,mean_temp_k"));
    assert!(lines[1].starts_with("0,"));
    assert!(lines[11].starts_with("10,"));

    let frames = SnapshotRecorderOp::load_json(&frames_path).unwrap();
    let steps: Vec<u32> = frames.iter().map(|f| f.step).collect();
    assert_eq!(steps, vec![0, 5, 10]);
    let last = frames.last().unwrap();
    assert_eq!(last.nx, 16);
    assert_eq!(last.temperature_k.len(), 128);

    // northern summer solstice: the north pole row is lit, the south pole row is dark
    let north_pole = last.insolation_w_m2[7 * 16];
    let south_pole = last.insolation_w_m2[0];
    assert_gt!(north_pole, 400.0);
    assert_eq!(south_pole, 0.0);
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{ "run": { "dt_days": -1.0 } }"#).unwrap();
    assert!(matches!(EbmConfig::load_json(&path), Err(EbmError::Configuration(_))));

    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(EbmConfig::load_json(&path), Err(EbmError::Json(_))));
}

#[test]
fn saved_config_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.json");
    let mut config = small_config();
    config.transport.zonal_moisture = false;
    config.save_json(&path).unwrap();
    assert_eq!(EbmConfig::load_json(&path).unwrap(), config);
}

#[test]
fn parallel_runs_are_deterministic() {
    let config = small_config();
    let mut first = Simulation::from_config(&config, "first", vec![]).unwrap();
    let mut second = Simulation::from_config(&config, "second", vec![]).unwrap();
    first.run().unwrap();
    second.run().unwrap();
    assert_eq!(first.grid.current(), second.grid.current());
}

#[test]
fn insolation_table_tracks_closed_form() {
    println!("📋 Insolation table vs closed form over 24 steps");
    let closed = small_config();
    let mut tabled = small_config();
    tabled.run.use_insolation_table = true;

    let mut a = Simulation::from_config(&closed, "closed", vec![]).unwrap();
    let mut b = Simulation::from_config(&tabled, "table", vec![]).unwrap();
    a.run().unwrap();
    b.run().unwrap();

    let (sa, sb) = (a.grid.statistics(), b.grid.statistics());
    println!("   mean T closed {:.5}K, table {:.5}K", sa.mean_temp_k, sb.mean_temp_k);
    assert_lt!((sa.mean_temp_k - sb.mean_temp_k).abs(), 0.05);
    assert_lt!((sa.mean_insolation_w_m2 - sb.mean_insolation_w_m2).abs(), 5.0);
    for (x, y) in a.grid.current().iter().zip(b.grid.current()) {
        assert_lt!((x.temperature_k - y.temperature_k).abs(), 0.1);
    }
}

#[test]
fn wrong_shape_initial_field_fails_before_first_step() {
    let config = small_config();
    let mut sim = Simulation::from_config(&config, "shape", vec![]).unwrap();
    sim.ops[0] = InitialStateOp::handle(InitialStateParams::field(vec![280.0; 10])).op;

    let result = sim.run();
    assert!(matches!(result, Err(EbmError::ShapeMismatch { found: 10, .. })));
    assert_eq!(sim.current_step(), 0);
}

#[test]
fn sim_steps_of_zero_only_initializes() {
    let mut config = small_config();
    config.run.steps = 0;
    let mut sim = Simulation::from_config(&config, "empty", vec![]).unwrap();
    sim.run().unwrap();
    assert_eq!(sim.current_step(), 0);
    assert_abs_diff_eq!(sim.grid.current()[0].temperature_k, 285.0, epsilon = 2.0 + 1e-9);
}
