// Ice-albedo state machine: the albedo switch at the freeze threshold and
// the enthalpy/ice-thickness invariant over long cold runs.

use ebm_grid::constants::{FREEZE_THRESHOLD_K, MELT_TEMP_K};
use ebm_grid::grid::{GridMapper, IceState};
use ebm_grid::params::PhysicalParameterFieldBuilder;
use ebm_grid::physics::surface_energy::{albedo, clear_sky_albedo};
use ebm_grid::physics::AlbedoScheme;
use ebm_grid::sim::{EbmConfig, Simulation};
use ebm_grid::solar::ForcingMode;
use more_asserts::{assert_ge, assert_gt};

#[test]
fn albedo_switches_at_freeze_threshold_on_every_row() {
    let mapper = GridMapper::new(8, 6).unwrap();
    let field = PhysicalParameterFieldBuilder::new(mapper).build().unwrap();
    for j in 0..mapper.ny {
        let cell = field.get(mapper.index(0, j));
        let clear = clear_sky_albedo(cell);
        let above = albedo(FREEZE_THRESHOLD_K + 1e-6, cell, FREEZE_THRESHOLD_K);
        let below = albedo(FREEZE_THRESHOLD_K - 1e-6, cell, FREEZE_THRESHOLD_K);
        println!("   lat {:>6.1}: clear {:.4}, below {:.4}", mapper.lat_deg(j), clear, below);
        assert_eq!(above, clear);
        assert_ge!(below, clear);
    }
}

fn assert_ice_invariant(sim: &Simulation) {
    for (index, cell) in sim.grid.current().iter().enumerate() {
        assert_ge!(cell.ice_thickness_m, 0.0, "cell {index} at step {}", sim.current_step());
        assert_eq!(
            cell.ice_thickness_m > 0.0,
            cell.energy_j_m2 < 0.0,
            "cell {index} at step {}: h = {}, E = {}",
            sim.current_step(),
            cell.ice_thickness_m,
            cell.energy_j_m2
        );
        if cell.ice_state() == IceState::IceCovered {
            assert!(cell.temperature_k <= MELT_TEMP_K);
        }
    }
}

fn cold_config(scheme: AlbedoScheme) -> EbmConfig {
    let mut config = EbmConfig::default();
    config.grid.nx = 16;
    config.grid.ny = 8;
    config.albedo.scheme = scheme;
    config.radiation.forcing_mode = ForcingMode::DailyMean;
    config.run.dt_days = 0.5;
    config.run.start_day = 300.0;
    config.run.initial_temperature_k = 271.0;
    config.run.initial_perturbation_k = 6.0;
    config.run.seed = 7;
    config
}

fn check_invariant_over_run(config: &EbmConfig, steps: u32) -> Simulation {
    let mut sim = Simulation::from_config(config, "ice", vec![]).unwrap();
    sim.initialize().unwrap();
    assert_ice_invariant(&sim);
    for _ in 0..steps {
        sim.step().unwrap();
        assert_ice_invariant(&sim);
    }
    sim
}

#[test]
fn threshold_scheme_keeps_ice_invariant() {
    println!("🧊 Ice invariant, threshold albedo, 240 half-day steps");
    let sim = check_invariant_over_run(&cold_config(AlbedoScheme::TemperatureThreshold), 240);
    let stats = sim.grid.statistics();
    println!("   ice cover {:.1}%", stats.ice_area_fraction * 100.0);
    assert_gt!(stats.ice_area_fraction, 0.0);
}

#[test]
fn smooth_scheme_keeps_ice_invariant() {
    check_invariant_over_run(&cold_config(AlbedoScheme::smooth()), 240);
}

#[test]
fn instantaneous_forcing_keeps_ice_invariant() {
    let mut config = cold_config(AlbedoScheme::TemperatureThreshold);
    config.radiation.forcing_mode = ForcingMode::Instantaneous;
    config.run.dt_days = 0.125;
    check_invariant_over_run(&config, 300);
}
