/// Initial state operation
/// Seeds every cell's temperature, enthalpy and ice before the first step.

use crate::constants::DEFAULT_INITIAL_TEMP_K;
use crate::error::EbmResult;
use crate::grid::Cell;
use crate::physics::ice::ice_thickness;
use crate::physics::kernel::surface_albedo;
use crate::physics::surface_energy::{energy_from_temperature, heat_capacity};
use crate::sim::config::RunConfig;
use crate::sim::simulation::Simulation;
use crate::sim_op::{SimOp, SimOpHandle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, PartialEq)]
pub enum InitialTemperature {
    Uniform(f64),
    /// One temperature per cell, row-major.
    Field(Vec<f64>),
}

/// Parameters for the initial state
#[derive(Debug, Clone, PartialEq)]
pub struct InitialStateParams {
    pub temperature: InitialTemperature,
    /// Half-width of a uniform random offset added to every cell (K).
    pub perturbation_k: f64,
    pub seed: u64,
}

impl Default for InitialStateParams {
    fn default() -> Self {
        Self {
            temperature: InitialTemperature::Uniform(DEFAULT_INITIAL_TEMP_K),
            perturbation_k: 0.0,
            seed: 0,
        }
    }
}

impl InitialStateParams {
    pub fn uniform(temp_k: f64) -> Self {
        Self {
            temperature: InitialTemperature::Uniform(temp_k),
            ..Self::default()
        }
    }

    pub fn field(temps_k: Vec<f64>) -> Self {
        Self {
            temperature: InitialTemperature::Field(temps_k),
            ..Self::default()
        }
    }

    pub fn with_perturbation(mut self, perturbation_k: f64, seed: u64) -> Self {
        self.perturbation_k = perturbation_k;
        self.seed = seed;
        self
    }
}

pub struct InitialStateOp {
    pub params: InitialStateParams,
}

impl InitialStateOp {
    pub fn new() -> Self {
        Self {
            params: InitialStateParams::default(),
        }
    }

    pub fn new_with_params(params: InitialStateParams) -> Self {
        Self { params }
    }

    pub fn handle(params: InitialStateParams) -> SimOpHandle {
        SimOpHandle::new(Box::new(Self::new_with_params(params)))
    }

    pub fn handle_from_run(run: &RunConfig) -> SimOpHandle {
        Self::handle(
            InitialStateParams::uniform(run.initial_temperature_k)
                .with_perturbation(run.initial_perturbation_k, run.seed),
        )
    }

    /// Cells at the requested temperatures. Below the melting point the
    /// enthalpy is negative and the matching ice thickness is seeded with it.
    pub fn initial_cells(&self, sim: &Simulation) -> EbmResult<Vec<Cell>> {
        let mapper = sim.mapper;
        let temps = match &self.params.temperature {
            InitialTemperature::Uniform(temp_k) => vec![*temp_k; mapper.len()],
            InitialTemperature::Field(values) => {
                mapper.ensure_len("initial temperature field", values.len())?;
                values.clone()
            }
        };

        let amplitude = self.params.perturbation_k.abs();
        let mut rng = StdRng::seed_from_u64(self.params.seed);

        let cells = temps
            .into_iter()
            .enumerate()
            .map(|(index, temp_k)| {
                let temp_k = if amplitude > 0.0 {
                    temp_k + rng.random_range(-amplitude..=amplitude)
                } else {
                    temp_k
                };
                let (i, j) = mapper.coords(index);
                let p = sim.params.get(index);
                let energy = energy_from_temperature(temp_k, heat_capacity(p));
                Cell {
                    temperature_k: temp_k,
                    energy_j_m2: energy,
                    ice_thickness_m: ice_thickness(energy, &sim.settings.ice),
                    insolation_w_m2: sim.forcing.insolation(
                        mapper.lat_deg(j),
                        mapper.lon_deg(i),
                        sim.clock.day,
                        sim.settings.forcing_mode,
                    ),
                    albedo: surface_albedo(&sim.settings, p, temp_k, energy),
                    net_flux_w_m2: 0.0,
                }
            })
            .collect();
        Ok(cells)
    }
}

impl SimOp for InitialStateOp {
    fn name(&self) -> &str {
        "InitialState"
    }

    fn init_sim(&mut self, sim: &mut Simulation) -> EbmResult<()> {
        let cells = self.initial_cells(sim)?;
        sim.grid.set_cells(cells)
    }
}
