/// Energy balance operation
/// Advances every cell by one explicit step: insolation, albedo, OLR,
/// diffusive transport and ice thermodynamics, computed in parallel from
/// the frozen previous snapshot into the next buffer.

use crate::error::EbmResult;
use crate::physics::EbmKernel;
use crate::sim::simulation::Simulation;
use crate::sim_op::{SimOp, SimOpHandle};

#[derive(Default)]
pub struct EnergyBalanceOp {
    kernel: Option<EbmKernel>,
}

impl EnergyBalanceOp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle() -> SimOpHandle {
        SimOpHandle::new(Box::new(Self::new()))
    }
}

impl SimOp for EnergyBalanceOp {
    fn name(&self) -> &str {
        "EnergyBalance"
    }

    fn init_sim(&mut self, sim: &mut Simulation) -> EbmResult<()> {
        self.kernel = Some(sim.kernel()?);
        Ok(())
    }

    fn update_sim(&mut self, sim: &mut Simulation) -> EbmResult<()> {
        if self.kernel.is_none() {
            self.kernel = Some(sim.kernel()?);
        }
        if let Some(kernel) = &self.kernel {
            let day = sim.clock.day;
            let dt_seconds = sim.clock.dt_seconds();
            let (prev, next) = sim.grid.split_mut();
            kernel.step(prev, next, day, dt_seconds);
        }
        Ok(())
    }
}
