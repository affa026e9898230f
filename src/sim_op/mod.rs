pub mod csv_writer_op;
pub mod energy_balance_op;
pub mod initial_state_op;
pub mod snapshot_recorder_op;
pub mod temperature_reporting_op;

pub use csv_writer_op::CsvWriterOp;
pub use energy_balance_op::EnergyBalanceOp;
pub use initial_state_op::{InitialStateOp, InitialStateParams, InitialTemperature};
pub use snapshot_recorder_op::{Snapshot, SnapshotRecorderOp};
pub use temperature_reporting_op::TemperatureReportingOp;

use crate::error::EbmResult;
use crate::sim::simulation::Simulation;

pub trait SimOp {
    /// The name of this operator (for identification and lookup)
    fn name(&self) -> &str;

    /// Called once at the beginning of the simulation
    fn init_sim(&mut self, _sim: &mut Simulation) -> EbmResult<()> {
        Ok(())
    }

    /// Called every step, before the next buffer is committed.
    /// Reads `sim.grid.current()`, writes `sim.grid.next`.
    fn update_sim(&mut self, _sim: &mut Simulation) -> EbmResult<()> {
        Ok(())
    }

    /// Called every step once the new snapshot is current.
    fn after_step(&mut self, _sim: &mut Simulation) -> EbmResult<()> {
        Ok(())
    }

    /// Called once at the end of the simulation
    fn after_sim(&mut self, _sim: &mut Simulation) -> EbmResult<()> {
        Ok(())
    }
}

pub struct SimOpHandle {
    pub op: Box<dyn SimOp>,
}

impl SimOpHandle {
    /// Create a new SimOpHandle with the given operation
    pub fn new(op: Box<dyn SimOp>) -> Self {
        SimOpHandle { op }
    }
}
