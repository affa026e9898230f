pub mod clock;
pub mod config;
pub mod simulation;

pub use clock::SimulationClock;
pub use config::EbmConfig;
pub use simulation::{OpTiming, SimProps, Simulation};
