pub mod insolation;
pub mod insolation_table;
pub mod orbit;

pub use insolation::{
    daily_mean_flux, instantaneous_flux, ForcingMode, OrbitalForcing, SolarForcing, SolarGeometry,
};
pub use insolation_table::InsolationTable;
pub use orbit::{half_day_angle, hour_angle, OrbitalParams};
