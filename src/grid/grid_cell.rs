/// Surface state of one grid cell.
///
/// `energy_j_m2` is the enthalpy relative to open water at the melting point:
/// positive values are sensible heat stored in the mixed layer, negative values
/// are latent heat locked up in ice. It is the only prognostic quantity; the
/// temperature and ice thickness are diagnosed from it every step.

use crate::constants::MELT_TEMP_K;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IceState {
    OpenWater,
    IceCovered,
}

impl IceState {
    pub fn from_energy(energy_j_m2: f64) -> Self {
        if energy_j_m2 < 0.0 {
            IceState::IceCovered
        } else {
            IceState::OpenWater
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub temperature_k: f64,
    pub energy_j_m2: f64,
    pub ice_thickness_m: f64,
    /// Top-of-atmosphere insolation used in the last step (W m^-2).
    pub insolation_w_m2: f64,
    /// Albedo applied in the last step.
    pub albedo: f64,
    /// Net surface energy tendency of the last step, radiation plus transport (W m^-2).
    pub net_flux_w_m2: f64,
}

impl Default for Cell {
    fn default() -> Self {
        Self::open_water(MELT_TEMP_K, 0.0)
    }
}

impl Cell {
    /// Open-water cell at `temperature_k` holding `energy_j_m2` of sensible heat.
    pub fn open_water(temperature_k: f64, energy_j_m2: f64) -> Self {
        Self {
            temperature_k,
            energy_j_m2,
            ice_thickness_m: 0.0,
            insolation_w_m2: 0.0,
            albedo: 0.0,
            net_flux_w_m2: 0.0,
        }
    }

    pub fn ice_state(&self) -> IceState {
        IceState::from_energy(self.energy_j_m2)
    }

    pub fn is_ice_covered(&self) -> bool {
        self.ice_state() == IceState::IceCovered
    }

    pub fn is_finite(&self) -> bool {
        self.temperature_k.is_finite()
            && self.energy_j_m2.is_finite()
            && self.ice_thickness_m.is_finite()
            && self.insolation_w_m2.is_finite()
            && self.albedo.is_finite()
            && self.net_flux_w_m2.is_finite()
    }
}
