/// Local sea-ice thermodynamics.
///
/// The sign of the enthalpy E decides the state; there is no other memory.
/// Open water stores sensible heat, ice stores the latent deficit as
/// thickness, and the ice surface temperature comes from a steady
/// conduction balance through the slab.

use crate::constants::{ICE_CONDUCTIVITY_W_M_K, ICE_LATENT_HEAT_J_M3, MELT_TEMP_K, MIN_HEAT_CAPACITY_J_M2_K};
use crate::grid::IceState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IceParams {
    /// Latent heat of fusion per unit ice volume (J m^-3).
    pub latent_heat_j_m3: f64,
    /// Thermal conductivity of ice (W m^-1 K^-1).
    pub conductivity_w_m_k: f64,
}

impl Default for IceParams {
    fn default() -> Self {
        Self {
            latent_heat_j_m3: ICE_LATENT_HEAT_J_M3,
            conductivity_w_m_k: ICE_CONDUCTIVITY_W_M_K,
        }
    }
}

/// Diagnosed surface state for a given enthalpy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IceReconciliation {
    pub state: IceState,
    pub temperature_k: f64,
    pub ice_thickness_m: f64,
}

/// Ice thickness (m) held by a negative enthalpy.
///
/// Never zero while E < 0, even when -E / L underflows.
pub fn ice_thickness(energy_j_m2: f64, params: &IceParams) -> f64 {
    if energy_j_m2 < 0.0 {
        (-energy_j_m2 / params.latent_heat_j_m3).max(f64::MIN_POSITIVE)
    } else {
        0.0
    }
}

/// Surface temperature of an ice slab of thickness `h`.
///
/// `net_flux_at_melt` is the surface flux balance evaluated at the melting
/// point (absorbed shortwave minus OLR at 273.15 K). A surplus holds the
/// surface at the melting point; a deficit is shared between the
/// atmospheric sensitivity B and the conductance k/h of the slab.
pub fn ice_surface_temperature(net_flux_at_melt: f64, olr_b: f64, h: f64, params: &IceParams) -> f64 {
    if net_flux_at_melt >= 0.0 {
        return MELT_TEMP_K;
    }
    // A h / (B h + k) equals (A / B) / (1 + k / (B h)) but stays finite as h -> 0
    let denominator = (olr_b * h + params.conductivity_w_m_k).max(f64::EPSILON);
    MELT_TEMP_K + net_flux_at_melt * h / denominator
}

/// Shortwave coalbedo under the smooth ice-albedo scheme.
///
/// Midway between the open-water and ice coalbedos, moved towards either
/// by tanh(E / (L_ice h_scale)).
pub fn smooth_coalbedo(
    energy_j_m2: f64,
    clear_albedo: f64,
    ice_albedo: f64,
    params: &IceParams,
    h_scale_m: f64,
) -> f64 {
    let open = 1.0 - clear_albedo;
    let ice = 1.0 - ice_albedo;
    let mid = 0.5 * (open + ice);
    let delta = open - ice;
    let scale = (params.latent_heat_j_m3 * h_scale_m).max(f64::EPSILON);
    mid + 0.5 * delta * (energy_j_m2 / scale).tanh()
}

/// Diagnoses state, temperature and ice thickness from the updated enthalpy.
pub fn reconcile(
    energy_j_m2: f64,
    heat_capacity_j_m2_k: f64,
    net_flux_at_melt: f64,
    olr_b: f64,
    params: &IceParams,
) -> IceReconciliation {
    match IceState::from_energy(energy_j_m2) {
        IceState::OpenWater => IceReconciliation {
            state: IceState::OpenWater,
            temperature_k: MELT_TEMP_K
                + energy_j_m2 / heat_capacity_j_m2_k.max(MIN_HEAT_CAPACITY_J_M2_K),
            ice_thickness_m: 0.0,
        },
        IceState::IceCovered => {
            let h = ice_thickness(energy_j_m2, params);
            IceReconciliation {
                state: IceState::IceCovered,
                temperature_k: ice_surface_temperature(net_flux_at_melt, olr_b, h, params),
                ice_thickness_m: h,
            }
        }
    }
}
