/// Moist amplification of the diffusive heat transport.
/// Latent heat carried with water vapour scales the dry diffusivity by
/// 1 + f(T), f = L_v RH dq_sat/dT / c_p.

use crate::constants::{
    AIR_SPECIFIC_HEAT_J_KG_K, DQ_DT_STEP_K, EPSILON_RD_RV, LATENT_HEAT_VAPORIZATION_J_KG,
    RELATIVE_HUMIDITY, SURFACE_PRESSURE_HPA, TO_KELVIN,
};
use serde::{Deserialize, Serialize};

// Range where the Magnus fit is evaluated; temperatures outside are clamped.
const MAGNUS_MIN_K: f64 = 173.15;
const MAGNUS_MAX_K: f64 = 343.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoistureParams {
    pub relative_humidity: f64,
    pub surface_pressure_hpa: f64,
    pub latent_heat_j_kg: f64,
    pub air_specific_heat_j_kg_k: f64,
}

impl Default for MoistureParams {
    fn default() -> Self {
        Self {
            relative_humidity: RELATIVE_HUMIDITY,
            surface_pressure_hpa: SURFACE_PRESSURE_HPA,
            latent_heat_j_kg: LATENT_HEAT_VAPORIZATION_J_KG,
            air_specific_heat_j_kg_k: AIR_SPECIFIC_HEAT_J_KG_K,
        }
    }
}

/// Saturation vapour pressure over water (hPa), Magnus form.
pub fn saturation_vapor_pressure_hpa(temp_k: f64) -> f64 {
    let temp_c = temp_k.clamp(MAGNUS_MIN_K, MAGNUS_MAX_K) - TO_KELVIN;
    6.112 * (17.67 * temp_c / (temp_c + 243.5)).exp()
}

/// Saturation specific humidity (kg/kg) at `pressure_hpa`.
pub fn saturation_specific_humidity(temp_k: f64, pressure_hpa: f64) -> f64 {
    let e_s = saturation_vapor_pressure_hpa(temp_k);
    let denominator = (pressure_hpa - (1.0 - EPSILON_RD_RV) * e_s).max(f64::EPSILON);
    EPSILON_RD_RV * e_s / denominator
}

/// dq_sat/dT (kg/kg/K) from a centered difference.
pub fn dq_sat_dt(temp_k: f64, pressure_hpa: f64) -> f64 {
    let upper = saturation_specific_humidity(temp_k + DQ_DT_STEP_K, pressure_hpa);
    let lower = saturation_specific_humidity(temp_k - DQ_DT_STEP_K, pressure_hpa);
    (upper - lower) / (2.0 * DQ_DT_STEP_K)
}

/// Dimensionless amplification f(T) of the dry diffusivity.
pub fn moisture_amplification(temp_k: f64, params: &MoistureParams) -> f64 {
    params.latent_heat_j_kg * params.relative_humidity * dq_sat_dt(temp_k, params.surface_pressure_hpa)
        / params.air_specific_heat_j_kg_k
}
