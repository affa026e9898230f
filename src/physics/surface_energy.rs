/// Surface energy balance: albedo, outgoing longwave and the explicit update.

use crate::constants::{
    FREEZE_THRESHOLD_K, ICE_ALBEDO_H_SCALE_M, MELT_TEMP_K, MIN_HEAT_CAPACITY_J_M2_K, OLR_A_W_M2,
};
use crate::math_utils::lerp;
use crate::params::CellParams;
use serde::{Deserialize, Serialize};

/// How the albedo reacts to freezing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum AlbedoScheme {
    /// Step to the ice albedo once T drops below the freeze threshold.
    #[default]
    TemperatureThreshold,
    /// Blend between clear-sky and ice albedo with tanh(E / (L_ice h_scale)).
    SmoothIce { h_scale_m: f64 },
}

impl AlbedoScheme {
    pub fn smooth() -> Self {
        AlbedoScheme::SmoothIce { h_scale_m: ICE_ALBEDO_H_SCALE_M }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceEnergyParams {
    /// OLR at the melting point (W m^-2).
    pub olr_a: f64,
    pub freeze_threshold_k: f64,
    pub albedo_scheme: AlbedoScheme,
}

impl Default for SurfaceEnergyParams {
    fn default() -> Self {
        Self {
            olr_a: OLR_A_W_M2,
            freeze_threshold_k: FREEZE_THRESHOLD_K,
            albedo_scheme: AlbedoScheme::TemperatureThreshold,
        }
    }
}

/// Second Legendre polynomial, (3x² - 1) / 2.
pub fn legendre_p2(x: f64) -> f64 {
    0.5 * (3.0 * x * x - 1.0)
}

/// Ice-free albedo: a0 + a2 P2(sin φ), blended towards the land albedo.
pub fn clear_sky_albedo(cell: &CellParams) -> f64 {
    let ocean = cell.a0 + cell.a2 * legendre_p2(cell.lat_deg.to_radians().sin());
    lerp(ocean, cell.a_land, cell.land_fraction)
}

/// Threshold albedo: the ice albedo at or below `freeze_threshold_k`.
pub fn albedo(temp_k: f64, cell: &CellParams, freeze_threshold_k: f64) -> f64 {
    if temp_k > freeze_threshold_k {
        clear_sky_albedo(cell)
    } else {
        cell.a_ice
    }
}

/// Linearized outgoing longwave radiation, A + B (T - 273.15).
pub fn olr(temp_k: f64, olr_b: f64, olr_a: f64) -> f64 {
    olr_a + olr_b * (temp_k - MELT_TEMP_K)
}

/// Net surface heating rate (W m^-2) before transport.
pub fn radiative_tendency(albedo: f64, insolation: f64, temp_k: f64, olr_b: f64, olr_a: f64) -> f64 {
    (1.0 - albedo) * insolation - olr(temp_k, olr_b, olr_a)
}

pub fn heat_capacity(cell: &CellParams) -> f64 {
    cell.heat_capacity_j_m2_k.max(MIN_HEAT_CAPACITY_J_M2_K)
}

/// One explicit Euler step of the enthalpy.
pub fn euler_update(energy_j_m2: f64, tendency_w_m2: f64, dt_seconds: f64) -> f64 {
    energy_j_m2 + tendency_w_m2 * dt_seconds
}

/// Temperature change of ice-free water for the same step.
pub fn temperature_increment(tendency_w_m2: f64, dt_seconds: f64, heat_capacity_j_m2_k: f64) -> f64 {
    tendency_w_m2 * dt_seconds / heat_capacity_j_m2_k.max(MIN_HEAT_CAPACITY_J_M2_K)
}

/// Enthalpy of a cell at `temp_k`; negative below the melting point.
pub fn energy_from_temperature(temp_k: f64, heat_capacity_j_m2_k: f64) -> f64 {
    heat_capacity_j_m2_k * (temp_k - MELT_TEMP_K)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridMapper;
    use crate::params::PhysicalParameterFieldBuilder;
    use approx::assert_abs_diff_eq;
    use more_asserts::assert_ge;

    fn cell_at(j: usize) -> CellParams {
        let field = PhysicalParameterFieldBuilder::new(GridMapper::new(8, 4).unwrap())
            .build()
            .unwrap();
        *field.get(j * 8)
    }

    #[test]
    fn p2_values() {
        assert_eq!(legendre_p2(0.0), -0.5);
        assert_eq!(legendre_p2(1.0), 1.0);
    }

    #[test]
    fn threshold_scheme_is_the_default() {
        assert_eq!(AlbedoScheme::default(), AlbedoScheme::TemperatureThreshold);
        let parsed: AlbedoScheme = serde_json::from_str(r#"{ "type": "temperature_threshold" }"#).unwrap();
        assert_eq!(parsed, AlbedoScheme::default());
    }

    #[test]
    fn albedo_threshold() {
        let cell = cell_at(1);
        let clear = clear_sky_albedo(&cell);
        assert_eq!(albedo(FREEZE_THRESHOLD_K + 0.01, &cell, FREEZE_THRESHOLD_K), clear);
        assert_ge!(albedo(FREEZE_THRESHOLD_K - 0.01, &cell, FREEZE_THRESHOLD_K), clear);
    }

    #[test]
    fn land_blends_towards_land_albedo() {
        let mut cell = cell_at(2);
        let ocean = clear_sky_albedo(&cell);
        cell.land_fraction = 1.0;
        assert_eq!(clear_sky_albedo(&cell), cell.a_land);
        cell.land_fraction = 0.5;
        assert_abs_diff_eq!(clear_sky_albedo(&cell), 0.5 * (ocean + cell.a_land), epsilon = 1e-12);
    }

    #[test]
    fn olr_is_a_at_melting_point() {
        assert_eq!(olr(MELT_TEMP_K, 2.0, 210.0), 210.0);
        assert_abs_diff_eq!(olr(MELT_TEMP_K + 10.0, 2.0, 210.0), 230.0, epsilon = 1e-9);
    }

    #[test]
    fn euler_update_matches_temperature_increment() {
        let c = 1.2e8;
        let tendency = 50.0;
        let dt = 86_400.0;
        let e0 = energy_from_temperature(280.0, c);
        let e1 = euler_update(e0, tendency, dt);
        assert_abs_diff_eq!(
            (e1 - e0) / c,
            temperature_increment(tendency, dt, c),
            epsilon = 1e-12
        );
    }

    #[test]
    fn tiny_heat_capacity_is_floored() {
        let mut cell = cell_at(0);
        cell.heat_capacity_j_m2_k = 0.0;
        assert_eq!(heat_capacity(&cell), MIN_HEAT_CAPACITY_J_M2_K);
        assert!(temperature_increment(1.0, 1.0, 0.0).is_finite());
    }
}
