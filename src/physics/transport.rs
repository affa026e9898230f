/// Diffusive heat transport on the sphere in flux form.
///
/// Each axis is a three-point stencil `lower, center, upper` with
/// `center = -(lower + upper)`. Coefficients carry units of 1/s, so the
/// temperature tendency is `lower T_lower + center T + upper T_upper` (K/s)
/// and the enthalpy tendency is C times that. Faces are shared between the
/// two cells they separate, which makes the scheme conserve
/// Σ C cos φ T exactly.
///
/// Meridional faces are weighted by cos φ at the face and the face weight at
/// a pole is zero, so no heat crosses a pole. The zonal axis wraps around.

use crate::constants::{DIFFUSIVITY_W_M2_K, MIN_HEAT_CAPACITY_J_M2_K};
use crate::grid::GridMapper;
use crate::physics::moisture::{moisture_amplification, MoistureParams};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportParams {
    /// Dry diffusivity D (W m^-2 K^-1).
    pub diffusivity_w_m2_k: f64,
    pub meridional_moisture: bool,
    pub zonal_moisture: bool,
    pub moisture: MoistureParams,
}

impl Default for TransportParams {
    fn default() -> Self {
        Self {
            diffusivity_w_m2_k: DIFFUSIVITY_W_M2_K,
            meridional_moisture: true,
            zonal_moisture: true,
            moisture: MoistureParams::default(),
        }
    }
}

impl TransportParams {
    pub fn dry(diffusivity_w_m2_k: f64) -> Self {
        Self {
            diffusivity_w_m2_k,
            meridional_moisture: false,
            zonal_moisture: false,
            ..Self::default()
        }
    }
}

/// Three-point stencil along one axis (1/s).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StencilCoefficients {
    pub lower: f64,
    pub center: f64,
    pub upper: f64,
}

impl StencilCoefficients {
    pub fn from_faces(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            center: -(lower + upper),
            upper,
        }
    }

    /// Temperature tendency (K/s).
    pub fn apply(&self, t_lower: f64, t_center: f64, t_upper: f64) -> f64 {
        self.lower * t_lower + self.center * t_center + self.upper * t_upper
    }
}

/// Effective diffusivity K = D / C * R² * (1 + f) at a face between two cells.
///
/// The moisture factor is evaluated at the mean of the two face temperatures,
/// so both cells see the same K.
pub fn face_diffusivity(
    t_a: f64,
    t_b: f64,
    heat_capacity_j_m2_k: f64,
    radius_m: f64,
    params: &TransportParams,
    with_moisture: bool,
) -> f64 {
    let f = if with_moisture {
        moisture_amplification(0.5 * (t_a + t_b), &params.moisture)
    } else {
        0.0
    };
    params.diffusivity_w_m2_k / heat_capacity_j_m2_k.max(MIN_HEAT_CAPACITY_J_M2_K)
        * radius_m
        * radius_m
        * (1.0 + f)
}

/// Meridional stencil for row `j` from the face diffusivities on its south
/// and north faces. A face without a neighbour (the poles) contributes zero.
pub fn meridional_coefficients(
    mapper: &GridMapper,
    j: usize,
    k_south: f64,
    k_north: f64,
) -> StencilCoefficients {
    let r = mapper.radius_m;
    let half = 0.5 * mapper.d_phi();
    let phi = mapper.lat_rad(j);
    let w_center = phi.cos();
    let x_center = r * phi;
    let cell_width = r * (2.0 * half);

    let lower = match mapper.south(j) {
        Some(js) => {
            let w_face = (phi - half).cos();
            let spacing = x_center - r * mapper.lat_rad(js);
            k_south * w_face / (w_center * cell_width * spacing)
        }
        None => 0.0,
    };
    let upper = match mapper.north(j) {
        Some(jn) => {
            let w_face = (phi + half).cos();
            let spacing = r * mapper.lat_rad(jn) - x_center;
            k_north * w_face / (w_center * cell_width * spacing)
        }
        None => 0.0,
    };
    StencilCoefficients::from_faces(lower, upper)
}

/// Zonal stencil for row `j`; periodic with unit face weights.
pub fn zonal_coefficients(mapper: &GridMapper, j: usize, k_west: f64, k_east: f64) -> StencilCoefficients {
    let dx = mapper.dx_m(j).max(f64::EPSILON);
    StencilCoefficients::from_faces(k_west / (dx * dx), k_east / (dx * dx))
}

/// Largest explicit step (s) keeping |center| dt <= 1 on every row, for
/// cells of heat capacity `heat_capacity_j_m2_k` at `reference_temp_k`.
/// Infinite when there is no transport at all.
pub fn max_stable_dt_seconds(
    mapper: &GridMapper,
    heat_capacity_j_m2_k: f64,
    reference_temp_k: f64,
    params: &TransportParams,
) -> f64 {
    let t = reference_temp_k;
    let r = mapper.radius_m;
    let k_meridional = face_diffusivity(t, t, heat_capacity_j_m2_k, r, params, params.meridional_moisture);
    let k_zonal = face_diffusivity(t, t, heat_capacity_j_m2_k, r, params, params.zonal_moisture);
    let stiffest = (0..mapper.ny)
        .map(|j| {
            let m = meridional_coefficients(mapper, j, k_meridional, k_meridional);
            let z = zonal_coefficients(mapper, j, k_zonal, k_zonal);
            -(m.center + z.center)
        })
        .fold(0.0, f64::max);
    if stiffest > 0.0 { 1.0 / stiffest } else { f64::INFINITY }
}

/// Transport heating (W m^-2) of cell (i, j) from a frozen temperature field.
pub fn transport_tendency(
    mapper: &GridMapper,
    temps: impl Fn(usize) -> f64,
    i: usize,
    j: usize,
    heat_capacity_j_m2_k: f64,
    params: &TransportParams,
) -> f64 {
    let r = mapper.radius_m;
    let t = temps(mapper.index(i, j));
    let face = |t_other: f64, moist: bool| {
        face_diffusivity(t, t_other, heat_capacity_j_m2_k, r, params, moist)
    };

    let t_south = mapper.south(j).map(|js| temps(mapper.index(i, js)));
    let t_north = mapper.north(j).map(|jn| temps(mapper.index(i, jn)));
    let meridional = meridional_coefficients(
        mapper,
        j,
        t_south.map_or(0.0, |ts| face(ts, params.meridional_moisture)),
        t_north.map_or(0.0, |tn| face(tn, params.meridional_moisture)),
    );

    let t_west = temps(mapper.index(mapper.west(i), j));
    let t_east = temps(mapper.index(mapper.east(i), j));
    let zonal = zonal_coefficients(
        mapper,
        j,
        face(t_west, params.zonal_moisture),
        face(t_east, params.zonal_moisture),
    );

    let dtemp_dt = meridional.apply(t_south.unwrap_or(t), t, t_north.unwrap_or(t))
        + zonal.apply(t_west, t, t_east);
    heat_capacity_j_m2_k.max(MIN_HEAT_CAPACITY_J_M2_K) * dtemp_dt
}
