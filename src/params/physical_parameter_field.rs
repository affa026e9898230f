/// Immutable per-cell physical parameters.
///
/// Geography (where the land is, how deep the mixed layer is, how strongly
/// each cell radiates) lives here, built once before the first step and then
/// shared read-only by every cell update.

use crate::constants::{
    ALBEDO_A0, ALBEDO_A2, ALBEDO_ICE, ALBEDO_LAND, LAND_DEPTH_M, MIN_HEAT_CAPACITY_J_M2_K,
    OCEAN_DEPTH_M, OLR_B_W_M2_K, WATER_DENSITY_KG_M3, WATER_SPECIFIC_HEAT_J_KG_K,
};
use crate::error::{EbmError, EbmResult};
use crate::grid::GridMapper;
use crate::math_utils::lerp;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellParams {
    pub lat_deg: f64,
    pub lon_deg: f64,
    /// OLR sensitivity B (W m^-2 K^-1).
    pub olr_b: f64,
    /// Mixed-layer depth (m).
    pub depth_m: f64,
    /// rho * c_p * depth (J m^-2 K^-1).
    pub heat_capacity_j_m2_k: f64,
    pub a0: f64,
    pub a2: f64,
    pub a_ice: f64,
    pub a_land: f64,
    /// 0 = all ocean, 1 = all land.
    pub land_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalParameterField {
    pub nx: usize,
    pub ny: usize,
    cells: Vec<CellParams>,
}

impl PhysicalParameterField {
    pub fn cells(&self) -> &[CellParams] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> &CellParams {
        &self.cells[index]
    }

    pub fn land_area_fraction(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.cells.iter().map(|c| c.land_fraction).sum::<f64>() / self.cells.len() as f64
    }

    /// Fails when the field was built for a different grid.
    pub fn ensure_matches(&self, mapper: &GridMapper) -> EbmResult<()> {
        if self.nx != mapper.nx || self.ny != mapper.ny {
            return Err(EbmError::shape(
                "physical parameter field",
                mapper.nx,
                mapper.ny,
                self.cells.len(),
            ));
        }
        mapper.ensure_len("physical parameter field", self.cells.len())
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> EbmResult<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P, mapper: &GridMapper) -> EbmResult<Self> {
        let field: PhysicalParameterField = serde_json::from_str(&fs::read_to_string(path)?)?;
        field.ensure_matches(mapper)?;
        Ok(field)
    }
}

/// Axis-aligned lat/lon box; `lon_min > lon_max` wraps across 0°.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLonRect {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl LatLonRect {
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self { lat_min, lat_max, lon_min, lon_max }
    }

    pub fn contains(&self, lat_deg: f64, lon_deg: f64) -> bool {
        if lat_deg < self.lat_min || lat_deg > self.lat_max {
            return false;
        }
        let lon = lon_deg.rem_euclid(360.0);
        let (lo, hi) = (self.lon_min.rem_euclid(360.0), self.lon_max.rem_euclid(360.0));
        if lo <= hi {
            lon >= lo && lon <= hi
        } else {
            lon >= lo || lon <= hi
        }
    }
}

#[derive(Debug, Clone)]
enum LandMask {
    None,
    Rects(Vec<LatLonRect>),
    Perlin { seed: u32, frequency: f64, land_fraction: f64 },
    Explicit(Vec<f64>),
}

pub struct PhysicalParameterFieldBuilder {
    mapper: GridMapper,
    olr_b: f64,
    olr_b_field: Option<Vec<f64>>,
    ocean_depth_m: f64,
    land_depth_m: f64,
    water_density: f64,
    water_specific_heat: f64,
    a0: f64,
    a2: f64,
    a_ice: f64,
    a_land: f64,
    land: LandMask,
}

impl PhysicalParameterFieldBuilder {
    pub fn new(mapper: GridMapper) -> Self {
        Self {
            mapper,
            olr_b: OLR_B_W_M2_K,
            olr_b_field: None,
            ocean_depth_m: OCEAN_DEPTH_M,
            land_depth_m: LAND_DEPTH_M,
            water_density: WATER_DENSITY_KG_M3,
            water_specific_heat: WATER_SPECIFIC_HEAT_J_KG_K,
            a0: ALBEDO_A0,
            a2: ALBEDO_A2,
            a_ice: ALBEDO_ICE,
            a_land: ALBEDO_LAND,
            land: LandMask::None,
        }
    }

    pub fn olr_b(mut self, olr_b: f64) -> Self {
        self.olr_b = olr_b;
        self
    }

    /// Per-cell B values, row-major; replaces the uniform default.
    pub fn olr_b_field(mut self, values: Vec<f64>) -> Self {
        self.olr_b_field = Some(values);
        self
    }

    pub fn depths(mut self, ocean_depth_m: f64, land_depth_m: f64) -> Self {
        self.ocean_depth_m = ocean_depth_m;
        self.land_depth_m = land_depth_m;
        self
    }

    pub fn water(mut self, density: f64, specific_heat: f64) -> Self {
        self.water_density = density;
        self.water_specific_heat = specific_heat;
        self
    }

    pub fn albedo(mut self, a0: f64, a2: f64, a_ice: f64, a_land: f64) -> Self {
        self.a0 = a0;
        self.a2 = a2;
        self.a_ice = a_ice;
        self.a_land = a_land;
        self
    }

    pub fn land_rects(mut self, rects: Vec<LatLonRect>) -> Self {
        self.land = LandMask::Rects(rects);
        self
    }

    /// Continents from Perlin noise sampled on the unit sphere; the
    /// `land_fraction` highest-noise cells become land.
    pub fn perlin_land(mut self, seed: u32, frequency: f64, land_fraction: f64) -> Self {
        self.land = LandMask::Perlin { seed, frequency, land_fraction };
        self
    }

    /// Per-cell land fractions in [0, 1], row-major.
    pub fn land_fractions(mut self, values: Vec<f64>) -> Self {
        self.land = LandMask::Explicit(values);
        self
    }

    fn land_fractions_for_grid(&self) -> EbmResult<Vec<f64>> {
        let mapper = self.mapper;
        let n = mapper.len();
        let fractions = match &self.land {
            LandMask::None => vec![0.0; n],
            LandMask::Rects(rects) => (0..n)
                .map(|index| {
                    let (i, j) = mapper.coords(index);
                    let (lat, lon) = (mapper.lat_deg(j), mapper.lon_deg(i));
                    if rects.iter().any(|r| r.contains(lat, lon)) { 1.0 } else { 0.0 }
                })
                .collect(),
            LandMask::Perlin { seed, frequency, land_fraction } => {
                let perlin = Perlin::new(*seed);
                let heights: Vec<f64> = (0..n)
                    .map(|index| {
                        let (i, j) = mapper.coords(index);
                        let (lat, lon) = (mapper.lat_rad(j), mapper.lon_deg(i).to_radians());
                        let p = [
                            lat.cos() * lon.cos() * frequency,
                            lat.cos() * lon.sin() * frequency,
                            lat.sin() * frequency,
                        ];
                        perlin.get(p)
                    })
                    .collect();
                let mut sorted: Vec<usize> = (0..n).collect();
                sorted.sort_unstable_by(|&a, &b| heights[b].total_cmp(&heights[a]));
                let num_land = ((n as f64) * land_fraction.clamp(0.0, 1.0)).round() as usize;
                let mut fractions = vec![0.0; n];
                for &index in &sorted[..num_land.min(n)] {
                    fractions[index] = 1.0;
                }
                fractions
            }
            LandMask::Explicit(values) => {
                mapper.ensure_len("land fraction field", values.len())?;
                values.iter().map(|v| v.clamp(0.0, 1.0)).collect()
            }
        };
        Ok(fractions)
    }

    pub fn build(self) -> EbmResult<PhysicalParameterField> {
        if !(self.ocean_depth_m > 0.0) || !(self.land_depth_m > 0.0) {
            return Err(EbmError::Configuration(format!(
                "mixed-layer depths must be positive (ocean {}, land {})",
                self.ocean_depth_m, self.land_depth_m
            )));
        }
        if let Some(values) = &self.olr_b_field {
            self.mapper.ensure_len("OLR sensitivity field", values.len())?;
        }

        let mapper = self.mapper;
        let land = self.land_fractions_for_grid()?;
        let volumetric = self.water_density * self.water_specific_heat;

        let cells = (0..mapper.len())
            .map(|index| {
                let (i, j) = mapper.coords(index);
                let land_fraction = land[index];
                let depth_m = lerp(self.ocean_depth_m, self.land_depth_m, land_fraction);
                CellParams {
                    lat_deg: mapper.lat_deg(j),
                    lon_deg: mapper.lon_deg(i),
                    olr_b: self
                        .olr_b_field
                        .as_ref()
                        .map_or(self.olr_b, |values| values[index]),
                    depth_m,
                    heat_capacity_j_m2_k: (volumetric * depth_m).max(MIN_HEAT_CAPACITY_J_M2_K),
                    a0: self.a0,
                    a2: self.a2,
                    a_ice: self.a_ice,
                    a_land: self.a_land,
                    land_fraction,
                }
            })
            .collect();

        Ok(PhysicalParameterField {
            nx: mapper.nx,
            ny: mapper.ny,
            cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mapper() -> GridMapper {
        GridMapper::new(8, 4).unwrap()
    }

    #[test]
    fn uniform_ocean_defaults() {
        let field = PhysicalParameterFieldBuilder::new(mapper()).build().unwrap();
        assert_eq!(field.cells().len(), 32);
        let cell = field.get(0);
        assert_eq!(cell.olr_b, OLR_B_W_M2_K);
        assert_abs_diff_eq!(cell.heat_capacity_j_m2_k, 1000.0 * 4000.0 * 30.0, epsilon = 1e-3);
        assert_eq!(field.land_area_fraction(), 0.0);
    }

    #[test]
    fn land_rect_is_shallow() {
        let field = PhysicalParameterFieldBuilder::new(mapper())
            .land_rects(vec![LatLonRect::new(0.0, 90.0, 0.0, 90.0)])
            .build()
            .unwrap();
        let grid = mapper();
        // (lon 22.5, lat 22.5) is inside, (lon 202.5, lat 22.5) is not
        let inside = field.get(grid.index(0, 2));
        let outside = field.get(grid.index(4, 2));
        assert_eq!(inside.land_fraction, 1.0);
        assert_eq!(inside.depth_m, LAND_DEPTH_M);
        assert_eq!(outside.land_fraction, 0.0);
        assert_eq!(outside.depth_m, OCEAN_DEPTH_M);
    }

    #[test]
    fn rect_wraps_across_prime_meridian() {
        let rect = LatLonRect::new(-10.0, 10.0, 350.0, 10.0);
        assert!(rect.contains(0.0, 355.0));
        assert!(rect.contains(0.0, 5.0));
        assert!(!rect.contains(0.0, 180.0));
        assert!(!rect.contains(20.0, 5.0));
    }

    #[test]
    fn perlin_land_hits_target_fraction() {
        let grid = GridMapper::new(32, 16).unwrap();
        let field = PhysicalParameterFieldBuilder::new(grid)
            .perlin_land(7, 1.5, 0.25)
            .build()
            .unwrap();
        assert_abs_diff_eq!(field.land_area_fraction(), 0.25, epsilon = 1.0 / 512.0);
    }

    #[test]
    fn explicit_land_fractions_blend_depth_and_albedo() {
        let mut fractions = vec![0.0; 32];
        fractions[5] = 0.5;
        fractions[6] = 1.7;
        let field = PhysicalParameterFieldBuilder::new(mapper())
            .land_fractions(fractions)
            .build()
            .unwrap();
        assert_abs_diff_eq!(field.get(5).depth_m, 0.5 * (OCEAN_DEPTH_M + LAND_DEPTH_M), epsilon = 1e-12);
        assert_eq!(field.get(6).land_fraction, 1.0);
        assert_abs_diff_eq!(field.land_area_fraction(), 1.5 / 32.0, epsilon = 1e-12);
    }

    #[test]
    fn b_field_shape_is_checked() {
        let err = PhysicalParameterFieldBuilder::new(mapper())
            .olr_b_field(vec![2.0; 5])
            .build()
            .unwrap_err();
        assert!(matches!(err, EbmError::ShapeMismatch { .. }));
    }

    #[test]
    fn grid_mismatch_is_detected() {
        let field = PhysicalParameterFieldBuilder::new(mapper()).build().unwrap();
        let other = GridMapper::new(4, 8).unwrap();
        assert!(field.ensure_matches(&other).is_err());
        assert!(field.ensure_matches(&mapper()).is_ok());
    }

    #[test]
    fn json_round_trip_through_file() {
        let field = PhysicalParameterFieldBuilder::new(mapper()).olr_b(1.7).build().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        field.save_json(&path).unwrap();
        let loaded = PhysicalParameterField::load_json(&path, &mapper()).unwrap();
        assert_eq!(loaded, field);
    }
}
