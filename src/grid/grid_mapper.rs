/// Maps grid indices to cell-centre geography and spherical metrics.
///
/// Cells are indexed `(i, j)` with `i` along longitude (eastward, periodic)
/// and `j` along latitude (south to north, open at the poles). Flat buffers
/// are row-major: `index = j * nx + i`.

use crate::constants::EARTH_RADIUS_M;
use crate::error::{EbmError, EbmResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMapper {
    pub nx: usize,
    pub ny: usize,
    pub radius_m: f64,
}

impl GridMapper {
    pub fn new(nx: usize, ny: usize) -> EbmResult<Self> {
        Self::with_radius(nx, ny, EARTH_RADIUS_M)
    }

    pub fn with_radius(nx: usize, ny: usize, radius_m: f64) -> EbmResult<Self> {
        if nx == 0 || ny == 0 {
            return Err(EbmError::Configuration(format!(
                "grid must have at least one cell per axis, got {nx}x{ny}"
            )));
        }
        if !(radius_m > 0.0) {
            return Err(EbmError::Configuration(format!(
                "planet radius must be positive, got {radius_m}"
            )));
        }
        Ok(Self { nx, ny, radius_m })
    }

    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.nx + i
    }

    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.nx, index / self.nx)
    }

    /// Cell-centre latitude in degrees, in (-90, 90).
    pub fn lat_deg(&self, j: usize) -> f64 {
        (j as f64 + 0.5) / self.ny as f64 * 180.0 - 90.0
    }

    /// Cell-centre longitude in degrees, in (0, 360).
    pub fn lon_deg(&self, i: usize) -> f64 {
        (i as f64 + 0.5) / self.nx as f64 * 360.0
    }

    pub fn lat_rad(&self, j: usize) -> f64 {
        self.lat_deg(j).to_radians()
    }

    /// Zonal angular spacing, 2π / nx.
    pub fn d_lambda(&self) -> f64 {
        2.0 * PI / self.nx as f64
    }

    /// Meridional angular spacing, π / ny.
    pub fn d_phi(&self) -> f64 {
        PI / self.ny as f64
    }

    /// East-west cell width in metres at row `j`.
    pub fn dx_m(&self, j: usize) -> f64 {
        self.radius_m * self.lat_rad(j).cos() * self.d_lambda()
    }

    /// North-south cell height in metres.
    pub fn dy_m(&self) -> f64 {
        self.radius_m * self.d_phi()
    }

    /// Relative area of a cell in row `j` (cos φ weighting).
    pub fn area_weight(&self, j: usize) -> f64 {
        self.lat_rad(j).cos()
    }

    pub fn west(&self, i: usize) -> usize {
        (i + self.nx - 1) % self.nx
    }

    pub fn east(&self, i: usize) -> usize {
        (i + 1) % self.nx
    }

    /// Row to the south, `None` on the southern polar row.
    pub fn south(&self, j: usize) -> Option<usize> {
        j.checked_sub(1)
    }

    /// Row to the north, `None` on the northern polar row.
    pub fn north(&self, j: usize) -> Option<usize> {
        if j + 1 < self.ny { Some(j + 1) } else { None }
    }

    pub fn ensure_len(&self, what: &str, found: usize) -> EbmResult<()> {
        if found == self.len() {
            Ok(())
        } else {
            Err(EbmError::shape(what, self.nx, self.ny, found))
        }
    }
}
