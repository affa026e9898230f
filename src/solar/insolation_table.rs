/// Precomputed solar geometry sampled bilinearly.
///
/// Nodes sit on a regular lattice over `u = day / days_per_year` and
/// `v = (lat + 90) / 180`, both spanning [0, 1] inclusive. Each node stores
/// (declination, amplitude, H0); a lookup interpolates all three and the
/// flux is then evaluated exactly as for the closed form.

use crate::error::{EbmError, EbmResult};
use crate::math_utils::lattice_position;
use crate::solar::insolation::{OrbitalForcing, SolarForcing, SolarGeometry};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsolationTable {
    pub n_days: usize,
    pub n_lats: usize,
    pub days_per_year: f64,
    pub solar_constant: f64,
    /// Row-major over latitude: `nodes[lat_index * n_days + day_index]`.
    nodes: Vec<DVec3>,
}

impl InsolationTable {
    /// Samples `forcing` on an `n_days` x `n_lats` lattice.
    pub fn from_forcing(forcing: &OrbitalForcing, n_days: usize, n_lats: usize) -> EbmResult<Self> {
        if n_days < 2 || n_lats < 2 {
            return Err(EbmError::Configuration(format!(
                "insolation table needs at least 2x2 nodes, got {n_days}x{n_lats}"
            )));
        }
        let days_per_year = forcing.orbit.days_per_year;
        let mut nodes = Vec::with_capacity(n_days * n_lats);
        for m in 0..n_lats {
            let lat_deg = m as f64 / (n_lats - 1) as f64 * 180.0 - 90.0;
            for k in 0..n_days {
                let day = k as f64 / (n_days - 1) as f64 * days_per_year;
                let g = forcing.geometry(day, lat_deg);
                nodes.push(DVec3::new(g.declination, g.amplitude_w_m2, g.half_day_angle));
            }
        }
        Ok(Self {
            n_days,
            n_lats,
            days_per_year,
            solar_constant: forcing.solar_constant,
            nodes,
        })
    }

    fn node(&self, day_index: usize, lat_index: usize) -> DVec3 {
        self.nodes[lat_index * self.n_days + day_index]
    }

    /// Bilinear lookup at normalized coordinates, each clamped to [0, 1].
    pub fn sample(&self, u: f64, v: f64) -> SolarGeometry {
        let (k, fu) = lattice_position(u, self.n_days);
        let (m, fv) = lattice_position(v, self.n_lats);
        let south = self.node(k, m).lerp(self.node(k + 1, m), fu);
        let north = self.node(k, m + 1).lerp(self.node(k + 1, m + 1), fu);
        let value = south.lerp(north, fv);
        SolarGeometry {
            declination: value.x,
            amplitude_w_m2: value.y,
            half_day_angle: value.z,
        }
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> EbmResult<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> EbmResult<Self> {
        let table: InsolationTable = serde_json::from_str(&fs::read_to_string(path)?)?;
        if table.nodes.len() != table.n_days * table.n_lats || table.n_days < 2 || table.n_lats < 2 {
            return Err(EbmError::Configuration(format!(
                "insolation table declares {}x{} nodes but holds {}",
                table.n_days,
                table.n_lats,
                table.nodes.len()
            )));
        }
        Ok(table)
    }
}

impl SolarForcing for InsolationTable {
    fn solar_constant(&self) -> f64 {
        self.solar_constant
    }

    fn geometry(&self, day: f64, lat_deg: f64) -> SolarGeometry {
        let u = day.rem_euclid(self.days_per_year) / self.days_per_year;
        let v = (lat_deg + 90.0) / 180.0;
        self.sample(u, v)
    }
}
