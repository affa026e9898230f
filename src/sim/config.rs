/// Run configuration loaded from JSON.
///
/// Every section falls back to its defaults, so a config file only needs the
/// values it changes. `validate` is called before anything is built.

use crate::constants::*;
use crate::error::{EbmError, EbmResult};
use crate::grid::GridMapper;
use crate::params::{LatLonRect, PhysicalParameterField, PhysicalParameterFieldBuilder};
use crate::physics::{
    AlbedoScheme, IceParams, KernelSettings, MoistureParams, SurfaceEnergyParams, TransportParams,
};
use crate::sim::clock::SimulationClock;
use crate::solar::{ForcingMode, InsolationTable, OrbitalForcing, OrbitalParams, SolarForcing};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub nx: usize,
    pub ny: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            nx: DEFAULT_NX,
            ny: DEFAULT_NY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiationConfig {
    pub solar_constant: f64,
    pub olr_a: f64,
    pub olr_b: f64,
    pub forcing_mode: ForcingMode,
}

impl Default for RadiationConfig {
    fn default() -> Self {
        Self {
            solar_constant: SOLAR_CONSTANT_W_M2,
            olr_a: OLR_A_W_M2,
            olr_b: OLR_B_W_M2_K,
            forcing_mode: ForcingMode::Instantaneous,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbedoConfig {
    pub a0: f64,
    pub a2: f64,
    pub a_ice: f64,
    pub a_land: f64,
    pub freeze_threshold_k: f64,
    pub scheme: AlbedoScheme,
}

impl Default for AlbedoConfig {
    fn default() -> Self {
        Self {
            a0: ALBEDO_A0,
            a2: ALBEDO_A2,
            a_ice: ALBEDO_ICE,
            a_land: ALBEDO_LAND,
            freeze_threshold_k: FREEZE_THRESHOLD_K,
            scheme: AlbedoScheme::TemperatureThreshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub ocean_depth_m: f64,
    pub land_depth_m: f64,
    pub water_density: f64,
    pub water_specific_heat: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            ocean_depth_m: OCEAN_DEPTH_M,
            land_depth_m: LAND_DEPTH_M,
            water_density: WATER_DENSITY_KG_M3,
            water_specific_heat: WATER_SPECIFIC_HEAT_J_KG_K,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerlinLandConfig {
    pub seed: u32,
    pub frequency: f64,
    pub fraction: f64,
}

/// Where the continents are. Rectangles win over Perlin noise when both are given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandConfig {
    pub rects: Vec<LatLonRect>,
    pub perlin: Option<PerlinLandConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub diffusivity: f64,
    pub relative_humidity: f64,
    pub surface_pressure_hpa: f64,
    pub meridional_moisture: bool,
    pub zonal_moisture: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            diffusivity: DIFFUSIVITY_W_M2_K,
            relative_humidity: RELATIVE_HUMIDITY,
            surface_pressure_hpa: SURFACE_PRESSURE_HPA,
            meridional_moisture: true,
            zonal_moisture: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub dt_days: f64,
    pub steps: u32,
    pub start_day: f64,
    pub initial_temperature_k: f64,
    /// Amplitude of a uniform random offset added to the initial temperature.
    pub initial_perturbation_k: f64,
    pub seed: u64,
    pub use_insolation_table: bool,
    pub table_days: usize,
    pub table_lats: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dt_days: DEFAULT_DT_DAYS,
            steps: DEFAULT_STEPS,
            start_day: 0.0,
            initial_temperature_k: DEFAULT_INITIAL_TEMP_K,
            initial_perturbation_k: 0.0,
            seed: 0,
            use_insolation_table: false,
            table_days: DEFAULT_TABLE_DAYS,
            table_lats: DEFAULT_TABLE_LATS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EbmConfig {
    pub grid: GridConfig,
    pub orbit: OrbitalParams,
    pub radiation: RadiationConfig,
    pub albedo: AlbedoConfig,
    pub surface: SurfaceConfig,
    pub land: LandConfig,
    pub ice: IceParams,
    pub transport: TransportConfig,
    pub run: RunConfig,
}

fn require(ok: bool, message: impl FnOnce() -> String) -> EbmResult<()> {
    if ok { Ok(()) } else { Err(EbmError::Configuration(message())) }
}

impl EbmConfig {
    pub fn load_json<P: AsRef<Path>>(path: P) -> EbmResult<Self> {
        let config: EbmConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> EbmResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> EbmResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> EbmResult<()> {
        require(self.grid.nx > 0 && self.grid.ny > 0, || {
            format!("grid must be at least 1x1, got {}x{}", self.grid.nx, self.grid.ny)
        })?;
        require(self.run.dt_days > 0.0 && self.run.dt_days.is_finite(), || {
            format!("dt_days must be positive, got {}", self.run.dt_days)
        })?;
        require(self.orbit.days_per_year > 0.0, || {
            format!("days_per_year must be positive, got {}", self.orbit.days_per_year)
        })?;
        require((0.0..1.0).contains(&self.orbit.eccentricity), || {
            format!("eccentricity must be in [0, 1), got {}", self.orbit.eccentricity)
        })?;
        require(self.radiation.solar_constant >= 0.0, || {
            format!("solar constant must be non-negative, got {}", self.radiation.solar_constant)
        })?;
        require(
            self.surface.water_density > 0.0 && self.surface.water_specific_heat > 0.0,
            || "water density and specific heat must be positive".to_string(),
        )?;
        require(
            self.transport.relative_humidity >= 0.0 && self.transport.surface_pressure_hpa > 0.0,
            || "relative humidity and surface pressure must be non-negative and positive".to_string(),
        )?;
        require(self.run.initial_temperature_k > 0.0, || {
            format!("initial temperature must be positive, got {}", self.run.initial_temperature_k)
        })?;
        if self.run.use_insolation_table {
            require(self.run.table_days >= 2 && self.run.table_lats >= 2, || {
                format!(
                    "insolation table needs at least 2x2 nodes, got {}x{}",
                    self.run.table_days, self.run.table_lats
                )
            })?;
        }
        self.kernel_settings().validate()
    }

    pub fn mapper(&self) -> EbmResult<GridMapper> {
        GridMapper::new(self.grid.nx, self.grid.ny)
    }

    pub fn clock(&self) -> SimulationClock {
        SimulationClock::new(self.run.start_day, self.run.dt_days)
    }

    pub fn parameter_builder(&self, mapper: GridMapper) -> PhysicalParameterFieldBuilder {
        let builder = PhysicalParameterFieldBuilder::new(mapper)
            .olr_b(self.radiation.olr_b)
            .depths(self.surface.ocean_depth_m, self.surface.land_depth_m)
            .water(self.surface.water_density, self.surface.water_specific_heat)
            .albedo(self.albedo.a0, self.albedo.a2, self.albedo.a_ice, self.albedo.a_land);
        if !self.land.rects.is_empty() {
            builder.land_rects(self.land.rects.clone())
        } else if let Some(perlin) = self.land.perlin {
            builder.perlin_land(perlin.seed, perlin.frequency, perlin.fraction)
        } else {
            builder
        }
    }

    pub fn parameter_field(&self, mapper: GridMapper) -> EbmResult<PhysicalParameterField> {
        self.parameter_builder(mapper).build()
    }

    pub fn orbital_forcing(&self) -> OrbitalForcing {
        OrbitalForcing::new(self.orbit, self.radiation.solar_constant)
    }

    /// Closed-form forcing, or a lookup table sampled from it.
    pub fn solar_forcing(&self) -> EbmResult<Arc<dyn SolarForcing>> {
        let orbital = self.orbital_forcing();
        if self.run.use_insolation_table {
            let table = InsolationTable::from_forcing(&orbital, self.run.table_days, self.run.table_lats)?;
            Ok(Arc::new(table))
        } else {
            Ok(Arc::new(orbital))
        }
    }

    pub fn kernel_settings(&self) -> KernelSettings {
        KernelSettings {
            surface: SurfaceEnergyParams {
                olr_a: self.radiation.olr_a,
                freeze_threshold_k: self.albedo.freeze_threshold_k,
                albedo_scheme: self.albedo.scheme,
            },
            ice: self.ice,
            transport: TransportParams {
                diffusivity_w_m2_k: self.transport.diffusivity,
                meridional_moisture: self.transport.meridional_moisture,
                zonal_moisture: self.transport.zonal_moisture,
                moisture: MoistureParams {
                    relative_humidity: self.transport.relative_humidity,
                    surface_pressure_hpa: self.transport.surface_pressure_hpa,
                    ..MoistureParams::default()
                },
            },
            forcing_mode: self.radiation.forcing_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        EbmConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: EbmConfig = serde_json::from_str(
            r#"{ "grid": { "nx": 8, "ny": 4 }, "radiation": { "forcing_mode": "daily_mean" } }"#,
        )
        .unwrap();
        assert_eq!(config.grid.nx, 8);
        assert_eq!(config.radiation.forcing_mode, ForcingMode::DailyMean);
        assert_eq!(config.radiation.solar_constant, SOLAR_CONSTANT_W_M2);
        assert_eq!(config.run, RunConfig::default());
    }

    #[test]
    fn albedo_scheme_parses() {
        let config: EbmConfig = serde_json::from_str(
            r#"{ "albedo": { "scheme": { "type": "smooth_ice", "h_scale_m": 0.5 } } }"#,
        )
        .unwrap();
        assert_eq!(config.albedo.scheme, AlbedoScheme::SmoothIce { h_scale_m: 0.5 });
    }

    #[test]
    fn rejects_zero_grid() {
        let mut config = EbmConfig::default();
        config.grid.nx = 0;
        assert!(matches!(config.validate(), Err(EbmError::Configuration(_))));
    }

    #[test]
    fn rejects_non_positive_dt() {
        let mut config = EbmConfig::default();
        config.run.dt_days = 0.0;
        assert!(config.validate().is_err());
        config.run.dt_days = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn kernel_settings_follow_sections() {
        let mut config = EbmConfig::default();
        config.transport.zonal_moisture = false;
        config.radiation.olr_a = 200.0;
        let settings = config.kernel_settings();
        assert!(!settings.transport.zonal_moisture);
        assert!(settings.transport.meridional_moisture);
        assert_eq!(settings.surface.olr_a, 200.0);
    }

    #[test]
    fn json_file_round_trip() {
        let mut config = EbmConfig::default();
        config.land.rects.push(LatLonRect::new(-30.0, 30.0, 10.0, 60.0));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        config.save_json(&path).unwrap();
        assert_eq!(EbmConfig::load_json(&path).unwrap(), config);
    }

    #[test]
    fn table_forcing_is_built_on_request() {
        let mut config = EbmConfig::default();
        config.run.use_insolation_table = true;
        config.run.table_days = 37;
        config.run.table_lats = 19;
        let forcing = config.solar_forcing().unwrap();
        assert_eq!(forcing.solar_constant(), SOLAR_CONSTANT_W_M2);
    }
}
