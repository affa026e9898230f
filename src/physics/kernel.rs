/// Per-cell energy-balance update.
///
/// Every tendency of a step is computed from the frozen previous snapshot:
/// insolation and albedo, OLR, and the transport divergence are summed into
/// a single enthalpy increment. Ice is reconciled last, from the updated
/// enthalpy, so a committed cell always has h > 0 exactly when E < 0.

use crate::constants::ICE_ALBEDO_H_SCALE_M;
use crate::error::{EbmError, EbmResult};
use crate::grid::{Cell, GridMapper, IceState};
use crate::params::{CellParams, PhysicalParameterField};
use crate::physics::ice::{reconcile, smooth_coalbedo, IceParams};
use crate::physics::surface_energy::{
    albedo, clear_sky_albedo, euler_update, heat_capacity, radiative_tendency, AlbedoScheme,
    SurfaceEnergyParams,
};
use crate::physics::transport::{max_stable_dt_seconds, transport_tendency, TransportParams};
use crate::solar::{ForcingMode, SolarForcing};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelSettings {
    pub surface: SurfaceEnergyParams,
    pub ice: IceParams,
    pub transport: TransportParams,
    pub forcing_mode: ForcingMode,
}

impl KernelSettings {
    pub fn validate(&self) -> EbmResult<()> {
        if !(self.ice.latent_heat_j_m3 > 0.0) {
            return Err(EbmError::Configuration(format!(
                "ice latent heat must be positive, got {}",
                self.ice.latent_heat_j_m3
            )));
        }
        if !(self.ice.conductivity_w_m_k > 0.0) {
            return Err(EbmError::Configuration(format!(
                "ice conductivity must be positive, got {}",
                self.ice.conductivity_w_m_k
            )));
        }
        if !(self.transport.diffusivity_w_m2_k >= 0.0) {
            return Err(EbmError::Configuration(format!(
                "diffusivity must be non-negative, got {}",
                self.transport.diffusivity_w_m2_k
            )));
        }
        if let AlbedoScheme::SmoothIce { h_scale_m } = self.surface.albedo_scheme {
            if !(h_scale_m > 0.0) {
                return Err(EbmError::Configuration(format!(
                    "smooth ice albedo scale must be positive, got {h_scale_m}"
                )));
            }
        }
        Ok(())
    }
}

/// Albedo a cell presents to the sun at the start of a step.
///
/// Open water follows the configured scheme. Ice-covered cells always get the
/// tanh correction in E on top of it, so sunlight under ice is damped even
/// while the ice surface is warmer than the freeze threshold.
pub fn surface_albedo(settings: &KernelSettings, p: &CellParams, temp_k: f64, energy_j_m2: f64) -> f64 {
    let surface = &settings.surface;
    let smooth = |h_scale_m: f64| {
        1.0 - smooth_coalbedo(energy_j_m2, clear_sky_albedo(p), p.a_ice, &settings.ice, h_scale_m)
    };
    match (surface.albedo_scheme, IceState::from_energy(energy_j_m2)) {
        (AlbedoScheme::SmoothIce { h_scale_m }, _) => smooth(h_scale_m),
        (AlbedoScheme::TemperatureThreshold, IceState::OpenWater) => {
            albedo(temp_k, p, surface.freeze_threshold_k)
        }
        // cold ice keeps the full ice albedo
        (AlbedoScheme::TemperatureThreshold, IceState::IceCovered) => {
            albedo(temp_k, p, surface.freeze_threshold_k).max(smooth(ICE_ALBEDO_H_SCALE_M))
        }
    }
}

pub struct EbmKernel {
    mapper: GridMapper,
    params: Arc<PhysicalParameterField>,
    forcing: Arc<dyn SolarForcing>,
    settings: KernelSettings,
}

impl EbmKernel {
    pub fn new(
        mapper: GridMapper,
        params: Arc<PhysicalParameterField>,
        forcing: Arc<dyn SolarForcing>,
        settings: KernelSettings,
    ) -> EbmResult<Self> {
        params.ensure_matches(&mapper)?;
        settings.validate()?;
        Ok(Self {
            mapper,
            params,
            forcing,
            settings,
        })
    }

    pub fn mapper(&self) -> &GridMapper {
        &self.mapper
    }

    pub fn settings(&self) -> &KernelSettings {
        &self.settings
    }

    /// Explicit-step limit of the transport stencil at `reference_temp_k`,
    /// taken over the smallest heat capacity in the parameter field.
    pub fn max_stable_dt_seconds(&self, reference_temp_k: f64) -> f64 {
        let c_min = self
            .params
            .cells()
            .iter()
            .map(heat_capacity)
            .fold(f64::INFINITY, f64::min);
        max_stable_dt_seconds(&self.mapper, c_min, reference_temp_k, &self.settings.transport)
    }

    /// Top-of-atmosphere flux on cell `index` at `day`.
    pub fn insolation_at(&self, index: usize, day: f64) -> f64 {
        let (i, j) = self.mapper.coords(index);
        self.forcing.insolation(
            self.mapper.lat_deg(j),
            self.mapper.lon_deg(i),
            day,
            self.settings.forcing_mode,
        )
    }

    /// New state of cell `index` after one step of `dt_seconds` starting at `day`.
    pub fn step_cell(&self, prev: &[Cell], index: usize, day: f64, dt_seconds: f64) -> Cell {
        let (i, j) = self.mapper.coords(index);
        let cell = &prev[index];
        let p = self.params.get(index);
        let surface = &self.settings.surface;

        let insolation = self.insolation_at(index, day);
        let cell_albedo = surface_albedo(&self.settings, p, cell.temperature_k, cell.energy_j_m2);

        let c = heat_capacity(p);
        let radiative = radiative_tendency(cell_albedo, insolation, cell.temperature_k, p.olr_b, surface.olr_a);
        let transport = transport_tendency(
            &self.mapper,
            |k| prev[k].temperature_k,
            i,
            j,
            c,
            &self.settings.transport,
        );
        let net_flux = radiative + transport;
        let energy = euler_update(cell.energy_j_m2, net_flux, dt_seconds);

        // flux balance with the surface held at the melting point, where OLR = A
        let net_at_melt = (1.0 - cell_albedo) * insolation - surface.olr_a;
        let ice = reconcile(energy, c, net_at_melt, p.olr_b, &self.settings.ice);

        Cell {
            temperature_k: ice.temperature_k,
            energy_j_m2: energy,
            ice_thickness_m: ice.ice_thickness_m,
            insolation_w_m2: insolation,
            albedo: cell_albedo,
            net_flux_w_m2: net_flux,
        }
    }

    /// Fills `next` from `prev`, one independent task per cell.
    pub fn step(&self, prev: &[Cell], next: &mut [Cell], day: f64, dt_seconds: f64) {
        next.par_iter_mut().enumerate().for_each(|(index, out)| {
            *out = self.step_cell(prev, index, day, dt_seconds);
        });
    }
}
