/// Closed-form top-of-atmosphere insolation.

use crate::constants::SOLAR_CONSTANT_W_M2;
use crate::solar::orbit::{half_day_angle, hour_angle, OrbitalParams};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Everything about the Sun that depends on (day, latitude) but not on longitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarGeometry {
    /// Declination δ (radians).
    pub declination: f64,
    /// S0 scaled by the distance factor (W m^-2).
    pub amplitude_w_m2: f64,
    /// Half-day hour angle H0 (radians).
    pub half_day_angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcingMode {
    /// Flux at the cell's local hour angle.
    #[default]
    Instantaneous,
    /// Flux averaged over the whole day.
    DailyMean,
}

/// Flux (W m^-2) at hour angle `h` for a given geometry, clamped to [0, S0].
pub fn instantaneous_flux(geometry: &SolarGeometry, lat_rad: f64, h: f64, solar_constant: f64) -> f64 {
    if h.abs() >= geometry.half_day_angle {
        return 0.0;
    }
    let cos_zenith = lat_rad.sin() * geometry.declination.sin()
        + lat_rad.cos() * geometry.declination.cos() * h.cos();
    (geometry.amplitude_w_m2 * cos_zenith).clamp(0.0, solar_constant)
}

/// Diurnally averaged flux (W m^-2), clamped to [0, S0].
pub fn daily_mean_flux(geometry: &SolarGeometry, lat_rad: f64, solar_constant: f64) -> f64 {
    let h0 = geometry.half_day_angle;
    let decl = geometry.declination;
    let flux = geometry.amplitude_w_m2 / PI
        * (h0 * lat_rad.sin() * decl.sin() + lat_rad.cos() * decl.cos() * h0.sin());
    flux.clamp(0.0, solar_constant)
}

/// Source of solar forcing shared read-only by every cell update.
pub trait SolarForcing: Send + Sync {
    fn solar_constant(&self) -> f64;

    /// Declination, amplitude and H0 on `day` at `lat_deg`.
    fn geometry(&self, day: f64, lat_deg: f64) -> SolarGeometry;

    fn insolation(&self, lat_deg: f64, lon_deg: f64, day: f64, mode: ForcingMode) -> f64 {
        let geometry = self.geometry(day, lat_deg);
        let lat_rad = lat_deg.to_radians();
        match mode {
            ForcingMode::Instantaneous => instantaneous_flux(
                &geometry,
                lat_rad,
                hour_angle(day, lon_deg),
                self.solar_constant(),
            ),
            ForcingMode::DailyMean => daily_mean_flux(&geometry, lat_rad, self.solar_constant()),
        }
    }
}

/// Exact orbital forcing, evaluated per call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalForcing {
    pub orbit: OrbitalParams,
    pub solar_constant: f64,
}

impl Default for OrbitalForcing {
    fn default() -> Self {
        Self {
            orbit: OrbitalParams::default(),
            solar_constant: SOLAR_CONSTANT_W_M2,
        }
    }
}

impl OrbitalForcing {
    pub fn new(orbit: OrbitalParams, solar_constant: f64) -> Self {
        Self { orbit, solar_constant }
    }
}

impl SolarForcing for OrbitalForcing {
    fn solar_constant(&self) -> f64 {
        self.solar_constant
    }

    fn geometry(&self, day: f64, lat_deg: f64) -> SolarGeometry {
        let lambda = self.orbit.solar_longitude(day);
        let declination = self.orbit.declination(lambda);
        SolarGeometry {
            declination,
            amplitude_w_m2: self.solar_constant * self.orbit.distance_factor(lambda),
            half_day_angle: half_day_angle(lat_deg.to_radians(), declination),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use more_asserts::{assert_gt, assert_le};

    fn equinox() -> SolarGeometry {
        SolarGeometry {
            declination: 0.0,
            amplitude_w_m2: SOLAR_CONSTANT_W_M2,
            half_day_angle: PI / 2.0,
        }
    }

    #[test]
    fn subsolar_point_gets_full_flux() {
        let flux = instantaneous_flux(&equinox(), 0.0, 0.0, SOLAR_CONSTANT_W_M2);
        assert_abs_diff_eq!(flux, SOLAR_CONSTANT_W_M2, epsilon = 1e-9);
    }

    #[test]
    fn night_side_is_dark() {
        let flux = instantaneous_flux(&equinox(), 0.2, 2.0, SOLAR_CONSTANT_W_M2);
        assert_eq!(flux, 0.0);
    }

    #[test]
    fn flux_never_exceeds_solar_constant() {
        let geometry = SolarGeometry {
            amplitude_w_m2: SOLAR_CONSTANT_W_M2 * 1.07,
            ..equinox()
        };
        assert_le!(instantaneous_flux(&geometry, 0.0, 0.0, SOLAR_CONSTANT_W_M2), SOLAR_CONSTANT_W_M2);
    }

    #[test]
    fn equatorial_daily_mean_at_equinox() {
        let flux = daily_mean_flux(&equinox(), 0.0, SOLAR_CONSTANT_W_M2);
        assert_abs_diff_eq!(flux, SOLAR_CONSTANT_W_M2 / PI, epsilon = 1e-9);
    }

    #[test]
    fn polar_night_daily_mean_is_zero() {
        let forcing = OrbitalForcing::new(OrbitalParams::circular(23.45), SOLAR_CONSTANT_W_M2);
        let december = 80.0 + 365.0 * 0.75;
        assert_eq!(forcing.insolation(85.0, 0.0, december, ForcingMode::DailyMean), 0.0);
        assert_gt!(forcing.insolation(-85.0, 0.0, december, ForcingMode::DailyMean), 400.0);
    }

    #[test]
    fn annual_mean_is_about_a_quarter_of_s0() {
        let forcing = OrbitalForcing::default();
        let mut total = 0.0;
        let mut weight = 0.0;
        for day in 0..365 {
            for lat in (-89..=89).step_by(2) {
                let w = (lat as f64).to_radians().cos();
                total += w * forcing.insolation(lat as f64, 0.0, day as f64, ForcingMode::DailyMean);
                weight += w;
            }
        }
        let mean = total / weight;
        assert_abs_diff_eq!(mean, SOLAR_CONSTANT_W_M2 / 4.0, epsilon = 3.0);
    }
}
