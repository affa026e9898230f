/// Orbital geometry: solar longitude, declination and day length.

use crate::constants::{
    DAYS_PER_YEAR, EARTH_ECCENTRICITY, EARTH_LONG_PERIHELION_DEG, EARTH_OBLIQUITY_DEG,
    VERNAL_EQUINOX_DAY,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitalParams {
    pub eccentricity: f64,
    pub obliquity_deg: f64,
    pub long_perihelion_deg: f64,
    pub days_per_year: f64,
}

impl Default for OrbitalParams {
    fn default() -> Self {
        Self {
            eccentricity: EARTH_ECCENTRICITY,
            obliquity_deg: EARTH_OBLIQUITY_DEG,
            long_perihelion_deg: EARTH_LONG_PERIHELION_DEG,
            days_per_year: DAYS_PER_YEAR,
        }
    }
}

impl OrbitalParams {
    /// Circular orbit with the given obliquity, handy for symmetric set-ups.
    pub fn circular(obliquity_deg: f64) -> Self {
        Self {
            eccentricity: 0.0,
            obliquity_deg,
            ..Self::default()
        }
    }

    /// Solar longitude λ (radians) on `day`, measured from the vernal equinox.
    ///
    /// Series solution of Kepler's equation truncated at third order in e:
    /// first the mean longitude at `day`, then the true longitude from it.
    pub fn solar_longitude(&self, day: f64) -> f64 {
        let ecc = self.eccentricity;
        let ecc2 = ecc * ecc;
        let ecc3 = ecc2 * ecc;
        let peri = self.long_perihelion_deg.to_radians();
        let beta = (1.0 - ecc2).sqrt();
        let delta_lambda = (day - VERNAL_EQUINOX_DAY) * TAU / self.days_per_year;

        let lambda_mean = -2.0
            * ((ecc / 2.0 + ecc3 / 8.0) * (1.0 + beta) * (-peri).sin()
                - ecc2 / 4.0 * (0.5 + beta) * (-2.0 * peri).sin()
                + ecc3 / 8.0 * (1.0 / 3.0 + beta) * (-3.0 * peri).sin())
            + delta_lambda;

        let m = lambda_mean - peri;
        lambda_mean
            + (2.0 * ecc - ecc3 / 4.0) * m.sin()
            + 1.25 * ecc2 * (2.0 * m).sin()
            + (13.0 / 12.0) * ecc3 * (3.0 * m).sin()
    }

    /// Solar declination δ = asin(sin ε · sin λ).
    pub fn declination(&self, solar_longitude: f64) -> f64 {
        (self.obliquity_deg.to_radians().sin() * solar_longitude.sin())
            .clamp(-1.0, 1.0)
            .asin()
    }

    /// Inverse-square Earth-Sun distance factor (a / r)².
    pub fn distance_factor(&self, solar_longitude: f64) -> f64 {
        let ecc = self.eccentricity;
        let a = 1.0 - ecc * ecc;
        let b = 1.0 + ecc * (solar_longitude - self.long_perihelion_deg.to_radians()).cos();
        (b * b) / (a * a)
    }
}

/// Half-day hour angle H0 (radians) at latitude `lat_rad` for declination `decl`.
///
/// π in polar day, 0 in polar night.
pub fn half_day_angle(lat_rad: f64, decl: f64) -> f64 {
    if decl.abs() + lat_rad.abs() >= FRAC_PI_2 {
        if lat_rad * decl > 0.0 { PI } else { 0.0 }
    } else {
        (-lat_rad.tan() * decl.tan()).clamp(-1.0, 1.0).acos()
    }
}

/// Local hour angle (radians, 0 at local noon) at longitude `lon_deg` on `day`.
pub fn hour_angle(day: f64, lon_deg: f64) -> f64 {
    ((day.rem_euclid(1.0) + lon_deg / 360.0).rem_euclid(1.0) - 0.5) * TAU
}
