pub const EARTH_RADIUS_M: f64 = 6.371e6;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const DAYS_PER_YEAR: f64 = 365.0;
pub const TO_KELVIN: f64 = 273.15;

// Melting point of the surface (sea) ice, also the reference temperature
// for the linearized OLR and for the enthalpy E.
pub const MELT_TEMP_K: f64 = TO_KELVIN;

// Day of year of the northern spring equinox used by the solar longitude series.
pub const VERNAL_EQUINOX_DAY: f64 = 80.0;

// === Radiation ===
pub const SOLAR_CONSTANT_W_M2: f64 = 1367.0;
pub const OLR_A_W_M2: f64 = 210.0; // OLR at the melting point
pub const OLR_B_W_M2_K: f64 = 2.0; // linearized greenhouse sensitivity

// === Orbit (present-day Earth) ===
pub const EARTH_ECCENTRICITY: f64 = 0.01724;
pub const EARTH_OBLIQUITY_DEG: f64 = 23.45;
pub const EARTH_LONG_PERIHELION_DEG: f64 = 281.4;

// === Albedo ===
pub const ALBEDO_A0: f64 = 0.3;
pub const ALBEDO_A2: f64 = 0.078;
pub const ALBEDO_ICE: f64 = 0.62;
pub const ALBEDO_LAND: f64 = 0.35;
pub const FREEZE_THRESHOLD_K: f64 = 263.15;
pub const ICE_ALBEDO_H_SCALE_M: f64 = 1.0;

// === Surface heat capacity ===
pub const WATER_DENSITY_KG_M3: f64 = 1000.0;
pub const WATER_SPECIFIC_HEAT_J_KG_K: f64 = 4000.0;
pub const OCEAN_DEPTH_M: f64 = 30.0;
pub const LAND_DEPTH_M: f64 = 2.0;
// Floor for C = rho * c_p * depth (J m^-2 K^-1); keeps E / C finite.
pub const MIN_HEAT_CAPACITY_J_M2_K: f64 = 1.0e3;

// === Sea ice ===
// rho_ice * L_f, 917 kg/m3 * 3.34e5 J/kg
pub const ICE_LATENT_HEAT_J_M3: f64 = 3.0e8;
pub const ICE_CONDUCTIVITY_W_M_K: f64 = 2.0;

// === Transport / moisture ===
pub const DIFFUSIVITY_W_M2_K: f64 = 0.6;
pub const LATENT_HEAT_VAPORIZATION_J_KG: f64 = 2.5e6;
pub const AIR_SPECIFIC_HEAT_J_KG_K: f64 = 1004.0;
pub const RELATIVE_HUMIDITY: f64 = 0.8;
pub const SURFACE_PRESSURE_HPA: f64 = 1000.0;
// Ratio of the gas constants of dry air and water vapour.
pub const EPSILON_RD_RV: f64 = 0.622;
// Half-width of the centered difference used for dq_sat/dT.
pub const DQ_DT_STEP_K: f64 = 0.5;

// === Defaults for a run ===
pub const DEFAULT_NX: usize = 32;
pub const DEFAULT_NY: usize = 16;
pub const DEFAULT_DT_DAYS: f64 = 0.125;
pub const DEFAULT_STEPS: u32 = 2920;
pub const DEFAULT_INITIAL_TEMP_K: f64 = 273.15;
pub const DEFAULT_TABLE_DAYS: usize = 366;
pub const DEFAULT_TABLE_LATS: usize = 181;
