//! Unit conversions for temperature and time used across the model.

use crate::constants::{SECONDS_PER_DAY, TO_KELVIN};

/// Converts Celsius to Kelvin.
pub fn celsius_to_kelvin(temp_c: f64) -> f64 {
    temp_c + TO_KELVIN
}

/// Converts Kelvin to Celsius.
pub fn kelvin_to_celsius(temp_k: f64) -> f64 {
    temp_k - TO_KELVIN
}

/// Converts a model step in days to seconds.
pub fn days_to_seconds(days: f64) -> f64 {
    days * SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_celsius_kelvin_conversion() {
        let test_cases = vec![
            (0.0, 273.15),
            (100.0, 373.15),
            (-10.0, 263.15),
        ];

        for (celsius, kelvin) in test_cases {
            assert_abs_diff_eq!(celsius_to_kelvin(celsius), kelvin, epsilon = 1e-9);
            assert_abs_diff_eq!(kelvin_to_celsius(kelvin), celsius, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_days_to_seconds() {
        assert_eq!(days_to_seconds(1.0), 86_400.0);
        assert_eq!(days_to_seconds(0.25), 21_600.0);
    }
}
