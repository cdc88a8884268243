//! Single-harmonic diurnal temperature model.
//!
//! The daily curve is approximated by one cosine with a fixed 24 h period:
//!
//! ```text
//! T(t) = A·cos(2π·(t − t_peak) / 1440) + T_avg
//! ```
//!
//! with `t` in minutes since midnight. Parameters are read straight off the
//! observations (no least-squares fit), which makes the model cheap and
//! deterministic but blind to multi-day trends.

use std::f64::consts::PI;

use tracing::debug;

use super::{extremes_and_sum, first_time_matching};
use crate::models::{minutes_since_midnight, round2};
use crate::{Metric, Reading};

/// Period of the model in minutes.
pub const DAY_MINUTES: f64 = 1440.0;

/// Fitted parameters of the diurnal cosine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiurnalModel {
    /// Half the observed peak-to-trough swing.
    pub amplitude: f64,
    /// Arithmetic mean of the observed temperatures.
    pub average: f64,
    /// Minute of day of the first reading at the observed maximum.
    pub peak_minute: u32,
}

impl DiurnalModel {
    /// Fit the model to the temperature series of `readings`.
    ///
    /// Returns `None` for an empty series, a series holding a non-finite
    /// temperature, or when the peak reading carries a time-bucket that
    /// cannot be parsed.
    pub fn fit(readings: &[Reading]) -> Option<Self> {
        // ---
        if readings.is_empty() {
            return None;
        }

        let (min, max, sum) = extremes_and_sum(Metric::Temperature.series(readings));
        let amplitude = (max - min) / 2.0;
        let average = sum / readings.len() as f64;
        if !(max.is_finite() && amplitude.is_finite() && average.is_finite()) {
            return None;
        }

        let peak_time = first_time_matching(readings, Metric::Temperature, max)?;
        let peak_minute = minutes_since_midnight(peak_time)?;

        Some(DiurnalModel {
            amplitude,
            average,
            peak_minute,
        })
    }

    /// Unrounded model temperature at `minute` past midnight.
    pub fn evaluate(&self, minute: u32) -> f64 {
        // ---
        let phase = 2.0 * PI * (f64::from(minute) - f64::from(self.peak_minute)) / DAY_MINUTES;
        self.amplitude * phase.cos() + self.average
    }
}

/// Predict the temperature at `target_time` (`HH-MM-SS`), rounded to 2 decimals.
///
/// Returns `None` when there are no readings to fit or `target_time` is not a
/// valid time-bucket.
pub fn predict_temperature(readings: &[Reading], target_time: &str) -> Option<f64> {
    // ---
    let model = DiurnalModel::fit(readings)?;
    let minute = minutes_since_midnight(target_time)?;

    let predicted = round2(model.evaluate(minute));
    debug!(?model, target_time, predicted, "diurnal prediction");

    Some(predicted)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn day() -> Vec<Reading> {
        // ---
        vec![
            Reading::new("18-11-2025", "06-00-00", "DEVICE_001", 20.0, 60.0, 1010.0),
            Reading::new("18-11-2025", "12-00-00", "DEVICE_002", 25.0, 50.0, 1009.0),
            Reading::new("18-11-2025", "18-00-00", "DEVICE_003", 22.5, 55.0, 1008.0),
        ]
    }

    #[test]
    fn test_fit_parameters() {
        // ---
        let model = DiurnalModel::fit(&day()).unwrap();

        assert_eq!(model.amplitude, 2.5);
        assert_eq!(model.average, 22.5);
        assert_eq!(model.peak_minute, 720);
    }

    #[test]
    fn test_prediction_at_peak_equals_observed_max() {
        // ---
        let predicted = predict_temperature(&day(), "12-00-00").unwrap();
        assert!((predicted - 25.0).abs() <= 0.01, "got {predicted}");
    }

    #[test]
    fn test_prediction_half_a_day_from_peak_is_trough() {
        // ---
        let predicted = predict_temperature(&day(), "00-00-00").unwrap();
        assert!((predicted - 20.0).abs() <= 0.01, "got {predicted}");
    }

    #[test]
    fn test_prediction_quarter_day_from_peak_is_average() {
        // ---
        assert_eq!(predict_temperature(&day(), "18-00-00"), Some(22.5));
        assert_eq!(predict_temperature(&day(), "06:00:00"), Some(22.5));
    }

    #[test]
    fn test_empty_readings_give_no_prediction() {
        // ---
        assert_eq!(predict_temperature(&[], "12-00-00"), None);
        assert_eq!(DiurnalModel::fit(&[]), None);
    }

    #[test]
    fn test_unparsable_target_gives_no_prediction() {
        // ---
        assert_eq!(predict_temperature(&day(), "noon"), None);
    }

    #[test]
    fn test_non_finite_temperature_gives_no_prediction() {
        // ---
        let mut readings = day();
        readings.push(Reading::new("18-11-2025", "20-00-00", "DEVICE_001", f64::NAN, 50.0, 1009.0));
        assert_eq!(DiurnalModel::fit(&readings), None);
        assert_eq!(predict_temperature(&readings, "12-00-00"), None);

        let mut readings = day();
        readings[0].temperature_c = f64::INFINITY;
        assert_eq!(predict_temperature(&readings, "12-00-00"), None);
    }

    #[test]
    fn test_peak_uses_first_matching_reading() {
        // ---
        let mut readings = day();
        readings.push(Reading::new("18-11-2025", "15-00-00", "DEVICE_001", 25.0, 50.0, 1009.0));

        let model = DiurnalModel::fit(&readings).unwrap();
        assert_eq!(model.peak_minute, 720);
    }

    #[test]
    fn test_prediction_is_deterministic() {
        // ---
        let a = predict_temperature(&day(), "09-17-00");
        let b = predict_temperature(&day(), "09-17-00");
        assert!(a.is_some());
        assert_eq!(a, b);
    }
}
