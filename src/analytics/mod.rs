//! Pure analytical core: descriptive statistics, the diurnal temperature
//! model and IDW spatial interpolation.
//!
//! Nothing here performs I/O or keeps state between calls; every function is
//! a deterministic function of its arguments and safe to call concurrently.

pub mod interpolation;
pub mod predict;
pub mod statistics;

pub use interpolation::{
    color_for_value, generate_heatmap_grid, idw_value, point_in_polygon, temperature_range,
    Bounds, Rgb, DEFAULT_POWER, DISTANCE_FLOOR,
};
pub use predict::{predict_temperature, DiurnalModel, DAY_MINUTES};
pub use statistics::compute_statistics;

/// Time-bucket of the first reading whose metric equals `target` exactly.
///
/// Extrema are matched against the unrounded value in input order, so ties
/// always resolve to the earliest record.
fn first_time_matching<'a>(
    readings: &'a [crate::Reading],
    metric: crate::Metric,
    target: f64,
) -> Option<&'a str> {
    readings
        .iter()
        .find(|r| metric.value_of(r) == target)
        .map(|r| r.time.as_str())
}

/// Minimum, maximum and sum of `series` in one pass.
///
/// A NaN anywhere poisons all three, unlike `f64::min`/`f64::max` which skip
/// it. An empty series yields `(inf, -inf, 0)`.
fn extremes_and_sum(series: impl Iterator<Item = f64>) -> (f64, f64, f64) {
    series.fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), v| {
            (
                if v.is_nan() || v < min { v } else { min },
                if v.is_nan() || v > max { v } else { max },
                sum + v,
            )
        },
    )
}
