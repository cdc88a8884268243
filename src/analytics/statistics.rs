//! Descriptive statistics over a metric series.

use tracing::trace;

use super::{extremes_and_sum, first_time_matching};
use crate::models::round2;
use crate::{Metric, MetricStatistic, Reading};

/// Placeholder time-bucket when no reading matches an extremum.
const NO_TIME: &str = "N/A";

// ---

/// Summarise each of `metrics` over `readings`.
///
/// Returns one [`MetricStatistic`] per metric, in the order requested, or an
/// empty list when `readings` is empty. Variance is the population variance
/// (divide by N). Values are rounded to 2 decimals only after all arithmetic.
///
/// Non-finite inputs are not filtered: the ingest layer coerces unparsable
/// fields to 0, so a NaN reaching this point propagates into every numeric
/// field and both extremum times fall back to `"N/A"`.
pub fn compute_statistics(readings: &[Reading], metrics: &[Metric]) -> Vec<MetricStatistic> {
    // ---
    if readings.is_empty() {
        return Vec::new();
    }

    metrics
        .iter()
        .map(|&metric| summarise(readings, metric))
        .collect()
}

fn summarise(readings: &[Reading], metric: Metric) -> MetricStatistic {
    // ---
    let n = readings.len() as f64;

    let (min, max, sum) = extremes_and_sum(metric.series(readings));
    let average = sum / n;
    let variance = metric
        .series(readings)
        .map(|v| (v - average).powi(2))
        .sum::<f64>()
        / n;

    let time_at_min = first_time_matching(readings, metric, min).unwrap_or(NO_TIME);
    let time_at_max = first_time_matching(readings, metric, max).unwrap_or(NO_TIME);

    trace!(%metric, n, average, variance, "metric summarised");

    MetricStatistic {
        metric,
        average: round2(average),
        min_value: round2(min),
        max_value: round2(max),
        time_at_min: time_at_min.to_string(),
        time_at_max: time_at_max.to_string(),
        variance: round2(variance),
        std_deviation: round2(variance.sqrt()),
    }
}
