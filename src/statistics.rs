//! Outlier removal based on the population mean and standard deviation of
//! the points currently on the chart.

use crate::filter::filter_value_range;
use crate::schema::StatisticalConfig;
use crate::utils::value_or_zero;
use crate::DataPoint;
use log::debug;
use serde::{Deserialize, Serialize};

/// Below this many points the spread is not meaningful and outlier removal
/// passes data through untouched.
pub const MIN_POINTS_FOR_OUTLIERS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticalSummary {
    pub count: usize,
    pub mean: f64,
    /// Population variance (divides by `count`, not `count - 1`).
    pub variance: f64,
    pub std_dev: f64,
}

impl StatisticalSummary {
    /// Inclusive `(lower, upper)` bounds `k` standard deviations from the mean.
    pub fn bounds(&self, k: f64) -> (f64, f64) {
        (self.mean - k * self.std_dev, self.mean + k * self.std_dev)
    }
}

pub fn summarize(values: &[f64]) -> Option<StatisticalSummary> {
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

    Some(StatisticalSummary {
        count,
        mean,
        variance,
        std_dev: variance.sqrt(),
    })
}

/// Applies the optional value range, then removes outliers in a single pass.
///
/// Statistics are computed once over the points that survive the value
/// range; they are not recomputed after outliers are dropped.
pub fn apply_statistical_filters(
    points: Vec<DataPoint>,
    config: &StatisticalConfig,
) -> Vec<DataPoint> {
    let points = match &config.value_range {
        Some(range) => filter_value_range(points, range),
        None => points,
    };

    if !config.hide_outliers || points.len() < MIN_POINTS_FOR_OUTLIERS {
        return points;
    }

    let values: Vec<f64> = points.iter().map(|p| value_or_zero(p.value)).collect();
    let Some(summary) = summarize(&values) else {
        return points;
    };
    let (lower, upper) = summary.bounds(config.outlier_threshold);

    debug!(
        "Outlier bounds [{:.4}, {:.4}] from mean {:.4}, std dev {:.4} over {} points",
        lower, upper, summary.mean, summary.std_dev, summary.count
    );

    let before = points.len();
    let kept: Vec<DataPoint> = points
        .into_iter()
        .zip(values)
        .filter(|(_, value)| *value >= lower && *value <= upper)
        .map(|(point, _)| point)
        .collect();

    if kept.len() != before {
        debug!("Removed {} outliers", before - kept.len());
    }

    kept
}
