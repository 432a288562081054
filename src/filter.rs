use crate::schema::{FilterConfig, ValueRange};
use crate::utils::value_or_zero;
use crate::DataPoint;
use log::debug;

/// Drops points that fail any enabled predicate, keeping the survivors in
/// their current order.
///
/// Missing values compare as zero, so `hide_zeros` also drops them.
pub fn filter_points(points: Vec<DataPoint>, config: &FilterConfig) -> Vec<DataPoint> {
    let before = points.len();

    let filtered: Vec<DataPoint> = points
        .into_iter()
        .filter(|point| passes(point, config))
        .collect();

    if filtered.len() != before {
        debug!(
            "Filter stage removed {} of {} points",
            before - filtered.len(),
            before
        );
    }

    filtered
}

fn passes(point: &DataPoint, config: &FilterConfig) -> bool {
    let value = value_or_zero(point.value);

    if config.hide_zeros && value == 0.0 {
        return false;
    }

    if config.hide_negatives && value < 0.0 {
        return false;
    }

    if let Some(range) = &config.value_range {
        if !range.contains(value) {
            return false;
        }
    }

    true
}

/// Keeps points whose value lies inside `range`. An unbounded range is a no-op.
pub fn filter_value_range(points: Vec<DataPoint>, range: &ValueRange) -> Vec<DataPoint> {
    if range.is_unbounded() {
        return points;
    }

    points
        .into_iter()
        .filter(|point| range.contains(value_or_zero(point.value)))
        .collect()
}
