use crate::schema::{SortConfig, SortDirection, SortMode};
use crate::utils::{merge_sort_by, value_or_zero, LabelKey};
use crate::DataPoint;
use log::debug;
use std::collections::HashMap;

/// Anything that can be placed on a chart's label axis and ordered.
pub trait ChartRecord {
    fn label(&self) -> &str;

    /// The value that drives value sorting. Missing values are `None`.
    fn sort_value(&self) -> Option<f64>;
}

impl ChartRecord for DataPoint {
    fn label(&self) -> &str {
        &self.label
    }

    fn sort_value(&self) -> Option<f64> {
        self.value
    }
}

pub fn sort_points(points: Vec<DataPoint>, config: &SortConfig) -> Vec<DataPoint> {
    sort_records(points, config)
}

/// Reorders records according to `config`. Never drops a record.
///
/// Every mode is stable: records that compare equal keep their current
/// relative order, in both directions.
pub fn sort_records<T: ChartRecord>(mut records: Vec<T>, config: &SortConfig) -> Vec<T> {
    match config.sort_mode {
        SortMode::None => records,

        SortMode::Value => {
            let direction = config.sort_direction;
            records.sort_by(|a, b| {
                let a = value_or_zero(a.sort_value()).abs();
                let b = value_or_zero(b.sort_value()).abs();
                direction.apply(a.total_cmp(&b))
            });
            records
        }

        SortMode::Label => {
            let direction = config.sort_direction;
            let keyed: Vec<(LabelKey, T)> = records
                .into_iter()
                .map(|record| (LabelKey::new(record.label()), record))
                .collect();
            merge_sort_by(keyed, &mut |a: &(LabelKey, T), b: &(LabelKey, T)| {
                direction.apply(a.0.compare(&b.0))
            })
            .into_iter()
            .map(|(_, record)| record)
            .collect()
        }

        SortMode::Custom => match &config.custom_order {
            Some(order) => sort_by_custom_order(records, order),
            None => {
                debug!("Custom sort requested without an order; keeping input order");
                records
            }
        },
    }
}

/// Listed labels come first in list order; unlisted labels follow in their
/// current order. A label listed twice takes its last position.
fn sort_by_custom_order<T: ChartRecord>(mut records: Vec<T>, order: &[String]) -> Vec<T> {
    let positions: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(position, label)| (label.as_str(), position))
        .collect();

    records.sort_by_key(|record| {
        positions
            .get(record.label())
            .copied()
            .unwrap_or(usize::MAX)
    });
    records
}

/// Keeps the first `top_n` records. `None`, zero, or a count at least as
/// large as the input leaves the records unchanged.
pub fn truncate<T>(mut records: Vec<T>, top_n: Option<usize>) -> Vec<T> {
    match top_n {
        Some(n) if n > 0 && n < records.len() => {
            debug!("Truncating {} records to top {}", records.len(), n);
            records.truncate(n);
            records
        }
        _ => records,
    }
}

impl SortConfig {
    pub fn by_value(direction: SortDirection) -> Self {
        Self {
            sort_mode: SortMode::Value,
            sort_direction: direction,
            custom_order: None,
        }
    }

    pub fn by_label(direction: SortDirection) -> Self {
        Self {
            sort_mode: SortMode::Label,
            sort_direction: direction,
            custom_order: None,
        }
    }

    pub fn custom<S: Into<String>>(order: impl IntoIterator<Item = S>) -> Self {
        Self {
            sort_mode: SortMode::Custom,
            sort_direction: SortDirection::default(),
            custom_order: Some(order.into_iter().map(Into::into).collect()),
        }
    }
}
