//! # Chart Data Pipeline
//!
//! Turns raw labeled chart data into the exact label/value arrays a chart
//! renderer draws, for single-series and multi-series charts.
//!
//! ## Stages
//!
//! - **Filter**: hide zero or negative values, or values outside a range
//! - **Outliers**: drop points beyond `k` standard deviations of the mean
//! - **Sort**: by absolute value, by label (dates aware), or by a custom order
//! - **Top-N**: keep the first N points of the sorted result
//!
//! Multi-series charts share one label axis. They are sorted once, by a
//! chosen series or by label, and every series is re-indexed the same way.
//!
//! Every stage is a pure function of its input and configuration. Nothing in
//! the pipeline returns an error: missing values count as zero, unknown
//! options fall back to no-ops, and empty input produces empty output.
//!
//! ## Example
//!
//! ```rust
//! use chart_data_pipeline::*;
//!
//! let config = ChartConfig {
//!     sort_mode: SortMode::Value,
//!     sort_direction: SortDirection::Desc,
//!     top_n: Some(2),
//!     ..Default::default()
//! };
//!
//! let output = sort_data(
//!     &["Rent", "Food", "Fuel", "Gym"],
//!     &[Some(1200.0), Some(-450.0), Some(80.0), None],
//!     &config,
//! );
//!
//! assert_eq!(output.labels, vec!["Rent", "Food"]);
//! assert_eq!(output.indices, vec![0, 1]);
//! ```

pub mod engine;
pub mod error;
pub mod filter;
pub mod multi_series;
pub mod schema;
pub mod sorting;
pub mod statistics;
pub mod utils;

pub use engine::ChartPipeline;
pub use error::{ChartPipelineError, Result};
pub use filter::{filter_points, filter_value_range};
pub use multi_series::sort_multi_series;
pub use schema::*;
pub use sorting::{sort_points, sort_records, truncate, ChartRecord};
pub use statistics::{apply_statistical_filters, summarize, StatisticalSummary};
pub use utils::{compare_alphanumeric, compare_labels, parse_label_date, LabelKey};

use serde::{Deserialize, Serialize};

/// One position on the label axis before any transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: Option<f64>,
    /// Position in the caller's input arrays. Never changes as the point is
    /// filtered, sorted or truncated.
    pub original_index: usize,
}

/// Pairs each label with the value at the same position.
///
/// Labels without a matching value get `None`; values past the last label
/// are ignored.
pub fn build_points<S: AsRef<str>>(labels: &[S], values: &[Option<f64>]) -> Vec<DataPoint> {
    labels
        .iter()
        .enumerate()
        .map(|(index, label)| DataPoint {
            label: label.as_ref().to_string(),
            value: values.get(index).copied().flatten(),
            original_index: index,
        })
        .collect()
}

/// Filters, removes outliers, sorts and truncates a single series.
pub fn sort_data<S: AsRef<str>>(
    labels: &[S],
    values: &[Option<f64>],
    config: &ChartConfig,
) -> SingleSeriesOutput {
    ChartPipeline::new(config.clone()).process_single(labels, values)
}

pub fn sort_multi_series_data<S: AsRef<str>>(
    labels: &[S],
    series: &[Series],
    config: &ChartConfig,
) -> MultiSeriesOutput {
    sort_multi_series(labels, series, config)
}

pub fn process_chart_data(data: &ChartData, config: &ChartConfig) -> ChartOutput {
    ChartPipeline::new(config.clone()).process(data)
}
