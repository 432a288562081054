use crate::filter::filter_points;
use crate::multi_series::sort_multi_series;
use crate::schema::*;
use crate::sorting::{sort_points, truncate};
use crate::statistics::apply_statistical_filters;
use crate::{build_points, DataPoint};
use log::debug;

/// Runs chart data through filter, outlier removal, sort and top-N with one
/// fixed configuration.
pub struct ChartPipeline {
    config: ChartConfig,
}

impl ChartPipeline {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn process(&self, data: &ChartData) -> ChartOutput {
        match data {
            ChartData::Single { labels, values } => {
                ChartOutput::Single(self.process_single(labels, values))
            }
            ChartData::Multi { labels, series } => {
                ChartOutput::Multi(self.process_multi(labels, series))
            }
        }
    }

    pub fn process_single<S: AsRef<str>>(
        &self,
        labels: &[S],
        values: &[Option<f64>],
    ) -> SingleSeriesOutput {
        if labels.is_empty() {
            return SingleSeriesOutput::default();
        }

        let points = build_points(labels, values);
        let input_len = points.len();

        let points = filter_points(points, &self.config.filter_config());
        let after_filter = points.len();

        let points = apply_statistical_filters(points, &self.config.statistical_config());
        let after_outliers = points.len();

        let points = sort_points(points, &self.config.sort_config());
        let points = truncate(points, self.config.top_n);

        debug!(
            "Single-series {:?} {:?} pipeline: {} -> {} (filter) -> {} (outliers) -> {} (top-n)",
            self.config.sort_mode,
            self.config.sort_direction,
            input_len,
            after_filter,
            after_outliers,
            points.len()
        );

        extract_output(points)
    }

    pub fn process_multi<S: AsRef<str>>(
        &self,
        labels: &[S],
        series: &[Series],
    ) -> MultiSeriesOutput {
        sort_multi_series(labels, series, &self.config)
    }
}

fn extract_output(points: Vec<DataPoint>) -> SingleSeriesOutput {
    let mut output = SingleSeriesOutput {
        labels: Vec::with_capacity(points.len()),
        values: Vec::with_capacity(points.len()),
        indices: Vec::with_capacity(points.len()),
    };

    for point in points {
        output.labels.push(point.label);
        output.values.push(point.value);
        output.indices.push(point.original_index);
    }

    output
}
