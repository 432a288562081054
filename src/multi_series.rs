use crate::schema::{ChartConfig, MultiSeriesOutput, Series};
use crate::sorting::{sort_records, truncate, ChartRecord};
use log::debug;

/// One position on the shared label axis, carrying every series' value there.
#[derive(Debug, Clone, PartialEq)]
struct LabelRecord {
    label: String,
    values: Vec<Option<f64>>,
    sort_series: usize,
}

impl ChartRecord for LabelRecord {
    fn label(&self) -> &str {
        &self.label
    }

    fn sort_value(&self) -> Option<f64> {
        self.values.get(self.sort_series).copied().flatten()
    }
}

/// Sorts and truncates parallel series that share one label axis.
///
/// The order is computed once, from `config.sort_by_series` for value
/// sorting or from the labels otherwise, and every series is re-indexed
/// through it. Filtering and outlier removal do not apply here.
pub fn sort_multi_series<S: AsRef<str>>(
    labels: &[S],
    series: &[Series],
    config: &ChartConfig,
) -> MultiSeriesOutput {
    if labels.is_empty() || series.is_empty() {
        return MultiSeriesOutput::default();
    }

    let sort_series = config.sort_by_series.min(series.len() - 1);
    if sort_series != config.sort_by_series {
        debug!(
            "sort_by_series {} out of range for {} series, using {}",
            config.sort_by_series,
            series.len(),
            sort_series
        );
    }

    let records: Vec<LabelRecord> = labels
        .iter()
        .enumerate()
        .map(|(index, label)| LabelRecord {
            label: label.as_ref().to_string(),
            values: series
                .iter()
                .map(|s| s.values.get(index).copied().flatten())
                .collect(),
            sort_series,
        })
        .collect();

    let records = sort_records(records, &config.sort_config());
    let records = truncate(records, config.top_n);

    debug!(
        "Multi-series {:?} sort kept {} of {} labels across {} series",
        config.sort_mode,
        records.len(),
        labels.len(),
        series.len()
    );

    let projected = series
        .iter()
        .enumerate()
        .map(|(series_index, s)| Series {
            name: s.name.clone(),
            values: records.iter().map(|r| r.values[series_index]).collect(),
        })
        .collect();

    MultiSeriesOutput {
        labels: records.into_iter().map(|r| r.label).collect(),
        series: projected,
    }
}
