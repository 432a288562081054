use crate::error::{ChartPipelineError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[schemars(description = "Keep the input order.")]
    #[default]
    None,

    #[schemars(
        description = "Order by absolute value, so large expenses and large income rank together."
    )]
    Value,

    #[schemars(
        description = "Order by label. Dates compare chronologically, anything else alphanumerically with numbers compared by value."
    )]
    Label,

    #[schemars(
        description = "Order by position in customOrder. Labels not listed keep their relative order after all listed labels."
    )]
    Custom,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Inclusive numeric bounds. A missing bound imposes no constraint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
pub struct ValueRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ValueRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: f64) -> bool {
        let meets_min = self.min.map_or(true, |min| value >= min);
        let meets_max = self.max.map_or(true, |max| value <= max);
        meets_min && meets_max
    }

    fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(ChartPipelineError::InvalidValueRange { min, max });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterConfig {
    pub hide_zeros: bool,
    pub hide_negatives: bool,
    pub value_range: Option<ValueRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct StatisticalConfig {
    pub hide_outliers: bool,
    pub outlier_threshold: f64,
    pub value_range: Option<ValueRange>,
}

impl Default for StatisticalConfig {
    fn default() -> Self {
        Self {
            hide_outliers: false,
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            value_range: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SortConfig {
    pub sort_mode: SortMode,
    pub sort_direction: SortDirection,
    pub custom_order: Option<Vec<String>>,
}

pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 2.0;

/// Chart display settings as the dashboard persists them.
///
/// Every field is optional in JSON and independent of the others; an unset
/// field leaves the data untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    #[schemars(description = "How points are ordered before truncation. Defaults to none.")]
    pub sort_mode: SortMode,

    #[schemars(description = "Ignored for custom ordering. Defaults to desc.")]
    pub sort_direction: SortDirection,

    #[serde(deserialize_with = "deserialize_top_n")]
    #[schemars(with = "Option<u64>")]
    #[schemars(
        description = "Keep only the first N points after sorting. Null, zero or negative keeps everything."
    )]
    pub top_n: Option<usize>,

    #[schemars(description = "Drop points whose value is exactly zero.")]
    pub hide_zeros: bool,

    #[schemars(description = "Drop points whose value is below zero.")]
    pub hide_negatives: bool,

    #[serde(deserialize_with = "deserialize_custom_order")]
    #[schemars(with = "Option<Vec<String>>")]
    #[schemars(
        description = "Explicit label ranking used when sortMode is custom. Anything other than an array of strings is ignored."
    )]
    pub custom_order: Option<Vec<String>>,

    #[schemars(
        description = "Drop points further than outlierThreshold standard deviations from the mean. Single-series only."
    )]
    pub hide_outliers: bool,

    #[schemars(description = "Number of standard deviations for outlier removal. Defaults to 2.")]
    pub outlier_threshold: f64,

    #[schemars(description = "Inclusive min/max bounds on the raw value. Either bound may be null.")]
    pub value_range: Option<ValueRange>,

    #[schemars(
        description = "Index of the series whose values drive value sorting on multi-series charts. Clamped to the available series."
    )]
    pub sort_by_series: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            sort_mode: SortMode::None,
            sort_direction: SortDirection::Desc,
            top_n: None,
            hide_zeros: false,
            hide_negatives: false,
            custom_order: None,
            hide_outliers: false,
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            value_range: None,
            sort_by_series: 0,
        }
    }
}

impl ChartConfig {
    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            hide_zeros: self.hide_zeros,
            hide_negatives: self.hide_negatives,
            value_range: self.value_range,
        }
    }

    /// The value range is owned by the filter stage, so it is not repeated here.
    pub fn statistical_config(&self) -> StatisticalConfig {
        StatisticalConfig {
            hide_outliers: self.hide_outliers,
            outlier_threshold: self.outlier_threshold,
            value_range: None,
        }
    }

    pub fn sort_config(&self) -> SortConfig {
        SortConfig {
            sort_mode: self.sort_mode,
            sort_direction: self.sort_direction,
            custom_order: self.custom_order.clone(),
        }
    }

    /// Checks the settings a caller is about to persist. The pipeline itself
    /// accepts any configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.outlier_threshold.is_finite() || self.outlier_threshold < 0.0 {
            return Err(ChartPipelineError::InvalidOutlierThreshold(
                self.outlier_threshold,
            ));
        }

        if let Some(range) = &self.value_range {
            range.validate()?;
        }

        if self.sort_mode == SortMode::Custom
            && self.custom_order.as_ref().map_or(true, |o| o.is_empty())
        {
            return Err(ChartPipelineError::InvalidConfig(
                "sortMode is custom but customOrder is empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ChartConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::json_schema())
    }
}

fn deserialize_custom_order<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let order = match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(label) => Some(label),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    };
    Ok(order)
}

fn deserialize_top_n<'de, D>(deserializer: D) -> std::result::Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let top_n = match Value::deserialize(deserializer)? {
        Value::Number(n) => match (n.as_u64(), n.as_f64()) {
            (Some(0), _) => None,
            (Some(n), _) => usize::try_from(n).ok(),
            (None, Some(f)) if f >= 1.0 => Some(f.floor() as usize),
            _ => None,
        },
        _ => None,
    };
    Ok(top_n)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn from_values(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, values.iter().copied().map(Some).collect())
    }
}

/// Raw chart input, resolved once at the pipeline entry point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChartData {
    Single {
        labels: Vec<String>,
        values: Vec<Option<f64>>,
    },
    Multi {
        labels: Vec<String>,
        series: Vec<Series>,
    },
}

impl ChartData {
    pub fn labels(&self) -> &[String] {
        match self {
            ChartData::Single { labels, .. } | ChartData::Multi { labels, .. } => labels,
        }
    }

    /// Reports the first value array whose length differs from the label axis.
    pub fn validate(&self) -> Result<()> {
        let expected = self.labels().len();
        match self {
            ChartData::Single { values, .. } => {
                if values.len() != expected {
                    return Err(ChartPipelineError::LengthMismatch {
                        series: "values".to_string(),
                        expected,
                        actual: values.len(),
                    });
                }
            }
            ChartData::Multi { series, .. } => {
                if let Some(s) = series.iter().find(|s| s.values.len() != expected) {
                    return Err(ChartPipelineError::LengthMismatch {
                        series: s.name.clone(),
                        expected,
                        actual: s.values.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
pub struct SingleSeriesOutput {
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
    /// `indices[i]` is the input position of the point now at position `i`.
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
pub struct MultiSeriesOutput {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChartOutput {
    Single(SingleSeriesOutput),
    Multi(MultiSeriesOutput),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config = ChartConfig::from_json("{}").unwrap();
        assert_eq!(config, ChartConfig::default());
        assert_eq!(config.sort_direction, SortDirection::Desc);
        assert_eq!(config.outlier_threshold, 2.0);
    }

    #[test]
    fn test_camel_case_settings() {
        let json = r#"{
            "sortMode": "custom",
            "sortDirection": "asc",
            "topN": 5,
            "hideZeros": true,
            "customOrder": ["Rent", "Groceries"],
            "valueRange": { "min": -100, "max": null },
            "sortBySeries": 1
        }"#;
        let config = ChartConfig::from_json(json).unwrap();
        assert_eq!(config.sort_mode, SortMode::Custom);
        assert_eq!(config.sort_direction, SortDirection::Asc);
        assert_eq!(config.top_n, Some(5));
        assert!(config.hide_zeros);
        assert!(!config.hide_negatives);
        assert_eq!(
            config.custom_order,
            Some(vec!["Rent".to_string(), "Groceries".to_string()])
        );
        assert_eq!(config.value_range, Some(ValueRange::new(Some(-100.0), None)));
        assert_eq!(config.sort_by_series, 1);
    }

    #[test]
    fn test_malformed_custom_order_is_ignored() {
        let config = ChartConfig::from_json(r#"{"customOrder": "Rent"}"#).unwrap();
        assert_eq!(config.custom_order, None);

        let config = ChartConfig::from_json(r#"{"customOrder": ["Rent", 3, null]}"#).unwrap();
        assert_eq!(config.custom_order, Some(vec!["Rent".to_string()]));
    }

    #[test]
    fn test_non_positive_top_n_is_unset() {
        for raw in ["0", "-3", "null", "\"ten\""] {
            let config = ChartConfig::from_json(&format!(r#"{{"topN": {}}}"#, raw)).unwrap();
            assert_eq!(config.top_n, None, "topN {}", raw);
        }
        let config = ChartConfig::from_json(r#"{"topN": 2.7}"#).unwrap();
        assert_eq!(config.top_n, Some(2));
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let config = ChartConfig {
            outlier_threshold: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ChartPipelineError::InvalidOutlierThreshold(_))
        ));

        let config = ChartConfig {
            value_range: Some(ValueRange::new(Some(10.0), Some(5.0))),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ChartPipelineError::InvalidValueRange { .. })
        ));

        let config = ChartConfig {
            sort_mode: SortMode::Custom,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ChartPipelineError::InvalidConfig(_))
        ));

        assert!(ChartConfig::default().validate().is_ok());
    }

    #[test]
    fn test_chart_data_length_validation() {
        let data = ChartData::Multi {
            labels: vec!["Jan".to_string(), "Feb".to_string()],
            series: vec![
                Series::from_values("Income", &[1.0, 2.0]),
                Series::from_values("Expenses", &[1.0]),
            ],
        };
        match data.validate() {
            Err(ChartPipelineError::LengthMismatch {
                series,
                expected,
                actual,
            }) => {
                assert_eq!(series, "Expenses");
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("expected length mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = ChartConfig::schema_as_json().unwrap();
        assert!(schema_json.contains("sortMode"));
        assert!(schema_json.contains("outlierThreshold"));
        assert!(schema_json.contains("customOrder"));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = ChartConfig {
            sort_mode: SortMode::Label,
            top_n: Some(3),
            hide_outliers: true,
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("\"sortMode\": \"label\""));
        assert_eq!(ChartConfig::from_json(&json).unwrap(), config);
    }
}
