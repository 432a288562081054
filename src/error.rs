use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartPipelineError {
    #[error("Invalid outlier threshold {0}: must be a finite, non-negative number of standard deviations")]
    InvalidOutlierThreshold(f64),

    #[error("Invalid value range: min ({min}) is greater than max ({max})")]
    InvalidValueRange { min: f64, max: f64 },

    #[error("Length mismatch in series '{series}': expected {expected} values, got {actual}")]
    LengthMismatch {
        series: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid chart configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChartPipelineError>;
