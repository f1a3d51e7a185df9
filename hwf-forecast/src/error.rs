use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while forecasting or invoking a model
#[derive(Error, Debug)]
pub enum ForecastError {
    /// No day of this month is available to compute a baseline
    #[error("No history for month {month} to compute a baseline")]
    MissingBaseline { month: u32 },

    /// A model asked for a feature the row does not carry
    #[error("Feature row has no value for {0:?}")]
    MalformedFeatures(String),

    /// A model artifact is internally inconsistent
    #[error("Malformed model artifact: {0}")]
    MalformedArtifact(String),

    /// A model artifact could not be decoded
    #[error("Failed to parse model artifact: {0}")]
    ArtifactParse(#[from] serde_json::Error),

    /// The regressor returned NaN or infinity
    #[error("Regressor produced a non-finite prediction for {date}")]
    NonFinitePrediction { date: NaiveDate },

    /// The classifier did not return one label per row
    #[error("Classifier returned {got} labels for {expected} rows")]
    ClassifierOutput { expected: usize, got: usize },

    /// Failed to read a model artifact
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Results using ForecastError
pub type Result<T> = std::result::Result<T, ForecastError>;
