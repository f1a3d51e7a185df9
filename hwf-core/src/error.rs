/// Error types for historical temperature data
use thiserror::Error;

/// Main error type for loading and shaping the temperature history
#[derive(Error, Debug)]
pub enum HwfError {
    /// The series held no usable observations
    #[error("Historical series is empty")]
    EmptyHistory,

    /// The table cannot be reduced to a (date, temperature) pair
    #[error("Historical table needs at least a date and a temperature column (found {found})")]
    InsufficientColumns { found: usize },

    /// Lags must be whole days before the target day
    #[error("Invalid lag: {0} days")]
    InvalidLag(u32),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Failed to read input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be decoded
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Type alias for Results using HwfError
pub type Result<T> = std::result::Result<T, HwfError>;
