use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Invalid export file name '{0}', expected '<month>_<yy>.csv' (e.g. janeiro_25.csv)")]
    InvalidFileName(String),

    // The batch has no recognisable payment-type and/or amount column.
    #[error("Required columns not found: {}", .missing.join(", "))]
    MissingRequiredColumns { missing: Vec<&'static str> },

    #[error("No valid rows after coercion and exclusion")]
    NoValidRows,

    // Time series need the retained rows, which synthetic aggregates don't have.
    #[error("No raw rows available for this period (synthetic data)")]
    NoRawDataAvailable,

    // Row-level only; aggregation recovers by skipping the row.
    #[error("Malformed amount: {0}")]
    MalformedAmount(String),

    #[error("No period files configured")]
    NoPeriodsLoaded,

    #[error("Processing task failed: {0}")]
    TaskError(String),
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        EngineError::TaskError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
