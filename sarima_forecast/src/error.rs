//! Error types for the sarima_forecast crate

use thiserror::Error;

/// Custom error types for the sarima_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Historical data is missing, malformed or empty after filtering
    #[error("Data error: {0}")]
    DataError(String),

    /// The model artifact is absent or cannot be decoded
    #[error("Model not found at '{path}': {reason}")]
    ModelNotFound { path: String, reason: String },

    /// Error raised by the model's own forecasting routine
    #[error("Forecasting error: {0}")]
    ForecastingError(String),

    /// A collaborator returned output that breaks its contract
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from series calculations
    #[error("Math error: {0}")]
    MathError(#[from] series_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV encoding
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl ForecastError {
    /// Whether the error must end the session before anything is rendered.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ForecastError::DataError(_) | ForecastError::ModelNotFound { .. }
        )
    }

    pub(crate) fn model_not_found(path: &std::path::Path, reason: impl ToString) -> Self {
        ForecastError::ModelNotFound {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
