//! # Series Math
//!
//! Numerical helpers for cleaning price series before they are handed to a
//! forecasting model. Every function here is a pure transform over `f64`
//! slices; missing observations are modelled as `Option<f64>`.

use thiserror::Error;

pub mod fill;
pub mod outliers;
pub mod quantiles;
pub mod returns;

pub use crate::fill::forward_fill;
pub use crate::outliers::TukeyFence;
pub use crate::quantiles::{interquartile_range, quantile};
pub use crate::returns::{log_returns, simple_returns};

/// Errors that can occur in series calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;
