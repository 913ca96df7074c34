//! Session configuration

use crate::error::{ForecastError, Result};
use std::path::PathBuf;

/// Default location of the historical price file
pub const DEFAULT_DATA_PATH: &str = "Stock Market.csv";
/// Default location of the fitted model artifact
pub const DEFAULT_MODEL_PATH: &str = "sarima_model.json";
/// Default location of the downloadable forecast table
pub const DEFAULT_OUTPUT_PATH: &str = "forecast.csv";

/// Smallest horizon offered by the horizon control
pub const HORIZON_MIN: usize = 5;
/// Largest horizon offered by the horizon control
pub const HORIZON_MAX: usize = 240;
/// Granularity of the horizon control
pub const HORIZON_STEP: usize = 5;
/// Horizon selected when none is given
pub const DEFAULT_HORIZON: usize = 30;
/// Number of business days shown in the history view
pub const DEFAULT_HISTORY_WINDOW: usize = 200;

/// Settings for one forecasting session
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    pub output_path: PathBuf,
    pub horizon: usize,
    pub show_interval: bool,
    pub history_window: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            horizon: DEFAULT_HORIZON,
            show_interval: true,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_show_interval(mut self, show: bool) -> Self {
        self.show_interval = show;
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }
}

/// Check a horizon against the horizon control: 5 to 240 in steps of 5.
pub fn validate_horizon_control(horizon: usize) -> Result<usize> {
    if !(HORIZON_MIN..=HORIZON_MAX).contains(&horizon) {
        return Err(ForecastError::InvalidParameter(format!(
            "Horizon must be between {} and {} business days, got {}",
            HORIZON_MIN, HORIZON_MAX, horizon
        )));
    }
    if horizon % HORIZON_STEP != 0 {
        return Err(ForecastError::InvalidParameter(format!(
            "Horizon must be a multiple of {}, got {}",
            HORIZON_STEP, horizon
        )));
    }

    Ok(horizon)
}
