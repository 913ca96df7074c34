//! # SARIMA Forecast
//!
//! Preprocessing and forecast shaping around a seasonal ARIMA model that was
//! fitted offline.
//!
//! ## Features
//!
//! - Day-first CSV loading into typed price records
//! - Simple and log returns capped at their Tukey fences
//! - Gap-free business-day reindexing with forward fill
//! - Loading fitted SARIMA artifacts and running their forecast routine
//! - Dated forecasts with optional 95% confidence bounds and CSV export
//!
//! ## Quick Start
//!
//! ```no_run
//! use sarima_forecast::{DataLoader, ForecastRequest, ForecastService, ModelRepository};
//!
//! let series = DataLoader::load("Stock Market.csv")?;
//! let model = ModelRepository::load("sarima_model.json")?;
//!
//! let request = ForecastRequest::new(30, true)?;
//! let result = ForecastService::for_series(&model, &series).forecast(&request)?;
//!
//! sarima_forecast::export::save_forecast_csv(&result, "forecast.csv")?;
//! # Ok::<(), sarima_forecast::ForecastError>(())
//! ```

pub mod calendar;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use crate::config::AppConfig;
pub use crate::data::{CleanedSeries, DataLoader, HistoricalData, PriceRecord, ReturnRecord};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{FittedModel, ModelForecast, ModelRepository, ModelSummary, SarimaModel};
pub use crate::service::{
    ConfidenceBounds, ForecastPoint, ForecastRequest, ForecastResult, ForecastService,
    MAX_HORIZON,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
