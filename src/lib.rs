//! # Stock Forecast Workspace
//!
//! Umbrella crate for the SARIMA stock price forecasting tools.
//!
//! - [`series_math`]: quantiles, Tukey fences, returns and forward fill
//! - [`sarima_forecast`]: loading, cleaning, model artifacts and dated forecasts
//!
//! The terminal report lives in the `forecast_cli` member.
//!
//! ## Example
//!
//! ```
//! use stock_forecast_workspace::series_math::TukeyFence;
//!
//! let fence = TukeyFence::new(1.0, 3.0).unwrap();
//! assert_eq!(fence.clip_value(5.0), 3.0);
//! ```

pub use sarima_forecast;
pub use series_math;

/// Version of the umbrella crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
