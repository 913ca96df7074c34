//! Forecast requests and their dated results
//!
//! The service asks a fitted model for `horizon` steps and lays the output
//! onto the business days that follow the last observed date. Interval
//! bounds are copied from the model untouched.

use crate::calendar::business_days_after;
use crate::data::CleanedSeries;
use crate::error::{ForecastError, Result};
use crate::models::FittedModel;
use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Largest horizon the service accepts
pub const MAX_HORIZON: usize = 240;

/// What the caller wants forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    horizon: usize,
    include_interval: bool,
}

impl ForecastRequest {
    /// Create a request; `horizon` may be zero but not above [`MAX_HORIZON`]
    pub fn new(horizon: usize, include_interval: bool) -> Result<Self> {
        if horizon > MAX_HORIZON {
            return Err(ForecastError::InvalidParameter(format!(
                "Horizon {} exceeds the maximum of {} business days",
                horizon, MAX_HORIZON
            )));
        }

        Ok(Self {
            horizon,
            include_interval,
        })
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn include_interval(&self) -> bool {
        self.include_interval
    }
}

/// Lower and upper 95% bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBounds {
    pub lower: f64,
    pub upper: f64,
}

/// One forecast business day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    pub bounds: Option<ConfidenceBounds>,
}

/// Forecast laid out on future business days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    points: Vec<ForecastPoint>,
    include_interval: bool,
}

impl ForecastResult {
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether every point carries bounds
    pub fn has_interval(&self) -> bool {
        self.include_interval
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn predicted(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter()
    }
}

/// Shapes model output into dated forecasts
#[derive(Debug)]
pub struct ForecastService<'a, M: FittedModel + ?Sized> {
    model: &'a M,
    last_date: NaiveDate,
}

impl<'a, M: FittedModel + ?Sized> ForecastService<'a, M> {
    /// Forecast past `last_date` with `model`
    pub fn new(model: &'a M, last_date: NaiveDate) -> Self {
        Self { model, last_date }
    }

    /// Forecast past the last date of `series`
    pub fn for_series(model: &'a M, series: &CleanedSeries) -> Self {
        Self::new(model, series.last_date())
    }

    pub fn last_date(&self) -> NaiveDate {
        self.last_date
    }

    /// Run one request against the model
    pub fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResult> {
        let horizon = request.horizon();
        if horizon > MAX_HORIZON {
            return Err(ForecastError::InvalidParameter(format!(
                "Horizon {} exceeds the maximum of {} business days",
                horizon, MAX_HORIZON
            )));
        }

        if let Some(end) = self.model.training_end() {
            if end != self.last_date {
                warn!(
                    "Model training data ends {} but the series ends {}; \
                     forecast dates follow the series",
                    end,
                    self.last_date
                );
            }
        }

        if horizon == 0 {
            return Ok(ForecastResult {
                points: Vec::new(),
                include_interval: request.include_interval(),
            });
        }

        let output = self.model.forecast(horizon)?;
        if output.mean.len() != horizon {
            return Err(ForecastError::ContractViolation(format!(
                "Model returned {} forecast values for a horizon of {}",
                output.mean.len(),
                horizon
            )));
        }

        let dates = business_days_after(self.last_date, horizon);
        let bounds: Vec<Option<ConfidenceBounds>> = if request.include_interval() {
            let (lower, upper) = output.interval.ok_or_else(|| {
                ForecastError::ContractViolation(
                    "Model returned no confidence interval".to_string(),
                )
            })?;
            if lower.len() != horizon || upper.len() != horizon {
                return Err(ForecastError::ContractViolation(format!(
                    "Model returned interval bounds of length {}/{} for a horizon of {}",
                    lower.len(),
                    upper.len(),
                    horizon
                )));
            }
            lower
                .into_iter()
                .zip(upper)
                .map(|(lower, upper)| Some(ConfidenceBounds { lower, upper }))
                .collect()
        } else {
            vec![None; horizon]
        };

        let points = dates
            .into_iter()
            .zip(output.mean)
            .zip(bounds)
            .map(|((date, predicted), bounds)| ForecastPoint {
                date,
                predicted,
                bounds,
            })
            .collect::<Vec<_>>();

        debug!(
            "Forecast {} business days from {} (interval: {})",
            points.len(),
            self.last_date,
            request.include_interval()
        );

        Ok(ForecastResult {
            points,
            include_interval: request.include_interval(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModelForecast, ModelSummary};

    #[derive(Debug)]
    struct ShortModel;

    impl FittedModel for ShortModel {
        fn forecast(&self, steps: usize) -> Result<ModelForecast> {
            Ok(ModelForecast {
                mean: vec![1.0; steps.saturating_sub(1)],
                interval: None,
            })
        }

        fn describe(&self) -> ModelSummary {
            ModelSummary {
                text: String::new(),
                nobs: 0,
            }
        }
    }

    #[test]
    fn test_request_bounds() {
        assert!(ForecastRequest::new(0, true).is_ok());
        assert!(ForecastRequest::new(MAX_HORIZON, true).is_ok());
        assert!(ForecastRequest::new(MAX_HORIZON + 1, true).is_err());
    }

    #[test]
    fn test_length_mismatch_is_contract_violation() {
        let last = NaiveDate::from_ymd_opt(2023, 12, 29).unwrap();
        let service = ForecastService::new(&ShortModel, last);
        let request = ForecastRequest::new(5, false).unwrap();

        let err = service.forecast(&request).unwrap_err();
        assert!(matches!(err, ForecastError::ContractViolation(_)));
    }

    #[test]
    fn test_zero_horizon_skips_model() {
        let last = NaiveDate::from_ymd_opt(2023, 12, 29).unwrap();
        let service = ForecastService::new(&ShortModel, last);
        let request = ForecastRequest::new(0, true).unwrap();

        let result = service.forecast(&request).unwrap();
        assert!(result.is_empty());
        assert!(result.has_interval());
    }
}
