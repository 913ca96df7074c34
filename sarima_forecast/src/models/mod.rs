//! Fitted forecasting models and the repository that loads them

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use log::info;
use std::fmt::Debug;
use std::fs;
use std::path::Path;

pub mod sarima;

pub use sarima::{SarimaCoefficients, SarimaModel, SarimaOrder, SarimaState, SeasonalOrder};

/// Coverage of the confidence interval reported by fitted models
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Raw output of a model's forecasting routine
#[derive(Debug, Clone, PartialEq)]
pub struct ModelForecast {
    /// Point forecast, one value per step
    pub mean: Vec<f64>,
    /// Lower and upper bounds, one pair of values per step
    pub interval: Option<(Vec<f64>, Vec<f64>)>,
}

impl ModelForecast {
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

/// Human-readable description of a fitted model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    /// Multi-line text summary
    pub text: String,
    /// Number of observations the model was fitted on
    pub nobs: usize,
}

/// A model that has already been fitted offline
pub trait FittedModel: Debug {
    /// Forecast `steps` periods past the end of the training data
    fn forecast(&self, steps: usize) -> Result<ModelForecast>;

    /// Text summary and observation count
    fn describe(&self) -> ModelSummary;

    /// Last date of the training data, when the artifact records it
    fn training_end(&self) -> Option<NaiveDate> {
        None
    }
}

/// Loads and stores fitted model artifacts
#[derive(Debug)]
pub struct ModelRepository;

impl ModelRepository {
    /// Load a SARIMA artifact.
    ///
    /// Absent, unreadable, undecodable and internally inconsistent artifacts
    /// all fail with [`ForecastError::ModelNotFound`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<SarimaModel> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ForecastError::model_not_found(path, e))?;
        let model: SarimaModel =
            serde_json::from_str(&raw).map_err(|e| ForecastError::model_not_found(path, e))?;
        model
            .validate()
            .map_err(|e| ForecastError::model_not_found(path, e))?;

        info!(
            "Loaded {} from '{}' ({} observations)",
            model.name(),
            path.display(),
            model.nobs()
        );
        Ok(model)
    }

    /// Write a SARIMA artifact as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(model: &SarimaModel, path: P) -> Result<()> {
        model.validate()?;
        let json = serde_json::to_string_pretty(model).map_err(|e| {
            ForecastError::ForecastingError(format!("Failed to encode model: {}", e))
        })?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
