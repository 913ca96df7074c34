//! Loaded data and model for one run

use crate::report::MetricCards;
use sarima_forecast::{
    AppConfig, CleanedSeries, DataLoader, ForecastRequest, ForecastResult, ForecastService,
    HistoricalData, ModelRepository, Result, SarimaModel,
};

/// Immutable handles shared by every request in a run
#[derive(Debug)]
pub struct Session {
    config: AppConfig,
    history: HistoricalData,
    model: SarimaModel,
}

impl Session {
    /// Load the price history and the model artifact named in `config`.
    ///
    /// Either failure is fatal for the session.
    pub fn open(config: AppConfig) -> Result<Self> {
        let history = DataLoader::load_history(&config.data_path)?;
        let model = ModelRepository::load(&config.model_path)?;
        Ok(Self::from_parts(config, history, model))
    }

    pub fn from_parts(config: AppConfig, history: HistoricalData, model: SarimaModel) -> Self {
        Self {
            config,
            history,
            model,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoricalData {
        &self.history
    }

    pub fn series(&self) -> &CleanedSeries {
        &self.history.series
    }

    pub fn model(&self) -> &SarimaModel {
        &self.model
    }

    /// Headline numbers shown above every section
    pub fn metric_cards(&self) -> MetricCards {
        let series = self.series();
        MetricCards {
            last_date: series.last_date(),
            last_close: series.last_value(),
            forecast_days: self.config.horizon,
            observations: series.len(),
        }
    }

    /// Forecast with the configured horizon and interval toggle
    pub fn forecast(&self) -> Result<ForecastResult> {
        self.forecast_with(self.config.horizon, self.config.show_interval)
    }

    /// Forecast with an explicit horizon and interval toggle
    pub fn forecast_with(&self, horizon: usize, include_interval: bool) -> Result<ForecastResult> {
        let request = ForecastRequest::new(horizon, include_interval)?;
        ForecastService::for_series(&self.model, self.series()).forecast(&request)
    }
}
