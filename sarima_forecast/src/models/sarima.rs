//! Seasonal ARIMA models fitted offline
//!
//! The artifact stores the orders, the estimated coefficients and enough of
//! the training series (trailing observations and residuals) to run the
//! forecast recursion. Coefficients follow the usual sign convention:
//! `phi(B) = 1 - sum(phi_i B^i)` and `theta(B) = 1 + sum(theta_j B^j)`.

use crate::error::{ForecastError, Result};
use crate::models::{FittedModel, ModelForecast, ModelSummary, CONFIDENCE_LEVEL};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;

/// Largest ordinary or seasonal differencing order an artifact may declare
pub const MAX_DIFFERENCING: usize = 4;

/// Largest lag of the expanded AR or MA polynomial
pub const MAX_EXPANDED_LAGS: usize = 10_000;

/// Non-seasonal order `(p, d, q)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SarimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

/// Seasonal order `(P, D, Q, s)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub s: usize,
}

/// Estimated parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaCoefficients {
    #[serde(default)]
    pub ar: Vec<f64>,
    #[serde(default)]
    pub ma: Vec<f64>,
    #[serde(default)]
    pub seasonal_ar: Vec<f64>,
    #[serde(default)]
    pub seasonal_ma: Vec<f64>,
    /// Innovation variance
    pub sigma2: f64,
}

/// Tail of the training series needed to continue the recursion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SarimaState {
    /// Most recent observations, oldest first
    pub observations: Vec<f64>,
    /// Most recent one-step residuals, oldest first
    pub residuals: Vec<f64>,
}

/// A fitted SARIMA(p,d,q)x(P,D,Q,s) model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaModel {
    order: SarimaOrder,
    seasonal_order: SeasonalOrder,
    coefficients: SarimaCoefficients,
    nobs: usize,
    #[serde(default)]
    training_end: Option<NaiveDate>,
    #[serde(default)]
    dependent_variable: Option<String>,
    #[serde(default)]
    log_likelihood: Option<f64>,
    state: SarimaState,
}

impl SarimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl SeasonalOrder {
    pub fn new(p: usize, d: usize, q: usize, s: usize) -> Self {
        Self { p, d, q, s }
    }

    /// Order with no seasonal terms
    pub fn none() -> Self {
        Self::new(0, 0, 0, 0)
    }

    fn has_terms(&self) -> bool {
        self.p + self.d + self.q > 0
    }
}

impl fmt::Display for SarimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

impl fmt::Display for SeasonalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.p, self.d, self.q, self.s)
    }
}

impl SarimaModel {
    /// Assemble a model from its parts and check that they agree
    pub fn new(
        order: SarimaOrder,
        seasonal_order: SeasonalOrder,
        coefficients: SarimaCoefficients,
        state: SarimaState,
        nobs: usize,
    ) -> Result<Self> {
        let model = Self {
            order,
            seasonal_order,
            coefficients,
            nobs,
            training_end: None,
            dependent_variable: None,
            log_likelihood: None,
            state,
        };
        model.validate()?;
        Ok(model)
    }

    /// Run known coefficients over a training series to recover the
    /// residuals and trailing state. No parameters are estimated here.
    pub fn condition(
        order: SarimaOrder,
        seasonal_order: SeasonalOrder,
        coefficients: SarimaCoefficients,
        series: &[f64],
    ) -> Result<Self> {
        let mut model = Self {
            order,
            seasonal_order,
            coefficients,
            nobs: series.len(),
            training_end: None,
            dependent_variable: None,
            log_likelihood: None,
            state: SarimaState::default(),
        };
        model.validate_structure()?;

        let residuals = model.conditional_residuals(series)?;
        let ar_lags = model.ar_polynomial().len() - 1;
        let ma_lags = model.ma_polynomial().len() - 1;

        model.state = SarimaState {
            observations: series[series.len() - ar_lags..].to_vec(),
            residuals: residuals[residuals.len() - ma_lags..].to_vec(),
        };
        model.validate()?;
        Ok(model)
    }

    pub fn with_training_end(mut self, date: NaiveDate) -> Self {
        self.training_end = Some(date);
        self
    }

    pub fn with_dependent_variable(mut self, name: impl Into<String>) -> Self {
        self.dependent_variable = Some(name.into());
        self
    }

    pub fn with_log_likelihood(mut self, value: f64) -> Self {
        self.log_likelihood = Some(value);
        self
    }

    pub fn with_sigma2(mut self, sigma2: f64) -> Self {
        self.coefficients.sigma2 = sigma2;
        self
    }

    /// Model label, e.g. `SARIMAX(1, 1, 1)x(1, 1, 1, 5)`
    pub fn name(&self) -> String {
        let o = self.order;
        let s = self.seasonal_order;
        if s.has_terms() {
            format!(
                "SARIMAX({}, {}, {})x({}, {}, {}, {})",
                o.p, o.d, o.q, s.p, s.d, s.q, s.s
            )
        } else {
            format!("SARIMAX({}, {}, {})", o.p, o.d, o.q)
        }
    }

    pub fn order(&self) -> SarimaOrder {
        self.order
    }

    pub fn seasonal_order(&self) -> SeasonalOrder {
        self.seasonal_order
    }

    pub fn coefficients(&self) -> &SarimaCoefficients {
        &self.coefficients
    }

    pub fn state(&self) -> &SarimaState {
        &self.state
    }

    pub fn nobs(&self) -> usize {
        self.nobs
    }

    /// Full autoregressive polynomial `phi(B) Phi(B^s) (1-B)^d (1-B^s)^D`,
    /// lag-0 coefficient first
    pub fn ar_polynomial(&self) -> Vec<f64> {
        let s = self.seasonal_order.s;
        let mut poly = multiply(
            &lag_polynomial(&self.coefficients.ar, 1, -1.0),
            &lag_polynomial(&self.coefficients.seasonal_ar, s, -1.0),
        );
        for _ in 0..self.order.d {
            poly = multiply(&poly, &difference_polynomial(1));
        }
        for _ in 0..self.seasonal_order.d {
            poly = multiply(&poly, &difference_polynomial(s));
        }
        poly
    }

    /// Full moving-average polynomial `theta(B) Theta(B^s)`, lag-0 first
    pub fn ma_polynomial(&self) -> Vec<f64> {
        multiply(
            &lag_polynomial(&self.coefficients.ma, 1, 1.0),
            &lag_polynomial(&self.coefficients.seasonal_ma, self.seasonal_order.s, 1.0),
        )
    }

    /// First `n` weights of the MA(infinity) form of the integrated model
    pub fn psi_weights(&self, n: usize) -> Vec<f64> {
        let phi = self.ar_polynomial();
        let theta = self.ma_polynomial();

        let mut psi: Vec<f64> = Vec::with_capacity(n);
        for j in 0..n {
            let mut value = theta.get(j).copied().unwrap_or(0.0);
            for i in 1..=j.min(phi.len() - 1) {
                value -= phi[i] * psi[j - i];
            }
            psi.push(value);
        }
        psi
    }

    /// Point forecast with future innovations set to zero
    pub fn point_forecast(&self, steps: usize) -> Vec<f64> {
        let phi = self.ar_polynomial();
        let theta = self.ma_polynomial();

        let mut history = self.state.observations.clone();
        let mut residuals = self.state.residuals.clone();
        let mut forecasts = Vec::with_capacity(steps);

        for _ in 0..steps {
            let mut value = 0.0;
            for (i, coef) in phi.iter().enumerate().skip(1) {
                value -= coef * history[history.len() - i];
            }
            for (j, coef) in theta.iter().enumerate().skip(1) {
                value += coef * residuals[residuals.len() - j];
            }

            history.push(value);
            residuals.push(0.0);
            forecasts.push(value);
        }

        forecasts
    }

    /// Forecast with a symmetric normal interval at the given coverage
    pub fn forecast_at_level(&self, steps: usize, level: f64) -> Result<ModelForecast> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Confidence level must be between 0 and 1, got {}",
                level
            )));
        }

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::ForecastingError(e.to_string()))?;
        let z = normal.inverse_cdf(0.5 + level / 2.0);

        let mean = self.point_forecast(steps);
        let psi = self.psi_weights(steps);

        let mut lower = Vec::with_capacity(steps);
        let mut upper = Vec::with_capacity(steps);
        let mut cumulative = 0.0;
        for (value, weight) in mean.iter().zip(psi.iter()) {
            cumulative += weight * weight;
            let margin = z * (self.coefficients.sigma2 * cumulative).sqrt();
            lower.push(value - margin);
            upper.push(value + margin);
        }

        Ok(ModelForecast {
            mean,
            interval: Some((lower, upper)),
        })
    }

    /// One-step residuals of `series` under this model's coefficients.
    ///
    /// The first `ar_lags` residuals have no full lag window and are zero.
    pub fn conditional_residuals(&self, series: &[f64]) -> Result<Vec<f64>> {
        let phi = self.ar_polynomial();
        let theta = self.ma_polynomial();
        let ar_lags = phi.len() - 1;
        let ma_lags = theta.len() - 1;

        let needed = (ar_lags + 1).max(ma_lags);
        if series.len() < needed {
            return Err(ForecastError::InvalidParameter(format!(
                "Insufficient data for {}. Need at least {} observations, have {}.",
                self.name(),
                needed,
                series.len()
            )));
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "Series contains non-finite values".to_string(),
            ));
        }

        let mut residuals = vec![0.0; series.len()];
        for t in ar_lags..series.len() {
            let mut fitted = 0.0;
            for i in 1..=ar_lags {
                fitted -= phi[i] * series[t - i];
            }
            for j in 1..=ma_lags.min(t) {
                fitted += theta[j] * residuals[t - j];
            }
            residuals[t] = series[t] - fitted;
        }

        Ok(residuals)
    }

    /// Mean squared residual of `series` after the burn-in window
    pub fn conditional_sigma2(&self, series: &[f64]) -> Result<f64> {
        let residuals = self.conditional_residuals(series)?;
        let burn_in = self.ar_polynomial().len() - 1;
        let used = &residuals[burn_in..];
        if used.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "No residuals after burn-in".to_string(),
            ));
        }
        Ok(used.iter().map(|r| r * r).sum::<f64>() / used.len() as f64)
    }

    /// Check the orders, coefficients and stored state agree
    pub fn validate(&self) -> Result<()> {
        self.validate_structure()?;

        let ar_lags = self.ar_polynomial().len() - 1;
        let ma_lags = self.ma_polynomial().len() - 1;
        if self.state.observations.len() < ar_lags {
            return Err(ForecastError::InvalidParameter(format!(
                "State holds {} observations, {} needs {}",
                self.state.observations.len(),
                self.name(),
                ar_lags
            )));
        }
        if self.state.residuals.len() < ma_lags {
            return Err(ForecastError::InvalidParameter(format!(
                "State holds {} residuals, {} needs {}",
                self.state.residuals.len(),
                self.name(),
                ma_lags
            )));
        }
        if self
            .state
            .observations
            .iter()
            .chain(self.state.residuals.iter())
            .any(|v| !v.is_finite())
        {
            return Err(ForecastError::InvalidParameter(
                "State contains non-finite values".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_structure(&self) -> Result<()> {
        let c = &self.coefficients;
        let counts = [
            ("ar", c.ar.len(), self.order.p),
            ("ma", c.ma.len(), self.order.q),
            ("seasonal_ar", c.seasonal_ar.len(), self.seasonal_order.p),
            ("seasonal_ma", c.seasonal_ma.len(), self.seasonal_order.q),
        ];
        for (name, have, want) in counts {
            if have != want {
                return Err(ForecastError::InvalidParameter(format!(
                    "Expected {} {} coefficient(s), found {}",
                    want, name, have
                )));
            }
        }

        if self.seasonal_order.has_terms() && self.seasonal_order.s < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "Seasonal period must be at least 2, got {}",
                self.seasonal_order.s
            )));
        }

        let d = self.order.d;
        let seasonal_d = self.seasonal_order.d;
        if d > MAX_DIFFERENCING || seasonal_d > MAX_DIFFERENCING {
            return Err(ForecastError::InvalidParameter(format!(
                "Differencing orders d={} and D={} exceed the limit of {}",
                d, seasonal_d, MAX_DIFFERENCING
            )));
        }

        let ar_lags = self.expanded_lags(self.order.p + d, self.seasonal_order.p + seasonal_d);
        let ma_lags = self.expanded_lags(self.order.q, self.seasonal_order.q);
        match (ar_lags, ma_lags) {
            (Some(ar), Some(ma)) if ar <= MAX_EXPANDED_LAGS && ma <= MAX_EXPANDED_LAGS => {}
            _ => {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} expands past {} lags",
                    self.name(),
                    MAX_EXPANDED_LAGS
                )));
            }
        }

        let mut all = c
            .ar
            .iter()
            .chain(&c.ma)
            .chain(&c.seasonal_ar)
            .chain(&c.seasonal_ma);
        if all.any(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "Coefficients must be finite".to_string(),
            ));
        }
        if !(c.sigma2.is_finite() && c.sigma2 >= 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "sigma2 must be a non-negative number, got {}",
                c.sigma2
            )));
        }

        Ok(())
    }

    /// `short + long * s`, or `None` on overflow
    fn expanded_lags(&self, short: usize, long: usize) -> Option<usize> {
        long.checked_mul(self.seasonal_order.s)?.checked_add(short)
    }

    fn summary_text(&self) -> String {
        let width = 78;
        let heavy = "=".repeat(width);
        let light = "-".repeat(width);
        let dep = self.dependent_variable.as_deref().unwrap_or("y");

        let mut lines = vec![
            format!("{:^width$}", "SARIMAX Results", width = width),
            heavy.clone(),
            format!(
                "{:<22}{:>16}    {:<22}{:>14}",
                "Dep. Variable:", dep, "No. Observations:", self.nobs
            ),
            format!("{:<22}{}", "Model:", self.name()),
        ];
        if let Some(ll) = self.log_likelihood {
            lines.push(format!("{:<22}{:>16.3}", "Log Likelihood", ll));
        }
        if let Some(end) = self.training_end {
            let end = end.format("%Y-%m-%d").to_string();
            lines.push(format!("{:<22}{:>16}", "Sample end:", end));
        }
        lines.push(heavy.clone());
        lines.push(format!("{:<22}{:>16}", "", "coef"));
        lines.push(light);

        let s = self.seasonal_order.s;
        let c = &self.coefficients;
        let labelled = c
            .ar
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("ar.L{}", i + 1), *v))
            .chain(c.ma.iter().enumerate().map(|(i, v)| (format!("ma.L{}", i + 1), *v)))
            .chain(
                c.seasonal_ar
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (format!("ar.S.L{}", (i + 1) * s), *v)),
            )
            .chain(
                c.seasonal_ma
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (format!("ma.S.L{}", (i + 1) * s), *v)),
            )
            .chain(std::iter::once(("sigma2".to_string(), c.sigma2)));

        for (label, value) in labelled {
            lines.push(format!("{:<22}{:>16.4}", label, value));
        }
        lines.push(heavy);

        lines.join("\n")
    }
}

impl FittedModel for SarimaModel {
    fn forecast(&self, steps: usize) -> Result<ModelForecast> {
        self.forecast_at_level(steps, CONFIDENCE_LEVEL)
    }

    fn describe(&self) -> ModelSummary {
        ModelSummary {
            text: self.summary_text(),
            nobs: self.nobs,
        }
    }

    fn training_end(&self) -> Option<NaiveDate> {
        self.training_end
    }
}

/// `1 + sign * (c_1 B^spacing + c_2 B^(2*spacing) + ...)`
fn lag_polynomial(coefs: &[f64], spacing: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefs.len() * spacing + 1];
    poly[0] = 1.0;
    for (k, c) in coefs.iter().enumerate() {
        poly[(k + 1) * spacing] += sign * c;
    }
    poly
}

/// `1 - B^spacing`
fn difference_polynomial(spacing: usize) -> Vec<f64> {
    let mut poly = vec![0.0; spacing + 1];
    poly[0] = 1.0;
    poly[spacing] -= 1.0;
    poly
}

fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn coefficients(
        ar: &[f64],
        ma: &[f64],
        sar: &[f64],
        sma: &[f64],
        sigma2: f64,
    ) -> SarimaCoefficients {
        SarimaCoefficients {
            ar: ar.to_vec(),
            ma: ma.to_vec(),
            seasonal_ar: sar.to_vec(),
            seasonal_ma: sma.to_vec(),
            sigma2,
        }
    }

    #[test]
    fn test_polynomial_multiplication() {
        // (1 - B)(1 - B) = 1 - 2B + B^2
        let poly = multiply(&difference_polynomial(1), &difference_polynomial(1));
        assert_eq!(poly, vec![1.0, -2.0, 1.0]);
    }

    #[test]
    fn test_seasonal_ar_polynomial() {
        let model = SarimaModel {
            order: SarimaOrder::new(1, 0, 0),
            seasonal_order: SeasonalOrder::new(1, 0, 0, 2),
            coefficients: coefficients(&[0.5], &[], &[0.2], &[], 1.0),
            nobs: 0,
            training_end: None,
            dependent_variable: None,
            log_likelihood: None,
            state: SarimaState::default(),
        };

        // (1 - 0.5B)(1 - 0.2B^2) = 1 - 0.5B - 0.2B^2 + 0.1B^3
        let poly = model.ar_polynomial();
        assert_eq!(poly.len(), 4);
        assert_relative_eq!(poly[1], -0.5);
        assert_relative_eq!(poly[2], -0.2);
        assert_relative_eq!(poly[3], 0.1);
    }

    #[test]
    fn test_random_walk_forecast() {
        let model = SarimaModel::new(
            SarimaOrder::new(0, 1, 0),
            SeasonalOrder::none(),
            coefficients(&[], &[], &[], &[], 4.0),
            SarimaState {
                observations: vec![10.0],
                residuals: vec![],
            },
            100,
        )
        .unwrap();

        let forecast = model.forecast(3).unwrap();
        assert_eq!(forecast.mean, vec![10.0, 10.0, 10.0]);

        // variance grows linearly: sigma2 * h
        let (lower, upper) = forecast.interval.unwrap();
        let z = 1.959963984540054;
        for h in 0..3 {
            let margin = z * (4.0 * (h + 1) as f64).sqrt();
            assert_relative_eq!(upper[h] - 10.0, margin, epsilon = 1e-6);
            assert_relative_eq!(10.0 - lower[h], margin, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_ar1_forecast_decays() {
        let model = SarimaModel::new(
            SarimaOrder::new(1, 0, 0),
            SeasonalOrder::none(),
            coefficients(&[0.5], &[], &[], &[], 1.0),
            SarimaState {
                observations: vec![8.0],
                residuals: vec![],
            },
            50,
        )
        .unwrap();

        assert_eq!(model.point_forecast(3), vec![4.0, 2.0, 1.0]);
        let psi = model.psi_weights(3);
        assert_eq!(psi, vec![1.0, 0.5, 0.25]);
    }

    #[test]
    fn test_ma_term_uses_last_residual() {
        let model = SarimaModel::new(
            SarimaOrder::new(0, 0, 1),
            SeasonalOrder::none(),
            coefficients(&[], &[0.4], &[], &[], 1.0),
            SarimaState {
                observations: vec![],
                residuals: vec![2.0],
            },
            10,
        )
        .unwrap();

        assert_eq!(model.point_forecast(2), vec![0.8, 0.0]);
    }

    #[test]
    fn test_validate_rejects_wrong_coefficient_count() {
        let result = SarimaModel::new(
            SarimaOrder::new(2, 0, 0),
            SeasonalOrder::none(),
            coefficients(&[0.5], &[], &[], &[], 1.0),
            SarimaState {
                observations: vec![1.0, 2.0],
                residuals: vec![],
            },
            10,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_short_state() {
        let result = SarimaModel::new(
            SarimaOrder::new(1, 1, 0),
            SeasonalOrder::none(),
            coefficients(&[0.5], &[], &[], &[], 1.0),
            SarimaState {
                observations: vec![1.0],
                residuals: vec![],
            },
            10,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_condition_recovers_residuals_of_random_walk() {
        let series = [1.0, 3.0, 2.0, 5.0];
        let model = SarimaModel::condition(
            SarimaOrder::new(0, 1, 0),
            SeasonalOrder::none(),
            coefficients(&[], &[], &[], &[], 1.0),
            &series,
        )
        .unwrap();

        assert_eq!(
            model.conditional_residuals(&series).unwrap(),
            vec![0.0, 2.0, -1.0, 3.0]
        );
        assert_eq!(model.state().observations, vec![5.0]);
        assert_relative_eq!(model.conditional_sigma2(&series).unwrap(), 14.0 / 3.0);
        assert_eq!(model.nobs(), 4);
    }

    #[test]
    fn test_name_and_orders() {
        let model = SarimaModel::new(
            SarimaOrder::new(1, 1, 1),
            SeasonalOrder::new(1, 1, 1, 5),
            coefficients(&[0.1], &[-0.2], &[0.05], &[-0.9], 2.5),
            SarimaState {
                observations: vec![1.0; 12],
                residuals: vec![0.0; 6],
            },
            1200,
        )
        .unwrap();

        assert_eq!(model.name(), "SARIMAX(1, 1, 1)x(1, 1, 1, 5)");
        assert_eq!(model.order().to_string(), "(1,1,1)");
        assert_eq!(model.seasonal_order().to_string(), "(1,1,1,5)");

        let summary = model.describe();
        assert_eq!(summary.nobs, 1200);
        assert!(summary.text.contains("ma.S.L5"));
        assert!(summary.text.contains("sigma2"));
    }
}
