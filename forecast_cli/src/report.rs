//! Plain-text rendering of the forecast views

use chrono::NaiveDate;
use sarima_forecast::{CleanedSeries, FittedModel, ForecastError, ForecastResult, SarimaModel};
use std::io::{self, Write};

/// Headline numbers
#[derive(Debug, Clone, PartialEq)]
pub struct MetricCards {
    pub last_date: NaiveDate,
    pub last_close: f64,
    pub forecast_days: usize,
    pub observations: usize,
}

/// User-facing message for an error that ends the session
pub fn fatal_message(err: &ForecastError) -> String {
    match err {
        ForecastError::ModelNotFound { path, reason } => format!(
            "Missing or unreadable model file: '{}' ({}). \
             Please place the fitted model artifact there.",
            path, reason
        ),
        ForecastError::DataError(msg) => format!("Could not load historical data: {}", msg),
        other => other.to_string(),
    }
}

pub fn render_metrics<W: Write>(w: &mut W, cards: &MetricCards) -> io::Result<()> {
    writeln!(w, "Apple Stock Price Forecast (SARIMA)")?;
    writeln!(w)?;
    writeln!(w, "  Last Date      {}", cards.last_date.format("%Y-%m-%d"))?;
    writeln!(w, "  Last Close     ${:.2}", cards.last_close)?;
    writeln!(w, "  Forecast Days  {}", cards.forecast_days)?;
    writeln!(w, "  Observations   {}", cards.observations)?;
    writeln!(w)
}

/// Last `window` business days of the cleaned series
pub fn render_history<W: Write>(
    w: &mut W,
    series: &CleanedSeries,
    window: usize,
) -> io::Result<()> {
    let tail = series.tail(window);
    writeln!(w, "Last {} Business Days: Close Price", tail.len())?;
    writeln!(w, "{:<12} {:>12}", "Date", "Close")?;
    for (date, close) in &tail {
        writeln!(w, "{:<12} {:>12.2}", date.format("%Y-%m-%d").to_string(), close)?;
    }

    let (low, high) = tail
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
            (lo.min(*v), hi.max(*v))
        });
    if !tail.is_empty() {
        writeln!(w, "Range: {:.2} to {:.2}", low, high)?;
    }
    writeln!(w)
}

/// Forecast table at two decimals
pub fn render_forecast<W: Write>(w: &mut W, result: &ForecastResult) -> io::Result<()> {
    writeln!(w, "Forecast Results")?;
    if result.has_interval() {
        writeln!(
            w,
            "{:<12} {:>16} {:>12} {:>12}",
            "Date", "Predicted_Close", "Lower_95", "Upper_95"
        )?;
    } else {
        writeln!(w, "{:<12} {:>16}", "Date", "Predicted_Close")?;
    }

    for point in result.iter() {
        let date = point.date.format("%Y-%m-%d").to_string();
        match point.bounds {
            Some(bounds) => writeln!(
                w,
                "{:<12} {:>16.2} {:>12.2} {:>12.2}",
                date, point.predicted, bounds.lower, bounds.upper
            )?,
            None => writeln!(w, "{:<12} {:>16.2}", date, point.predicted)?,
        }
    }
    writeln!(w)
}

/// Model summary and configuration
pub fn render_model_info<W: Write>(w: &mut W, model: &SarimaModel) -> io::Result<()> {
    let summary = model.describe();
    writeln!(w, "SARIMA Model Summary")?;
    writeln!(w, "{}", summary.text)?;
    writeln!(w)?;
    writeln!(w, "Model Configuration")?;
    writeln!(w, "  Order (p,d,q): {}", model.order())?;
    writeln!(w, "  Seasonal Order (P,D,Q,s): {}", model.seasonal_order())?;
    writeln!(w, "  Observations used: {}", summary.nobs)?;
    writeln!(w)
}
