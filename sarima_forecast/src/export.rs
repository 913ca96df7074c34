//! Forecast table export

use crate::error::{ForecastError, Result};
use crate::service::ForecastResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write the forecast as CSV: `Date,Predicted_Close[,Lower_95,Upper_95]`
pub fn write_forecast_csv<W: Write>(result: &ForecastResult, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    if result.has_interval() {
        csv_writer.write_record(["Date", "Predicted_Close", "Lower_95", "Upper_95"])?;
    } else {
        csv_writer.write_record(["Date", "Predicted_Close"])?;
    }

    for point in result.iter() {
        let date = point.date.format("%Y-%m-%d").to_string();
        let predicted = point.predicted.to_string();
        match (result.has_interval(), point.bounds) {
            (true, Some(bounds)) => csv_writer.write_record([
                date,
                predicted,
                bounds.lower.to_string(),
                bounds.upper.to_string(),
            ])?,
            (true, None) => {
                return Err(ForecastError::ContractViolation(format!(
                    "Forecast point {} has no bounds",
                    date
                )))
            }
            (false, _) => csv_writer.write_record([date, predicted])?,
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Render the forecast CSV into a string
pub fn forecast_csv_string(result: &ForecastResult) -> Result<String> {
    let mut buffer = Vec::new();
    write_forecast_csv(result, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| ForecastError::ForecastingError(format!("Forecast CSV is not UTF-8: {}", e)))
}

/// Save the forecast CSV to `path`
pub fn save_forecast_csv<P: AsRef<Path>>(result: &ForecastResult, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_forecast_csv(result, file)
}
