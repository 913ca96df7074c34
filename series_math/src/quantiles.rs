//! Order-statistic quantiles
//!
//! Quantiles are computed with linear interpolation between the two closest
//! order statistics, the same rule most dataframe libraries use by default.
//! Missing and non-finite values are ignored.

use crate::{MathError, Result};

/// Quantile `q` (in `[0, 1]`) of the present, finite values.
pub fn quantile(values: &[Option<f64>], q: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&q) {
        return Err(MathError::InvalidInput(format!(
            "Quantile must be between 0 and 1, got {}",
            q
        )));
    }

    let mut sorted: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();

    if sorted.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot compute a quantile of an empty series".to_string(),
        ));
    }

    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(interpolate(&sorted, q))
}

/// First and third quartile together with their difference.
pub fn interquartile_range(values: &[Option<f64>]) -> Result<(f64, f64, f64)> {
    let q1 = quantile(values, 0.25)?;
    let q3 = quantile(values, 0.75)?;
    Ok((q1, q3, q3 - q1))
}

fn interpolate(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
