//! Tukey fences for capping outliers
//!
//! Values outside `[Q1 - k*IQR, Q3 + k*IQR]` are clipped to the nearest
//! bound instead of being dropped, so the series keeps its length.

use crate::quantiles::interquartile_range;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Multiplier used by the classic Tukey fence
pub const TUKEY_K: f64 = 1.5;

/// Lower and upper bounds of an outlier fence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TukeyFence {
    /// Values below this are raised to it
    pub lower: f64,
    /// Values above this are lowered to it
    pub upper: f64,
}

impl TukeyFence {
    /// Create a fence from explicit bounds
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() || lower > upper {
            return Err(MathError::InvalidInput(format!(
                "Invalid fence bounds [{}, {}]",
                lower, upper
            )));
        }

        Ok(Self { lower, upper })
    }

    /// Fence at `Q1 - 1.5*IQR` and `Q3 + 1.5*IQR` of the present values
    pub fn from_values(values: &[Option<f64>]) -> Result<Self> {
        Self::with_multiplier(values, TUKEY_K)
    }

    /// Fence at `Q1 - k*IQR` and `Q3 + k*IQR`
    pub fn with_multiplier(values: &[Option<f64>], k: f64) -> Result<Self> {
        if !(k >= 0.0) {
            return Err(MathError::InvalidInput(format!(
                "Fence multiplier must be non-negative, got {}",
                k
            )));
        }

        let (q1, q3, iqr) = interquartile_range(values)?;
        Self::new(q1 - k * iqr, q3 + k * iqr)
    }

    /// Clip one value into the fence
    pub fn clip_value(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }

    /// Clip every present value; missing values stay missing
    pub fn clip(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        values
            .iter()
            .map(|v| v.map(|x| self.clip_value(x)))
            .collect()
    }

    /// Whether a value lies inside the fence
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Compute the Tukey fence of `values` and clip them to it in one step.
pub fn cap_outliers(values: &[Option<f64>]) -> Result<(TukeyFence, Vec<Option<f64>>)> {
    let fence = TukeyFence::from_values(values)?;
    let capped = fence.clip(values);
    Ok((fence, capped))
}
