//! Period-over-period returns
//!
//! The first element of every returned vector is `None` because it has no
//! previous observation. A return is also `None` when the previous price is
//! zero or either price is not finite.

/// Simple returns `p[t] / p[t-1] - 1`
pub fn simple_returns(prices: &[f64]) -> Vec<Option<f64>> {
    pairwise(prices, |prev, curr| curr / prev - 1.0)
}

/// Log returns `ln(p[t] / p[t-1])`
pub fn log_returns(prices: &[f64]) -> Vec<Option<f64>> {
    pairwise(prices, |prev, curr| (curr / prev).ln())
}

fn pairwise<F>(prices: &[f64], f: F) -> Vec<Option<f64>>
where
    F: Fn(f64, f64) -> f64,
{
    let mut out = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return out;
    }

    out.push(None);
    for window in prices.windows(2) {
        let (prev, curr) = (window[0], window[1]);
        let value = if prev == 0.0 { None } else { Some(f(prev, curr)) };
        out.push(value.filter(|v| v.is_finite()));
    }

    out
}
