//! Gap filling

/// Carry the last present value forward over missing entries.
///
/// Leading gaps have nothing to carry and stay `None`.
pub fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = *v;
            }
            last
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_fill() {
        let filled = forward_fill(&[None, Some(1.0), None, None, Some(2.0), None]);
        assert_eq!(
            filled,
            vec![None, Some(1.0), Some(1.0), Some(1.0), Some(2.0), Some(2.0)]
        );
    }
}
