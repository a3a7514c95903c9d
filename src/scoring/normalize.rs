// Min-max normalization with a zero floor for degenerate inputs.

/// Scale `values` into [0, 1] by the range of their finite entries.
///
/// Non-finite entries become 0. When there are no finite values, or they
/// are all equal, every output is 0.
pub fn min_max(values: &[f64]) -> Vec<f64> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let range = max - min;

    if !range.is_finite() || range <= 0.0 {
        return vec![0.0; values.len()];
    }
    values
        .iter()
        .map(|v| if v.is_finite() { ((v - min) / range).clamp(0.0, 1.0) } else { 0.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scales_to_unit_interval() {
        assert_eq!(min_max(&[2.0, 4.0, 3.0]), vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_constant_and_empty_are_zero() {
        assert_eq!(min_max(&[5.0, 5.0]), vec![0.0, 0.0]);
        assert!(min_max(&[]).is_empty());
    }

    #[test]
    fn test_non_finite_entries_zeroed() {
        let got = min_max(&[f64::NAN, 1.0, 3.0, f64::INFINITY]);
        assert_eq!(got, vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(min_max(&[f64::NAN, f64::NAN]), vec![0.0, 0.0]);
    }
}
