use serde::{Deserialize, Serialize};

/// Five-number summary plus mean of a numeric sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub avg: f64,
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Arithmetic mean, `0.0` for an empty sample.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Summarize a sample into min, quartiles, median, max and mean.
///
/// Quartiles use the nearest-rank rule on the ascending sample: `q1` is the
/// element at index `⌊0.25·n⌋` and `q3` the element at `⌊0.75·n⌋`, with no
/// interpolation. The median averages the two central elements when `n` is
/// even.
///
/// # Arguments
///
/// * `values` - Unordered sample; may be empty.
///
/// # Returns
///
/// A [`BoxSummary`] with every field rounded to two decimals. An empty sample
/// yields the all-zero summary.
pub fn summarize(values: &[f64]) -> BoxSummary {
    if values.is_empty() {
        return BoxSummary::default();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    // Rounding happens once, here, so repeated aggregation does not drift.
    BoxSummary {
        min: round2(sorted[0]),
        q1: round2(sorted[n / 4]),
        median: round2(median),
        q3: round2(sorted[(3 * n) / 4]),
        max: round2(sorted[n - 1]),
        avg: round2(mean(&sorted)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sample_is_all_zero() {
        assert_eq!(summarize(&[]), BoxSummary::default());
    }

    #[test]
    fn odd_sample_uses_central_element() {
        let s = summarize(&[5.0, 1.0, 3.0]);
        assert_eq!(s.median, 3.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 5.0);
        assert_eq!(s.avg, 3.0);
    }

    #[test]
    fn quartiles_use_nearest_rank() {
        // n = 8: q1 -> index 2, q3 -> index 6
        let s = summarize(&[8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(s.q1, 3.0);
        assert_eq!(s.q3, 7.0);
        assert_eq!(s.median, 4.5);
    }

    #[test]
    fn rounds_at_boundary() {
        let s = summarize(&[0.111, 0.333]);
        assert_eq!(s.median, 0.22);
        assert_eq!(s.avg, 0.22);
        assert_eq!(s.min, 0.11);
        assert_eq!(s.max, 0.33);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0]), 1.5);
    }
}
