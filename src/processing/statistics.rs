use serde::{Deserialize, Serialize};

/// Samples smaller than this are drawn as scatter points without a box.
pub const MIN_BOX_SAMPLES: usize = 5;

/// Multiplier applied to the interquartile range for the inner fences.
pub const FENCE_FACTOR: f64 = 1.5;

/// Five-number summary of a sample, using Tukey hinges for the quartiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxPlot {
    pub min: f64,
    pub lower_quartile: f64,
    pub median: f64,
    pub upper_quartile: f64,
    pub max: f64,
    /// Sorted copy of the input.
    pub values: Vec<f64>,
}

/// Whisker values and outliers of a box plot, split at the inner fences.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FencePartition {
    pub whiskers: Vec<f64>,
    pub outliers: Vec<f64>,
}

impl BoxPlot {
    /// Compute the summary of `sample`. Values must be finite; callers filter
    /// NaN and infinities first. Returns `None` for an empty sample.
    pub fn compute(sample: &[f64]) -> Option<Self> {
        if sample.is_empty() {
            return None;
        }

        let mut values = sample.to_vec();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let n = values.len();
        let median = median_of_sorted(&values);

        // Odd lengths drop the median from both halves.
        let lower = &values[..n / 2];
        let upper = if n % 2 == 0 { &values[n / 2..] } else { &values[n / 2 + 1..] };

        // A single value has empty halves; its hinges collapse onto the median.
        let lower_quartile = if lower.is_empty() { median } else { median_of_sorted(lower) };
        let upper_quartile = if upper.is_empty() { median } else { median_of_sorted(upper) };

        Some(BoxPlot {
            min: values[0],
            lower_quartile,
            median,
            upper_quartile,
            max: values[n - 1],
            values,
        })
    }

    pub fn interquartile_range(&self) -> f64 {
        self.upper_quartile - self.lower_quartile
    }

    /// Inner fences as `(lower, upper)`.
    pub fn fences(&self) -> (f64, f64) {
        let iqr = self.interquartile_range();
        (
            self.lower_quartile - FENCE_FACTOR * iqr,
            self.upper_quartile + FENCE_FACTOR * iqr,
        )
    }

    /// Split the values into those inside the fences and the outliers.
    pub fn partition(&self) -> FencePartition {
        let (low, high) = self.fences();
        let (whiskers, outliers) = self
            .values
            .iter()
            .copied()
            .partition(|&v| v >= low && v <= high);
        FencePartition { whiskers, outliers }
    }

    /// Whether the sample is large enough to draw a box and whiskers.
    pub fn draws_box(&self) -> bool {
        self.values.len() >= MIN_BOX_SAMPLES
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Format as a one-line summary using `fmt` for each number.
    pub fn summary(&self, fmt: impl Fn(f64) -> String) -> String {
        format!(
            "n={} min={} q1={} median={} q3={} max={}",
            self.count(),
            fmt(self.min),
            fmt(self.lower_quartile),
            fmt(self.median),
            fmt(self.upper_quartile),
            fmt(self.max)
        )
    }
}

/// Median of an already sorted, non-empty slice.
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_ordered(b: &BoxPlot) {
        assert!(b.min <= b.lower_quartile, "{b:?}");
        assert!(b.lower_quartile <= b.median, "{b:?}");
        assert!(b.median <= b.upper_quartile, "{b:?}");
        assert!(b.upper_quartile <= b.max, "{b:?}");
    }

    #[test]
    fn test_single_value() {
        let b = BoxPlot::compute(&[5.0]).unwrap();
        assert_eq!(b.min, 5.0);
        assert_eq!(b.lower_quartile, 5.0);
        assert_eq!(b.median, 5.0);
        assert_eq!(b.upper_quartile, 5.0);
        assert_eq!(b.max, 5.0);
        assert_eq!(b.values, vec![5.0]);
    }

    #[test]
    fn test_even_length_hinges() {
        let b = BoxPlot::compute(&[8.0, 3.0, 1.0, 6.0, 2.0, 7.0, 5.0, 4.0]).unwrap();
        assert_eq!(b.min, 1.0);
        assert_eq!(b.lower_quartile, 2.5);
        assert_eq!(b.median, 4.5);
        assert_eq!(b.upper_quartile, 6.5);
        assert_eq!(b.max, 8.0);
        assert_eq!(b.values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_odd_length_excludes_median() {
        let b = BoxPlot::compute(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(b.median, 3.0);
        assert_eq!(b.lower_quartile, 1.5);
        assert_eq!(b.upper_quartile, 4.5);
    }

    #[test]
    fn test_two_and_three_values() {
        let b = BoxPlot::compute(&[4.0, 2.0]).unwrap();
        assert_eq!((b.lower_quartile, b.median, b.upper_quartile), (2.0, 3.0, 4.0));

        let b = BoxPlot::compute(&[9.0, 1.0, 5.0]).unwrap();
        assert_eq!((b.lower_quartile, b.median, b.upper_quartile), (1.0, 5.0, 9.0));
    }

    #[test]
    fn test_empty_sample_has_no_box() {
        assert!(BoxPlot::compute(&[]).is_none());
    }

    #[test]
    fn test_input_not_mutated() {
        let input = vec![3.0, 1.0, 2.0];
        let _ = BoxPlot::compute(&input);
        assert_eq!(input, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_ordering_holds_across_shapes() {
        // Deterministic pseudo-random samples of every length up to 40.
        let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;
        for len in 1..=40 {
            let sample: Vec<f64> = (0..len)
                .map(|_| {
                    seed ^= seed << 13;
                    seed ^= seed >> 7;
                    seed ^= seed << 17;
                    (seed % 10_000) as f64 / 7.0 - 500.0
                })
                .collect();
            assert_ordered(&BoxPlot::compute(&sample).unwrap());
        }
        assert_ordered(&BoxPlot::compute(&[2.0, 2.0, 2.0, 2.0]).unwrap());
        assert_ordered(&BoxPlot::compute(&[-1e300, 0.0, 1e300]).unwrap());
    }

    #[test]
    fn test_fences_and_partition() {
        let b = BoxPlot::compute(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 100.0]).unwrap();
        // q1 = 2.5, q3 = 6.5, iqr = 4
        assert_eq!(b.fences(), (-3.5, 12.5));
        let p = b.partition();
        assert_eq!(p.outliers, vec![100.0]);
        assert_eq!(p.whiskers.len(), 7);
    }

    #[test]
    fn test_small_samples_skip_box() {
        assert!(!BoxPlot::compute(&[1.0, 2.0, 3.0, 4.0]).unwrap().draws_box());
        assert!(BoxPlot::compute(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap().draws_box());
    }
}
