//! Statistical summaries of retained reservoir samples.

use serde::{Deserialize, Serialize};

/// Immutable point-in-time summary of a reservoir's retained samples.
///
/// All statistics are computed over the samples retained at query time, not
/// over every observation ever seen; [`total_observed`](Self::total_observed)
/// carries the latter. Cost is bounded by the reservoir capacity, never by
/// the observation count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Retained samples, sorted ascending.
    values: Vec<i64>,
    /// Count of every update the reservoir has seen since creation or the
    /// last reset, including evicted samples.
    total_observed: u64,
    min: i64,
    max: i64,
    mean: f64,
    std_dev: f64,
}

impl Snapshot {
    /// Builds a snapshot from an unsorted copy of retained values.
    pub fn new(mut values: Vec<i64>, total_observed: u64) -> Self {
        values.sort_unstable();

        if values.is_empty() {
            return Self {
                values,
                total_observed,
                min: 0,
                max: 0,
                mean: 0.0,
                std_dev: 0.0,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
        // Population variance, two-pass for numerical stability.
        let variance = values
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        Self {
            min: values[0],
            max: values[values.len() - 1],
            mean,
            std_dev: variance.sqrt(),
            values,
            total_observed,
        }
    }

    /// An empty snapshot with no retained samples and no observations.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// Number of retained samples. Always at most the reservoir capacity.
    pub fn sample_size(&self) -> usize {
        self.values.len()
    }

    /// Count of every update ever seen, including evicted samples.
    pub fn total_observed(&self) -> u64 {
        self.total_observed
    }

    /// Smallest retained value, or 0 when empty.
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Largest retained value, or 0 when empty.
    pub fn max(&self) -> i64 {
        self.max
    }

    /// Arithmetic mean of retained values, or 0.0 when empty.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation of retained values, or 0.0 when empty.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// The 50th percentile.
    pub fn median(&self) -> f64 {
        self.percentile(0.5)
    }

    /// Value at quantile `p` in `[0.0, 1.0]`, linearly interpolated between
    /// order statistics. Out-of-range `p` is clamped; an empty snapshot
    /// yields 0.0.
    pub fn percentile(&self, p: f64) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let p = p.clamp(0.0, 1.0);
        let rank = p * (self.values.len() - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;
        if lower == upper {
            return self.values[lower] as f64;
        }
        let fraction = rank - lower as f64;
        let low = self.values[lower] as f64;
        let high = self.values[upper] as f64;
        low + fraction * (high - low)
    }

    /// The retained samples in ascending order.
    pub fn values(&self) -> &[i64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::empty();
        assert_eq!(snapshot.sample_size(), 0);
        assert_eq!(snapshot.total_observed(), 0);
        assert_eq!(snapshot.min(), 0);
        assert_eq!(snapshot.max(), 0);
        assert_eq!(snapshot.mean(), 0.0);
        assert_eq!(snapshot.std_dev(), 0.0);
        assert_eq!(snapshot.percentile(0.99), 0.0);
    }

    #[test]
    fn test_basic_statistics() {
        let snapshot = Snapshot::new(vec![5, 1, 3, 2, 4], 5);
        assert_eq!(snapshot.sample_size(), 5);
        assert_eq!(snapshot.min(), 1);
        assert_eq!(snapshot.max(), 5);
        assert_eq!(snapshot.mean(), 3.0);
        // Population stddev of 1..=5 is sqrt(2).
        assert!((snapshot.std_dev() - 2.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(snapshot.median(), 3.0);
    }

    #[test]
    fn test_percentile_interpolation() {
        let snapshot = Snapshot::new(vec![10, 20, 30, 40], 4);
        assert_eq!(snapshot.percentile(0.0), 10.0);
        assert_eq!(snapshot.percentile(1.0), 40.0);
        // rank = 0.5 * 3 = 1.5, midway between 20 and 30.
        assert_eq!(snapshot.median(), 25.0);
        // rank = 0.75 * 3 = 2.25.
        assert!((snapshot.percentile(0.75) - 32.5).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_clamps_out_of_range() {
        let snapshot = Snapshot::new(vec![7], 1);
        assert_eq!(snapshot.percentile(-0.5), 7.0);
        assert_eq!(snapshot.percentile(2.0), 7.0);
    }

    #[test]
    fn test_percentile_monotonic() {
        let values: Vec<i64> = (1..=1000).collect();
        let snapshot = Snapshot::new(values, 1000);
        let p50 = snapshot.percentile(0.5);
        let p90 = snapshot.percentile(0.9);
        let p99 = snapshot.percentile(0.99);
        assert!(p50 <= p90);
        assert!(p90 <= p99);
        assert!(p99 <= snapshot.max() as f64);
    }

    #[test]
    fn test_total_observed_independent_of_samples() {
        let snapshot = Snapshot::new(vec![1, 2, 3], 1_000_000);
        assert_eq!(snapshot.sample_size(), 3);
        assert_eq!(snapshot.total_observed(), 1_000_000);
    }
}
