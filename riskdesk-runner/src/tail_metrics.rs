//! Tail risk metrics: VaR, expected shortfall, skewness, excess kurtosis.
//!
//! All functions are pure: per-trade returns in, scalar out. VaR and
//! expected shortfall are magnitudes in currency (scaled by a balance).

use serde::{Deserialize, Serialize};

use crate::metrics::{is_zero_std, mean_f64, std_dev};

/// Tail probability of the 95% VaR.
pub const TAIL_95: f64 = 0.05;

/// Tail probability of the 99% VaR.
pub const TAIL_99: f64 = 0.01;

/// Tail statistics of a return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailMetrics {
    /// Loss magnitude at the 5% quantile, in currency.
    pub var_95: f64,
    /// Loss magnitude at the 1% quantile, in currency. Never below `var_95`
    /// for a left tail of losses.
    pub var_99: f64,
    /// Mean loss magnitude over the 5% tail, in currency.
    pub expected_shortfall: f64,
    /// Third standardized moment.
    pub skewness: f64,
    /// Fourth standardized moment minus 3.
    pub kurtosis: f64,
}

impl TailMetrics {
    /// Compute every tail statistic. An empty series yields all zeros.
    pub fn compute(returns: &[f64], balance: f64) -> Self {
        if returns.is_empty() {
            return Self {
                var_95: 0.0,
                var_99: 0.0,
                expected_shortfall: 0.0,
                skewness: 0.0,
                kurtosis: 0.0,
            };
        }
        let sorted = sorted_ascending(returns);
        Self {
            var_95: value_at_risk(&sorted, TAIL_95) * balance,
            var_99: value_at_risk(&sorted, TAIL_99) * balance,
            expected_shortfall: expected_shortfall(&sorted, TAIL_95) * balance,
            skewness: skewness(returns),
            kurtosis: excess_kurtosis(returns),
        }
    }
}

pub(crate) fn sorted_ascending(returns: &[f64]) -> Vec<f64> {
    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Index of the VaR observation: `floor(n · tail)`.
pub fn tail_index(n: usize, tail: f64) -> usize {
    let idx = (n as f64 * tail).floor() as usize;
    idx.min(n.saturating_sub(1))
}

/// Historical VaR as a return magnitude: `|sorted[tail_index]|`.
///
/// `sorted` must be ascending and non-empty.
pub fn value_at_risk(sorted: &[f64], tail: f64) -> f64 {
    match sorted.get(tail_index(sorted.len(), tail)) {
        Some(r) => r.abs(),
        None => 0.0,
    }
}

/// Expected shortfall as a return magnitude: `|mean(sorted[..=tail_index])|`.
pub fn expected_shortfall(sorted: &[f64], tail: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = tail_index(sorted.len(), tail);
    mean_f64(&sorted[..=idx]).abs()
}

/// Skewness: `(1/n) · Σ((x - mean) / s)³` with the sample deviation `s`.
pub fn skewness(returns: &[f64]) -> f64 {
    standardized_moment(returns, 3)
}

/// Excess kurtosis: `(1/n) · Σ((x - mean) / s)⁴ - 3`. 0 when `s` is 0.
pub fn excess_kurtosis(returns: &[f64]) -> f64 {
    let std = std_dev(returns);
    if is_zero_std(std) {
        return 0.0;
    }
    standardized_moment(returns, 4) - 3.0
}

fn standardized_moment(returns: &[f64], power: i32) -> f64 {
    let std = std_dev(returns);
    if is_zero_std(std) {
        return 0.0;
    }
    let mean = mean_f64(returns);
    returns
        .iter()
        .map(|r| ((r - mean) / std).powi(power))
        .sum::<f64>()
        / returns.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        // -0.05 .. +0.05, ascending
        (0..n)
            .map(|i| -0.05 + 0.1 * i as f64 / (n - 1) as f64)
            .collect()
    }

    #[test]
    fn tail_indices() {
        assert_eq!(tail_index(5000, TAIL_95), 250);
        assert_eq!(tail_index(5000, TAIL_99), 50);
        assert_eq!(tail_index(10, TAIL_95), 0);
        assert_eq!(tail_index(1, TAIL_99), 0);
    }

    #[test]
    fn var_reads_sorted_quantile() {
        let sorted = ramp(101);
        // floor(101 * 0.05) = 5 → -0.05 + 0.005
        assert!((value_at_risk(&sorted, TAIL_95) - 0.045).abs() < 1e-12);
        // floor(101 * 0.01) = 1 → -0.049
        assert!((value_at_risk(&sorted, TAIL_99) - 0.049).abs() < 1e-12);
    }

    #[test]
    fn var99_at_least_var95_on_loss_tail() {
        let tm = TailMetrics::compute(&ramp(1000), 100_000.0);
        assert!(tm.var_99 >= tm.var_95);
        assert!(tm.expected_shortfall >= tm.var_95);
    }

    #[test]
    fn expected_shortfall_includes_var_observation() {
        let sorted = [-0.10, -0.05, 0.0, 0.01, 0.02, 0.03, 0.04, 0.05, 0.06, 0.07, 0.08, 0.09, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1];
        // n = 20 → idx 1 → mean(-0.10, -0.05)
        assert!((expected_shortfall(&sorted, TAIL_95) - 0.075).abs() < 1e-12);
    }

    #[test]
    fn symmetric_series_has_zero_skew() {
        let r = [-0.02, -0.01, 0.0, 0.01, 0.02];
        assert!(skewness(&r).abs() < 1e-12);
    }

    #[test]
    fn left_tail_skews_negative() {
        let mut r = vec![0.01; 100];
        for i in (0..100).step_by(10) {
            r[i] = -0.08;
        }
        assert!(skewness(&r) < 0.0);
        assert!(excess_kurtosis(&r) > 0.0);
    }

    #[test]
    fn zero_std_moments_are_zero() {
        let r = vec![0.003; 50];
        assert_eq!(skewness(&r), 0.0);
        assert_eq!(excess_kurtosis(&r), 0.0);
    }

    #[test]
    fn empty_series_is_all_zero() {
        let tm = TailMetrics::compute(&[], 100_000.0);
        assert_eq!(tm.var_95, 0.0);
        assert_eq!(tm.expected_shortfall, 0.0);
    }
}
