//! Heuristic quality scores shown next to a report.
//!
//! These are presentation heuristics with no statistical grounding. The
//! formulas are kept exactly as the calculator has always shown them; do not
//! read them as confidence intervals or convergence diagnostics.

use serde::{Deserialize, Serialize};

/// Four 0–100 scores derived from trial count, shape and drawdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    /// `85 + trials / 100`
    pub confidence: f64,
    /// `90 - |skew|·10 - |kurt|·5`
    pub reliability: f64,
    /// `95 - std·100`
    pub convergence: f64,
    /// `90 - max_dd / 2`
    pub stability: f64,
}

impl QualityScores {
    pub fn compute(trials: usize, skewness: f64, kurtosis: f64, std: f64, max_dd_pct: f64) -> Self {
        Self {
            confidence: bounded(85.0 + trials as f64 / 100.0),
            reliability: bounded(90.0 - skewness.abs() * 10.0 - kurtosis.abs() * 5.0),
            convergence: bounded(95.0 - std * 100.0),
            stability: bounded(90.0 - max_dd_pct / 2.0),
        }
    }
}

fn bounded(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}
