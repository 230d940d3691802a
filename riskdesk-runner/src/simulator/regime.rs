//! Market regime switching.
//!
//! A memoryless redraw: with a small probability per trial the regime is
//! drawn again from a fixed distribution, regardless of the current one.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Per-trial probability of redrawing the regime.
pub const REGIME_SWITCH_PROBABILITY: f64 = 0.02;

/// Win-rate shift per regime step.
pub const REGIME_WIN_RATE_SHIFT: f64 = 0.05;

/// Bounds on the regime-adjusted win probability.
pub const MIN_ADJUSTED_WIN_RATE: f64 = 0.10;
pub const MAX_ADJUSTED_WIN_RATE: f64 = 0.90;

/// Discrete market regime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Bear,
    #[default]
    Normal,
    Bull,
}

impl Regime {
    /// Signed regime index: bear -1, normal 0, bull +1.
    pub fn sign(self) -> i8 {
        match self {
            Regime::Bear => -1,
            Regime::Normal => 0,
            Regime::Bull => 1,
        }
    }

    /// Map a uniform draw to a regime: 30% bear, 40% normal, 30% bull.
    pub fn from_uniform(u: f64) -> Self {
        if u < 0.3 {
            Regime::Bear
        } else if u < 0.7 {
            Regime::Normal
        } else {
            Regime::Bull
        }
    }

    /// One transition step. Always consumes one uniform; a second only when
    /// the regime is redrawn.
    pub fn step<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        if rng.gen::<f64>() < REGIME_SWITCH_PROBABILITY {
            Regime::from_uniform(rng.gen::<f64>())
        } else {
            self
        }
    }

    /// Shift a base win rate by this regime and clamp it to [0.10, 0.90].
    pub fn adjust_win_rate(self, win_rate: f64) -> f64 {
        (win_rate + f64::from(self.sign()) * REGIME_WIN_RATE_SHIFT)
            .clamp(MIN_ADJUSTED_WIN_RATE, MAX_ADJUSTED_WIN_RATE)
    }
}
