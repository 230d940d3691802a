//! Kelly criterion helpers
//!
//! `f* = (p * b - q) / b` where `p` is the win rate, `q = 1 - p` and `b` the
//! payoff (reward / risk). Two uses with different clamps:
//! - sizing: a quarter of full Kelly, clamped to [1%, 25%] of the balance
//! - reporting: full Kelly in percent, clamped to [0, 25]

/// Safety multiplier applied to full Kelly before clamping.
pub const KELLY_SAFETY_MULTIPLIER: f64 = 0.25;

/// Lower clamp of the fractional Kelly used for sizing.
pub const MIN_SIZING_FRACTION: f64 = 0.01;

/// Upper clamp of the fractional Kelly used for sizing.
pub const MAX_SIZING_FRACTION: f64 = 0.25;

/// Upper clamp of the reported Kelly percentage.
pub const MAX_KELLY_PERCENTAGE: f64 = 25.0;

/// Full Kelly fraction. `None` when the payoff is not a positive number.
pub fn kelly_fraction(win_rate: f64, payoff: f64) -> Option<f64> {
    if !(payoff > 0.0 && payoff.is_finite()) {
        return None;
    }
    let q = 1.0 - win_rate;
    Some((win_rate * payoff - q) / payoff)
}

/// Fraction of the balance to risk under fractional Kelly.
///
/// The safety multiplier is applied first and the result clamped second.
/// Without a positive payoff there is no edge, so the floor is used.
pub fn sizing_fraction(win_rate: f64, payoff: f64) -> f64 {
    match kelly_fraction(win_rate, payoff) {
        Some(f) => (f * KELLY_SAFETY_MULTIPLIER).clamp(MIN_SIZING_FRACTION, MAX_SIZING_FRACTION),
        None => MIN_SIZING_FRACTION,
    }
}

/// Reported Kelly percentage, clamped to [0, 25]. 0 without a positive payoff.
pub fn kelly_percentage(win_rate: f64, payoff: f64) -> f64 {
    kelly_fraction(win_rate, payoff)
        .map(|f| (f * 100.0).clamp(0.0, MAX_KELLY_PERCENTAGE))
        .unwrap_or(0.0)
}

/// Optimal-f percentage: a quarter of the reported Kelly percentage.
pub fn optimal_f_percentage(kelly_pct: f64) -> f64 {
    kelly_pct * KELLY_SAFETY_MULTIPLIER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_kelly_known_value() {
        // p = 0.6, b = 2: (1.2 - 0.4) / 2 = 0.4
        assert!((kelly_fraction(0.6, 2.0).unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn sizing_applies_multiplier_before_clamp() {
        // 0.4 * 0.25 = 0.10, inside the clamp
        assert!((sizing_fraction(0.6, 2.0) - 0.10).abs() < 1e-12);
        // Negative edge is floored at 1%
        assert_eq!(sizing_fraction(0.2, 1.0), MIN_SIZING_FRACTION);
        // Certain win: f = 1, 0.25 after multiplier, at the ceiling
        assert!((sizing_fraction(1.0, 3.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn sizing_without_payoff_uses_floor() {
        assert_eq!(sizing_fraction(0.9, 0.0), MIN_SIZING_FRACTION);
        assert_eq!(sizing_fraction(0.9, -1.0), MIN_SIZING_FRACTION);
    }

    #[test]
    fn reported_percentage_clamped() {
        assert!((kelly_percentage(0.6, 2.0) - 25.0).abs() < 1e-12); // 40% clamps to 25
        assert!((kelly_percentage(0.55, 1.0) - 10.0).abs() < 1e-9);
        assert_eq!(kelly_percentage(0.3, 1.0), 0.0);
        assert_eq!(kelly_percentage(0.7, 0.0), 0.0);
    }

    #[test]
    fn optimal_f_is_quarter_kelly() {
        assert_eq!(optimal_f_percentage(20.0), 5.0);
    }
}
