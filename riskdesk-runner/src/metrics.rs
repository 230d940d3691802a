//! Risk-adjusted return metrics: pure functions over a simulated path.
//!
//! Inputs are per-trade simple returns (fractions) and the drawdown series in
//! percent. Every ratio has an explicit zero-denominator fallback of 0.0 so
//! no NaN or infinity reaches a report.

/// Trading periods per year used for annualization.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// Market premium assumed by the alpha calculation (10% a year).
pub const MARKET_PREMIUM: f64 = 0.10;

/// Standard deviations below this are treated as zero.
const ZERO_STD: f64 = 1e-15;

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (divisor n - 1). 0.0 below two observations.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

pub(crate) fn is_zero_std(std: f64) -> bool {
    std < ZERO_STD
}

/// Daily risk-free rate from an annual percentage (4.5 = 4.5%).
pub fn daily_risk_free(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 100.0 / PERIODS_PER_YEAR
}

fn annualization() -> f64 {
    PERIODS_PER_YEAR.sqrt()
}

// ─── Return-based ratios ────────────────────────────────────────────

/// Annualized Sharpe ratio: `(mean - rf_d) / std * sqrt(252)`.
pub fn sharpe_ratio(returns: &[f64], rf_daily: f64) -> f64 {
    let std = std_dev(returns);
    if is_zero_std(std) {
        return 0.0;
    }
    (mean_f64(returns) - rf_daily) / std * annualization()
}

/// Downside deviation around the daily risk-free rate.
///
/// Root mean square of `r - rf_d` over the returns below `rf_d`, divided by
/// the count of those returns. `None` when no return falls below it.
pub fn downside_deviation(returns: &[f64], rf_daily: f64) -> Option<f64> {
    let below: Vec<f64> = returns
        .iter()
        .filter(|&&r| r < rf_daily)
        .map(|r| (r - rf_daily).powi(2))
        .collect();
    if below.is_empty() {
        return None;
    }
    Some((below.iter().sum::<f64>() / below.len() as f64).sqrt())
}

/// Annualized Sortino ratio. Falls back to the full standard deviation when
/// there are no downside observations.
pub fn sortino_ratio(returns: &[f64], rf_daily: f64) -> f64 {
    let denom = downside_deviation(returns, rf_daily).unwrap_or_else(|| std_dev(returns));
    if is_zero_std(denom) {
        return 0.0;
    }
    (mean_f64(returns) - rf_daily) / denom * annualization()
}

/// Annualized mean over annualized deviation, without the risk-free rate.
pub fn information_ratio(returns: &[f64]) -> f64 {
    let std = std_dev(returns);
    if is_zero_std(std) {
        return 0.0;
    }
    mean_f64(returns) / std * annualization()
}

/// Annualized standard deviation of returns.
pub fn tracking_error(returns: &[f64]) -> f64 {
    std_dev(returns) * annualization()
}

/// CAPM-style alpha with the assumed beta and a fixed 10% market premium:
/// `mean·252 - (rf_d·252 + β·(0.10 - rf_d·252))`.
pub fn alpha(returns: &[f64], rf_daily: f64, beta: f64) -> f64 {
    let annual_rf = rf_daily * PERIODS_PER_YEAR;
    mean_f64(returns) * PERIODS_PER_YEAR - (annual_rf + beta * (MARKET_PREMIUM - annual_rf))
}

// ─── Drawdown-based measures ────────────────────────────────────────

/// Largest drawdown in percent. 0.0 for an empty series.
pub fn max_drawdown(drawdowns: &[f64]) -> f64 {
    drawdowns.iter().copied().fold(0.0_f64, f64::max)
}

/// Ulcer index: root mean square of the drawdown series (percent).
pub fn ulcer_index(drawdowns: &[f64]) -> f64 {
    if drawdowns.is_empty() {
        return 0.0;
    }
    (drawdowns.iter().map(|d| d * d).sum::<f64>() / drawdowns.len() as f64).sqrt()
}

/// Pain index: mean drawdown (percent).
pub fn pain_index(drawdowns: &[f64]) -> f64 {
    mean_f64(drawdowns)
}

/// Calmar ratio: `mean·252 / (max_dd / 100)`.
pub fn calmar_ratio(returns: &[f64], max_dd_pct: f64) -> f64 {
    if max_dd_pct <= 0.0 {
        return 0.0;
    }
    mean_f64(returns) * PERIODS_PER_YEAR / (max_dd_pct / 100.0)
}

/// Sterling ratio: `(mean·252 - rf_d·252) / (max_dd / 100)`.
pub fn sterling_ratio(returns: &[f64], rf_daily: f64, max_dd_pct: f64) -> f64 {
    if max_dd_pct <= 0.0 {
        return 0.0;
    }
    (mean_f64(returns) * PERIODS_PER_YEAR - rf_daily * PERIODS_PER_YEAR) / (max_dd_pct / 100.0)
}

/// Martin ratio: `mean·252 / (ulcer / 100)²`.
pub fn martin_ratio(returns: &[f64], ulcer: f64) -> f64 {
    if ulcer <= 0.0 {
        return 0.0;
    }
    mean_f64(returns) * PERIODS_PER_YEAR / (ulcer / 100.0).powi(2)
}

/// Gain-to-pain ratio: `mean·252 / (ulcer / 100)`.
pub fn gain_to_pain_ratio(returns: &[f64], ulcer: f64) -> f64 {
    if ulcer <= 0.0 {
        return 0.0;
    }
    mean_f64(returns) * PERIODS_PER_YEAR / (ulcer / 100.0)
}
