//! Risk & performance statistics aggregator.
//!
//! Turns a completed [`SimulationPath`] plus the sized position into a
//! [`RiskReport`]. Pure: same path, same report.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use riskdesk_core::domain::{MarketAssumptions, PositionPlan};
use riskdesk_core::sizers::kelly::{kelly_percentage, optimal_f_percentage};

use crate::metrics::{
    alpha, calmar_ratio, daily_risk_free, gain_to_pain_ratio, information_ratio, martin_ratio,
    max_drawdown, mean_f64, pain_index, sharpe_ratio, sortino_ratio, std_dev, sterling_ratio,
    tracking_error, ulcer_index,
};
use crate::quality::QualityScores;
use crate::simulator::SimulationPath;
use crate::tail_metrics::TailMetrics;

/// Number of buckets in the monthly return series.
pub const MONTHS: usize = 12;

/// Errors from the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("cannot aggregate an empty simulation path")]
    EmptyPath,
}

// ─── Report types ────────────────────────────────────────────────────

/// Distributional, tail and risk-adjusted statistics of one path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub mean_return: f64,
    pub return_std_dev: f64,
    pub var_95: f64,
    pub var_99: f64,
    pub expected_shortfall: f64,
    /// Same value as `expected_shortfall`.
    pub conditional_var: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    /// Percent.
    pub max_drawdown: f64,
    pub calmar_ratio: f64,
    /// From the assumed win rate and the plan's reward/risk, not the path.
    pub kelly_percentage: f64,
    pub optimal_f_percentage: f64,
    pub ulcer_index: f64,
    pub pain_index: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub sterling_ratio: f64,
    pub martin_ratio: f64,
    pub gain_to_pain_ratio: f64,
    pub alpha: f64,
    /// Assumed beta, passed through.
    pub beta: f64,
    pub information_ratio: f64,
    pub tracking_error: f64,
}

/// Return of one of the twelve contiguous buckets of the path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    /// 1-based bucket number.
    pub month: usize,
    pub return_pct: f64,
}

/// A report without the path and derived curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReportSummary {
    pub plan: PositionPlan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub trials_requested: usize,
    pub trials_completed: usize,
    pub ruined: bool,
    pub final_balance: f64,
    pub total_pnl: f64,
    pub win_count: usize,
    pub loss_count: usize,
    pub realized_win_rate: f64,
    pub expected_value: f64,
    /// Assumed win rate in percent.
    pub profit_probability: f64,
    pub metrics: RiskMetrics,
    pub quality: QualityScores,
}

/// Complete result of one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    #[serde(flatten)]
    pub summary: RiskReportSummary,
    pub path: SimulationPath,
    pub equity_curve: Vec<f64>,
    pub drawdown_curve: Vec<f64>,
    pub monthly_returns: Vec<MonthlyReturn>,
}

impl RiskReport {
    /// Compact copy without the path and curves.
    pub fn summary(&self) -> RiskReportSummary {
        self.summary.clone()
    }

    pub fn metrics(&self) -> &RiskMetrics {
        &self.summary.metrics
    }

    pub fn into_summary(self) -> RiskReportSummary {
        self.summary
    }
}

// ─── Aggregation ─────────────────────────────────────────────────────

/// Aggregate a completed path into a report.
pub fn aggregate(
    plan: &PositionPlan,
    assumptions: &MarketAssumptions,
    path: SimulationPath,
) -> Result<RiskReport, StatsError> {
    if path.is_empty() {
        return Err(StatsError::EmptyPath);
    }

    let balance = plan.account_balance;
    let returns = path.returns();
    let drawdowns = path.drawdowns();
    let equity_curve = path.balances();
    let rf_daily = daily_risk_free(assumptions.risk_free_rate_pct);

    let mean_return = mean_f64(&returns);
    let return_std_dev = std_dev(&returns);
    let tail = TailMetrics::compute(&returns, balance);
    let max_dd = max_drawdown(&drawdowns);
    let ulcer = ulcer_index(&drawdowns);
    let kelly = kelly_percentage(assumptions.win_rate, plan.risk_reward_ratio);

    let metrics = RiskMetrics {
        mean_return,
        return_std_dev,
        var_95: tail.var_95,
        var_99: tail.var_99,
        expected_shortfall: tail.expected_shortfall,
        conditional_var: tail.expected_shortfall,
        sharpe_ratio: sharpe_ratio(&returns, rf_daily),
        sortino_ratio: sortino_ratio(&returns, rf_daily),
        max_drawdown: max_dd,
        calmar_ratio: calmar_ratio(&returns, max_dd),
        kelly_percentage: kelly,
        optimal_f_percentage: optimal_f_percentage(kelly),
        ulcer_index: ulcer,
        pain_index: pain_index(&drawdowns),
        skewness: tail.skewness,
        kurtosis: tail.kurtosis,
        sterling_ratio: sterling_ratio(&returns, rf_daily, max_dd),
        martin_ratio: martin_ratio(&returns, ulcer),
        gain_to_pain_ratio: gain_to_pain_ratio(&returns, ulcer),
        alpha: alpha(&returns, rf_daily, assumptions.market_beta),
        beta: assumptions.market_beta,
        information_ratio: information_ratio(&returns),
        tracking_error: tracking_error(&returns),
    };

    let trials_completed = path.len();
    let win_count = path.win_count();
    let quality = QualityScores::compute(
        trials_completed,
        tail.skewness,
        tail.kurtosis,
        return_std_dev,
        max_dd,
    );

    let summary = RiskReportSummary {
        plan: plan.clone(),
        seed: None,
        trials_requested: path.trials_requested,
        trials_completed,
        ruined: path.ruined(),
        final_balance: path.final_balance(),
        total_pnl: path.total_pnl(),
        win_count,
        loss_count: path.loss_count(),
        realized_win_rate: win_count as f64 / trials_completed as f64,
        expected_value: assumptions.win_rate * plan.reward_amount
            - (1.0 - assumptions.win_rate) * plan.risk_amount,
        profit_probability: assumptions.win_rate * 100.0,
        metrics,
        quality,
    };

    Ok(RiskReport {
        summary,
        monthly_returns: monthly_returns(&equity_curve),
        drawdown_curve: drawdowns,
        equity_curve,
        path,
    })
}

/// Split the balance series into twelve contiguous buckets of
/// `floor(n / 12)` trades and report each bucket's return in percent.
///
/// Bucket `i` runs from index `i·period` to `min((i+1)·period, n-1)`. With
/// fewer than twelve trades every bucket collapses to a single point and
/// reports 0. A bucket starting at a zero balance reports 0.
pub fn monthly_returns(balances: &[f64]) -> Vec<MonthlyReturn> {
    let n = balances.len();
    if n == 0 {
        return Vec::new();
    }
    let period = n / MONTHS;
    (0..MONTHS)
        .map(|i| {
            let start = (i * period).min(n - 1);
            let end = ((i + 1) * period).min(n - 1);
            let (start_bal, end_bal) = (balances[start], balances[end]);
            let return_pct = if start_bal > 0.0 {
                (end_bal - start_bal) / start_bal * 100.0
            } else {
                0.0
            };
            MonthlyReturn {
                month: i + 1,
                return_pct,
            }
        })
        .collect()
}
