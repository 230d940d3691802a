//! Trade setup validation: raw form strings in, validated `TradeSetup` out.
//!
//! Every rule is checked independently and every violation is reported in a
//! single pass, in a fixed order. Validation is pure and deterministic.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{AssetClass, MarketAssumptions, RawTradeSetup, TradeSetup};

/// Smallest account balance the calculator accepts.
pub const MIN_ACCOUNT_BALANCE: f64 = 1000.0;

/// Smallest accepted reward-to-risk ratio on price distance.
pub const MIN_REWARD_RISK_RATIO: f64 = 0.5;

/// A single violated validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum ValidationFailure {
    #[error("Account balance must be a positive number")]
    BalanceNotPositive,
    #[error("Minimum account balance should be $1,000")]
    BalanceBelowMinimum,
    #[error("Entry price must be a positive number")]
    EntryNotPositive,
    #[error("Stop loss must be a positive number")]
    StopNotPositive,
    #[error("Take profit must be a positive number")]
    TakeProfitNotPositive,
    #[error("Number of contracts must be positive")]
    QuantityNotPositive,
    #[error("Commission must be non-negative")]
    CommissionNegative,
    #[error("Entry price and stop loss cannot be equal")]
    EntryEqualsStop,
    #[error("Entry price and take profit cannot be equal")]
    EntryEqualsTakeProfit,
    #[error("Risk/reward ratio is too low (minimum 1:0.5 recommended)")]
    RatioTooLow,
    #[error("Win rate must be between 0 and 1")]
    WinRateOutOfRange,
    #[error("Volatility must be between 0 and 1")]
    VolatilityOutOfRange,
    #[error("Risk-free rate must be a finite number")]
    RiskFreeRateInvalid,
    #[error("Market beta must be a finite number")]
    BetaInvalid,
}

/// Non-empty, ordered list of validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<ValidationFailure>);

impl ValidationErrors {
    pub fn failures(&self) -> &[ValidationFailure] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, failure: ValidationFailure) -> bool {
        self.0.contains(&failure)
    }

    /// Human-readable messages in report order.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|f| f.to_string()).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Parse a trimmed decimal, rejecting anything that is not a finite number.
fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_positive(raw: &str) -> Option<f64> {
    parse_finite(raw).filter(|v| *v > 0.0)
}

/// Futures trade whole contracts; forex accepts fractional lots.
fn parse_quantity(raw: &str, asset_class: AssetClass) -> Option<f64> {
    match asset_class {
        AssetClass::Futures => raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .map(f64::from),
        AssetClass::Forex => parse_positive(raw),
    }
}

fn check_assumptions(a: &MarketAssumptions, failures: &mut Vec<ValidationFailure>) {
    if !(0.0..=1.0).contains(&a.win_rate) {
        failures.push(ValidationFailure::WinRateOutOfRange);
    }
    if !(0.0..=1.0).contains(&a.volatility) {
        failures.push(ValidationFailure::VolatilityOutOfRange);
    }
    if !a.risk_free_rate_pct.is_finite() {
        failures.push(ValidationFailure::RiskFreeRateInvalid);
    }
    if !a.market_beta.is_finite() {
        failures.push(ValidationFailure::BetaInvalid);
    }
}

/// Validate a raw setup.
///
/// Returns every violated rule, never just the first. The ratio rule is only
/// evaluated when all three prices parsed and entry differs from stop.
pub fn validate(raw: &RawTradeSetup) -> Result<TradeSetup, ValidationErrors> {
    use ValidationFailure as F;

    let mut failures = Vec::new();

    let balance_num = parse_finite(&raw.account_balance);
    let balance = balance_num.filter(|b| *b > 0.0);
    if balance.is_none() {
        failures.push(F::BalanceNotPositive);
    }
    if balance_num.is_some_and(|b| b < MIN_ACCOUNT_BALANCE) {
        failures.push(F::BalanceBelowMinimum);
    }

    let entry_num = parse_finite(&raw.entry_price);
    let stop_num = parse_finite(&raw.stop_loss);
    let target_num = parse_finite(&raw.take_profit);

    let entry = entry_num.filter(|v| *v > 0.0);
    if entry.is_none() {
        failures.push(F::EntryNotPositive);
    }
    let stop = stop_num.filter(|v| *v > 0.0);
    if stop.is_none() {
        failures.push(F::StopNotPositive);
    }
    let target = target_num.filter(|v| *v > 0.0);
    if target.is_none() {
        failures.push(F::TakeProfitNotPositive);
    }

    let quantity = parse_quantity(&raw.quantity, raw.asset_class);
    if quantity.is_none() {
        failures.push(F::QuantityNotPositive);
    }

    let commission = parse_finite(&raw.commission).filter(|c| *c >= 0.0);
    if commission.is_none() {
        failures.push(F::CommissionNegative);
    }

    if let (Some(e), Some(s)) = (entry_num, stop_num) {
        if e == s {
            failures.push(F::EntryEqualsStop);
        }
    }
    if let (Some(e), Some(t)) = (entry_num, target_num) {
        if e == t {
            failures.push(F::EntryEqualsTakeProfit);
        }
    }

    if let (Some(e), Some(s), Some(t)) = (entry_num, stop_num, target_num) {
        let risk = (e - s).abs();
        if risk > 0.0 && (t - e).abs() / risk < MIN_REWARD_RISK_RATIO {
            failures.push(F::RatioTooLow);
        }
    }

    check_assumptions(&raw.assumptions, &mut failures);

    match (balance, entry, stop, target, quantity, commission) {
        (Some(balance), Some(entry), Some(stop), Some(target), Some(quantity), Some(commission))
            if failures.is_empty() =>
        {
            Ok(TradeSetup::new(
                raw.asset_class,
                raw.symbol.trim().to_ascii_uppercase(),
                balance,
                entry,
                stop,
                target,
                quantity,
                commission,
                raw.sizing_method,
                raw.assumptions,
            ))
        }
        _ => Err(ValidationErrors(failures)),
    }
}
