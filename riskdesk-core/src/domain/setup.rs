//! Trade setup: the raw form input and its validated counterpart.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::instrument::AssetClass;

/// Position sizing method selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizingMethod {
    /// Trade the quantity as entered.
    #[default]
    FixedRisk,
    /// Rescale risk to a clamped fractional-Kelly share of the balance.
    Kelly,
    /// Accepted but sized exactly like `FixedRisk`.
    VolatilityTarget,
}

impl SizingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FixedRisk => "fixed-risk",
            Self::Kelly => "kelly",
            Self::VolatilityTarget => "volatility-target",
        }
    }
}

impl fmt::Display for SizingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown sizing method '{0}' (expected fixed-risk, kelly, or volatility-target)")]
pub struct ParseSizingMethodError(pub String);

impl FromStr for SizingMethod {
    type Err = ParseSizingMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed-risk" | "fixed" => Ok(Self::FixedRisk),
            "kelly" => Ok(Self::Kelly),
            "volatility-target" | "vol-target" => Ok(Self::VolatilityTarget),
            other => Err(ParseSizingMethodError(other.to_string())),
        }
    }
}

/// Market assumptions that drive sizing and simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketAssumptions {
    /// Assumed probability of a winning trade, 0–1.
    pub win_rate: f64,
    /// Assumed annualized volatility, 0–1.
    pub volatility: f64,
    /// Annualized risk-free rate in percent (4.5 = 4.5%).
    pub risk_free_rate_pct: f64,
    /// Assumed market beta, passed through to the report.
    pub market_beta: f64,
}

impl Default for MarketAssumptions {
    fn default() -> Self {
        Self {
            win_rate: 0.65,
            volatility: 0.18,
            risk_free_rate_pct: 4.5,
            market_beta: 1.0,
        }
    }
}

/// Unvalidated trade setup exactly as a form supplies it.
///
/// Numeric fields are strings so that malformed input reaches the validator
/// instead of failing at deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTradeSetup {
    pub asset_class: AssetClass,
    pub symbol: String,
    pub account_balance: String,
    pub entry_price: String,
    pub stop_loss: String,
    pub take_profit: String,
    /// Contract count for futures, lot size for forex.
    pub quantity: String,
    /// Commission per side; futures charge it twice (round trip).
    pub commission: String,
    pub sizing_method: SizingMethod,
    pub assumptions: MarketAssumptions,
}

impl Default for RawTradeSetup {
    fn default() -> Self {
        Self {
            asset_class: AssetClass::Futures,
            symbol: "ES".into(),
            account_balance: "100000".into(),
            entry_price: "4500".into(),
            stop_loss: "4480".into(),
            take_profit: "4540".into(),
            quantity: "1".into(),
            commission: "2.50".into(),
            sizing_method: SizingMethod::FixedRisk,
            assumptions: MarketAssumptions::default(),
        }
    }
}

/// A validated trade setup. Only [`crate::validation::validate`] builds one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSetup {
    asset_class: AssetClass,
    symbol: String,
    account_balance: f64,
    entry_price: f64,
    stop_loss: f64,
    take_profit: f64,
    quantity: f64,
    commission: f64,
    sizing_method: SizingMethod,
    assumptions: MarketAssumptions,
}

impl TradeSetup {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        asset_class: AssetClass,
        symbol: String,
        account_balance: f64,
        entry_price: f64,
        stop_loss: f64,
        take_profit: f64,
        quantity: f64,
        commission: f64,
        sizing_method: SizingMethod,
        assumptions: MarketAssumptions,
    ) -> Self {
        Self {
            asset_class,
            symbol,
            account_balance,
            entry_price,
            stop_loss,
            take_profit,
            quantity,
            commission,
            sizing_method,
            assumptions,
        }
    }

    pub fn asset_class(&self) -> AssetClass {
        self.asset_class
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn account_balance(&self) -> f64 {
        self.account_balance
    }

    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    pub fn stop_loss(&self) -> f64 {
        self.stop_loss
    }

    pub fn take_profit(&self) -> f64 {
        self.take_profit
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn commission(&self) -> f64 {
        self.commission
    }

    pub fn sizing_method(&self) -> SizingMethod {
        self.sizing_method
    }

    pub fn assumptions(&self) -> &MarketAssumptions {
        &self.assumptions
    }

    /// Price distance from entry to stop.
    pub fn risk_distance(&self) -> f64 {
        (self.entry_price - self.stop_loss).abs()
    }

    /// Price distance from entry to take-profit.
    pub fn reward_distance(&self) -> f64 {
        (self.take_profit - self.entry_price).abs()
    }

    /// Reward-to-risk ratio on price distance, before commission.
    pub fn price_ratio(&self) -> f64 {
        self.reward_distance() / self.risk_distance()
    }
}
