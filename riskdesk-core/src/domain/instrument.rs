use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Units of base currency in one standard forex lot.
pub const FOREX_STANDARD_LOT_UNITS: f64 = 100_000.0;

/// Flat margin rate applied to forex notional (1:100 leverage).
pub const FOREX_MARGIN_RATE: f64 = 0.01;

/// Asset class of a tradable instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Futures,
    Forex,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Futures => "futures",
            Self::Forex => "forex",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown asset class '{0}' (expected 'futures' or 'forex')")]
pub struct ParseAssetClassError(pub String);

impl FromStr for AssetClass {
    type Err = ParseAssetClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "futures" | "future" => Ok(Self::Futures),
            "forex" | "fx" => Ok(Self::Forex),
            other => Err(ParseAssetClassError(other.to_string())),
        }
    }
}

/// Contract size tier (futures contract family or forex lot tier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractTier {
    Standard,
    Mini,
    Micro,
}

impl ContractTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Mini => "mini",
            Self::Micro => "micro",
        }
    }
}

/// How position quantity is expressed for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LotConvention {
    /// Whole exchange-traded contracts.
    Contracts,
    /// Lots of `units` base currency; fractional lots allowed.
    Lots { units: f64 },
}

/// Immutable catalog entry for a tradable instrument.
///
/// For forex, `tick_size` and `tick_value` are the pip size and the pip value
/// of one standard lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    pub symbol: String,
    pub name: String,
    pub asset_class: AssetClass,
    pub tick_size: f64,
    pub tick_value: f64,
    /// Currency value of a one-point move (futures only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_value: Option<f64>,
    /// Margin per contract (futures) or per standard lot (forex).
    pub margin_per_unit: f64,
    pub lot_convention: LotConvention,
    pub tier: ContractTier,
    pub sector: String,
    /// Exchange for futures, trading session for forex.
    pub venue: String,
    /// Typical spread in pips (forex only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread_pips: Option<f64>,
}

impl InstrumentSpec {
    #[allow(clippy::too_many_arguments)]
    pub fn future(
        symbol: &str,
        name: &str,
        tick_size: f64,
        tick_value: f64,
        point_value: f64,
        margin: f64,
        tier: ContractTier,
        sector: &str,
        exchange: &str,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            asset_class: AssetClass::Futures,
            tick_size,
            tick_value,
            point_value: Some(point_value),
            margin_per_unit: margin,
            lot_convention: LotConvention::Contracts,
            tier,
            sector: sector.into(),
            venue: exchange.into(),
            spread_pips: None,
        }
    }

    pub fn forex_pair(
        symbol: &str,
        name: &str,
        pip_size: f64,
        pip_value: f64,
        spread_pips: f64,
        sector: &str,
        session: &str,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            asset_class: AssetClass::Forex,
            tick_size: pip_size,
            tick_value: pip_value,
            point_value: None,
            margin_per_unit: FOREX_STANDARD_LOT_UNITS * FOREX_MARGIN_RATE,
            lot_convention: LotConvention::Lots {
                units: FOREX_STANDARD_LOT_UNITS,
            },
            tier: ContractTier::Standard,
            sector: sector.into(),
            venue: session.into(),
            spread_pips: Some(spread_pips),
        }
    }

    /// Check that the entry carries the fields its asset class needs.
    pub fn check(&self) -> Result<(), InstrumentError> {
        if !(self.tick_size > 0.0 && self.tick_size.is_finite()) {
            return Err(InstrumentError::InvalidTickSize {
                symbol: self.symbol.clone(),
                tick_size: self.tick_size,
            });
        }
        if !(self.tick_value > 0.0 && self.tick_value.is_finite()) {
            return Err(InstrumentError::InvalidTickValue {
                symbol: self.symbol.clone(),
                tick_value: self.tick_value,
            });
        }
        if self.asset_class == AssetClass::Futures {
            match self.point_value {
                Some(pv) if pv > 0.0 && pv.is_finite() => {}
                _ => return Err(InstrumentError::MissingPointValue(self.symbol.clone())),
            }
        }
        if !(self.margin_per_unit >= 0.0 && self.margin_per_unit.is_finite()) {
            return Err(InstrumentError::InvalidMargin {
                symbol: self.symbol.clone(),
                margin: self.margin_per_unit,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("instrument {symbol}: tick size {tick_size} must be positive")]
    InvalidTickSize { symbol: String, tick_size: f64 },

    #[error("instrument {symbol}: tick value {tick_value} must be positive")]
    InvalidTickValue { symbol: String, tick_value: f64 },

    #[error("instrument {0}: futures contracts need a positive point value")]
    MissingPointValue(String),

    #[error("instrument {symbol}: margin {margin} must be non-negative")]
    InvalidMargin { symbol: String, margin: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_class_parses_case_insensitively() {
        assert_eq!("Futures".parse::<AssetClass>().unwrap(), AssetClass::Futures);
        assert_eq!(" forex ".parse::<AssetClass>().unwrap(), AssetClass::Forex);
        assert!("crypto".parse::<AssetClass>().is_err());
    }

    #[test]
    fn forex_margin_is_one_percent_of_standard_lot() {
        let eurusd = InstrumentSpec::forex_pair("EURUSD", "EUR/USD", 0.0001, 10.0, 0.8, "Major", "24/5");
        assert!((eurusd.margin_per_unit - 1000.0).abs() < 1e-9);
        assert!(eurusd.point_value.is_none());
        assert!(eurusd.check().is_ok());
    }

    #[test]
    fn future_without_point_value_is_rejected() {
        let mut es = InstrumentSpec::future(
            "ES", "E-mini S&P 500", 0.25, 12.5, 50.0, 13200.0, ContractTier::Mini, "Equity Index", "CME",
        );
        assert!(es.check().is_ok());
        es.point_value = None;
        assert!(matches!(es.check(), Err(InstrumentError::MissingPointValue(_))));
    }

    #[test]
    fn lot_convention_serializes_tagged() {
        let json = serde_json::to_string(&LotConvention::Lots { units: 100_000.0 }).unwrap();
        assert!(json.contains("\"type\":\"lots\""));
    }
}
