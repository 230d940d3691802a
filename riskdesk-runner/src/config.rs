//! Serializable calculation configuration.
//!
//! A calculation file has three optional sections:
//!
//! ```toml
//! [setup]
//! asset_class = "futures"
//! symbol = "ES"
//! account_balance = "100000"
//! entry_price = "4500"
//! stop_loss = "4480"
//! take_profit = "4540"
//! quantity = "1"
//! commission = "2.50"
//! sizing_method = "fixed-risk"
//!
//! [simulation]
//! trials = 5000
//! seed = 42
//! yield_interval = 50
//! timeout_secs = 30
//!
//! [market]
//! win_rate = 0.65
//! volatility = 0.18
//! risk_free_rate_pct = 4.5
//! market_beta = 1.0
//! ```
//!
//! Setup values stay strings so the validator sees them exactly as typed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use riskdesk_core::domain::{AssetClass, MarketAssumptions, RawTradeSetup, SizingMethod};

use crate::simulator::{GarchParams, MonteCarloConfig};

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The `[setup]` section: trade inputs as raw strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupSection {
    pub asset_class: AssetClass,
    pub symbol: String,
    pub account_balance: String,
    pub entry_price: String,
    pub stop_loss: String,
    pub take_profit: String,
    pub quantity: String,
    pub commission: String,
    pub sizing_method: SizingMethod,
}

impl Default for SetupSection {
    fn default() -> Self {
        let raw = RawTradeSetup::default();
        Self {
            asset_class: raw.asset_class,
            symbol: raw.symbol,
            account_balance: raw.account_balance,
            entry_price: raw.entry_price,
            stop_loss: raw.stop_loss,
            take_profit: raw.take_profit,
            quantity: raw.quantity,
            commission: raw.commission,
            sizing_method: raw.sizing_method,
        }
    }
}

/// The `[simulation]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    pub trials: usize,
    /// Fixed seed; a fresh one is drawn per run when absent.
    pub seed: Option<u64>,
    pub yield_interval: usize,
    pub timeout_secs: Option<u64>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        let mc = MonteCarloConfig::default();
        Self {
            trials: mc.trials,
            seed: None,
            yield_interval: mc.yield_interval,
            timeout_secs: None,
        }
    }
}

/// One calculation: setup, simulation settings and market assumptions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationConfig {
    pub setup: SetupSection,
    pub simulation: SimulationSection,
    pub market: MarketAssumptions,
}

impl CalculationConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    /// Structural checks. Trade values are left to the validator.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.simulation.trials == 0 {
            return Err(ConfigError::Invalid(
                "simulation.trials must be at least 1".into(),
            ));
        }
        if self.simulation.yield_interval == 0 {
            return Err(ConfigError::Invalid(
                "simulation.yield_interval must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The raw setup handed to the validator, with `[market]` as its assumptions.
    pub fn raw_setup(&self) -> RawTradeSetup {
        let s = &self.setup;
        RawTradeSetup {
            asset_class: s.asset_class,
            symbol: s.symbol.clone(),
            account_balance: s.account_balance.clone(),
            entry_price: s.entry_price.clone(),
            stop_loss: s.stop_loss.clone(),
            take_profit: s.take_profit.clone(),
            quantity: s.quantity.clone(),
            commission: s.commission.clone(),
            sizing_method: s.sizing_method,
            assumptions: self.market,
        }
    }

    pub fn monte_carlo(&self) -> MonteCarloConfig {
        MonteCarloConfig {
            trials: self.simulation.trials,
            yield_interval: self.simulation.yield_interval,
            garch: GarchParams::default(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.simulation.timeout_secs.map(Duration::from_secs)
    }
}

/// A named calculation inside a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(flatten)]
    pub config: CalculationConfig,
}

/// A batch of scenarios, one `[[scenario]]` table each.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(rename = "scenario", default)]
    pub scenarios: Vec<Scenario>,
}

impl ScenarioFile {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: Self = toml::from_str(content)?;
        if file.scenarios.is_empty() {
            return Err(ConfigError::Invalid("no [[scenario]] entries".into()));
        }
        let mut seen = HashSet::new();
        for s in &file.scenarios {
            if s.name.trim().is_empty() {
                return Err(ConfigError::Invalid("scenario name must not be empty".into()));
            }
            if !seen.insert(s.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate scenario name '{}'",
                    s.name
                )));
            }
            s.config.check()?;
        }
        Ok(file)
    }
}
