//! Instrument catalog: immutable lookup of instrument specifications by symbol.
//!
//! The built-in catalog is constructed once on first use and shared for the
//! life of the process. Host applications may load their own table from TOML
//! instead; either way the catalog is read-only after construction.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AssetClass, ContractTier, InstrumentError, InstrumentSpec};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("read catalog file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate instrument symbol '{0}'")]
    DuplicateSymbol(String),
    #[error(transparent)]
    Invalid(#[from] InstrumentError),
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(rename = "instrument", default)]
    instruments: Vec<InstrumentSpec>,
}

/// Read-only mapping from symbol to instrument specification.
#[derive(Debug, Clone, Default)]
pub struct InstrumentCatalog {
    instruments: BTreeMap<String, InstrumentSpec>,
}

impl InstrumentCatalog {
    /// Build a catalog from a list of specs, rejecting duplicates and
    /// malformed entries.
    pub fn from_specs(specs: Vec<InstrumentSpec>) -> Result<Self, CatalogError> {
        let mut instruments = BTreeMap::new();
        for mut spec in specs {
            spec.check()?;
            spec.symbol = spec.symbol.trim().to_ascii_uppercase();
            let symbol = spec.symbol.clone();
            if instruments.insert(symbol.clone(), spec).is_some() {
                return Err(CatalogError::DuplicateSymbol(symbol));
            }
        }
        Ok(Self { instruments })
    }

    /// Load a catalog from a TOML file of `[[instrument]]` tables.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a catalog from a TOML string of `[[instrument]]` tables.
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::from_specs(file.instruments)
    }

    /// Serialize the catalog back to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        let file = CatalogFile {
            instruments: self.instruments.values().cloned().collect(),
        };
        toml::to_string_pretty(&file)
    }

    /// The built-in futures and forex table, built once per process.
    pub fn builtin() -> &'static InstrumentCatalog {
        static BUILTIN: OnceLock<InstrumentCatalog> = OnceLock::new();
        BUILTIN.get_or_init(|| Self {
            instruments: builtin_specs()
                .into_iter()
                .map(|spec| (spec.symbol.clone(), spec))
                .collect(),
        })
    }

    /// Look up a symbol in any asset class. Symbols are case-insensitive.
    pub fn get(&self, symbol: &str) -> Option<&InstrumentSpec> {
        self.instruments.get(&symbol.trim().to_ascii_uppercase())
    }

    /// Look up a symbol within one asset class only.
    pub fn get_for(&self, asset_class: AssetClass, symbol: &str) -> Option<&InstrumentSpec> {
        self.get(symbol).filter(|spec| spec.asset_class == asset_class)
    }

    /// Symbols of one asset class, in sorted order.
    pub fn symbols(&self, asset_class: AssetClass) -> Vec<&str> {
        self.instruments
            .values()
            .filter(|spec| spec.asset_class == asset_class)
            .map(|spec| spec.symbol.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstrumentSpec> {
        self.instruments.values()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

fn builtin_specs() -> Vec<InstrumentSpec> {
    use ContractTier::{Micro, Mini, Standard};

    let f = InstrumentSpec::future;
    let fx = InstrumentSpec::forex_pair;

    vec![
        // Equity index
        f("ES", "E-mini S&P 500", 0.25, 12.5, 50.0, 13200.0, Mini, "Equity Index", "CME"),
        f("MES", "Micro E-mini S&P 500", 0.25, 1.25, 5.0, 1320.0, Micro, "Equity Index", "CME"),
        f("NQ", "E-mini NASDAQ-100", 0.25, 5.0, 20.0, 17600.0, Mini, "Equity Index", "CME"),
        f("MNQ", "Micro E-mini NASDAQ-100", 0.25, 0.5, 2.0, 1760.0, Micro, "Equity Index", "CME"),
        f("YM", "E-mini Dow Jones", 1.0, 5.0, 5.0, 11000.0, Mini, "Equity Index", "CBOT"),
        f("MYM", "Micro E-mini Dow Jones", 1.0, 0.5, 0.5, 1100.0, Micro, "Equity Index", "CBOT"),
        f("RTY", "E-mini Russell 2000", 0.1, 5.0, 50.0, 7700.0, Mini, "Equity Index", "CME"),
        f("M2K", "Micro E-mini Russell 2000", 0.1, 0.5, 5.0, 770.0, Micro, "Equity Index", "CME"),
        // Energy
        f("CL", "Crude Oil", 0.01, 10.0, 1000.0, 6600.0, Standard, "Energy", "NYMEX"),
        f("MCL", "Micro Crude Oil", 0.01, 1.0, 100.0, 660.0, Micro, "Energy", "NYMEX"),
        // Metals
        f("GC", "Gold", 0.1, 10.0, 100.0, 11000.0, Standard, "Precious Metals", "COMEX"),
        f("MGC", "Micro Gold", 0.1, 1.0, 10.0, 1100.0, Micro, "Precious Metals", "COMEX"),
        // Forex majors
        fx("EURUSD", "EUR/USD", 0.0001, 10.0, 0.8, "Major", "24/5"),
        fx("GBPUSD", "GBP/USD", 0.0001, 10.0, 1.2, "Major", "24/5"),
        fx("USDJPY", "USD/JPY", 0.01, 10.0, 0.9, "Major", "24/5"),
        fx("USDCHF", "USD/CHF", 0.0001, 10.0, 1.1, "Major", "24/5"),
    ]
}
