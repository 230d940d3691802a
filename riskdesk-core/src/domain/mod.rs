//! Domain types for riskdesk

pub mod instrument;
pub mod plan;
pub mod setup;

pub use instrument::{
    AssetClass, ContractTier, InstrumentError, InstrumentSpec, LotConvention,
    ParseAssetClassError, FOREX_MARGIN_RATE, FOREX_STANDARD_LOT_UNITS,
};
pub use plan::{PositionPlan, RiskRating};
pub use setup::{
    MarketAssumptions, ParseSizingMethodError, RawTradeSetup, SizingMethod, TradeSetup,
};

