//! RiskDesk Core: instruments, trade setups, validation and position sizing.
//!
//! This crate holds everything that runs before a simulation:
//! - Instrument catalog (built-in futures and forex specs, TOML overrides)
//! - Trade setup validation with an accumulated list of failures
//! - Asset-class pricers and the position sizer with its business-rule gates
//! - Fractional Kelly helpers
//! - Deterministic seed derivation for simulations

pub mod catalog;
pub mod domain;
pub mod rng;
pub mod sizers;
pub mod validation;

pub use catalog::{CatalogError, InstrumentCatalog};
pub use domain::{
    AssetClass, InstrumentSpec, MarketAssumptions, PositionPlan, RawTradeSetup, RiskRating,
    SizingMethod, TradeSetup,
};
pub use sizers::{size_from_catalog, size_position, SizingError};
pub use validation::{validate, ValidationErrors, ValidationFailure};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types handed to worker threads are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<InstrumentSpec>();
        require_sync::<InstrumentSpec>();
        require_send::<InstrumentCatalog>();
        require_sync::<InstrumentCatalog>();
        require_send::<RawTradeSetup>();
        require_sync::<RawTradeSetup>();
        require_send::<TradeSetup>();
        require_sync::<TradeSetup>();
        require_send::<PositionPlan>();
        require_sync::<PositionPlan>();
        require_send::<ValidationErrors>();
        require_sync::<ValidationErrors>();
        require_send::<SizingError>();
        require_sync::<SizingError>();
        require_send::<rng::RngHierarchy>();
        require_sync::<rng::RngHierarchy>();
    }

    /// Pricers are shared as `&'static dyn Pricer` across threads.
    #[test]
    fn pricer_trait_objects_are_shareable() {
        fn _check(p: &'static dyn sizers::Pricer) -> &'static (dyn sizers::Pricer + Send + Sync) {
            p
        }
        assert_eq!(sizers::pricer_for(AssetClass::Futures).name(), "Futures");
        assert_eq!(sizers::pricer_for(AssetClass::Forex).name(), "Forex");
    }
}
