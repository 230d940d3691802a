//! Position & risk sizing: turn a validated setup into a `PositionPlan`.
//!
//! Pricing is asset-class specific (see [`Pricer`]); the business-rule gates
//! and Kelly rescale are shared. A plan that breaks a gate is never returned.

pub mod forex;
pub mod futures;
pub mod kelly;

pub use forex::ForexPricer;
pub use futures::FuturesPricer;

use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::InstrumentCatalog;
use crate::domain::{
    AssetClass, InstrumentSpec, PositionPlan, RiskRating, SizingMethod, TradeSetup,
};

/// Margin may use at most this share of the account balance.
pub const MAX_MARGIN_SHARE: f64 = 0.8;

/// Risk per trade may be at most this percentage of the account balance.
pub const MAX_RISK_PERCENTAGE: f64 = 20.0;

/// Currency amounts for a setup before gates and resizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub risk_points: f64,
    pub reward_points: f64,
    pub risk_amount: f64,
    pub reward_amount: f64,
    pub position_size: f64,
    pub margin_required: f64,
    pub notional_value: f64,
}

/// Asset-class pricing rules.
///
/// # Responsibilities
/// - Convert price distances into currency risk and reward
/// - Apply the asset class commission convention
/// - Compute margin and notional
///
/// # Non-Responsibilities
/// - Pricers do NOT enforce margin or risk limits (the sizer does)
/// - Pricers do NOT rescale positions
pub trait Pricer: Send + Sync {
    fn price(&self, setup: &TradeSetup, spec: &InstrumentSpec) -> Pricing;

    /// Pricer name for logging
    fn name(&self) -> &str;
}

/// The pricer for an asset class.
pub fn pricer_for(asset_class: AssetClass) -> &'static dyn Pricer {
    match asset_class {
        AssetClass::Futures => &FuturesPricer,
        AssetClass::Forex => &ForexPricer,
    }
}

/// Business-rule failures that abort a calculation before simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    #[error("Invalid contract selected: no {asset_class} instrument '{symbol}'")]
    UnknownInstrument {
        asset_class: AssetClass,
        symbol: String,
    },

    #[error("Instrument {symbol} is {actual}, but the setup is {expected}")]
    AssetClassMismatch {
        symbol: String,
        expected: AssetClass,
        actual: AssetClass,
    },

    #[error("Insufficient margin - position size too large for account balance")]
    InsufficientMargin { required: f64, limit: f64 },

    #[error("Risk per trade exceeds 20% of account balance - position too large")]
    RiskTooLarge { risk_percentage: f64 },
}

/// Look up the setup's instrument and size it.
pub fn size_from_catalog(
    setup: &TradeSetup,
    catalog: &InstrumentCatalog,
) -> Result<PositionPlan, SizingError> {
    let spec = catalog
        .get_for(setup.asset_class(), setup.symbol())
        .ok_or_else(|| SizingError::UnknownInstrument {
            asset_class: setup.asset_class(),
            symbol: setup.symbol().to_string(),
        })?;
    size_position(setup, spec)
}

/// Size a validated setup against its instrument.
///
/// Order: price, margin gate, risk gate, then the optional Kelly rescale.
/// The gates apply to the entered position only; the Kelly fraction is bounded
/// by its own [1%, 25%] clamp. `risk_percentage` reports the entered position.
/// Kelly scales reward and position size by the same factor as risk; margin
/// and notional keep the entered quantity.
pub fn size_position(setup: &TradeSetup, spec: &InstrumentSpec) -> Result<PositionPlan, SizingError> {
    if spec.asset_class != setup.asset_class() {
        return Err(SizingError::AssetClassMismatch {
            symbol: spec.symbol.clone(),
            expected: setup.asset_class(),
            actual: spec.asset_class,
        });
    }

    let balance = setup.account_balance();
    let pricer = pricer_for(spec.asset_class);
    let mut pricing = pricer.price(setup, spec);

    let margin_limit = balance * MAX_MARGIN_SHARE;
    if pricing.margin_required > margin_limit {
        warn!(
            symbol = %spec.symbol,
            required = pricing.margin_required,
            limit = margin_limit,
            "margin gate rejected position"
        );
        return Err(SizingError::InsufficientMargin {
            required: pricing.margin_required,
            limit: margin_limit,
        });
    }

    let risk_reward_ratio = ratio(pricing.reward_amount, pricing.risk_amount);
    let risk_percentage = check_risk(pricing.risk_amount, balance, &spec.symbol)?;

    let win_rate = setup.assumptions().win_rate;
    let kelly_applied = setup.sizing_method() == SizingMethod::Kelly && pricing.risk_amount > 0.0;
    if kelly_applied {
        let fraction = kelly::sizing_fraction(win_rate, risk_reward_ratio);
        let new_risk = balance * fraction;
        let scale = new_risk / pricing.risk_amount;
        debug!(fraction, scale, "kelly rescale");
        pricing.risk_amount = new_risk;
        pricing.reward_amount *= scale;
        pricing.position_size *= scale;
    }

    let plan = PositionPlan {
        symbol: spec.symbol.clone(),
        asset_class: spec.asset_class,
        sizing_method: setup.sizing_method(),
        account_balance: balance,
        risk_points: pricing.risk_points,
        reward_points: pricing.reward_points,
        risk_amount: pricing.risk_amount,
        reward_amount: pricing.reward_amount,
        position_size: pricing.position_size,
        margin_required: pricing.margin_required,
        notional_value: pricing.notional_value,
        risk_reward_ratio,
        risk_percentage,
        expected_value: win_rate * pricing.reward_amount
            - (1.0 - win_rate) * pricing.risk_amount,
        kelly_applied,
        risk_rating: RiskRating::from_ratio(risk_reward_ratio),
    };

    debug!(
        symbol = %plan.symbol,
        pricer = pricer.name(),
        risk = plan.risk_amount,
        reward = plan.reward_amount,
        size = plan.position_size,
        "position sized"
    );
    Ok(plan)
}

fn ratio(reward: f64, risk: f64) -> f64 {
    if risk > 0.0 {
        reward / risk
    } else {
        0.0
    }
}

fn check_risk(risk_amount: f64, balance: f64, symbol: &str) -> Result<f64, SizingError> {
    let risk_percentage = risk_amount / balance * 100.0;
    if risk_percentage > MAX_RISK_PERCENTAGE {
        warn!(symbol, risk_percentage, "risk gate rejected position");
        return Err(SizingError::RiskTooLarge { risk_percentage });
    }
    Ok(risk_percentage)
}
