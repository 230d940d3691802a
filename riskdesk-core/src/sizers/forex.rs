//! Forex pricing
//!
//! Pip distance times a tiered pip value. Margin is a flat share of the
//! lot notional (1:100 leverage) and commission is applied once per side.

use crate::domain::{InstrumentSpec, LotConvention, TradeSetup, FOREX_MARGIN_RATE, FOREX_STANDARD_LOT_UNITS};
use crate::sizers::{Pricer, Pricing};

/// Pip value multiplier for a lot size: standard (1.0), mini (0.1) or micro (0.01).
pub fn lot_multiplier(lot_size: f64) -> f64 {
    if lot_size >= 1.0 {
        1.0
    } else if lot_size >= 0.1 {
        0.1
    } else {
        0.01
    }
}

/// Pricing for spot forex pairs.
///
/// # Formula
/// ```text
/// pips      = |price distance| / pip_size
/// pip_value = standard_pip_value * lot_multiplier(lots)
/// risk      = risk_pips   * pip_value + commission
/// reward    = reward_pips * pip_value - commission
/// margin    = 1% * (100_000 * lots)
/// notional  = entry * 100_000 * lots
/// ```
///
/// The pip value depends only on the lot tier, not the exact lot size; 0.5
/// lots and 0.1 lots share the mini-lot pip value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForexPricer;

impl Pricer for ForexPricer {
    fn price(&self, setup: &TradeSetup, spec: &InstrumentSpec) -> Pricing {
        let lots = setup.quantity();
        let units = match spec.lot_convention {
            LotConvention::Lots { units } => units,
            LotConvention::Contracts => FOREX_STANDARD_LOT_UNITS,
        };

        let risk_pips = setup.risk_distance() / spec.tick_size;
        let reward_pips = setup.reward_distance() / spec.tick_size;
        let pip_value = spec.tick_value * lot_multiplier(lots);
        let commission = setup.commission();

        Pricing {
            risk_points: risk_pips,
            reward_points: reward_pips,
            risk_amount: risk_pips * pip_value + commission,
            reward_amount: reward_pips * pip_value - commission,
            position_size: lots,
            margin_required: units * lots * FOREX_MARGIN_RATE,
            notional_value: setup.entry_price() * units * lots,
        }
    }

    fn name(&self) -> &str {
        "Forex"
    }
}
