//! Futures pricing
//!
//! Risk and reward are point distances times the contract point value.
//! Commission is charged per side, so a round trip costs it twice.

use crate::domain::{InstrumentSpec, TradeSetup};
use crate::sizers::{Pricer, Pricing};

/// Pricing for exchange-traded futures contracts.
///
/// # Formula
/// ```text
/// risk     = |entry - stop|   * point_value * contracts + 2 * commission
/// reward   = |target - entry| * point_value * contracts - 2 * commission
/// margin   = margin_per_contract * contracts
/// notional = entry * point_value * contracts
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FuturesPricer;

impl Pricer for FuturesPricer {
    fn price(&self, setup: &TradeSetup, spec: &InstrumentSpec) -> Pricing {
        let point_value = spec.point_value.unwrap_or(spec.tick_value / spec.tick_size);
        let contracts = setup.quantity();
        let round_trip = setup.commission() * 2.0;

        let risk_points = setup.risk_distance();
        let reward_points = setup.reward_distance();

        Pricing {
            risk_points,
            reward_points,
            risk_amount: risk_points * point_value * contracts + round_trip,
            reward_amount: reward_points * point_value * contracts - round_trip,
            position_size: contracts,
            margin_required: spec.margin_per_unit * contracts,
            notional_value: setup.entry_price() * point_value * contracts,
        }
    }

    fn name(&self) -> &str {
        "Futures"
    }
}
