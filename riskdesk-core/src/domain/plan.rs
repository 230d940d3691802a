use serde::{Deserialize, Serialize};

use super::instrument::AssetClass;
use super::setup::SizingMethod;

/// Qualitative grade of a post-commission reward-to-risk ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl RiskRating {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 2.0 {
            Self::Excellent
        } else if ratio >= 1.5 {
            Self::Good
        } else if ratio >= 1.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// Sized position derived from a trade setup and its instrument.
///
/// Invariants (enforced by the sizer on the entered position):
/// `margin_required <= 0.8 * balance` and `risk_percentage <= 20`. A Kelly
/// rescale may move `risk_amount` up to 25% of the balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionPlan {
    pub symbol: String,
    pub asset_class: AssetClass,
    pub sizing_method: SizingMethod,
    pub account_balance: f64,
    /// Points (futures) or pips (forex) between entry and stop.
    pub risk_points: f64,
    /// Points (futures) or pips (forex) between entry and take-profit.
    pub reward_points: f64,
    /// Currency lost if the stop is hit, commission included.
    pub risk_amount: f64,
    /// Currency gained if the target is hit, net of commission.
    pub reward_amount: f64,
    /// Contracts or lots, after any Kelly rescale.
    pub position_size: f64,
    pub margin_required: f64,
    pub notional_value: f64,
    /// reward_amount / risk_amount, 0 when risk is 0.
    pub risk_reward_ratio: f64,
    /// Entered-position risk as a percentage of the balance, before any Kelly rescale.
    pub risk_percentage: f64,
    /// p * reward - (1 - p) * risk under the assumed win rate.
    pub expected_value: f64,
    pub kelly_applied: bool,
    pub risk_rating: RiskRating,
}
