//! Calculation pipeline: Validator → Sizer → Simulator → Aggregator.
//!
//! A call either returns a complete [`RiskReport`] or one [`CalcError`];
//! nothing partial is ever returned.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{info, warn};

use riskdesk_core::domain::RawTradeSetup;
use riskdesk_core::{size_from_catalog, validate, InstrumentCatalog, SizingError, ValidationErrors};

use crate::config::CalculationConfig;
use crate::report::{aggregate, RiskReport, StatsError};
use crate::simulator::{
    run_simulation, MonteCarloConfig, SimulationControl, SimulationError, SimulationParams,
};

/// Errors that abort a calculation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// Every violated input rule, in report order.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A business rule rejected the sized position.
    #[error("{0}")]
    Sizing(#[from] SizingError),

    #[error("{0}")]
    Simulation(#[from] SimulationError),

    #[error("{0}")]
    Stats(#[from] StatsError),
}

impl CalcError {
    /// Messages for the caller: the full list for validation, one otherwise.
    pub fn messages(&self) -> Vec<String> {
        match self {
            CalcError::Validation(errors) => errors.messages(),
            CalcError::Sizing(e) => vec![e.to_string()],
            CalcError::Simulation(e) => vec![e.to_string()],
            CalcError::Stats(e) => vec![e.to_string()],
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CalcError::Validation(_))
    }
}

/// Run the full pipeline with a caller-supplied RNG.
///
/// The report carries no seed; use [`calculate`] for a reproducible run.
pub fn calculate_with_rng<R: Rng + ?Sized>(
    raw: &RawTradeSetup,
    catalog: &InstrumentCatalog,
    config: &MonteCarloConfig,
    rng: &mut R,
    control: &SimulationControl<'_>,
) -> Result<RiskReport, CalcError> {
    let started = Instant::now();

    let setup = validate(raw).map_err(|errors| {
        warn!(count = errors.len(), "trade setup rejected");
        errors
    })?;
    let plan = size_from_catalog(&setup, catalog)?;

    let params = SimulationParams::from_plan(&plan, setup.assumptions());
    let path = run_simulation(&params, config, rng, control)?;
    let report = aggregate(&plan, setup.assumptions(), path)?;

    info!(
        symbol = %plan.symbol,
        trials = report.summary.trials_completed,
        ruined = report.summary.ruined,
        sharpe = report.metrics().sharpe_ratio,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "calculation complete"
    );
    Ok(report)
}

/// Run the full pipeline with a `StdRng` seeded from `seed`.
pub fn calculate(
    raw: &RawTradeSetup,
    catalog: &InstrumentCatalog,
    config: &MonteCarloConfig,
    seed: u64,
    control: &SimulationControl<'_>,
) -> Result<RiskReport, CalcError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut report = calculate_with_rng(raw, catalog, config, &mut rng, control)?;
    report.summary.seed = Some(seed);
    Ok(report)
}

/// Run a calculation file. Uses its seed, or draws a fresh one that the
/// report records.
pub fn run_config(
    config: &CalculationConfig,
    catalog: &InstrumentCatalog,
    control: &SimulationControl<'_>,
) -> Result<RiskReport, CalcError> {
    let seed = config.simulation.seed.unwrap_or_else(rand::random);
    let mut control = *control;
    if control.deadline.is_none() {
        control.deadline = config.timeout();
    }
    calculate(&config.raw_setup(), catalog, &config.monte_carlo(), seed, &control)
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskdesk_core::domain::SizingMethod;
    use riskdesk_core::ValidationFailure;

    fn catalog() -> &'static InstrumentCatalog {
        InstrumentCatalog::builtin()
    }

    fn quick() -> MonteCarloConfig {
        MonteCarloConfig {
            trials: 1000,
            ..MonteCarloConfig::default()
        }
    }

    #[test]
    fn es_example_end_to_end() {
        let report = calculate(
            &RawTradeSetup::default(),
            catalog(),
            &MonteCarloConfig::default(),
            42,
            &SimulationControl::none(),
        )
        .unwrap();
        let s = &report.summary;
        assert_eq!(s.plan.risk_points, 20.0);
        assert_eq!(s.plan.reward_points, 40.0);
        assert_eq!(s.plan.margin_required, 13_200.0);
        assert!(s.plan.risk_reward_ratio >= 1.9 && s.plan.risk_reward_ratio <= 2.0);
        assert!(s.trials_completed <= 5000);
        assert!(report.metrics().max_drawdown >= 0.0);
        assert_eq!(s.seed, Some(42));
    }

    #[test]
    fn seeded_runs_repeat() {
        let a = calculate(&RawTradeSetup::default(), catalog(), &quick(), 9, &SimulationControl::none())
            .unwrap();
        let b = calculate(&RawTradeSetup::default(), catalog(), &quick(), 9, &SimulationControl::none())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn validation_errors_are_listed_in_full() {
        let raw = RawTradeSetup {
            account_balance: "500".into(),
            entry_price: "100".into(),
            stop_loss: "100".into(),
            take_profit: "120".into(),
            commission: "-1".into(),
            ..RawTradeSetup::default()
        };
        let err = calculate(&raw, catalog(), &quick(), 1, &SimulationControl::none()).unwrap_err();
        assert!(err.is_validation());
        let CalcError::Validation(errors) = &err else {
            unreachable!()
        };
        assert!(errors.contains(ValidationFailure::BalanceBelowMinimum));
        assert!(errors.contains(ValidationFailure::CommissionNegative));
        assert!(errors.contains(ValidationFailure::EntryEqualsStop));
        assert!(!errors.contains(ValidationFailure::RatioTooLow));
        assert_eq!(err.messages().len(), 3);
    }

    #[test]
    fn margin_gate_aborts_before_simulation() {
        let raw = RawTradeSetup {
            quantity: "100".into(),
            ..RawTradeSetup::default()
        };
        let err = calculate(&raw, catalog(), &quick(), 1, &SimulationControl::none()).unwrap_err();
        assert_eq!(
            err.messages(),
            vec!["Insufficient margin - position size too large for account balance".to_string()]
        );
    }

    #[test]
    fn kelly_flows_into_simulation_amounts() {
        let raw = RawTradeSetup {
            sizing_method: SizingMethod::Kelly,
            ..RawTradeSetup::default()
        };
        let report = calculate(&raw, catalog(), &quick(), 3, &SimulationControl::none()).unwrap();
        assert!(report.summary.plan.kelly_applied);
        let first = report.path.outcomes[0];
        let base = if first.win {
            report.summary.plan.reward_amount
        } else {
            report.summary.plan.risk_amount
        };
        let factor = first.pnl.abs() / base;
        assert!((0.5 - 1e-9..=2.0 + 1e-9).contains(&factor));
    }

    #[test]
    fn config_seed_is_recorded() {
        let mut config = CalculationConfig::default();
        config.simulation.trials = 200;
        config.simulation.seed = Some(77);
        let report = run_config(&config, catalog(), &SimulationControl::none()).unwrap();
        assert_eq!(report.summary.seed, Some(77));
        assert_eq!(report.summary.trials_requested, 200);
    }

    #[test]
    fn unseeded_config_still_records_a_seed() {
        let mut config = CalculationConfig::default();
        config.simulation.trials = 100;
        let report = run_config(&config, catalog(), &SimulationControl::none()).unwrap();
        assert!(report.summary.seed.is_some());
    }
}
