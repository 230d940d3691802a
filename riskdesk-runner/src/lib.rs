//! RiskDesk Runner: Monte Carlo simulation, risk statistics, calculation
//! pipeline and scenario comparison.
//!
//! This crate builds on `riskdesk-core` to provide:
//! - The Monte Carlo trade simulator (regime switching, GARCH volatility,
//!   fat tails, loss-streak penalty, ruin)
//! - Return, drawdown and tail metrics plus heuristic quality scores
//! - The aggregator producing a `RiskReport`
//! - TOML calculation and scenario files
//! - The end-to-end pipeline and parallel scenario comparison

pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod quality;
pub mod report;
pub mod scenarios;
pub mod simulator;
pub mod tail_metrics;

pub use config::{CalculationConfig, ConfigError, Scenario, ScenarioFile};
pub use pipeline::{calculate, calculate_with_rng, run_config, CalcError};
pub use quality::QualityScores;
pub use report::{aggregate, MonthlyReturn, RiskMetrics, RiskReport, RiskReportSummary, StatsError};
pub use scenarios::{compare_scenarios, ScenarioOutcome, ScenarioRunner};
pub use simulator::{
    run_simulation, MonteCarloConfig, Regime, SimulationControl, SimulationError,
    SimulationParams, SimulationPath, SimulationProgress, TradeOutcome,
};
pub use tail_metrics::TailMetrics;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<RiskReport>();
        assert_sync::<RiskReport>();
        assert_send::<RiskReportSummary>();
        assert_sync::<RiskReportSummary>();
        assert_send::<ScenarioOutcome>();
        assert_sync::<ScenarioOutcome>();
    }

    #[test]
    fn simulation_types_are_send_sync() {
        assert_send::<SimulationPath>();
        assert_sync::<SimulationPath>();
        assert_send::<TradeOutcome>();
        assert_sync::<TradeOutcome>();
        assert_send::<MonteCarloConfig>();
        assert_sync::<MonteCarloConfig>();
        assert_send::<SimulationParams>();
        assert_sync::<SimulationParams>();
    }

    #[test]
    fn config_and_error_types_are_send_sync() {
        assert_send::<CalculationConfig>();
        assert_sync::<CalculationConfig>();
        assert_send::<ScenarioFile>();
        assert_sync::<ScenarioFile>();
        assert_send::<CalcError>();
        assert_sync::<CalcError>();
        assert_send::<ConfigError>();
        assert_sync::<ConfigError>();
    }
}
