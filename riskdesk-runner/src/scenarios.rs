//! Scenario comparison: run named calculations side by side.
//!
//! Scenarios share nothing, so they run on the rayon pool. Each draws its seed
//! from an [`RngHierarchy`] keyed by scenario name, which makes the results
//! independent of thread count and scheduling order.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use riskdesk_core::rng::{RngHierarchy, SIMULATION_STREAM};
use riskdesk_core::InstrumentCatalog;

use crate::config::Scenario;
use crate::pipeline::calculate;
use crate::report::RiskReportSummary;
use crate::simulator::SimulationControl;

/// Result of one scenario. Failures keep their caller-facing message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub result: Result<RiskReportSummary, String>,
}

impl ScenarioOutcome {
    pub fn summary(&self) -> Option<&RiskReportSummary> {
        self.result.as_ref().ok()
    }
}

/// Runs scenario batches, in parallel by default.
#[derive(Debug, Clone)]
pub struct ScenarioRunner<'a> {
    catalog: &'a InstrumentCatalog,
    parallel: bool,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(catalog: &'a InstrumentCatalog) -> Self {
        Self {
            catalog,
            parallel: true,
        }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every scenario. Outcomes come back in input order.
    ///
    /// A scenario's own `simulation.seed` wins over the derived one.
    pub fn run(&self, scenarios: &[Scenario], master_seed: u64) -> Vec<ScenarioOutcome> {
        let hierarchy = RngHierarchy::new(master_seed);
        if self.parallel {
            scenarios
                .par_iter()
                .map(|s| self.run_one(s, &hierarchy))
                .collect()
        } else {
            scenarios
                .iter()
                .map(|s| self.run_one(s, &hierarchy))
                .collect()
        }
    }

    fn run_one(&self, scenario: &Scenario, hierarchy: &RngHierarchy) -> ScenarioOutcome {
        let config = &scenario.config;
        let seed = config
            .simulation
            .seed
            .unwrap_or_else(|| hierarchy.sub_seed(&scenario.name, SIMULATION_STREAM));
        debug!(scenario = %scenario.name, seed, "running scenario");

        let control = SimulationControl {
            deadline: config.timeout(),
            ..SimulationControl::none()
        };
        let result = calculate(
            &config.raw_setup(),
            self.catalog,
            &config.monte_carlo(),
            seed,
            &control,
        )
        .map(|report| report.into_summary())
        .map_err(|e| e.messages().join("; "));

        ScenarioOutcome {
            name: scenario.name.clone(),
            result,
        }
    }
}

/// Run scenarios in parallel against a catalog.
pub fn compare_scenarios(
    scenarios: &[Scenario],
    catalog: &InstrumentCatalog,
    master_seed: u64,
) -> Vec<ScenarioOutcome> {
    ScenarioRunner::new(catalog).run(scenarios, master_seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CalculationConfig;
    use riskdesk_core::domain::SizingMethod;

    fn scenario(name: &str, edit: impl FnOnce(&mut CalculationConfig)) -> Scenario {
        let mut config = CalculationConfig::default();
        config.simulation.trials = 300;
        edit(&mut config);
        Scenario {
            name: name.into(),
            config,
        }
    }

    fn batch() -> Vec<Scenario> {
        vec![
            scenario("base", |_| {}),
            scenario("kelly", |c| c.setup.sizing_method = SizingMethod::Kelly),
            scenario("oversized", |c| c.setup.quantity = "100".into()),
            scenario("bad-input", |c| c.setup.entry_price = "abc".into()),
        ]
    }

    #[test]
    fn outcomes_keep_input_order() {
        let out = compare_scenarios(&batch(), InstrumentCatalog::builtin(), 42);
        let names: Vec<&str> = out.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["base", "kelly", "oversized", "bad-input"]);
        assert!(out[0].summary().is_some());
        assert!(out[1].summary().is_some_and(|s| s.plan.kelly_applied));
        assert_eq!(
            out[2].result,
            Err("Insufficient margin - position size too large for account balance".into())
        );
        assert!(out[3]
            .result
            .as_ref()
            .is_err_and(|m| m.contains("Entry price must be a positive number")));
    }

    #[test]
    fn parallel_matches_sequential() {
        let catalog = InstrumentCatalog::builtin();
        let scenarios = batch();
        let parallel = ScenarioRunner::new(catalog).run(&scenarios, 7);
        let sequential = ScenarioRunner::new(catalog)
            .with_parallelism(false)
            .run(&scenarios, 7);
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn seeds_derive_from_scenario_name() {
        let out = compare_scenarios(&batch(), InstrumentCatalog::builtin(), 42);
        let h = RngHierarchy::new(42);
        assert_eq!(
            out[0].summary().and_then(|s| s.seed),
            Some(h.sub_seed("base", SIMULATION_STREAM))
        );
    }

    #[test]
    fn explicit_seed_wins() {
        let s = vec![scenario("fixed", |c| c.simulation.seed = Some(5))];
        let out = compare_scenarios(&s, InstrumentCatalog::builtin(), 42);
        assert_eq!(out[0].summary().and_then(|s| s.seed), Some(5));
    }
}
