//! Monte Carlo trade simulator.
//!
//! Iterates a path-dependent process over up to `trials` trades. State carried
//! across trials: balance, cumulative P&L, running peak, market regime,
//! GARCH volatility and the consecutive-loss counter. Per trial, in order:
//!
//! 1. Regime step (2% chance of a memoryless redraw)
//! 2. GARCH(1,1) volatility update from one Box–Muller shock
//! 3. Regime-adjusted win probability, clamped to [0.10, 0.90]
//! 4. Fat-tail draw (5%): win probability cut to 30% for this trial
//! 5. Win/loss draw, base P&L of +reward or -risk
//! 6. Volatility scaling of the P&L
//! 7. Loss-streak penalty once more than 3 losses in a row
//! 8. Balance, peak, drawdown and return bookkeeping
//! 9. Stop on ruin (reported balance reaches 0)
//!
//! The order of random draws is part of the contract: a seeded run always
//! reproduces the same path.

pub mod regime;
pub mod volatility;

pub use regime::Regime;
pub use volatility::GarchParams;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use riskdesk_core::domain::{MarketAssumptions, PositionPlan};

use self::volatility::{standard_normal, volatility_factor};

/// Per-trial probability of an extreme event.
pub const FAT_TAIL_PROBABILITY: f64 = 0.05;

/// Share of the win probability kept during an extreme event.
pub const FAT_TAIL_WIN_SCALE: f64 = 0.3;

/// Losses in a row tolerated before the streak penalty applies.
pub const LOSS_STREAK_THRESHOLD: u32 = 3;

/// Penalty growth per consecutive loss, and its cap.
pub const LOSS_STREAK_STEP: f64 = 0.1;
pub const MAX_LOSS_STREAK_PENALTY: f64 = 0.5;

// ─── Configuration ───────────────────────────────────────────────────

/// Simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Requested number of trades (default 5000).
    pub trials: usize,
    /// Trades between progress/cancellation checkpoints (default 50).
    pub yield_interval: usize,
    pub garch: GarchParams,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            trials: 5000,
            yield_interval: 50,
            garch: GarchParams::default(),
        }
    }
}

/// Scalars the simulation needs from a sized position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub initial_balance: f64,
    pub risk_amount: f64,
    pub reward_amount: f64,
    pub win_rate: f64,
    /// Assumed volatility; also the starting GARCH state.
    pub base_volatility: f64,
}

impl SimulationParams {
    pub fn from_plan(plan: &PositionPlan, assumptions: &MarketAssumptions) -> Self {
        Self {
            initial_balance: plan.account_balance,
            risk_amount: plan.risk_amount,
            reward_amount: plan.reward_amount,
            win_rate: assumptions.win_rate,
            base_volatility: assumptions.volatility,
        }
    }
}

// ─── Result types ────────────────────────────────────────────────────

/// One simulated trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeOutcome {
    /// 1-based trade index.
    pub trade: usize,
    pub pnl: f64,
    pub cumulative_pnl: f64,
    /// Balance after the trade, floored at 0.
    pub balance: f64,
    /// Running peak balance, non-decreasing along the path.
    pub peak_balance: f64,
    /// Decline from the running peak, in percent. Measured on the floored
    /// balance, so a ruining trade reports exactly 100 rather than more.
    pub drawdown: f64,
    /// P&L as a percentage of the initial balance.
    pub return_pct: f64,
    pub win: bool,
    pub regime: Regime,
    pub volatility: f64,
}

/// Ordered trade outcomes of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationPath {
    pub initial_balance: f64,
    pub trials_requested: usize,
    pub outcomes: Vec<TradeOutcome>,
}

impl SimulationPath {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// True when the account hit zero before all requested trades ran.
    pub fn ruined(&self) -> bool {
        self.outcomes.last().is_some_and(|o| o.balance <= 0.0)
    }

    pub fn final_balance(&self) -> f64 {
        self.outcomes
            .last()
            .map_or(self.initial_balance, |o| o.balance)
    }

    pub fn total_pnl(&self) -> f64 {
        self.outcomes.last().map_or(0.0, |o| o.cumulative_pnl)
    }

    /// Per-trade simple returns as fractions (`return_pct / 100`).
    pub fn returns(&self) -> Vec<f64> {
        self.outcomes.iter().map(|o| o.return_pct / 100.0).collect()
    }

    pub fn balances(&self) -> Vec<f64> {
        self.outcomes.iter().map(|o| o.balance).collect()
    }

    pub fn drawdowns(&self) -> Vec<f64> {
        self.outcomes.iter().map(|o| o.drawdown).collect()
    }

    pub fn win_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.win).count()
    }

    pub fn loss_count(&self) -> usize {
        self.len() - self.win_count()
    }
}

// ─── Control ─────────────────────────────────────────────────────────

/// Progress snapshot handed to the callback at each checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationProgress {
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
}

impl SimulationProgress {
    fn new(completed: usize, total: usize) -> Self {
        let percent = if total > 0 {
            completed as f64 / total as f64 * 100.0
        } else {
            100.0
        };
        Self {
            completed,
            total,
            percent,
        }
    }
}

/// Caller hooks checked every `yield_interval` trades.
///
/// None of them touch the RNG, so a run with hooks produces the same path as
/// a run without.
#[derive(Default, Clone, Copy)]
pub struct SimulationControl<'a> {
    pub progress: Option<&'a dyn Fn(&SimulationProgress)>,
    pub cancel: Option<&'a AtomicBool>,
    /// Wall-clock budget measured from the start of the run.
    pub deadline: Option<Duration>,
}

impl<'a> SimulationControl<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_progress(mut self, cb: &'a dyn Fn(&SimulationProgress)) -> Self {
        self.progress = Some(cb);
        self
    }

    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_deadline(mut self, limit: Duration) -> Self {
        self.deadline = Some(limit);
        self
    }

    fn checkpoint(
        &self,
        completed: usize,
        total: usize,
        started: Instant,
    ) -> Result<(), SimulationError> {
        if let Some(cb) = self.progress {
            cb(&SimulationProgress::new(completed, total));
        }
        if self.cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
            return Err(SimulationError::Cancelled { completed });
        }
        if let Some(limit) = self.deadline {
            if started.elapsed() >= limit {
                return Err(SimulationError::TimedOut { completed, limit });
            }
        }
        Ok(())
    }
}

/// Errors from the simulator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("simulation needs at least one trial")]
    NoTrials,
    #[error("simulation cancelled after {completed} trades")]
    Cancelled { completed: usize },
    #[error("simulation timed out after {completed} trades (limit {limit:?})")]
    TimedOut { completed: usize, limit: Duration },
}

// ─── Simulation ──────────────────────────────────────────────────────

/// Multiplier applied to a loss after `streak` consecutive losses.
pub fn loss_streak_penalty(streak: u32) -> f64 {
    if streak > LOSS_STREAK_THRESHOLD {
        1.0 + (f64::from(streak) * LOSS_STREAK_STEP).min(MAX_LOSS_STREAK_PENALTY)
    } else {
        1.0
    }
}

/// Run one Monte Carlo path.
///
/// The path ends early the first time the reported balance reaches 0, so a
/// negative balance never feeds into a later trial. Cancellation and the
/// deadline are only observed at checkpoints; either aborts the run without a
/// partial path. A final progress callback marks completion, ruin included.
pub fn run_simulation<R: Rng + ?Sized>(
    params: &SimulationParams,
    config: &MonteCarloConfig,
    rng: &mut R,
    control: &SimulationControl<'_>,
) -> Result<SimulationPath, SimulationError> {
    if config.trials == 0 {
        return Err(SimulationError::NoTrials);
    }

    debug!(
        trials = config.trials,
        risk = params.risk_amount,
        reward = params.reward_amount,
        win_rate = params.win_rate,
        volatility = params.base_volatility,
        "starting simulation"
    );

    let started = Instant::now();
    let interval = config.yield_interval.max(1);
    let initial = params.initial_balance;

    let mut outcomes = Vec::with_capacity(config.trials);
    let mut balance = initial;
    let mut cumulative_pnl = 0.0;
    let mut peak = initial;
    let mut regime = Regime::Normal;
    let mut sigma = params.base_volatility;
    let mut loss_streak: u32 = 0;

    for i in 0..config.trials {
        if i % interval == 0 {
            control.checkpoint(i, config.trials, started)?;
        }

        regime = regime.step(rng);

        let shock = standard_normal(rng);
        sigma = config.garch.next(sigma, shock);

        let adjusted = regime.adjust_win_rate(params.win_rate);
        let fat_tail = rng.gen::<f64>() < FAT_TAIL_PROBABILITY;
        let p = if fat_tail {
            adjusted * FAT_TAIL_WIN_SCALE
        } else {
            adjusted
        };
        let win = rng.gen::<f64>() < p;

        let mut pnl = if win {
            params.reward_amount
        } else {
            -params.risk_amount
        };
        pnl *= volatility_factor(sigma, params.base_volatility);

        if win {
            loss_streak = 0;
        } else {
            loss_streak += 1;
            pnl *= loss_streak_penalty(loss_streak);
        }

        balance += pnl;
        cumulative_pnl += pnl;
        let reported = balance.max(0.0);
        peak = peak.max(reported);

        let drawdown = if peak > 0.0 {
            (peak - reported) / peak * 100.0
        } else {
            0.0
        };
        let return_pct = if initial > 0.0 {
            pnl / initial * 100.0
        } else {
            0.0
        };

        outcomes.push(TradeOutcome {
            trade: i + 1,
            pnl,
            cumulative_pnl,
            balance: reported,
            peak_balance: peak,
            drawdown,
            return_pct,
            win,
            regime,
            volatility: sigma,
        });

        if reported <= 0.0 {
            warn!(trade = i + 1, "account ruined, stopping path early");
            break;
        }
    }

    if let Some(cb) = control.progress {
        cb(&SimulationProgress {
            completed: outcomes.len(),
            total: config.trials,
            percent: 100.0,
        });
    }

    Ok(SimulationPath {
        initial_balance: initial,
        trials_requested: config.trials,
        outcomes,
    })
}
