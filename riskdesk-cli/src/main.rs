//! RiskDesk CLI: position sizing and Monte Carlo risk reports.
//!
//! Commands:
//! - `calc` size a trade and run the simulation from a TOML file and/or flags
//! - `compare` run a scenario file in parallel and tabulate the results
//! - `instruments` list the instrument catalog

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use riskdesk_core::domain::{AssetClass, SizingMethod};
use riskdesk_core::InstrumentCatalog;
use riskdesk_runner::{
    compare_scenarios, run_config, CalcError, CalculationConfig, RiskReport, ScenarioFile,
    ScenarioOutcome, SimulationControl, SimulationProgress,
};

#[derive(Parser)]
#[command(
    name = "riskdesk",
    about = "RiskDesk: position sizing and Monte Carlo risk assessment"
)]
struct Cli {
    /// Instrument catalog TOML replacing the built-in table.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Size a trade and run the risk simulation.
    Calc(CalcArgs),
    /// Run every scenario in a scenario file.
    Compare {
        /// Scenario file with one [[scenario]] table per run.
        #[arg(long)]
        scenarios: PathBuf,

        /// Master seed for per-scenario seeds.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List catalog instruments.
    Instruments {
        /// Only this asset class (futures or forex).
        #[arg(long)]
        asset: Option<AssetClass>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct CalcArgs {
    /// Calculation TOML file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    asset: Option<AssetClass>,
    #[arg(long)]
    symbol: Option<String>,
    #[arg(long)]
    balance: Option<String>,
    #[arg(long)]
    entry: Option<String>,
    #[arg(long)]
    stop: Option<String>,
    #[arg(long)]
    target: Option<String>,
    /// Contracts (futures) or lots (forex).
    #[arg(long)]
    quantity: Option<String>,
    #[arg(long)]
    commission: Option<String>,
    /// fixed-risk, kelly, or volatility-target.
    #[arg(long)]
    method: Option<SizingMethod>,

    /// Assumed win rate, 0-1.
    #[arg(long)]
    win_rate: Option<f64>,
    /// Assumed annualized volatility, 0-1.
    #[arg(long)]
    volatility: Option<f64>,
    /// Annual risk-free rate in percent.
    #[arg(long)]
    risk_free: Option<f64>,
    #[arg(long)]
    beta: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    trials: Option<usize>,
    /// Abort the simulation after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print JSON instead of a text summary.
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Include the trade path and curves in JSON output.
    #[arg(long, default_value_t = false)]
    full: bool,
    /// Show simulation progress on stderr.
    #[arg(long, default_value_t = false)]
    progress: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let owned_catalog = cli
        .catalog
        .as_deref()
        .map(load_catalog)
        .transpose()?;
    let catalog = owned_catalog
        .as_ref()
        .unwrap_or_else(|| InstrumentCatalog::builtin());

    match cli.command {
        Commands::Calc(args) => run_calc(args, catalog),
        Commands::Compare {
            scenarios,
            seed,
            json,
        } => run_compare(&scenarios, seed, json, catalog),
        Commands::Instruments { asset, json } => run_instruments(asset, json, catalog),
    }
}

fn load_catalog(path: &Path) -> Result<InstrumentCatalog> {
    info!(path = %path.display(), "loading instrument catalog");
    InstrumentCatalog::from_file(path)
        .with_context(|| format!("loading catalog {}", path.display()))
}

fn build_config(args: &CalcArgs) -> Result<CalculationConfig> {
    let mut config = match &args.config {
        Some(path) => CalculationConfig::from_file(path)?,
        None => CalculationConfig::default(),
    };

    let setup = &mut config.setup;
    if let Some(asset) = args.asset {
        setup.asset_class = asset;
    }
    let overrides = [
        (&args.symbol, &mut setup.symbol),
        (&args.balance, &mut setup.account_balance),
        (&args.entry, &mut setup.entry_price),
        (&args.stop, &mut setup.stop_loss),
        (&args.target, &mut setup.take_profit),
        (&args.quantity, &mut setup.quantity),
        (&args.commission, &mut setup.commission),
    ];
    for (value, field) in overrides {
        if let Some(v) = value {
            *field = v.clone();
        }
    }
    if let Some(method) = args.method {
        setup.sizing_method = method;
    }

    let market = &mut config.market;
    if let Some(v) = args.win_rate {
        market.win_rate = v;
    }
    if let Some(v) = args.volatility {
        market.volatility = v;
    }
    if let Some(v) = args.risk_free {
        market.risk_free_rate_pct = v;
    }
    if let Some(v) = args.beta {
        market.market_beta = v;
    }

    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(trials) = args.trials {
        config.simulation.trials = trials;
    }
    if let Some(secs) = args.timeout_secs {
        config.simulation.timeout_secs = Some(secs);
    }
    config.check()?;
    Ok(config)
}

fn run_calc(args: CalcArgs, catalog: &InstrumentCatalog) -> Result<()> {
    let config = build_config(&args)?;

    let show_progress = |p: &SimulationProgress| {
        eprint!("\rSimulating... {:>5.1}%", p.percent);
        if p.percent >= 100.0 {
            eprintln!();
        }
    };
    let mut control = SimulationControl::none();
    if args.progress {
        control = control.with_progress(&show_progress);
    }

    let report = match run_config(&config, catalog, &control) {
        Ok(report) => report,
        Err(CalcError::Validation(errors)) => {
            eprintln!("Invalid trade setup:");
            for message in errors.messages() {
                eprintln!("  - {message}");
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        let out = if args.full {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string_pretty(&report.summary)?
        };
        println!("{out}");
    } else {
        print_report(&report);
    }
    Ok(())
}

fn run_compare(path: &Path, seed: u64, json: bool, catalog: &InstrumentCatalog) -> Result<()> {
    let file = ScenarioFile::from_file(path)?;
    info!(scenarios = file.scenarios.len(), seed, "comparing scenarios");
    let outcomes = compare_scenarios(&file.scenarios, catalog, seed);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        print_comparison(&outcomes);
    }

    if outcomes.iter().all(|o| o.result.is_err()) {
        bail!("every scenario failed");
    }
    Ok(())
}

fn run_instruments(asset: Option<AssetClass>, json: bool, catalog: &InstrumentCatalog) -> Result<()> {
    let specs: Vec<_> = catalog
        .iter()
        .filter(|s| asset.map_or(true, |a| s.asset_class == a))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&specs)?);
        return Ok(());
    }

    println!(
        "{:<8} {:<28} {:<8} {:<8} {:>10} {:>10} {:>10}",
        "Symbol", "Name", "Class", "Tier", "Tick", "TickValue", "Margin"
    );
    for s in specs {
        println!(
            "{:<8} {:<28} {:<8} {:<8} {:>10} {:>10.2} {:>10.2}",
            s.symbol,
            s.name,
            s.asset_class,
            s.tier.as_str(),
            s.tick_size,
            s.tick_value,
            s.margin_per_unit
        );
    }
    Ok(())
}

fn print_report(report: &RiskReport) {
    let s = &report.summary;
    let p = &s.plan;
    let m = report.metrics();
    let q = &s.quality;

    println!();
    println!("=== Position ===");
    println!("Instrument:     {} ({})", p.symbol, p.asset_class);
    println!("Sizing:         {}", p.sizing_method);
    println!("Position Size:  {:.4}", p.position_size);
    println!("Risk:           ${:.2} ({:.2}%)", p.risk_amount, p.risk_percentage);
    println!("Reward:         ${:.2}", p.reward_amount);
    println!("Reward/Risk:    {:.2} ({:?})", p.risk_reward_ratio, p.risk_rating);
    println!("Margin:         ${:.2}", p.margin_required);
    println!("Notional:       ${:.2}", p.notional_value);
    println!("Expected Value: ${:.2}", s.expected_value);
    println!();
    println!("=== Simulation ===");
    if let Some(seed) = s.seed {
        println!("Seed:           {seed}");
    }
    println!(
        "Trades:         {} of {}",
        s.trials_completed, s.trials_requested
    );
    println!("Final Balance:  ${:.2}", s.final_balance);
    println!("Total P&L:      ${:.2}", s.total_pnl);
    println!("Win Rate:       {:.1}%", s.realized_win_rate * 100.0);
    if s.ruined {
        println!("WARNING: account ruined before the last trade");
    }
    println!();
    println!("--- Risk ---");
    println!("VaR 95:         ${:.2}", m.var_95);
    println!("VaR 99:         ${:.2}", m.var_99);
    println!("Exp. Shortfall: ${:.2}", m.expected_shortfall);
    println!("Max Drawdown:   {:.2}%", m.max_drawdown);
    println!("Ulcer Index:    {:.3}", m.ulcer_index);
    println!("Pain Index:     {:.3}", m.pain_index);
    println!("Skewness:       {:.3}", m.skewness);
    println!("Kurtosis:       {:.3}", m.kurtosis);
    println!();
    println!("--- Ratios ---");
    println!("Sharpe:         {:.3}", m.sharpe_ratio);
    println!("Sortino:        {:.3}", m.sortino_ratio);
    println!("Calmar:         {:.3}", m.calmar_ratio);
    println!("Sterling:       {:.3}", m.sterling_ratio);
    println!("Martin:         {:.3}", m.martin_ratio);
    println!("Gain/Pain:      {:.3}", m.gain_to_pain_ratio);
    println!("Alpha:          {:.4}", m.alpha);
    println!("Beta:           {:.2}", m.beta);
    println!("Info Ratio:     {:.3}", m.information_ratio);
    println!("Tracking Error: {:.4}", m.tracking_error);
    println!("Kelly:          {:.2}%", m.kelly_percentage);
    println!("Optimal f:      {:.2}%", m.optimal_f_percentage);
    println!();
    println!("--- Quality (heuristic) ---");
    println!(
        "Confidence {:.0} | Reliability {:.0} | Convergence {:.0} | Stability {:.0}",
        q.confidence, q.reliability, q.convergence, q.stability
    );
    println!();
    println!("--- Monthly Returns ---");
    let months: Vec<String> = report
        .monthly_returns
        .iter()
        .map(|r| format!("{:+.1}%", r.return_pct))
        .collect();
    println!("{}", months.join("  "));
    println!();
}

fn print_comparison(outcomes: &[ScenarioOutcome]) {
    println!(
        "{:<20} {:>8} {:>10} {:>8} {:>8} {:>9} {:>12} {:>14}",
        "Scenario", "Trades", "Risk %", "Sharpe", "Sortino", "MaxDD %", "VaR95", "Final"
    );
    for o in outcomes {
        match &o.result {
            Ok(s) => println!(
                "{:<20} {:>8} {:>10.2} {:>8.3} {:>8.3} {:>9.2} {:>12.2} {:>14.2}{}",
                o.name,
                s.trials_completed,
                s.plan.risk_percentage,
                s.metrics.sharpe_ratio,
                s.metrics.sortino_ratio,
                s.metrics.max_drawdown,
                s.metrics.var_95,
                s.final_balance,
                if s.ruined { "  RUINED" } else { "" }
            ),
            Err(message) => println!("{:<20} FAILED: {message}", o.name),
        }
    }
}
