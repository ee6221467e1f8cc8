//! Valuation Oracle — Entry Point
//!
//! One binary, one subcommand per published strategy. Every command
//! follows the same shape: load config.toml + validate, init tracing to
//! stderr (stdout stays report-only), load the CSV export(s), run the
//! strategy, print the human report and optionally the JSON payload.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::info;

mod adapters;
mod config;
mod domain;
mod ports;
mod usecases;

use adapters::{load_price_series, CsvBondUniverse, CsvMetricSource};
use domain::errors::ValuationError;
use usecases::{
    ladder_report, run_backtest, BacktestParams, BondMarketStrategy, DoubleLowScreen,
    IndexStrategy,
};

#[derive(Parser)]
#[command(
    name = "valuation-oracle",
    version,
    about = "Percentile-based valuation and Kelly position sizing"
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    /// Additionally print the structured result as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate the equity-index valuation gates.
    Index {
        /// Fundamentals CSV (date,pe,pb,roe) for one index.
        #[arg(long)]
        metrics: PathBuf,
        /// Ten-year government bond rate; defaults to the configured one.
        #[arg(long)]
        debt_rate: Option<f64>,
    },
    /// Evaluate the market-wide convertible-bond position.
    BondMarket {
        /// Convertible-universe CSV, one row per bond per day.
        #[arg(long)]
        market: PathBuf,
    },
    /// Screen the convertible universe for double-low candidates.
    DoubleLow {
        /// Convertible-universe CSV, one row per bond per day.
        #[arg(long)]
        universe: PathBuf,
        /// Also require the underlying stock to support a convert-price cut.
        #[arg(long)]
        with_stock_filter: bool,
    },
    /// Backtest threshold rebalancing over a price series.
    Rebalance {
        /// Price CSV (date,price).
        csvfile: PathBuf,
        /// First date of the backtest (YYYY-MM-DD, must be in the file).
        begin: NaiveDate,
        /// Upward drift trigger, in percentage points of total value.
        up: Decimal,
        /// Downward drift trigger, in percentage points of total value.
        down: Decimal,
    },
    /// Report holding win rates over the standard ladder of periods.
    WinRate {
        /// Price CSV (date,price).
        csvfile: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::loader::load_config(&cli.config).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting valuation-oracle");

    match cli.command {
        Command::Index { metrics, debt_rate } => run_index(&config, &metrics, debt_rate, cli.json),
        Command::BondMarket { market } => run_bond_market(&config, &market, cli.json),
        Command::DoubleLow {
            universe,
            with_stock_filter,
        } => run_double_low(&config, &universe, with_stock_filter, cli.json),
        Command::Rebalance {
            csvfile,
            begin,
            up,
            down,
        } => run_rebalance(&config, &csvfile, begin, up, down, cli.json),
        Command::WinRate { csvfile } => run_win_rate(&csvfile, cli.json),
    }
}

fn run_index(
    config: &config::AppConfig,
    metrics: &Path,
    debt_rate: Option<f64>,
    json: bool,
) -> Result<()> {
    let source = CsvMetricSource::from_path(metrics)?;
    let as_of = source
        .last_date()
        .ok_or(ValuationError::InsufficientHistory)
        .context("Fundamentals file is empty")?;
    let entity = metrics
        .file_stem()
        .map_or_else(|| "index".to_string(), |s| s.to_string_lossy().into_owned());
    let debt_rate = debt_rate.unwrap_or(config.index.national_debt_rate);

    let strategy = IndexStrategy::new(config.index.clone());
    let rec = strategy.evaluate(&source, &entity, as_of, debt_rate)?;

    let d = &rec.diagnostics;
    println!("{} as of {}", rec.entity, rec.as_of);
    println!(
        "  PE {:.2} ({:.0}th percentile)   PB {:.2} ({:.0}th percentile)",
        d.pe,
        d.pe_quantile * 100.0,
        d.pb,
        d.pb_quantile * 100.0
    );
    if let (Some(win), Some(odds)) = (d.win_rate, d.odds) {
        println!("  win rate {:.2}   odds {:.2}", win, odds);
    }
    println!("  gate: {:?}", rec.gate);
    println!("  position delta: {:+.4}", rec.position_delta);
    if json {
        println!("{}", serde_json::to_string_pretty(&rec)?);
    }
    Ok(())
}

fn run_bond_market(config: &config::AppConfig, market: &Path, json: bool) -> Result<()> {
    let source = CsvBondUniverse::from_path(market, config.bond_market.underrate_price)?;
    let as_of = source
        .last_date()
        .ok_or(ValuationError::InsufficientHistory)
        .context("Universe file is empty")?;

    let strategy = BondMarketStrategy::new(config.bond_market.clone());
    let rec = strategy.evaluate(&source, as_of)?;

    println!("convertible market as of {}", rec.as_of);
    println!(
        "  avg price {:.2}   avg premium {:.1}%   cheap share {:.1}%",
        rec.avg_price,
        rec.avg_premium_ratio * 100.0,
        rec.cheap_share * 100.0
    );
    println!("  win rate {:.2}   odds {:.2}", rec.win_rate, rec.odds);
    println!("  position delta: {:+.4}", rec.position_delta);
    if json {
        println!("{}", serde_json::to_string_pretty(&rec)?);
    }
    Ok(())
}

fn run_double_low(
    config: &config::AppConfig,
    universe: &Path,
    with_stock_filter: bool,
    json: bool,
) -> Result<()> {
    let source = CsvBondUniverse::from_path(universe, config.bond_market.underrate_price)?;
    let as_of = source
        .last_date()
        .ok_or(ValuationError::InsufficientHistory)
        .context("Universe file is empty")?;

    use ports::BondUniverseSource;
    let bonds = source.bonds(as_of)?;
    let screen = DoubleLowScreen::new(config.double_low.clone());
    let picks = screen.screen(&bonds, with_stock_filter);

    println!("double-low picks as of {as_of} ({} of {})", picks.len(), bonds.len());
    for bond in &picks {
        println!(
            "  {}  {:<12}  price {:>7.2}  premium {:>6.1}%  double-low {:>7.2}",
            bond.code,
            bond.name,
            bond.price,
            bond.premium_ratio * 100.0,
            bond.double_low()
        );
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&picks)?);
    }
    Ok(())
}

fn run_rebalance(
    config: &config::AppConfig,
    csvfile: &Path,
    begin: NaiveDate,
    up: Decimal,
    down: Decimal,
    json: bool,
) -> Result<()> {
    let series = load_price_series(csvfile)?;
    let params = BacktestParams {
        begin,
        // Command-line triggers arrive in percentage points.
        up_threshold: up / Decimal::ONE_HUNDRED,
        down_threshold: down / Decimal::ONE_HUNDRED,
    };
    let report = run_backtest(&series, &config.rebalance, &params)?;

    println!(
        "rebalancing {} from {} (triggers +{}% / -{}%)",
        csvfile.display(),
        begin,
        up,
        down
    );
    for event in &report.events {
        println!(
            "  {}  price {:>10.4}  cash {:>12.2}  risk {:>12.2}  total {:>12.2}",
            event.date,
            event.implied_price().unwrap_or_default(),
            event.cash,
            event.risk_value,
            event.total()
        );
    }
    println!(
        "  final {}  total {:.2}  ({} events, started with {})",
        report.final_date,
        report.final_total,
        report.events.len(),
        report.initial_capital
    );
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn run_win_rate(csvfile: &Path, json: bool) -> Result<()> {
    let series = load_price_series(csvfile)?;
    let prices: Vec<f64> = series
        .iter()
        .map(|p| {
            p.price.to_f64().ok_or_else(|| {
                ValuationError::DataFormat(format!("price {} overflows f64", p.price))
            })
        })
        .collect::<Result<_, _>>()?;

    let report = ladder_report(&prices);
    println!("holding win rates over {} observations", prices.len());
    for rung in &report {
        println!(
            "  hold {:>4}  win rate {:>6.1}%  ({} start points)",
            rung.hold_slots,
            rung.win_rate * 100.0,
            rung.start_points
        );
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
