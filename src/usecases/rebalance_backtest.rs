//! Rebalancing Backtest - Ledger Replay Over a Price Series
//!
//! Walks a historical price series through the threshold rebalancer and
//! returns the full event ledger: the seed split plus every rebalance
//! that fired, each entry carrying the cash/risk split after the event.
//! The final mark-to-market uses the last quote of the series whether or
//! not it fired an event.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::adapters::csv_prices::PricePoint;
use crate::config::RebalanceConfig;
use crate::domain::errors::ValuationError;
use crate::domain::rebalance::{PortfolioState, Rebalancer, HALT_PRICE};

/// Command-line-supplied backtest parameters.
#[derive(Debug, Clone, Copy)]
pub struct BacktestParams {
  /// First date of the backtest; must be present in the series.
  pub begin: NaiveDate,
  /// Upward drift (fraction of total value) that triggers a rebalance.
  pub up_threshold: Decimal,
  /// Downward drift (fraction of total value) that triggers a rebalance.
  pub down_threshold: Decimal,
}

/// Full result of one backtest run.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
  /// Starting capital.
  pub initial_capital: Decimal,
  /// Seed split plus every rebalance event, in date order.
  pub events: Vec<PortfolioState>,
  /// Date of the last quote in the series.
  pub final_date: NaiveDate,
  /// Portfolio value marked to the last quote.
  pub final_total: Decimal,
}

/// Replays `series` from `params.begin` through the rebalancer.
///
/// # Errors
/// Fails with [`ValuationError::DataFormat`] when the begin date is not
/// present in the series or carries a halted quote (no units can be
/// bought at it), and when the configured capital or weight does not
/// convert to an exact decimal.
pub fn run_backtest(
  series: &[PricePoint],
  config: &RebalanceConfig,
  params: &BacktestParams,
) -> Result<BacktestReport> {
  let start = series
    .iter()
    .position(|p| p.date == params.begin)
    .ok_or_else(|| {
      ValuationError::DataFormat(format!("begin date {} not present in the series", params.begin))
    })?;
  if series[start].price < HALT_PRICE {
    return Err(
      ValuationError::DataFormat(format!(
        "begin date {} has a halted quote ({})",
        params.begin, series[start].price
      ))
      .into(),
    );
  }

  let capital = Decimal::try_from(config.initial_capital)
    .context("initial_capital is not representable as a decimal")?;
  let weight = Decimal::try_from(config.target_risk_weight)
    .context("target_risk_weight is not representable as a decimal")?;
  let rebalancer = Rebalancer::new(weight, params.up_threshold, params.down_threshold);

  let seed = rebalancer.seed(capital, series[start].date, series[start].price);
  let mut last = seed;
  let mut events = vec![seed];
  for point in &series[start + 1..] {
    if let Some(next) = rebalancer.step(&last, point.date, point.price) {
      last = next;
      events.push(next);
    }
  }

  let final_point = series[series.len() - 1];
  let final_total = last.cash + last.risk_units * final_point.price;
  info!(
    events = events.len(),
    %final_total,
    "Backtest complete"
  );

  Ok(BacktestReport {
    initial_capital: capital,
    events,
    final_date: final_point.date,
    final_total,
  })
}
