//! Convertible-bond Market Strategy - Aggregate Positioning
//!
//! Positions against the whole convertible market rather than any single
//! bond. The win probability is the most pessimistic of three views of
//! cheapness (share of outstanding value trading under the underrate
//! price, the average premium's rank in its own history, the average
//! price's rank in its own history); the Kelly fraction runs at fixed
//! configured odds and is passed through un-clamped, so a negative edge
//! comes back as a share of the held position to unwind.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::BondMarketConfig;
use crate::domain::kelly::{KellySizer, SizingMode};
use crate::domain::quantile::quantile_rank;
use crate::ports::bond_universe::BondUniverseSource;
use crate::ports::metric_source::HistoryWindow;

/// Result of one market-wide evaluation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BondMarketRecommendation {
  /// Date of the evaluated snapshot.
  pub as_of: NaiveDate,
  /// Most pessimistic of the three cheapness views.
  pub win_rate: f64,
  /// Fixed payoff odds behind the sizing.
  pub odds: f64,
  /// Fraction of capital to move; negative = unwind that share.
  pub position_delta: f64,
  /// Average closing price across the market.
  pub avg_price: f64,
  /// Average conversion premium ratio across the market.
  pub avg_premium_ratio: f64,
  /// Share of outstanding value at or below the underrate price.
  pub cheap_share: f64,
}

/// Market-wide convertible-bond strategy.
pub struct BondMarketStrategy {
  config: BondMarketConfig,
}

impl BondMarketStrategy {
  /// Creates the strategy from its configured thresholds.
  pub fn new(config: BondMarketConfig) -> Self {
    Self { config }
  }

  /// Evaluates the market as of `as_of`.
  ///
  /// # Errors
  /// Fails when the source has no snapshot for `as_of` or the aggregate
  /// history over the look-back window is empty.
  pub fn evaluate<S: BondUniverseSource + ?Sized>(
    &self,
    source: &S,
    as_of: NaiveDate,
  ) -> Result<BondMarketRecommendation> {
    let cfg = &self.config;
    let aggregates = source.market_aggregates(as_of)?;

    let end = as_of + Duration::days(1);
    let window = HistoryWindow::new(
      end - Duration::days(365 * i64::from(cfg.history_years)),
      end,
      1,
    );
    let history = source.market_history(&window)?;
    let price_history: Vec<f64> = history.iter().map(|(_, a)| a.avg_price).collect();
    let premium_history: Vec<f64> = history.iter().map(|(_, a)| a.avg_premium_ratio).collect();

    let cheap_share = aggregates.cheap_share();
    let premium_rank = quantile_rank(aggregates.avg_premium_ratio, &premium_history)?;
    let price_rank = quantile_rank(aggregates.avg_price, &price_history)?;
    let win_rate = cheap_share.min(1.0 - premium_rank).min(1.0 - price_rank);
    debug!(
      cheap_share,
      premium_rank, price_rank, win_rate, "Market cheapness views"
    );

    let fraction = KellySizer::new(SizingMode::PassThrough).size(win_rate, cfg.kelly_odds)?;
    // Adding is further gated on absolute levels; reducing is not.
    let position_delta = if fraction > 0.0 {
      if aggregates.avg_price < cfg.buy_price_cap
        && aggregates.avg_premium_ratio < cfg.buy_premium_cap
      {
        fraction
      } else {
        0.0
      }
    } else {
      fraction
    };

    info!(%as_of, win_rate, position_delta, "Bond market recommendation");
    Ok(BondMarketRecommendation {
      as_of,
      win_rate,
      odds: cfg.kelly_odds,
      position_delta,
      avg_price: aggregates.avg_price,
      avg_premium_ratio: aggregates.avg_premium_ratio,
      cheap_share,
    })
  }
}
