//! Equity-index Valuation Strategy - Ordered Gate Evaluation
//!
//! Turns the current PE/PB of an index and their position in the index's
//! own history into a position recommendation. The gates are evaluated
//! in a fixed order and the first match wins: systemic overrides come
//! before the percentile rules, so a market that is absurdly cheap (or
//! absurdly expensive) in absolute terms never waits on its own history.
//!
//! Buys are sized with the continuous Kelly fraction fed by a growth
//! projection; sells use the discrete risk-off table. The asymmetry is
//! the strategy, not an accident.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::IndexStrategyConfig;
use crate::domain::errors::ValuationError;
use crate::domain::kelly::{sell_step, KellySizer, SizingMode};
use crate::domain::projection::GrowthProjection;
use crate::domain::quantile::quantile_rank;
use crate::ports::metric_source::{HistoryWindow, MetricSource};

/// Which gate produced the recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gate {
  /// Absolute floor: buy everything regardless of history.
  SystemicLow,
  /// Absolute ceiling: sell everything regardless of history.
  SystemicHigh,
  /// Percentile-cheap zone: continuous Kelly buy.
  RelativeLow,
  /// Percentile-rich zone: stepwise sell.
  RelativeHigh,
  /// Neither zone: do nothing.
  Hold,
}

/// Inputs the gates actually saw, kept for the report.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Diagnostics {
  /// Current price-to-earnings ratio.
  pub pe: f64,
  /// Current price-to-book ratio.
  pub pb: f64,
  /// Percentile of the current PE in its own history.
  pub pe_quantile: f64,
  /// Percentile of the current PB in its own history.
  pub pb_quantile: f64,
  /// Projected win rate, present only when a Kelly buy was sized.
  pub win_rate: Option<f64>,
  /// Payoff odds behind the Kelly buy, when one was sized.
  pub odds: Option<f64>,
}

/// Result of one strategy evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
  /// Entity the recommendation is for.
  pub entity: String,
  /// Date of the evaluated observation.
  pub as_of: NaiveDate,
  /// Gate that fired.
  pub gate: Gate,
  /// Fraction of capital to move: +1.0 = all in, -1.0 = sell all,
  /// negative fractions are shares of the held position.
  pub position_delta: f64,
  /// Inputs the decision was made on.
  pub diagnostics: Diagnostics,
}

/// Equity-index valuation strategy.
pub struct IndexStrategy {
  config: IndexStrategyConfig,
}

impl IndexStrategy {
  /// Creates the strategy from its configured thresholds.
  pub fn new(config: IndexStrategyConfig) -> Self {
    Self { config }
  }

  /// Evaluates the gates for `entity` as of `as_of`.
  ///
  /// `debt_rate` is the ten-year government bond rate the earnings-yield
  /// comparisons run against.
  ///
  /// # Errors
  /// Fails with [`ValuationError::InsufficientHistory`] when the source
  /// has no usable current observation or an empty look-back history.
  pub fn evaluate<S: MetricSource + ?Sized>(
    &self,
    source: &S,
    entity: &str,
    as_of: NaiveDate,
    debt_rate: f64,
  ) -> Result<Recommendation> {
    let cfg = &self.config;
    let pe = source.latest("pe", entity)?.value;
    let pb = source.latest("pb", entity)?.value;

    let end = as_of + Duration::days(1);
    let lookback = HistoryWindow::new(
      end - Duration::days(365 * i64::from(cfg.history_years)),
      end,
      cfg.sample_stride,
    );
    let pe_history = source.metric_history("pe", entity, &lookback)?;
    let pb_history = source.metric_history("pb", entity, &lookback)?;
    let roe_history = source.metric_history("roe", entity, &lookback)?;

    let pe_values = pe_history.values();
    let pb_values = pb_history.values();
    let pe_quantile = quantile_rank(pe, &pe_values)?;
    let pb_quantile = quantile_rank(pb, &pb_values)?;
    debug!(
      entity,
      pe, pb, pe_quantile, pb_quantile, "Valuation inputs assembled"
    );

    let mut diagnostics = Diagnostics {
      pe,
      pb,
      pe_quantile,
      pb_quantile,
      win_rate: None,
      odds: None,
    };
    let earnings_yield = 1.0 / pe;

    let (gate, position_delta) = if pe < cfg.systemic_low_pe
      && pb < cfg.systemic_low_pb
      && pb / pe > cfg.systemic_low_roe
    {
      (Gate::SystemicLow, 1.0)
    } else if pe > cfg.systemic_high_pe || pb > cfg.systemic_high_pb {
      (Gate::SystemicHigh, -1.0)
    } else if (pe_quantile < cfg.relative_low_quantile
      && pb_quantile < cfg.relative_low_quantile
      && pb < cfg.relative_low_pb_cap)
      || (pb_quantile < cfg.relative_low_quantile
        && earnings_yield > debt_rate * cfg.debt_rate_buy_multiple)
      || (pe_quantile < cfg.deep_low_quantile && pb_quantile < cfg.deep_low_quantile)
    {
      let projection = GrowthProjection::new(cfg.target_annual_return, cfg.horizon_years);
      let avg_roe = roe_history
        .mean()
        .ok_or(ValuationError::InsufficientHistory)?;
      let win_rate = projection.win_rate(pe, avg_roe, &pe_values)?;
      let odds = projection.odds();
      let size = KellySizer::new(SizingMode::ClampToZero).size(win_rate, odds)?;
      diagnostics.win_rate = Some(win_rate);
      diagnostics.odds = Some(odds);
      (Gate::RelativeLow, size)
    } else if (pe_quantile > cfg.relative_high_quantile
      && pb_quantile > cfg.relative_high_quantile)
      || earnings_yield < debt_rate * cfg.debt_rate_sell_multiple
    {
      (Gate::RelativeHigh, sell_step(pe_quantile))
    } else {
      (Gate::Hold, 0.0)
    };

    info!(entity, ?gate, position_delta, "Index recommendation");
    Ok(Recommendation {
      entity: entity.to_string(),
      as_of,
      gate,
      position_delta,
      diagnostics,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::series::{MetricHistory, MetricSample};
  use crate::ports::metric_source::MockMetricSource;

  fn history_of(values: Vec<f64>) -> MetricHistory {
    let samples = values
      .into_iter()
      .enumerate()
      .map(|(i, value)| MetricSample {
        date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(i as i64),
        value,
      })
      .collect();
    MetricHistory::new(samples)
  }

  /// Mock serving fixed look-back histories and fixed current
  /// observations.
  fn source(
    pe_history: Vec<f64>,
    pb_history: Vec<f64>,
    roe: f64,
    current_pe: f64,
    current_pb: f64,
  ) -> MockMetricSource {
    let mut mock = MockMetricSource::new();
    mock.expect_latest().returning(move |metric, _entity| {
      let value = match metric {
        "pe" => current_pe,
        "pb" => current_pb,
        other => panic!("unexpected current metric {other}"),
      };
      Ok(MetricSample {
        date: as_of(),
        value,
      })
    });
    mock
      .expect_metric_history()
      .returning(move |metric, _entity, _window| {
        let values = match metric {
          "pe" => pe_history.clone(),
          "pb" => pb_history.clone(),
          "roe" => vec![roe; 10],
          other => panic!("unexpected metric {other}"),
        };
        Ok(history_of(values))
      });
    mock
  }

  fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
  }

  fn strategy() -> IndexStrategy {
    IndexStrategy::new(IndexStrategyConfig::default())
  }

  #[test]
  fn test_systemic_low_wins_over_relative_low() {
    // pe 5 / pb 0.95 satisfies the relative-low zone too (both are at
    // the bottom of their histories); the systemic override must win.
    let mock = source(
      (10..=30).map(f64::from).collect(),
      (1..=4).map(f64::from).collect(),
      0.12,
      5.0,
      0.95,
    );
    let rec = strategy().evaluate(&mock, "000300", as_of(), 0.035).unwrap();
    assert_eq!(rec.gate, Gate::SystemicLow);
    assert_eq!(rec.position_delta, 1.0);
  }

  #[test]
  fn test_systemic_high_sells_all() {
    let mock = source(
      (10..=30).map(f64::from).collect(),
      (1..=4).map(f64::from).collect(),
      0.12,
      60.0,
      3.0,
    );
    let rec = strategy().evaluate(&mock, "000300", as_of(), 0.035).unwrap();
    assert_eq!(rec.gate, Gate::SystemicHigh);
    assert_eq!(rec.position_delta, -1.0);
  }

  #[test]
  fn test_relative_low_sizes_a_kelly_buy() {
    // pe 11 sits near the bottom decile of [10, 30]; pb 1.1 near the
    // bottom of [1, 4] and under the absolute cap.
    let mock = source(
      (10..=30).map(f64::from).collect(),
      (10..=40).map(|v| f64::from(v) / 10.0).collect(),
      0.20,
      11.0,
      1.1,
    );
    let rec = strategy().evaluate(&mock, "000300", as_of(), 0.035).unwrap();
    assert_eq!(rec.gate, Gate::RelativeLow);
    assert!(rec.position_delta >= 0.0, "buy side never goes negative");
    assert!(rec.diagnostics.win_rate.is_some());
    assert!(rec.diagnostics.odds.is_some());
  }

  #[test]
  fn test_relative_high_uses_sell_table() {
    // pe 29 / pb 3.9 sit at the very top of their histories but below
    // the systemic ceilings.
    let mock = source(
      (10..=30).map(f64::from).collect(),
      (10..=40).map(|v| f64::from(v) / 10.0).collect(),
      0.12,
      29.0,
      3.9,
    );
    let rec = strategy().evaluate(&mock, "000300", as_of(), 0.035).unwrap();
    assert_eq!(rec.gate, Gate::RelativeHigh);
    assert_eq!(rec.position_delta, sell_step(rec.diagnostics.pe_quantile));
    assert!(rec.position_delta < 0.0);
  }

  #[test]
  fn test_middle_of_history_holds() {
    // Debt rate low enough that neither yield arm fires: the 5% yield
    // sits between 3x 1.5% (buy) and 2x 1.5% (sell).
    let mock = source(
      (10..=30).map(f64::from).collect(),
      (10..=40).map(|v| f64::from(v) / 10.0).collect(),
      0.12,
      20.0,
      2.5,
    );
    let rec = strategy().evaluate(&mock, "000300", as_of(), 0.015).unwrap();
    assert_eq!(rec.gate, Gate::Hold);
    assert_eq!(rec.position_delta, 0.0);
  }

  #[test]
  fn test_cheap_earnings_yield_buys_even_with_middling_pe_rank() {
    // pb rank is low and 1/pe = 10% is far above 3x the debt rate, so
    // the yield arm of the relative-low gate fires alone.
    let mock = source(
      (8..=12).map(f64::from).collect(),
      (10..=40).map(|v| f64::from(v) / 10.0).collect(),
      0.20,
      10.0,
      1.05,
    );
    let rec = strategy().evaluate(&mock, "000300", as_of(), 0.02).unwrap();
    assert_eq!(rec.gate, Gate::RelativeLow);
  }

  #[test]
  fn test_empty_history_is_an_error() {
    let mut mock = MockMetricSource::new();
    mock.expect_latest().returning(|_, _| {
      Ok(MetricSample {
        date: as_of(),
        value: 12.0,
      })
    });
    mock
      .expect_metric_history()
      .returning(|_, _, _| Ok(MetricHistory::default()));
    assert!(strategy().evaluate(&mock, "000300", as_of(), 0.035).is_err());
  }

  #[test]
  fn test_source_without_valid_observations_is_an_error() {
    let mut mock = MockMetricSource::new();
    mock
      .expect_latest()
      .returning(|_, _| Err(ValuationError::InsufficientHistory.into()));
    assert!(strategy().evaluate(&mock, "000300", as_of(), 0.035).is_err());
  }
}
