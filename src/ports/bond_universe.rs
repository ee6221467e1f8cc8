//! Bond Universe Port - Convertible Market Data Interface
//!
//! Supplies the per-bond universe snapshot the double-low screen works
//! on and the per-day market aggregates the market-wide strategy ranks
//! against its own history.

use anyhow::Result;
use chrono::NaiveDate;

use crate::domain::bond::{BondMarketAggregates, BondSnapshot};
use crate::ports::metric_source::HistoryWindow;

/// Provider of the convertible-bond universe.
///
/// Suspended issues, not-yet-listed announcements and force-redeemed
/// bonds are already excluded; when an actual close is unavailable the
/// source substitutes par value (a domain fallback, not an error).
#[cfg_attr(test, mockall::automock)]
pub trait BondUniverseSource {
  /// All live bonds as of `date`, with screen inputs populated.
  fn bonds(&self, date: NaiveDate) -> Result<Vec<BondSnapshot>>;

  /// Market-wide aggregates as of `date`.
  fn market_aggregates(&self, date: NaiveDate) -> Result<BondMarketAggregates>;

  /// Daily aggregate history over `window`, ordered by date.
  fn market_history(&self, window: &HistoryWindow) -> Result<Vec<(NaiveDate, BondMarketAggregates)>>;
}
