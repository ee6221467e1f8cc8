//! Double-low Convertible Screen - Cheap-both-ways Candidates
//!
//! Filters one day's convertible universe down to the bonds that are
//! cheap both as a bond (low price, par redemption bounds the downside)
//! and as an equity option (low conversion premium). Each cut is a
//! named, pure predicate applied in a fixed order; the optional stock
//! filter additionally demands that the underlying's valuation leaves
//! room for a convert-price cut.

use std::cmp::Ordering;

use tracing::info;

use crate::config::DoubleLowConfig;
use crate::domain::bond::BondSnapshot;

/// Double-low screen over one day's universe.
pub struct DoubleLowScreen {
  config: DoubleLowConfig,
}

impl DoubleLowScreen {
  /// Creates the screen from its configured cutoffs.
  pub fn new(config: DoubleLowConfig) -> Self {
    Self { config }
  }

  /// Runs the screen, returning survivors sorted by double-low score
  /// ascending.
  ///
  /// With `with_stock_filter` the underlying-stock stages also apply;
  /// bonds without usable stock valuation data fail those stages (and
  /// only those).
  pub fn screen(&self, bonds: &[BondSnapshot], with_stock_filter: bool) -> Vec<BondSnapshot> {
    let mut picks: Vec<BondSnapshot> = bonds
      .iter()
      .filter(|b| self.in_size_band(b))
      .filter(|b| self.liquid(b))
      .filter(|b| self.low_premium(b))
      .filter(|b| self.low_double_low(b))
      .filter(|b| !with_stock_filter || self.stock_supports_cut(b))
      .cloned()
      .collect();
    picks.sort_by(|a, b| {
      a.double_low()
        .partial_cmp(&b.double_low())
        .unwrap_or(Ordering::Equal)
    });

    info!(
      universe = bonds.len(),
      picks = picks.len(),
      with_stock_filter,
      "Double-low screen complete"
    );
    picks
  }

  /// Outstanding amount inside the band: tiny issues are too
  /// squeezable, huge ones trade like rates.
  fn in_size_band(&self, bond: &BondSnapshot) -> bool {
    bond.outstanding > self.config.min_outstanding && bond.outstanding < self.config.max_outstanding
  }

  /// Enough daily turnover that an exit exists.
  fn liquid(&self, bond: &BondSnapshot) -> bool {
    bond.day_turnover > self.config.min_day_turnover
  }

  /// Conversion premium under the cap.
  fn low_premium(&self, bond: &BondSnapshot) -> bool {
    bond.premium_ratio < self.config.max_premium_ratio
  }

  /// Double-low score under the cap.
  fn low_double_low(&self, bond: &BondSnapshot) -> bool {
    bond.double_low() < self.config.max_double_low
  }

  /// Underlying stock cheap enough in its own history, yet with enough
  /// book value above par that a convert-price cut stays available.
  fn stock_supports_cut(&self, bond: &BondSnapshot) -> bool {
    bond.stock.is_some_and(|s| {
      s.pb > self.config.min_stock_pb
        && s.pe_quantile < self.config.max_stock_quantile
        && s.pb_quantile < self.config.max_stock_quantile
    })
  }
}
