//! Holding-period Win Rates - How Long Until Patience Pays
//!
//! Answers "over this history, how often did holding for N observations
//! end at or above the entry price" for a standard ladder of holding
//! periods. Rungs longer than the series report a zero rate and zero
//! start points rather than erroring; the report stays printable for
//! short files.

use serde::Serialize;
use tracing::info;

use crate::domain::series::holding_win_rate;

/// Standard ladder of holding periods, in observations.
pub const HOLD_LADDER: [usize; 9] = [3, 30, 60, 90, 120, 180, 360, 720, 1080];

/// Win rate of one holding period.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LadderRung {
  /// Holding period in observations.
  pub hold_slots: usize,
  /// Fraction of start points that did not lose money.
  pub win_rate: f64,
  /// Number of start points the rate is computed over.
  pub start_points: usize,
}

/// Computes the win rate for every rung of [`HOLD_LADDER`].
pub fn ladder_report(prices: &[f64]) -> Vec<LadderRung> {
  let report: Vec<LadderRung> = HOLD_LADDER
    .iter()
    .map(|&hold_slots| LadderRung {
      hold_slots,
      win_rate: holding_win_rate(prices, hold_slots),
      start_points: prices.len().saturating_sub(hold_slots),
    })
    .collect();
  info!(observations = prices.len(), "Holding ladder computed");
  report
}
