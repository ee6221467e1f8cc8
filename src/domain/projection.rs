//! Expected-value projection for buy-side odds derivation.
//!
//! When a strategy decides the market is cheap, the payoff odds are not
//! fixed: they come from assuming a target annualized return sustained
//! over a holding horizon, and the win probability comes from asking the
//! historical valuation distribution how often an exit at the projected
//! fair multiple would have been possible.

use super::errors::ValuationError;
use super::quantile::quantile_rank;

/// Growth assumption behind a buy recommendation.
#[derive(Debug, Clone, Copy)]
pub struct GrowthProjection {
    /// Target annualized return rate (e.g., 0.15 for 15%).
    pub target_annual_return: f64,
    /// Holding horizon in years over which the return compounds.
    pub horizon_years: u32,
}

impl GrowthProjection {
    /// Creates a projection from a target return and horizon.
    pub fn new(target_annual_return: f64, horizon_years: u32) -> Self {
        Self {
            target_annual_return,
            horizon_years,
        }
    }

    /// Payoff odds: the growth multiple `(1 + r)^n`.
    pub fn odds(&self) -> f64 {
        (1.0 + self.target_annual_return).powi(self.horizon_years as i32)
    }

    /// Valuation multiple we would need to exit at, assuming fundamentals
    /// compound at `avg_profitability` while the price delivers the
    /// target return.
    ///
    /// The target growth multiple is decompressed into earnings growth
    /// and multiple expansion: whatever the fundamentals do not deliver,
    /// the exit multiple must.
    pub fn expected_exit_metric(&self, current_metric: f64, avg_profitability: f64) -> f64 {
        let fundamental_growth = (1.0 + avg_profitability).powi(self.horizon_years as i32);
        self.odds() / fundamental_growth * current_metric
    }

    /// Probability that the historical valuation distribution would have
    /// allowed an exit at or above the projected fair multiple.
    ///
    /// `1 - quantile_rank(expected_exit_metric, history)`: the higher the
    /// projected exit multiple sits in the metric's own history, the less
    /// often the market has paid it.
    ///
    /// # Errors
    /// Returns [`ValuationError::InsufficientHistory`] if `history` is
    /// empty.
    pub fn win_rate(
        &self,
        current_metric: f64,
        avg_profitability: f64,
        history: &[f64],
    ) -> Result<f64, ValuationError> {
        let exit_metric = self.expected_exit_metric(current_metric, avg_profitability);
        Ok(1.0 - quantile_rank(exit_metric, history)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odds_compound() {
        let proj = GrowthProjection::new(0.15, 5);
        let expected = 1.15_f64.powi(5);
        assert!((proj.odds() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_exit_metric_when_profitability_matches_target() {
        // Fundamentals growing at the target rate need no multiple
        // expansion: the exit multiple equals the entry multiple.
        let proj = GrowthProjection::new(0.10, 5);
        let exit = proj.expected_exit_metric(12.0, 0.10);
        assert!((exit - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_exit_metric_expands_when_profitability_lags() {
        let proj = GrowthProjection::new(0.15, 5);
        let exit = proj.expected_exit_metric(10.0, 0.08);
        assert!(exit > 10.0, "lagging fundamentals require multiple expansion");
    }

    #[test]
    fn test_win_rate_high_when_exit_is_cheap() {
        let proj = GrowthProjection::new(0.10, 5);
        let history: Vec<f64> = (10..=30).map(f64::from).collect();
        // ROE well above the target keeps the exit multiple below the
        // whole historical range.
        let win = proj.win_rate(10.0, 0.25, &history).unwrap();
        assert!((win - 1.0).abs() < 1e-9, "got {win}");
    }

    #[test]
    fn test_win_rate_zero_when_exit_above_history() {
        let proj = GrowthProjection::new(0.15, 5);
        let history: Vec<f64> = (10..=30).map(f64::from).collect();
        let win = proj.win_rate(35.0, 0.0, &history).unwrap();
        assert!(win.abs() < 1e-9, "got {win}");
    }

    #[test]
    fn test_win_rate_requires_history() {
        let proj = GrowthProjection::new(0.15, 5);
        assert!(proj.win_rate(10.0, 0.1, &[]).is_err());
    }
}
