//! Kelly-criterion position sizing.
//!
//! Two deliberately different policies coexist:
//! - the continuous Kelly fraction for buy-side sizing, and
//! - a discrete stepwise risk-off table for sell-side liquidation.
//!
//! The asymmetry is inherited from the strategies themselves (gradual,
//! odds-aware accumulation vs hard percentile-triggered de-risking) and
//! the two are kept as separately testable modes.

use super::errors::ValuationError;

/// What to do with a negative Kelly fraction.
///
/// Both policies exist among the strategies: the equity-index flavor
/// treats a negative edge as "do not buy" and holds at zero, while the
/// bond-market flavor passes the negative fraction through as "unwind
/// this share of the held position".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingMode {
    /// Negative fractions clamp to 0.0 (never recommend a short).
    ClampToZero,
    /// Negative fractions are returned as-is (actively reduce).
    PassThrough,
}

/// Raw Kelly fraction `f = (odds * win_rate - (1 - win_rate)) / odds`.
///
/// `odds` is the ratio of potential gain to potential loss for a winning
/// outcome. The result may be negative when the edge is against us.
///
/// # Errors
/// Returns [`ValuationError::InvalidOdds`] when `odds <= 0`.
pub fn kelly_fraction(win_rate: f64, odds: f64) -> Result<f64, ValuationError> {
    if odds <= 0.0 {
        return Err(ValuationError::InvalidOdds(odds));
    }
    Ok((odds * win_rate - (1.0 - win_rate)) / odds)
}

/// Kelly sizer with an explicit negative-fraction policy.
#[derive(Debug, Clone, Copy)]
pub struct KellySizer {
    mode: SizingMode,
}

impl KellySizer {
    /// Creates a sizer with the given negative-fraction policy.
    pub fn new(mode: SizingMode) -> Self {
        Self { mode }
    }

    /// Recommended capital fraction for the given win probability and odds.
    ///
    /// # Errors
    /// Returns [`ValuationError::InvalidOdds`] when `odds <= 0`.
    pub fn size(&self, win_rate: f64, odds: f64) -> Result<f64, ValuationError> {
        let fraction = kelly_fraction(win_rate, odds)?;
        Ok(match self.mode {
            SizingMode::ClampToZero => fraction.max(0.0),
            SizingMode::PassThrough => fraction,
        })
    }
}

/// Discrete sell-side liquidation table.
///
/// Maps the valuation percentile to a fixed fraction of the held position
/// to liquidate. The steps are a deliberate non-continuous policy choice
/// (hard risk-off bands), not an approximation of a formula:
///
/// | percentile band | fraction |
/// |-----------------|----------|
/// | [0.80, 0.85)    | -0.02    |
/// | [0.85, 0.90)    | -0.10    |
/// | [0.90, 0.95)    | -0.30    |
/// | [0.95, 0.97)    | -0.50    |
/// | [0.97, 0.99)    | -0.70    |
/// | [0.99, 1.00]    | -1.00    |
/// | otherwise       |  0.00    |
pub fn sell_step(percentile: f64) -> f64 {
    if percentile >= 0.99 {
        -1.0
    } else if percentile >= 0.97 {
        -0.7
    } else if percentile >= 0.95 {
        -0.5
    } else if percentile >= 0.90 {
        -0.3
    } else if percentile >= 0.85 {
        -0.1
    } else if percentile >= 0.80 {
        -0.02
    } else {
        0.0
    }
}
