//! Historical percentile ranking via decile interpolation.
//!
//! Turns "current PE is 12" into "current PE sits at the 35th percentile
//! of its own history". The rank is computed against the 11 decile
//! breakpoints of the sample set rather than the raw samples, which keeps
//! the result stable for the modest series sizes we work with
//! (a few hundred to a couple thousand points).

use super::errors::ValuationError;

/// Number of decile breakpoints (0th, 10th, ..., 100th percentile).
const BREAKPOINTS: usize = 11;

/// Computes the 11 decile breakpoints of `values`.
///
/// Uses the linear-interpolation quantile method: the i-th breakpoint is
/// the value at fractional position `i/10 * (n-1)` of the sorted samples.
///
/// # Errors
/// Returns [`ValuationError::InsufficientHistory`] if `values` is empty.
pub fn decile_breakpoints(values: &[f64]) -> Result<[f64; BREAKPOINTS], ValuationError> {
    if values.is_empty() {
        return Err(ValuationError::InsufficientHistory);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mut breakpoints = [0.0; BREAKPOINTS];
    for (i, slot) in breakpoints.iter_mut().enumerate() {
        let pos = i as f64 / 10.0 * (n - 1) as f64;
        let lo = pos.floor() as usize;
        let frac = pos - lo as f64;
        *slot = if lo + 1 < n {
            sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
        } else {
            sorted[n - 1]
        };
    }
    Ok(breakpoints)
}

/// Returns the percentile rank of `observation` within `history`, in [0, 1].
///
/// A rank of 0.7 means roughly 70% of the historical samples sit at or
/// below the observation. The observation is located among the decile
/// breakpoints with upper-bound semantics (ties with a breakpoint insert
/// after equal elements) and the rank is linearly interpolated inside the
/// enclosing decile.
///
/// Observations at or above the top breakpoint rank 1.0; observations
/// below the bottom breakpoint rank 0.0. A zero-width decile (many
/// repeated values) contributes no interpolation and ranks at its upper
/// boundary.
///
/// The result is monotonically non-decreasing in `observation` for a
/// fixed `history`, and the function is pure.
///
/// # Errors
/// Returns [`ValuationError::InsufficientHistory`] if `history` is empty.
pub fn quantile_rank(observation: f64, history: &[f64]) -> Result<f64, ValuationError> {
    let breakpoints = decile_breakpoints(history)?;
    Ok(rank_among(observation, &breakpoints))
}

/// Ranks `observation` among precomputed decile breakpoints.
fn rank_among(observation: f64, breakpoints: &[f64; BREAKPOINTS]) -> f64 {
    // Upper-bound insertion index: first breakpoint strictly above the
    // observation. Equal breakpoints sort before the observation.
    let idx = breakpoints.partition_point(|&b| b <= observation);

    if idx >= 10 {
        return 1.0;
    }
    if idx == 0 {
        // Below the recorded minimum decile boundary.
        return 0.0;
    }

    let upper = breakpoints[idx];
    let lower = breakpoints[idx - 1];
    let width = upper - lower;
    if width <= 0.0 {
        // Flat decile: no meaningful interpolation across a zero-width
        // interval, rank at the boundary itself.
        return idx as f64 / 10.0;
    }

    (idx as f64 - (upper - observation) / width) / 10.0
}
