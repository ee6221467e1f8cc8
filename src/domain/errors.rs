//! Domain error types.
//!
//! Percentile math over a filtered history can legitimately run out of
//! samples, and CSV-backed sources can hand us corrupted rows. Both are
//! surfaced as typed errors so callers can tell "no data" apart from
//! "bad data".

use thiserror::Error;

/// Errors produced by the valuation domain and its data adapters.
#[derive(Debug, Error)]
pub enum ValuationError {
    /// The historical sample set is empty after filtering invalid values.
    ///
    /// Percentile ranks are undefined on an empty history; callers must
    /// not receive a made-up rank.
    #[error("insufficient history: no valid samples to rank against")]
    InsufficientHistory,

    /// Kelly odds must be strictly positive.
    #[error("invalid odds {0}: payoff odds must be > 0")]
    InvalidOdds(f64),

    /// A time series file contained a row the pipeline cannot recover from
    /// (malformed date, non-numeric price).
    #[error("data format error: {0}")]
    DataFormat(String),
}
