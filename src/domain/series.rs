//! Metric time-series types.
//!
//! A [`MetricHistory`] is an ordered-by-date sequence of scalar
//! observations of one metric (PE, PB, average bond price, ...) over a
//! bounded look-back window. Samples with invalid underlying fundamentals
//! (negative earnings, suspended quotes) never make it in; the data
//! sources drop them at collection time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A scalar financial ratio observed on a specific date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Observation date.
    pub date: NaiveDate,
    /// Observed value. Always finite; undefined observations are excluded
    /// before construction.
    pub value: f64,
}

/// Ordered-by-date samples of one metric over a bounded window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricHistory {
    samples: Vec<MetricSample>,
}

impl MetricHistory {
    /// Builds a history from samples already ordered by date.
    pub fn new(samples: Vec<MetricSample>) -> Self {
        debug_assert!(
            samples.windows(2).all(|w| w[0].date <= w[1].date),
            "samples must be ordered by date"
        );
        Self { samples }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when no valid samples survived collection.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The raw observation values, in date order.
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// Arithmetic mean of the observation values.
    ///
    /// Returns `None` on an empty history.
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().map(|s| s.value).sum();
        Some(sum / self.samples.len() as f64)
    }

    /// The most recent sample.
    pub fn last(&self) -> Option<&MetricSample> {
        self.samples.last()
    }

    /// Iterates over the samples in date order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricSample> {
        self.samples.iter()
    }
}

/// Fraction of start points for which holding the asset for `hold_slots`
/// observations did not lose money.
///
/// For each index `i` with `i + hold_slots` in range, the hold is a win
/// when `prices[i + hold_slots] >= prices[i]`. Returns 0.0 when the series
/// is shorter than the holding period.
pub fn holding_win_rate(prices: &[f64], hold_slots: usize) -> f64 {
    if hold_slots == 0 || prices.len() <= hold_slots {
        return 0.0;
    }

    let window = &prices[..prices.len() - hold_slots];
    let wins = window
        .iter()
        .enumerate()
        .filter(|(i, &start)| prices[i + hold_slots] >= start)
        .count();
    wins as f64 / window.len() as f64
}
