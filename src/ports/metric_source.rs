//! Metric Source Port - Historical Valuation Series Interface
//!
//! The strategies only ever see ordered `(date, value)` observations; how
//! they are obtained (vendor API, local CSV export) is an adapter
//! concern. Calls are ordinary blocking calls: the whole pipeline is a
//! single sequential pass and any retry/backoff policy belongs to the
//! data collaborator, not here.

use anyhow::Result;
use chrono::NaiveDate;

use crate::domain::series::{MetricHistory, MetricSample};

/// Bounded look-back window with a sampling stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
  /// First date of the window (inclusive).
  pub begin: NaiveDate,
  /// Last date of the window (exclusive).
  pub end: NaiveDate,
  /// Keep every `stride`-th trading observation (1 = keep all). Bounds
  /// compute cost on long windows.
  pub stride: usize,
}

impl HistoryWindow {
  /// Window covering `[begin, end)` with the given stride.
  pub fn new(begin: NaiveDate, end: NaiveDate, stride: usize) -> Self {
    Self {
      begin,
      end,
      stride: stride.max(1),
    }
  }

  /// True when `date` falls inside the window.
  pub fn contains(&self, date: NaiveDate) -> bool {
    date >= self.begin && date < self.end
  }
}

/// Provider of historical metric observations for one entity.
///
/// Implementors must return samples strictly within the window, ordered
/// by date, with observations whose underlying fundamentals are invalid
/// (e.g. negative earnings) already dropped.
#[cfg_attr(test, mockall::automock)]
pub trait MetricSource {
  /// Historical series of `metric` for `entity` over `window`.
  fn metric_history(
    &self,
    metric: &str,
    entity: &str,
    window: &HistoryWindow,
  ) -> Result<MetricHistory>;

  /// Most recent valid observation of `metric` for `entity`, with its
  /// date. This is the "current value" the strategies gate on; it may
  /// sit earlier than the newest raw row when the latest fundamentals
  /// are invalid.
  fn latest(&self, metric: &str, entity: &str) -> Result<MetricSample>;
}
