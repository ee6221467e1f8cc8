//! Fundamentals Source - CSV-backed MetricSource
//!
//! Reads a per-entity export with columns `date,pe,pb,roe` (one row per
//! trading day) and serves windowed, strided metric histories from it.
//! Blank cells mark days where the underlying fundamentals were invalid
//! (negative earnings, missing reports); those observations simply never
//! enter a history - partial data is routine, not an error.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::domain::errors::ValuationError;
use crate::domain::series::{MetricHistory, MetricSample};
use crate::ports::metric_source::{HistoryWindow, MetricSource};

#[derive(Debug, Clone, Deserialize)]
struct FundamentalsRow {
    date: NaiveDate,
    pe: Option<f64>,
    pb: Option<f64>,
    roe: Option<f64>,
}

/// `MetricSource` backed by a single-entity fundamentals CSV.
#[derive(Debug, Clone)]
pub struct CsvMetricSource {
    rows: Vec<FundamentalsRow>,
}

impl CsvMetricSource {
    /// Load the fundamentals file for one entity.
    ///
    /// # Errors
    /// Fails with [`ValuationError::DataFormat`] on malformed rows.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open fundamentals file: {}", path.display()))?;

        let mut rows: Vec<FundamentalsRow> = Vec::new();
        for (i, result) in reader.deserialize().enumerate() {
            let row: FundamentalsRow = result.map_err(|e| {
                ValuationError::DataFormat(format!("line {}: {e}", i + 2))
            })?;
            rows.push(row);
        }
        rows.sort_by_key(|r| r.date);

        debug!(path = %path.display(), rows = rows.len(), "Fundamentals loaded");
        Ok(Self { rows })
    }

    /// Date of the last row in the file, valid or not.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    fn pick(row: &FundamentalsRow, metric: &str) -> Result<Option<f64>> {
        let value = match metric {
            "pe" => row.pe,
            "pb" => row.pb,
            "roe" => row.roe,
            other => {
                return Err(ValuationError::DataFormat(format!(
                    "unknown metric {other:?}, expected pe/pb/roe"
                ))
                .into())
            }
        };
        // Valuation ratios are positive by construction; anything else is
        // a broken report.
        Ok(value.filter(|v| *v > 0.0 && v.is_finite()))
    }
}

impl MetricSource for CsvMetricSource {
    fn metric_history(
        &self,
        metric: &str,
        entity: &str,
        window: &HistoryWindow,
    ) -> Result<MetricHistory> {
        let mut samples = Vec::new();
        let mut day = 0usize;
        for row in &self.rows {
            if !window.contains(row.date) {
                continue;
            }
            day += 1;
            if day % window.stride != 0 {
                continue;
            }
            if let Some(value) = Self::pick(row, metric)? {
                samples.push(MetricSample { date: row.date, value });
            }
        }

        debug!(
            metric,
            entity,
            samples = samples.len(),
            stride = window.stride,
            "Metric history assembled"
        );
        Ok(MetricHistory::new(samples))
    }

    fn latest(&self, metric: &str, entity: &str) -> Result<MetricSample> {
        for row in self.rows.iter().rev() {
            if let Some(value) = Self::pick(row, metric)? {
                debug!(metric, entity, date = %row.date, "Latest valid observation");
                return Ok(MetricSample { date: row.date, value });
            }
        }
        Err(ValuationError::InsufficientHistory.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn source(content: &str) -> CsvMetricSource {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        CsvMetricSource::from_path(file.path()).unwrap()
    }

    fn window(begin: (i32, u32, u32), end: (i32, u32, u32), stride: usize) -> HistoryWindow {
        HistoryWindow::new(
            NaiveDate::from_ymd_opt(begin.0, begin.1, begin.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            stride,
        )
    }

    #[test]
    fn test_blank_cells_are_dropped() {
        let src = source(
            "date,pe,pb,roe\n\
             2024-01-01,10.0,1.5,0.15\n\
             2024-01-02,,1.4,0.14\n\
             2024-01-03,11.0,1.6,0.15\n",
        );
        let history = src
            .metric_history("pe", "000300", &window((2024, 1, 1), (2025, 1, 1), 1))
            .unwrap();
        assert_eq!(history.values(), vec![10.0, 11.0]);
    }

    #[test]
    fn test_non_positive_values_are_dropped() {
        let src = source(
            "date,pe,pb,roe\n\
             2024-01-01,-5.0,1.5,0.15\n\
             2024-01-02,12.0,1.4,0.14\n",
        );
        let history = src
            .metric_history("pe", "000300", &window((2024, 1, 1), (2025, 1, 1), 1))
            .unwrap();
        assert_eq!(history.values(), vec![12.0]);
    }

    #[test]
    fn test_stride_keeps_every_nth_trading_day() {
        let src = source(
            "date,pe,pb,roe\n\
             2024-01-01,10.0,1.0,0.1\n\
             2024-01-02,11.0,1.1,0.1\n\
             2024-01-03,12.0,1.2,0.1\n\
             2024-01-04,13.0,1.3,0.1\n",
        );
        let history = src
            .metric_history("pe", "000300", &window((2024, 1, 1), (2025, 1, 1), 2))
            .unwrap();
        assert_eq!(history.values(), vec![11.0, 13.0]);
    }

    #[test]
    fn test_window_is_half_open() {
        let src = source(
            "date,pe,pb,roe\n\
             2023-12-31,9.0,1.0,0.1\n\
             2024-01-01,10.0,1.0,0.1\n\
             2024-06-30,11.0,1.0,0.1\n\
             2024-07-01,12.0,1.0,0.1\n",
        );
        let history = src
            .metric_history("pe", "000300", &window((2024, 1, 1), (2024, 7, 1), 1))
            .unwrap();
        assert_eq!(history.values(), vec![10.0, 11.0]);
    }

    #[test]
    fn test_unknown_metric_rejected() {
        let src = source("date,pe,pb,roe\n2024-01-01,10.0,1.0,0.1\n");
        assert!(src
            .metric_history("eps", "000300", &window((2024, 1, 1), (2025, 1, 1), 1))
            .is_err());
    }

    #[test]
    fn test_latest_skips_invalid_tail() {
        let src = source(
            "date,pe,pb,roe\n\
             2024-01-01,10.0,1.0,0.1\n\
             2024-01-02,,1.1,0.1\n",
        );
        let latest = src.latest("pe", "000300").unwrap();
        assert_eq!(latest.value, 10.0);
        assert_eq!(latest.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }
}
