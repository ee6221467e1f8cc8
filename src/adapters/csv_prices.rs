//! Price Series Loader - Two-column CSV Input
//!
//! Reads the `date,price` files the rebalancing backtest consumes, one
//! row per trading day, dates in `YYYY-MM-DD`. Corrupted rows are a hard
//! stop: a time series with silently skipped days would make the
//! backtest lie.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::domain::errors::ValuationError;

/// One trading day's closing price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricePoint {
    /// Trading date.
    pub date: NaiveDate,
    /// Closing price.
    pub price: Decimal,
}

/// Load a `date,price` CSV into an ordered price series.
///
/// # Errors
/// Fails with [`ValuationError::DataFormat`] on a malformed date or a
/// non-numeric price, and with an I/O error when the file can't be read.
pub fn load_price_series(path: &Path) -> Result<Vec<PricePoint>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open price file: {}", path.display()))?;

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    let date_col = column_index(&headers, "date", path)?;
    let price_col = column_index(&headers, "price", path)?;

    let mut series = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read row {}", i + 2))?;
        let line = i + 2; // header is line 1

        let date_field = record.get(date_col).unwrap_or("");
        let date = NaiveDate::parse_from_str(date_field.trim(), "%Y-%m-%d").map_err(|_| {
            ValuationError::DataFormat(format!(
                "line {line}: malformed date {date_field:?}, expected YYYY-MM-DD"
            ))
        })?;

        let price_field = record.get(price_col).unwrap_or("");
        let price = Decimal::from_str(price_field.trim()).map_err(|_| {
            ValuationError::DataFormat(format!("line {line}: non-numeric price {price_field:?}"))
        })?;

        series.push(PricePoint { date, price });
    }

    debug!(path = %path.display(), rows = series.len(), "Price series loaded");
    Ok(series)
}

fn column_index(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            ValuationError::DataFormat(format!(
                "{}: missing required column {name:?}",
                path.display()
            ))
            .into()
        })
}
