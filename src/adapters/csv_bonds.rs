//! Bond Universe Source - CSV-backed Convertible Market Data
//!
//! Reads a daily convertible-universe export (one row per bond per day)
//! and serves both the per-bond snapshots the double-low screen works on
//! and the per-day market aggregates the market-wide strategy needs.
//!
//! Columns: `date,code,name,stock_code,close,convert_price,stock_price,
//! outstanding,day_turnover[,par,stock_pe,stock_pb,stock_pe_quantile,
//! stock_pb_quantile]`. A blank close means the issue has not published a
//! quote yet; the source falls back to par (a domain convention for
//! fresh issues, not an error). Blank stock columns mean the underlying's
//! report data is unusable and leave [`BondSnapshot::stock`] empty.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::domain::bond::{
    conversion_premium, BondMarketAggregates, BondSnapshot, StockValuation,
};
use crate::domain::errors::ValuationError;
use crate::ports::bond_universe::BondUniverseSource;
use crate::ports::metric_source::HistoryWindow;

#[derive(Debug, Clone, Deserialize)]
struct BondRow {
    date: NaiveDate,
    code: String,
    name: String,
    stock_code: String,
    close: Option<f64>,
    convert_price: f64,
    stock_price: f64,
    outstanding: f64,
    day_turnover: f64,
    #[serde(default)]
    par: Option<f64>,
    #[serde(default)]
    stock_pe: Option<f64>,
    #[serde(default)]
    stock_pb: Option<f64>,
    #[serde(default)]
    stock_pe_quantile: Option<f64>,
    #[serde(default)]
    stock_pb_quantile: Option<f64>,
}

/// `BondUniverseSource` backed by a daily universe CSV.
#[derive(Debug, Clone)]
pub struct CsvBondUniverse {
    by_date: BTreeMap<NaiveDate, Vec<BondSnapshot>>,
    underrate_price: f64,
}

impl CsvBondUniverse {
    /// Load the universe file.
    ///
    /// `underrate_price` is the price at or below which a bond counts as
    /// underrated in the market aggregates.
    ///
    /// # Errors
    /// Fails with [`ValuationError::DataFormat`] on malformed rows.
    pub fn from_path(path: &Path, underrate_price: f64) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open bond universe file: {}", path.display()))?;

        let mut by_date: BTreeMap<NaiveDate, Vec<BondSnapshot>> = BTreeMap::new();
        let mut rows = 0usize;
        for (i, result) in reader.deserialize().enumerate() {
            let row: BondRow = result.map_err(|e| {
                ValuationError::DataFormat(format!("line {}: {e}", i + 2))
            })?;
            rows += 1;

            // Par fallback for issues without a published close yet.
            let price = row.close.unwrap_or_else(|| row.par.unwrap_or(100.0));
            if price < 1.0 {
                // Suspended; the exchange reports a placeholder quote.
                continue;
            }

            let premium_ratio =
                conversion_premium(price, row.convert_price, row.stock_price);
            let stock = match (row.stock_pe, row.stock_pb, row.stock_pe_quantile, row.stock_pb_quantile)
            {
                (Some(pe), Some(pb), Some(pe_quantile), Some(pb_quantile)) => Some(StockValuation {
                    pe,
                    pb,
                    pe_quantile,
                    pb_quantile,
                }),
                _ => None,
            };

            by_date.entry(row.date).or_default().push(BondSnapshot {
                code: row.code,
                name: row.name,
                stock_code: row.stock_code,
                price,
                premium_ratio,
                outstanding: row.outstanding,
                day_turnover: row.day_turnover,
                stock,
            });
        }

        debug!(path = %path.display(), rows, days = by_date.len(), "Bond universe loaded");
        Ok(Self {
            by_date,
            underrate_price,
        })
    }

    /// Date of the most recent universe snapshot in the file.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.by_date.keys().next_back().copied()
    }

    fn aggregates_of(&self, bonds: &[BondSnapshot]) -> Result<BondMarketAggregates> {
        if bonds.is_empty() {
            return Err(ValuationError::InsufficientHistory.into());
        }
        let total_outstanding: f64 = bonds.iter().map(|b| b.outstanding).sum();
        let underrate_outstanding: f64 = bonds
            .iter()
            .filter(|b| b.price <= self.underrate_price)
            .map(|b| b.outstanding)
            .sum();
        let n = bonds.len() as f64;
        let avg_price = bonds.iter().map(|b| b.price).sum::<f64>() / n;
        let avg_premium_ratio = bonds.iter().map(|b| b.premium_ratio).sum::<f64>() / n;
        Ok(BondMarketAggregates {
            total_outstanding,
            underrate_outstanding,
            avg_price,
            avg_premium_ratio,
        })
    }
}

impl BondUniverseSource for CsvBondUniverse {
    fn bonds(&self, date: NaiveDate) -> Result<Vec<BondSnapshot>> {
        Ok(self.by_date.get(&date).cloned().unwrap_or_default())
    }

    fn market_aggregates(&self, date: NaiveDate) -> Result<BondMarketAggregates> {
        let bonds = self
            .by_date
            .get(&date)
            .ok_or(ValuationError::InsufficientHistory)?;
        self.aggregates_of(bonds)
    }

    fn market_history(
        &self,
        window: &HistoryWindow,
    ) -> Result<Vec<(NaiveDate, BondMarketAggregates)>> {
        let mut history = Vec::new();
        let mut day = 0usize;
        for (date, bonds) in &self.by_date {
            if !window.contains(*date) {
                continue;
            }
            day += 1;
            if day % window.stride != 0 {
                continue;
            }
            history.push((*date, self.aggregates_of(bonds)?));
        }
        Ok(history)
    }
}
