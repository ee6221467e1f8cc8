//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits with concrete data sources. Everything
//! here reads local CSV exports; the vendor-API collaborators that
//! produce those exports live outside this crate.
//!
//! Adapter categories:
//! - `csv_prices`: `(date, price)` series for the rebalancing backtest
//! - `csv_metrics`: per-entity fundamentals implementing `MetricSource`
//! - `csv_bonds`: convertible universe implementing `BondUniverseSource`

pub mod csv_bonds;
pub mod csv_metrics;
pub mod csv_prices;

pub use csv_bonds::CsvBondUniverse;
pub use csv_metrics::CsvMetricSource;
pub use csv_prices::{load_price_series, PricePoint};
