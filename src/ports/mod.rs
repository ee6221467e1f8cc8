//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires from
//! the market-data world. Adapters implement these traits.
//!
//! Port categories:
//! - `MetricSource`: historical fundamentals/valuation series per entity
//! - `BondUniverseSource`: convertible-bond universe and market aggregates

pub mod bond_universe;
pub mod metric_source;

pub use bond_universe::BondUniverseSource;
pub use metric_source::{HistoryWindow, MetricSource};
