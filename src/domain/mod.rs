//! Domain layer - Core valuation and sizing logic.
//!
//! Pure computation only (hexagonal architecture inner ring): percentile
//! ranking, Kelly sizing, growth projection, convertible-bond math and
//! the rebalancing engine. No I/O and no external data dependencies; all
//! types are serializable and testable in isolation.

pub mod bond;
pub mod errors;
pub mod kelly;
pub mod projection;
pub mod quantile;
pub mod rebalance;
pub mod series;

// Re-export core types for convenience
pub use bond::{BondMarketAggregates, BondSnapshot, StockValuation};
pub use errors::ValuationError;
pub use kelly::{kelly_fraction, sell_step, KellySizer, SizingMode};
pub use projection::GrowthProjection;
pub use quantile::{decile_breakpoints, quantile_rank};
pub use rebalance::{PortfolioState, Rebalancer};
pub use series::{holding_win_rate, MetricHistory, MetricSample};
