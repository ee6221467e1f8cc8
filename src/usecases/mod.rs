//! Usecases Layer - Strategy Orchestration
//!
//! Wires the pure domain math to the ports. Each usecase is one
//! published strategy:
//! - `index_strategy`: equity-index valuation gates + Kelly buy sizing
//! - `bond_market`: market-wide convertible positioning
//! - `double_low`: per-bond double-low screen
//! - `rebalance_backtest`: two-asset threshold-rebalancing backtest
//! - `hold_ladder`: holding-period win-rate report

pub mod bond_market;
pub mod double_low;
pub mod hold_ladder;
pub mod index_strategy;
pub mod rebalance_backtest;

pub use bond_market::{BondMarketRecommendation, BondMarketStrategy};
pub use double_low::DoubleLowScreen;
pub use hold_ladder::{ladder_report, LadderRung, HOLD_LADDER};
pub use index_strategy::{Gate, IndexStrategy, Recommendation};
pub use rebalance_backtest::{run_backtest, BacktestParams, BacktestReport};
