//! Configuration Module - TOML-based Strategy Configuration
//!
//! Loads strategy thresholds from `config.toml`. Every cutoff the gate
//! logic uses (systemic PE ceiling, relative-low percentile, sizing odds,
//! rebalance weights) is a named field here - nothing is hardcoded in the
//! strategy layer. All sections have defaults matching the published
//! strategy write-ups, so an absent file means "stock rules".

pub mod loader;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// Process-level settings.
  #[serde(default)]
  pub general: GeneralConfig,
  /// Equity-index valuation strategy.
  #[serde(default)]
  pub index: IndexStrategyConfig,
  /// Market-wide convertible-bond strategy.
  #[serde(default)]
  pub bond_market: BondMarketConfig,
  /// Double-low convertible screen.
  #[serde(default)]
  pub double_low: DoubleLowConfig,
  /// Two-asset rebalancing backtest.
  #[serde(default)]
  pub rebalance: RebalanceConfig,
}

/// Process-level settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

impl Default for GeneralConfig {
  fn default() -> Self {
    Self {
      log_level: default_log_level(),
    }
  }
}

/// Equity-index strategy thresholds.
///
/// The gates are evaluated in order: systemic overrides first, then the
/// relative (percentile) zones. Defaults reproduce the classic rule set
/// (systemic buy below 7x earnings / 1x book, systemic sell above 50x /
/// 4.5x, percentile zones at 30%/70%).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexStrategyConfig {
  /// Systemic-low override: current PE must be below this floor.
  pub systemic_low_pe: f64,
  /// Systemic-low override: current PB must be below this floor.
  pub systemic_low_pb: f64,
  /// Systemic-low override: PB/PE (an ROE proxy) must exceed this.
  pub systemic_low_roe: f64,
  /// Systemic-high override: current PE above this ceiling sells all.
  pub systemic_high_pe: f64,
  /// Systemic-high override: current PB above this ceiling sells all.
  pub systemic_high_pb: f64,
  /// Relative-low zone percentile cutoff for PE and PB.
  pub relative_low_quantile: f64,
  /// Stricter percentile cutoff at which both metrics alone justify a buy.
  pub deep_low_quantile: f64,
  /// Absolute PB bound accompanying the relative-low zone.
  pub relative_low_pb_cap: f64,
  /// Relative-high zone percentile cutoff for PE and PB.
  pub relative_high_quantile: f64,
  /// Buy when the earnings yield (1/PE) exceeds the risk-free rate times
  /// this multiple.
  pub debt_rate_buy_multiple: f64,
  /// Sell when the earnings yield falls below the risk-free rate times
  /// this multiple.
  pub debt_rate_sell_multiple: f64,
  /// Default ten-year government bond rate when none is supplied.
  pub national_debt_rate: f64,
  /// Target annualized return assumed when sizing a buy.
  pub target_annual_return: f64,
  /// Holding horizon (years) over which the target return compounds.
  pub horizon_years: u32,
  /// Look-back window length in years.
  pub history_years: u32,
  /// Keep every n-th trading observation of the history.
  pub sample_stride: usize,
}

impl Default for IndexStrategyConfig {
  fn default() -> Self {
    Self {
      systemic_low_pe: 7.0,
      systemic_low_pb: 1.0,
      systemic_low_roe: 0.18,
      systemic_high_pe: 50.0,
      systemic_high_pb: 4.5,
      relative_low_quantile: 0.3,
      deep_low_quantile: 0.1,
      relative_low_pb_cap: 2.0,
      relative_high_quantile: 0.7,
      debt_rate_buy_multiple: 3.0,
      debt_rate_sell_multiple: 2.0,
      national_debt_rate: 0.035,
      target_annual_return: 0.15,
      horizon_years: 5,
      history_years: 5,
      sample_stride: 7,
    }
  }
}

/// Market-wide convertible-bond strategy thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BondMarketConfig {
  /// Bonds at or below this price count as underrated.
  pub underrate_price: f64,
  /// Fixed payoff odds for the Kelly sizing.
  pub kelly_odds: f64,
  /// Only add when the market's average price is below this.
  pub buy_price_cap: f64,
  /// Only add when the market's average premium ratio is below this.
  pub buy_premium_cap: f64,
  /// Look-back window length in years.
  pub history_years: u32,
}

impl Default for BondMarketConfig {
  fn default() -> Self {
    Self {
      underrate_price: 110.0,
      kelly_odds: 2.3,
      buy_price_cap: 120.0,
      buy_premium_cap: 0.30,
      history_years: 3,
    }
  }
}

/// Double-low screen cutoffs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DoubleLowConfig {
  /// Minimum outstanding amount (yuan); tiny issues are too squeezable.
  pub min_outstanding: f64,
  /// Maximum outstanding amount (yuan); huge issues move like rates.
  pub max_outstanding: f64,
  /// Minimum daily turnover (yuan) to ensure an exit exists.
  pub min_day_turnover: f64,
  /// Maximum conversion premium ratio.
  pub max_premium_ratio: f64,
  /// Maximum double-low score.
  pub max_double_low: f64,
  /// Underlying-stock PB floor (keeps a convert-price cut available).
  pub min_stock_pb: f64,
  /// Underlying-stock PE/PB history percentile ceiling.
  pub max_stock_quantile: f64,
}

impl Default for DoubleLowConfig {
  fn default() -> Self {
    Self {
      min_outstanding: 1e8,
      max_outstanding: 1e9,
      min_day_turnover: 1e6,
      max_premium_ratio: 0.15,
      max_double_low: 125.0,
      min_stock_pb: 1.3,
      max_stock_quantile: 0.5,
    }
  }
}

/// Rebalancing backtest parameters not taken from the command line.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RebalanceConfig {
  /// Starting capital of the simulated portfolio.
  pub initial_capital: f64,
  /// Risk-asset share restored at every rebalance.
  pub target_risk_weight: f64,
}

impl Default for RebalanceConfig {
  fn default() -> Self {
    Self {
      initial_capital: 10_000.0,
      target_risk_weight: 0.3,
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}
