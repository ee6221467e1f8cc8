//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all thresholds, and
//! providing clear error messages for misconfiguration. A missing file
//! is not an error: the defaults are the published rule set.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// Falls back to the built-in defaults when the file does not exist.
///
/// # Errors
/// Returns detailed error if:
/// - The file exists but can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let config = if path.exists() {
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content)
      .with_context(|| format!("Failed to parse {}", path.display()))?;

    info!(path = %path.display(), "Configuration loaded");
    config
  } else {
    debug!(path = %path.display(), "No config file, using defaults");
    AppConfig::default()
  };

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Positive valuation bounds, ordered floors/ceilings
/// - Percentile cutoffs inside (0, 1) and low < high
/// - Positive sizing odds and horizons
/// - Rebalance weight inside (0, 1)
pub fn validate_config(config: &AppConfig) -> Result<()> {
  let index = &config.index;
  anyhow::ensure!(
    index.systemic_low_pe > 0.0 && index.systemic_low_pb > 0.0,
    "Systemic-low floors must be positive"
  );
  anyhow::ensure!(
    index.systemic_high_pe > index.systemic_low_pe,
    "systemic_high_pe ({}) must exceed systemic_low_pe ({})",
    index.systemic_high_pe,
    index.systemic_low_pe
  );
  anyhow::ensure!(
    index.systemic_high_pb > index.systemic_low_pb,
    "systemic_high_pb ({}) must exceed systemic_low_pb ({})",
    index.systemic_high_pb,
    index.systemic_low_pb
  );
  for (name, q) in [
    ("relative_low_quantile", index.relative_low_quantile),
    ("deep_low_quantile", index.deep_low_quantile),
    ("relative_high_quantile", index.relative_high_quantile),
  ] {
    anyhow::ensure!(
      q > 0.0 && q < 1.0,
      "{} must be in (0, 1), got {}",
      name,
      q
    );
  }
  anyhow::ensure!(
    index.relative_low_quantile < index.relative_high_quantile,
    "relative_low_quantile must be below relative_high_quantile"
  );
  anyhow::ensure!(
    index.deep_low_quantile <= index.relative_low_quantile,
    "deep_low_quantile must not exceed relative_low_quantile"
  );
  anyhow::ensure!(
    index.target_annual_return > 0.0,
    "target_annual_return must be positive, got {}",
    index.target_annual_return
  );
  anyhow::ensure!(index.horizon_years >= 1, "horizon_years must be at least 1");
  anyhow::ensure!(index.history_years >= 1, "history_years must be at least 1");
  anyhow::ensure!(
    index.national_debt_rate > 0.0 && index.national_debt_rate < 1.0,
    "national_debt_rate must be in (0, 1), got {}",
    index.national_debt_rate
  );

  let bond = &config.bond_market;
  anyhow::ensure!(
    bond.kelly_odds > 0.0,
    "kelly_odds must be positive, got {}",
    bond.kelly_odds
  );
  anyhow::ensure!(
    bond.underrate_price > 0.0 && bond.buy_price_cap > 0.0,
    "Bond price thresholds must be positive"
  );
  anyhow::ensure!(
    bond.buy_premium_cap > 0.0,
    "buy_premium_cap must be positive, got {}",
    bond.buy_premium_cap
  );

  let dl = &config.double_low;
  anyhow::ensure!(
    dl.min_outstanding > 0.0 && dl.max_outstanding > dl.min_outstanding,
    "Outstanding band must satisfy 0 < min < max"
  );
  anyhow::ensure!(
    dl.max_stock_quantile > 0.0 && dl.max_stock_quantile < 1.0,
    "max_stock_quantile must be in (0, 1), got {}",
    dl.max_stock_quantile
  );

  let rebalance = &config.rebalance;
  anyhow::ensure!(
    rebalance.initial_capital > 0.0,
    "initial_capital must be positive, got {}",
    rebalance.initial_capital
  );
  anyhow::ensure!(
    rebalance.target_risk_weight > 0.0 && rebalance.target_risk_weight < 1.0,
    "target_risk_weight must be in (0, 1), got {}",
    rebalance.target_risk_weight
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_validate() {
    assert!(validate_config(&AppConfig::default()).is_ok());
  }

  #[test]
  fn test_missing_file_falls_back_to_defaults() {
    let config = load_config("does-not-exist.toml").unwrap();
    assert!((config.index.systemic_low_pe - 7.0).abs() < f64::EPSILON);
  }

  #[test]
  fn test_inverted_quantiles_rejected() {
    let mut config = AppConfig::default();
    config.index.relative_low_quantile = 0.8;
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_bad_odds_rejected() {
    let mut config = AppConfig::default();
    config.bond_market.kelly_odds = 0.0;
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_partial_toml_overlays_defaults() {
    let config: AppConfig = toml::from_str(
      r#"
        [index]
        relative_low_quantile = 0.25

        [bond_market]
        kelly_odds = 2.0
      "#,
    )
    .unwrap();
    assert!((config.index.relative_low_quantile - 0.25).abs() < f64::EPSILON);
    assert!((config.index.systemic_high_pe - 50.0).abs() < f64::EPSILON);
    assert!((config.bond_market.kelly_odds - 2.0).abs() < f64::EPSILON);
  }
}
