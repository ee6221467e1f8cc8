//! Two-asset threshold rebalancing.
//!
//! Models a portfolio of uncorrelated cash and a volatile risk asset.
//! Whenever the risk sleeve's drift since the last rebalance reaches a
//! configured share of total portfolio value, the split is restored to
//! the target weight. Money amounts use `Decimal` so long backtests do
//! not accumulate float noise in the ledger.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Quotes below this are treated as halted: [`Rebalancer::step`] skips
/// them, and a ledger must not be seeded on one.
pub const HALT_PRICE: Decimal = dec!(0.1);

/// Portfolio ledger entry: the state as of a rebalance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioState {
    /// Date of the event.
    pub date: NaiveDate,
    /// Cash sleeve value.
    pub cash: Decimal,
    /// Risk sleeve value at the event.
    pub risk_value: Decimal,
    /// Risk-asset units held after the event.
    pub risk_units: Decimal,
}

impl PortfolioState {
    /// Total portfolio value at the event.
    pub fn total(&self) -> Decimal {
        self.cash + self.risk_value
    }

    /// Risk-asset price implied by the sleeve value and unit count.
    pub fn implied_price(&self) -> Option<Decimal> {
        if self.risk_units.is_zero() {
            return None;
        }
        Some(self.risk_value / self.risk_units)
    }
}

/// Threshold rebalancer between cash and one risk asset.
#[derive(Debug, Clone, Copy)]
pub struct Rebalancer {
    /// Risk-asset share restored at every rebalance.
    target_risk_weight: Decimal,
    /// Upward drift (fraction of total value) that triggers a rebalance.
    up_threshold: Decimal,
    /// Downward drift (fraction of total value) that triggers a rebalance.
    down_threshold: Decimal,
}

impl Rebalancer {
    /// Creates a rebalancer.
    ///
    /// `up_threshold` / `down_threshold` are fractions of total portfolio
    /// value (0.15 = rebalance on a 15%-of-total drift).
    pub fn new(target_risk_weight: Decimal, up_threshold: Decimal, down_threshold: Decimal) -> Self {
        Self {
            target_risk_weight,
            up_threshold,
            down_threshold,
        }
    }

    /// Initial split of `capital` at the target weight, buying risk units
    /// at `price`. `price` must be a tradable quote, at or above
    /// [`HALT_PRICE`]; callers walking raw series reject halted begin
    /// quotes before seeding.
    pub fn seed(&self, capital: Decimal, date: NaiveDate, price: Decimal) -> PortfolioState {
        debug_assert!(price >= HALT_PRICE, "cannot seed on a halted quote");
        let risk_value = capital * self.target_risk_weight;
        PortfolioState {
            date,
            cash: capital - risk_value,
            risk_value,
            risk_units: risk_value / price,
        }
    }

    /// Marks the risk sleeve to market at `price` and fires a rebalance
    /// when the drift since `last` reaches a threshold.
    ///
    /// The drift is measured against the total value at the last event,
    /// and an exactly-at-threshold move triggers. Returns the new ledger
    /// entry, or `None` when no event fires (state is unchanged).
    pub fn step(
        &self,
        last: &PortfolioState,
        date: NaiveDate,
        price: Decimal,
    ) -> Option<PortfolioState> {
        if price < HALT_PRICE {
            return None;
        }

        let current_risk = last.risk_units * price;
        let last_total = last.total();

        let triggered = if current_risk > last.risk_value {
            (current_risk - last.risk_value) / last_total >= self.up_threshold
        } else if current_risk < last.risk_value {
            (last.risk_value - current_risk) / last_total >= self.down_threshold
        } else {
            false
        };
        if !triggered {
            return None;
        }

        let total = current_risk + last.cash;
        let risk_value = total * self.target_risk_weight;
        Some(PortfolioState {
            date,
            cash: total - risk_value,
            risk_value,
            risk_units: risk_value / price,
        })
    }
}
