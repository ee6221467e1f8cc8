//! Convertible-bond valuation primitives.
//!
//! Conversion premium, the double-low cheapness score, and the snapshot
//! types the bond strategies screen over. Data collection quirks (par
//! value standing in for a missing close, delisted or suspended issues)
//! are handled by the data sources; by the time a [`BondSnapshot`] exists
//! its fields are usable.

use serde::{Deserialize, Serialize};

/// Conversion premium ratio of a convertible bond.
///
/// The conversion value is `100 / convert_price * stock_price` (each bond
/// converts into `100 / convert_price` shares at par). The premium is the
/// fraction by which the bond's market price exceeds that value; it is
/// negative for discounted convertibles.
pub fn conversion_premium(bond_price: f64, convert_price: f64, stock_price: f64) -> f64 {
    let conversion_value = 100.0 / convert_price * stock_price;
    (bond_price - conversion_value) / conversion_value
}

/// Double-low cheapness score: bond price plus 100x the premium ratio.
///
/// Low price bounds the downside (par redemption), low premium keeps the
/// equity upside; the sum is the standard screen for "cheap both ways".
pub fn double_low(price: f64, premium_ratio: f64) -> f64 {
    price + premium_ratio * 100.0
}

/// Underlying-stock valuation attached to a bond, when the stock's
/// fundamentals are usable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StockValuation {
    /// Price-to-earnings ratio of the underlying stock.
    pub pe: f64,
    /// Price-to-book ratio of the underlying stock.
    pub pb: f64,
    /// Percentile of the current PE in the stock's own history.
    pub pe_quantile: f64,
    /// Percentile of the current PB in the stock's own history.
    pub pb_quantile: f64,
}

/// One convertible bond as the screens see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondSnapshot {
    /// Exchange code of the bond.
    pub code: String,
    /// Short name.
    pub name: String,
    /// Exchange code of the underlying stock.
    pub stock_code: String,
    /// Closing price.
    pub price: f64,
    /// Conversion premium ratio (0.15 = 15%).
    pub premium_ratio: f64,
    /// Outstanding amount in yuan (issue size corrected for converted
    /// share).
    pub outstanding: f64,
    /// Traded amount on the day, in yuan.
    pub day_turnover: f64,
    /// Underlying-stock valuation, absent when the stock's report data is
    /// broken (negative earnings etc.).
    pub stock: Option<StockValuation>,
}

impl BondSnapshot {
    /// Double-low score of this bond.
    pub fn double_low(&self) -> f64 {
        double_low(self.price, self.premium_ratio)
    }
}

/// Market-wide convertible aggregates for one day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BondMarketAggregates {
    /// Total outstanding amount of the market, in yuan.
    pub total_outstanding: f64,
    /// Outstanding amount of bonds trading at or below the underrate
    /// price, in yuan.
    pub underrate_outstanding: f64,
    /// Arithmetic mean closing price across the market.
    pub avg_price: f64,
    /// Arithmetic mean conversion premium ratio across the market.
    pub avg_premium_ratio: f64,
}

impl BondMarketAggregates {
    /// Share of outstanding value sitting at or below the underrate
    /// price. Used directly as a win-probability input.
    pub fn cheap_share(&self) -> f64 {
        if self.total_outstanding <= 0.0 {
            return 0.0;
        }
        self.underrate_outstanding / self.total_outstanding
    }
}
