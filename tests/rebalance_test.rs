//! Integration Tests — Rebalancing Backtest Over a CSV Series
//!
//! Loads temp price files through the CSV adapter and replays them
//! through the backtest, checking the ledger against hand-computed
//! decimals.

use std::io::Write;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use valuation_oracle::adapters::load_price_series;
use valuation_oracle::config::RebalanceConfig;
use valuation_oracle::domain::errors::ValuationError;
use valuation_oracle::usecases::{run_backtest, BacktestParams};

fn price_file(rows: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "date,price\n{rows}").unwrap();
    file
}

fn params(begin: (i32, u32, u32)) -> BacktestParams {
    BacktestParams {
        begin: NaiveDate::from_ymd_opt(begin.0, begin.1, begin.2).unwrap(),
        up_threshold: dec!(0.15),
        down_threshold: dec!(0.15),
    }
}

#[test]
fn test_exact_threshold_rally_fires_and_resets() {
    // Seed 10000 at 0.30: 7000 cash, 3000 risk, 10000 units. At 0.45
    // the sleeve is worth 4500, a drift of exactly 15% of the 10000
    // total, so the event fires and resets to 30% of 11500.
    let file = price_file(
        "2019-01-02,0.30\n\
         2019-01-03,0.33\n\
         2019-01-04,0.45\n",
    );
    let series = load_price_series(file.path()).unwrap();
    let report = run_backtest(&series, &RebalanceConfig::default(), &params((2019, 1, 2))).unwrap();

    assert_eq!(report.events.len(), 2);
    let event = &report.events[1];
    assert_eq!(event.date, NaiveDate::from_ymd_opt(2019, 1, 4).unwrap());
    assert_eq!(event.total(), dec!(11500));
    assert_eq!(event.risk_value, dec!(3450.00));
    assert_eq!(event.cash, dec!(8050.00));
    // 3450 / 0.45 units is a non-terminating decimal; the final mark
    // carries the last-digit residue of that division.
    assert!((report.final_total - dec!(11500)).abs() < dec!(0.0001));
}

#[test]
fn test_below_threshold_never_trades() {
    // 0.30 to 0.34 is a 12%-of-total drift: the ledger stays at the
    // seed and the final mark floats with the price.
    let file = price_file(
        "2019-01-02,0.30\n\
         2019-01-03,0.34\n",
    );
    let series = load_price_series(file.path()).unwrap();
    let report = run_backtest(&series, &RebalanceConfig::default(), &params((2019, 1, 2))).unwrap();

    assert_eq!(report.events.len(), 1);
    // 10000 units marked at 0.34 on top of 7000 cash.
    assert_eq!(report.final_total, dec!(10400.00));
}

#[test]
fn test_crash_rebalances_into_the_fall() {
    // 0.30 to 0.15 halves the sleeve: -15% of total, fires, and the
    // reset buys units at the lower price.
    let file = price_file(
        "2019-01-02,0.30\n\
         2019-01-03,0.15\n",
    );
    let series = load_price_series(file.path()).unwrap();
    let report = run_backtest(&series, &RebalanceConfig::default(), &params((2019, 1, 2))).unwrap();

    assert_eq!(report.events.len(), 2);
    let event = &report.events[1];
    assert_eq!(event.total(), dec!(8500));
    assert_eq!(event.risk_value, dec!(2550.00));
    assert!(event.risk_units > report.events[0].risk_units);
    // 2550 / 17000 units recovers the event quote exactly.
    assert_eq!(event.implied_price(), Some(dec!(0.15)));
}

#[test]
fn test_halted_begin_quote_is_rejected_not_divided() {
    // A zero close on the begin date is parseable CSV, but no units can
    // be bought at it: the backtest must refuse the seed instead of
    // dividing by the quote.
    let file = price_file(
        "2019-01-02,0\n\
         2019-01-03,0.30\n",
    );
    let series = load_price_series(file.path()).unwrap();
    let err = run_backtest(&series, &RebalanceConfig::default(), &params((2019, 1, 2))).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ValuationError>(),
        Some(ValuationError::DataFormat(_))
    ));
}

#[test]
fn test_halted_quotes_do_not_trade() {
    let file = price_file(
        "2019-01-02,0.30\n\
         2019-01-03,0.01\n\
         2019-01-04,0.31\n",
    );
    let series = load_price_series(file.path()).unwrap();
    let report = run_backtest(&series, &RebalanceConfig::default(), &params((2019, 1, 2))).unwrap();
    assert_eq!(report.events.len(), 1);
}

#[test]
fn test_begin_date_must_exist() {
    let file = price_file("2019-01-02,0.30\n");
    let series = load_price_series(file.path()).unwrap();
    let err = run_backtest(&series, &RebalanceConfig::default(), &params((2019, 1, 9))).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ValuationError>(),
        Some(ValuationError::DataFormat(_))
    ));
}

#[test]
fn test_malformed_price_file_fails_fast() {
    let file = price_file("2019-01-02,thirty\n");
    assert!(load_price_series(file.path()).is_err());
}
