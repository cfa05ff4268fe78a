//! Backtest engine and event loop.

use chrono::NaiveDate;

use super::error::GaptraderError;
use super::execution::{fill_buy, fill_close, Broker, ExecutionConfig, PendingOrders};
use super::ohlcv::Bar;
use super::portfolio::Portfolio;
use super::strategy::{BarContext, Strategy};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_cash: f64,
    /// Fraction of trade value charged on every fill.
    pub commission_pct: f64,
    /// Annualized, used for Sharpe/Sortino.
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_cash: 100_000.0,
            commission_pct: 0.001,
            risk_free_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bars_processed: usize,
    pub portfolio: Portfolio,
}

/// Run a strategy over a date-sorted bar series.
///
/// Per bar: fill the orders queued on the previous bar at this bar's open
/// (close before buy, so entries never stack), then hand the bar to the
/// strategy, then mark equity at the close. Any position still open after the
/// last bar is liquidated at that bar's close so every run ends flat.
pub fn run_backtest(
    bars: &[Bar],
    strategy: &mut dyn Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, GaptraderError> {
    let (first, last) = match (bars.first(), bars.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => {
            return Err(GaptraderError::NoData {
                ticker: "<empty series>".to_string(),
            })
        }
    };
    let ticker = first.ticker.clone();

    let exec = ExecutionConfig {
        commission_pct: config.commission_pct,
    };

    let mut portfolio = Portfolio::new(config.initial_cash);
    let mut pending = PendingOrders::default();

    strategy.init(bars);

    for (i, bar) in bars.iter().enumerate() {
        if !pending.is_empty() {
            if pending.close_position {
                fill_close(&mut portfolio, bar.open, bar.date, &exec);
            }
            if let Some(shares) = pending.buy_shares {
                // Exclusive orders: an entry displaces whatever is still open.
                if portfolio.has_position() {
                    fill_close(&mut portfolio, bar.open, bar.date, &exec);
                }
                fill_buy(&mut portfolio, &ticker, shares, bar.open, bar.date, &exec);
            }
        }

        let mut broker = Broker::new(&portfolio);
        let ctx = BarContext { index: i, bars };
        strategy.next(&ctx, &mut broker);
        pending = broker.into_orders();

        portfolio.record_equity(bar.date, bar.close);
    }

    // Final liquidation; re-mark the last equity point to reflect exit costs.
    if portfolio.has_position() {
        fill_close(&mut portfolio, last.close, last.date, &exec);
        portfolio.equity_curve.pop();
        portfolio.record_equity(last.date, last.close);
    }

    Ok(BacktestResult {
        ticker,
        start_date: first.date,
        end_date: last.date,
        bars_processed: bars.len(),
        portfolio,
    })
}
