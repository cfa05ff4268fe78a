//! Order collection and fill simulation.
//!
//! Strategies place orders through a [`Broker`] during their per-bar callback;
//! every order fills at the following bar's open. Orders are exclusive: when a
//! close and a buy are pending on the same bar, the close fills first, so a
//! new entry always replaces the old position rather than stacking on it.

use chrono::NaiveDate;

use super::portfolio::Portfolio;
use super::position::{ClosedTrade, Position};

/// Execution parameters shared by every fill.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    /// Commission as a fraction of trade value, charged on entry and exit.
    /// 0.001 = 0.1%.
    pub commission_pct: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            commission_pct: 0.001,
        }
    }
}

/// Orders queued during one bar, to be filled at the next bar's open.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingOrders {
    pub close_position: bool,
    pub buy_shares: Option<u64>,
}

impl PendingOrders {
    pub fn is_empty(&self) -> bool {
        !self.close_position && self.buy_shares.is_none()
    }
}

/// The strategy's view of the portfolio plus its order buffer.
pub struct Broker<'p> {
    portfolio: &'p Portfolio,
    orders: PendingOrders,
}

impl<'p> Broker<'p> {
    pub fn new(portfolio: &'p Portfolio) -> Self {
        Broker {
            portfolio,
            orders: PendingOrders::default(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.portfolio.cash
    }

    pub fn position(&self) -> Option<&Position> {
        self.portfolio.position.as_ref()
    }

    /// Queue a market buy for the next bar's open. A later call replaces an
    /// earlier one within the same bar.
    pub fn buy(&mut self, shares: u64) {
        if shares > 0 {
            self.orders.buy_shares = Some(shares);
        }
    }

    /// Queue a close of the open position for the next bar's open.
    pub fn close_position(&mut self) {
        if self.portfolio.has_position() {
            self.orders.close_position = true;
        }
    }

    pub fn into_orders(self) -> PendingOrders {
        self.orders
    }
}

pub fn calculate_commission(trade_value: f64, config: &ExecutionConfig) -> f64 {
    trade_value * config.commission_pct
}

/// Result of a buy fill attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum FillResult {
    Filled {
        shares: u64,
        price: f64,
        cost: f64,
        commission: f64,
    },
    /// Cost plus commission exceeded available cash; order dropped.
    InsufficientCash,
}

/// Fill a queued buy at `price`. Any still-open position must have been
/// closed beforehand; stacking fills is not supported.
pub fn fill_buy(
    portfolio: &mut Portfolio,
    ticker: &str,
    shares: u64,
    price: f64,
    date: NaiveDate,
    config: &ExecutionConfig,
) -> FillResult {
    debug_assert!(!portfolio.has_position());

    let cost = shares as f64 * price;
    let commission = calculate_commission(cost, config);
    let total = cost + commission;

    if shares == 0 || total > portfolio.cash {
        return FillResult::InsufficientCash;
    }

    portfolio.cash -= total;
    portfolio.position = Some(Position {
        ticker: ticker.to_string(),
        shares,
        entry_price: price,
        entry_date: date,
        entry_commission: commission,
    });

    FillResult::Filled {
        shares,
        price,
        cost,
        commission,
    }
}

/// Result of closing a position.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitFill {
    pub shares: u64,
    pub exit_price: f64,
    pub proceeds: f64,
    pub commission: f64,
    pub pnl: f64,
}

/// Close the open position at `price`, recording a round-trip trade with
/// PnL net of both commissions. Returns `None` when the portfolio is flat.
pub fn fill_close(
    portfolio: &mut Portfolio,
    price: f64,
    exit_date: NaiveDate,
    config: &ExecutionConfig,
) -> Option<ExitFill> {
    let position = portfolio.position.take()?;

    let proceeds = position.shares as f64 * price;
    let commission = calculate_commission(proceeds, config);

    let price_pnl = position.shares as f64 * (price - position.entry_price);
    let pnl = price_pnl - position.entry_commission - commission;

    portfolio.cash += proceeds - commission;

    portfolio.record_trade(ClosedTrade {
        ticker: position.ticker,
        shares: position.shares,
        entry_price: position.entry_price,
        exit_price: price,
        entry_date: position.entry_date,
        exit_date,
        pnl,
    });

    Some(ExitFill {
        shares: position.shares,
        exit_price: price,
        proceeds,
        commission,
        pnl,
    })
}
