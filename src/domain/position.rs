//! Open position and closed trade records.

use chrono::NaiveDate;

/// A long holding opened by a fill. The scaffold is long-only, so
/// `shares` is always positive.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub ticker: String,
    pub shares: u64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub entry_commission: f64,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.shares as f64 * (price - self.entry_price)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub ticker: String,
    pub shares: u64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    /// Net of entry and exit commissions.
    pub pnl: f64,
}
