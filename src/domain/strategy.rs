//! Strategy trait and the shipped overnight-gap strategy.
//!
//! A strategy is a two-method override point: `init` runs once before the
//! simulation with the full bar series, `next` runs once per bar and places
//! orders through the [`Broker`]. Orders fill at the following bar's open.

use super::execution::Broker;
use super::ohlcv::Bar;

/// Per-bar view handed to [`Strategy::next`]: the full series plus the index
/// of the bar being processed. Bars after `index` are the future and must not
/// influence decisions; they are exposed only because slicing per call would
/// buy nothing.
pub struct BarContext<'a> {
    pub index: usize,
    pub bars: &'a [Bar],
}

impl<'a> BarContext<'a> {
    pub fn bar(&self) -> &Bar {
        &self.bars[self.index]
    }

    pub fn close(&self) -> f64 {
        self.bar().close
    }

    pub fn open(&self) -> f64 {
        self.bar().open
    }

    /// Bars up to and including the current one.
    pub fn history(&self) -> &'a [Bar] {
        &self.bars[..=self.index]
    }
}

pub trait Strategy {
    fn name(&self) -> &str;

    /// Called once before the first bar.
    fn init(&mut self, _bars: &[Bar]) {}

    /// Called once per bar to decide orders for the next open.
    fn next(&mut self, ctx: &BarContext<'_>, broker: &mut Broker<'_>);
}

/// Buy a fixed dollar amount at every bar and roll it over: close the open
/// position and re-enter with `floor(investment / close)` shares. Both orders
/// fill at the next open, so each position is held from one open to the next.
#[derive(Debug, Clone)]
pub struct OvernightGap {
    pub investment_amount: f64,
}

impl OvernightGap {
    pub fn new(investment_amount: f64) -> Self {
        OvernightGap { investment_amount }
    }
}

impl Strategy for OvernightGap {
    fn name(&self) -> &str {
        "overnight-gap"
    }

    fn next(&mut self, ctx: &BarContext<'_>, broker: &mut Broker<'_>) {
        if broker.position().is_some() {
            broker.close_position();
        }

        let shares = (self.investment_amount / ctx.close()).floor() as u64;
        if shares >= 1 {
            broker.buy(shares);
        }
    }
}
