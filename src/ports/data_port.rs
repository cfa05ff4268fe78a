//! Price data access port trait.

use crate::domain::error::GaptraderError;
use crate::domain::ohlcv::{Bar, Granularity};

pub trait DataPort {
    /// Full available history for `ticker`, resampled to `granularity` and
    /// sorted by date. Lookback windowing is the caller's job.
    fn fetch_bars(
        &self,
        ticker: &str,
        granularity: Granularity,
    ) -> Result<Vec<Bar>, GaptraderError>;

    fn list_tickers(&self) -> Result<Vec<String>, GaptraderError>;
}
