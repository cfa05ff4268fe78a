//! OHLCV bar representation and series preparation.

use chrono::{Datelike, Duration, NaiveDate};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Bar frequency the raw daily series is resampled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    /// Calendar bucket a date falls into: (year, period-within-year).
    fn period_key(&self, date: NaiveDate) -> (i32, u32, u32) {
        match self {
            Granularity::Daily => (date.year(), date.month(), date.day()),
            Granularity::Weekly => {
                let week = date.iso_week();
                (week.year(), week.week(), 0)
            }
            Granularity::Monthly => (date.year(), date.month(), 0),
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "d" => Ok(Granularity::Daily),
            "weekly" | "w" => Ok(Granularity::Weekly),
            "monthly" | "m" => Ok(Granularity::Monthly),
            other => Err(format!(
                "unknown granularity {other:?} (expected daily, weekly or monthly)"
            )),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        };
        write!(f, "{s}")
    }
}

/// Resample a date-sorted daily series by keeping the last bar of each period.
pub fn resample(bars: &[Bar], granularity: Granularity) -> Vec<Bar> {
    let mut sorted: Vec<Bar> = bars.to_vec();
    sorted.sort_by_key(|b| b.date);

    let mut out: Vec<Bar> = Vec::new();
    for bar in sorted {
        match out.last_mut() {
            Some(last) if granularity.period_key(last.date) == granularity.period_key(bar.date) => {
                *last = bar;
            }
            _ => out.push(bar),
        }
    }
    out
}

/// Keep only bars within the trailing `years * 365` days of `today`.
pub fn filter_lookback(bars: Vec<Bar>, years: u32, today: NaiveDate) -> Vec<Bar> {
    let start = today - Duration::days(365 * years as i64);
    bars.into_iter().filter(|b| b.date >= start).collect()
}

/// Lagged close columns: row `t` holds `close[t - i*lag_gap]` for `i` in
/// `1..=num_lags`. Leading rows without a full lag set are dropped, so the
/// result pairs with `bars[num_lags * lag_gap..]`.
pub fn lagged_closes(bars: &[Bar], num_lags: usize, lag_gap: usize) -> Vec<Vec<f64>> {
    let offset = num_lags * lag_gap;
    if bars.len() <= offset {
        return Vec::new();
    }

    (offset..bars.len())
        .map(|t| {
            (1..=num_lags)
                .map(|i| bars[t - i * lag_gap].close)
                .collect()
        })
        .collect()
}
