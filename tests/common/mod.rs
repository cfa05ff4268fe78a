#![allow(dead_code)]

use chrono::NaiveDate;
use gaptrader::domain::backtest::BacktestConfig;
use gaptrader::domain::error::GaptraderError;
pub use gaptrader::domain::ohlcv::{Bar, Granularity};
use gaptrader::domain::ohlcv::resample;
use gaptrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        ticker: &str,
        granularity: Granularity,
    ) -> Result<Vec<Bar>, GaptraderError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(GaptraderError::Fetch {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        match self.data.get(ticker) {
            Some(bars) => Ok(resample(bars, granularity)),
            None => Err(GaptraderError::UnknownTicker {
                ticker: ticker.to_string(),
            }),
        }
    }

    fn list_tickers(&self) -> Result<Vec<String>, GaptraderError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(ticker: &str, date_str: &str, close: f64) -> Bar {
    Bar {
        ticker: ticker.to_string(),
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

pub fn generate_bars(ticker: &str, start_date: &str, count: usize, start_price: f64) -> Vec<Bar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| Bar {
            ticker: ticker.to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: start_price + i as f64,
            high: start_price + i as f64 + 1.0,
            low: start_price + i as f64 - 1.0,
            close: start_price + i as f64 + 0.5,
            volume: 1000,
        })
        .collect()
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        initial_cash: 100_000.0,
        commission_pct: 0.001,
        risk_free_rate: 0.0,
    }
}
