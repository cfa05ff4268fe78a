//! Local CSV directory data adapter, for cached downloads and offline runs.

use std::fs;
use std::path::PathBuf;

use crate::adapters::price_csv::parse_price_csv;
use crate::domain::error::GaptraderError;
use crate::domain::ohlcv::{resample, Bar, Granularity};
use crate::ports::data_port::DataPort;

pub struct CsvDataAdapter {
    base_path: PathBuf,
}

impl CsvDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker.to_uppercase()))
    }
}

impl DataPort for CsvDataAdapter {
    fn fetch_bars(
        &self,
        ticker: &str,
        granularity: Granularity,
    ) -> Result<Vec<Bar>, GaptraderError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| GaptraderError::Fetch {
            ticker: ticker.to_string(),
            reason: format!("failed to read {}: {e}", path.display()),
        })?;

        let bars = parse_price_csv(&ticker.to_uppercase(), content.as_bytes())?;
        Ok(resample(&bars, granularity))
    }

    fn list_tickers(&self) -> Result<Vec<String>, GaptraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| GaptraderError::Fetch {
            ticker: "*".to_string(),
            reason: format!("failed to read directory {}: {e}", self.base_path.display()),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(GaptraderError::Io)?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".csv") {
                tickers.push(stem.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup() -> (TempDir, CsvDataAdapter) {
        let dir = TempDir::new().unwrap();
        let content = "Date,Open,High,Low,Close,Volume\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n";
        fs::write(dir.path().join("TSLA.csv"), content).unwrap();
        fs::write(
            dir.path().join("AMZN.csv"),
            "Date,Open,High,Low,Close,Volume\n",
        )
        .unwrap();
        let adapter = CsvDataAdapter::new(dir.path().to_path_buf());
        (dir, adapter)
    }

    #[test]
    fn fetch_bars_reads_file() {
        let (_dir, adapter) = setup();
        let bars = adapter.fetch_bars("TSLA", Granularity::Daily).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[2].close, 115.0);
    }

    #[test]
    fn fetch_bars_lowercase_ticker() {
        let (_dir, adapter) = setup();
        let bars = adapter.fetch_bars("tsla", Granularity::Daily).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].ticker, "TSLA");
    }

    #[test]
    fn fetch_bars_resamples() {
        let (_dir, adapter) = setup();
        // all three bars fall in the same ISO week
        let bars = adapter.fetch_bars("TSLA", Granularity::Weekly).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 115.0);
    }

    #[test]
    fn missing_file_is_a_fetch_error() {
        let (_dir, adapter) = setup();
        let err = adapter.fetch_bars("NVDA", Granularity::Daily).unwrap_err();
        assert!(matches!(err, GaptraderError::Fetch { .. }));
    }

    #[test]
    fn list_tickers_from_directory() {
        let (_dir, adapter) = setup();
        assert_eq!(adapter.list_tickers().unwrap(), vec!["AMZN", "TSLA"]);
    }
}
