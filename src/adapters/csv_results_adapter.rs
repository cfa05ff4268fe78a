//! Results directory adapter: one `stats_<timestamp>.csv` per run, plus
//! `strategy_summary_<timestamp>` files from the analyze command.

use chrono::NaiveDateTime;
use std::fs;
use std::path::PathBuf;

use crate::domain::analysis::{RunRecord, Summary};
use crate::domain::error::GaptraderError;
use crate::domain::metrics::StatsRecord;
use crate::ports::results_port::ResultsPort;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub struct CsvResultsAdapter {
    dir: PathBuf,
}

impl CsvResultsAdapter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn results_error(reason: impl Into<String>) -> GaptraderError {
        GaptraderError::Results {
            reason: reason.into(),
        }
    }

    /// `stats_20240601_093000.csv` → run timestamp, or None for foreign files.
    fn parse_run_timestamp(filename: &str) -> Option<NaiveDateTime> {
        let stem = filename.strip_prefix("stats_")?.strip_suffix(".csv")?;
        NaiveDateTime::parse_from_str(stem, TIMESTAMP_FORMAT).ok()
    }

    fn read_stats_file(path: &PathBuf) -> Result<StatsRecord, GaptraderError> {
        let mut rdr = csv::Reader::from_path(path)
            .map_err(|e| Self::results_error(format!("{}: {e}", path.display())))?;
        rdr.deserialize()
            .next()
            .ok_or_else(|| Self::results_error(format!("{}: empty file", path.display())))?
            .map_err(|e| Self::results_error(format!("{}: {e}", path.display())))
    }
}

impl ResultsPort for CsvResultsAdapter {
    fn save_stats(
        &self,
        record: &StatsRecord,
        run_at: NaiveDateTime,
    ) -> Result<PathBuf, GaptraderError> {
        fs::create_dir_all(&self.dir)?;
        let path = self
            .dir
            .join(format!("stats_{}.csv", run_at.format(TIMESTAMP_FORMAT)));

        let mut wtr = csv::Writer::from_path(&path)
            .map_err(|e| Self::results_error(format!("{}: {e}", path.display())))?;
        wtr.serialize(record)
            .map_err(|e| Self::results_error(format!("{}: {e}", path.display())))?;
        wtr.flush()?;

        Ok(path)
    }

    fn load_all(&self) -> Result<Vec<RunRecord>, GaptraderError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();

            let Some(recorded_at) = Self::parse_run_timestamp(&name) else {
                continue;
            };

            match Self::read_stats_file(&entry.path()) {
                Ok(stats) => records.push(RunRecord {
                    recorded_at,
                    source_file: name.to_string(),
                    stats,
                }),
                Err(e) => {
                    eprintln!("warning: skipping {name} ({e})");
                }
            }
        }

        records.sort_by_key(|r| r.recorded_at);
        Ok(records)
    }

    fn save_summary_csv(
        &self,
        summary: &Summary,
        analyzed_at: NaiveDateTime,
    ) -> Result<PathBuf, GaptraderError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!(
            "strategy_summary_{}.csv",
            analyzed_at.format(TIMESTAMP_FORMAT)
        ));

        let mut wtr = csv::Writer::from_path(&path)
            .map_err(|e| Self::results_error(format!("{}: {e}", path.display())))?;
        wtr.serialize(summary)
            .map_err(|e| Self::results_error(format!("{}: {e}", path.display())))?;
        wtr.flush()?;

        Ok(path)
    }

    fn save_summary_json(
        &self,
        summary: &Summary,
        analyzed_at: NaiveDateTime,
    ) -> Result<PathBuf, GaptraderError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!(
            "strategy_summary_{}.json",
            analyzed_at.format(TIMESTAMP_FORMAT)
        ));

        let json = serde_json::to_string_pretty(summary)
            .map_err(|e| Self::results_error(e.to_string()))?;
        fs::write(&path, json)?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_record(ticker: &str, return_pct: f64) -> StatsRecord {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        StatsRecord {
            ticker: ticker.to_string(),
            run_at: date.and_hms_opt(9, 30, 0).unwrap(),
            investment_amount: 10_000.0,
            lookback_years: 5,
            initial_cash: 100_000.0,
            commission_pct: 0.001,
            start_date: NaiveDate::from_ymd_opt(2019, 1, 2).unwrap(),
            end_date: date,
            bars: 1258,
            return_pct,
            annualized_return_pct: return_pct / 5.0,
            sharpe_ratio: 0.9,
            sortino_ratio: 1.2,
            max_drawdown_pct: 25.0,
            max_drawdown_duration_days: 120,
            num_trades: 1200,
            win_rate_pct: 51.0,
            profit_factor: 1.1,
            avg_win: 90.0,
            avg_loss: 85.0,
            largest_win: 900.0,
            largest_loss: 800.0,
            avg_trade_duration_days: 1.0,
            final_equity: 100_000.0 * (1.0 + return_pct / 100.0),
        }
    }

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvResultsAdapter::new(dir.path().to_path_buf());

        let record = sample_record("TSLA", 12.5);
        let path = adapter.save_stats(&record, ts(9)).unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("stats_20240601_090000"));

        let loaded = adapter.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].stats, record);
        assert_eq!(loaded[0].recorded_at, ts(9));
    }

    #[test]
    fn load_all_sorted_by_run_time() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvResultsAdapter::new(dir.path().to_path_buf());

        adapter.save_stats(&sample_record("TSLA", 2.0), ts(15)).unwrap();
        adapter.save_stats(&sample_record("TSLA", 1.0), ts(9)).unwrap();

        let loaded = adapter.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded[0].recorded_at < loaded[1].recorded_at);
        assert_eq!(loaded[0].stats.return_pct, 1.0);
    }

    #[test]
    fn load_all_skips_malformed_and_foreign_files() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvResultsAdapter::new(dir.path().to_path_buf());

        adapter.save_stats(&sample_record("TSLA", 2.0), ts(9)).unwrap();
        fs::write(dir.path().join("stats_20240601_100000.csv"), "not,a,stats,row\n1,2,3,4\n")
            .unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::write(dir.path().join("strategy_summary_20240601_110000.csv"), "x\n").unwrap();

        let loaded = adapter.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn load_all_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvResultsAdapter::new(dir.path().join("never_created"));
        assert!(adapter.load_all().unwrap().is_empty());
    }

    #[test]
    fn summary_files_written() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvResultsAdapter::new(dir.path().to_path_buf());

        let record = RunRecord {
            recorded_at: ts(9),
            source_file: "stats_20240601_090000.csv".into(),
            stats: sample_record("TSLA", 10.0),
        };
        let summary = Summary::aggregate(&[record], ts(12)).unwrap();

        let csv_path = adapter.save_summary_csv(&summary, ts(12)).unwrap();
        let json_path = adapter.save_summary_json(&summary, ts(12)).unwrap();

        let csv_content = fs::read_to_string(csv_path).unwrap();
        assert!(csv_content.contains("avg_return_pct"));
        assert!(csv_content.contains("TSLA"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(json["num_runs"], 1);
        assert_eq!(json["ticker"], "TSLA");
    }

    #[test]
    fn parse_run_timestamp_rejects_noise() {
        assert!(CsvResultsAdapter::parse_run_timestamp("stats_20240601_090000.csv").is_some());
        assert!(CsvResultsAdapter::parse_run_timestamp("stats_garbage.csv").is_none());
        assert!(CsvResultsAdapter::parse_run_timestamp("summary_20240601_090000.csv").is_none());
        assert!(CsvResultsAdapter::parse_run_timestamp("stats_20240601_090000.json").is_none());
    }
}
