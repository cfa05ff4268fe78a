//! Cross-run aggregation of persisted stats rows.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::error::GaptraderError;
use super::metrics::StatsRecord;

/// One loaded result file.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    /// Run timestamp recovered from the `stats_<ts>.csv` filename.
    pub recorded_at: NaiveDateTime,
    pub source_file: String,
    pub stats: StatsRecord,
}

/// Averages across all loaded runs, persisted as `strategy_summary_<ts>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub ticker: String,
    pub num_runs: usize,
    pub avg_return_pct: f64,
    pub avg_sharpe_ratio: f64,
    pub avg_max_drawdown_pct: f64,
    pub avg_win_rate_pct: f64,
    pub avg_num_trades: f64,
    pub investment_amount: f64,
    pub lookback_years: u32,
    pub analyzed_at: NaiveDateTime,
}

impl Summary {
    /// Average the headline metrics across runs. Ticker and run parameters
    /// are taken from the most recent run.
    pub fn aggregate(
        records: &[RunRecord],
        analyzed_at: NaiveDateTime,
    ) -> Result<Self, GaptraderError> {
        let Some(latest) = records.iter().max_by_key(|r| r.recorded_at) else {
            return Err(GaptraderError::Results {
                reason: "cannot summarize zero runs".to_string(),
            });
        };

        let n = records.len() as f64;
        let sum = |f: fn(&StatsRecord) -> f64| -> f64 {
            records.iter().map(|r| f(&r.stats)).sum::<f64>() / n
        };

        Ok(Summary {
            ticker: latest.stats.ticker.clone(),
            num_runs: records.len(),
            avg_return_pct: sum(|s| s.return_pct),
            avg_sharpe_ratio: sum(|s| s.sharpe_ratio),
            avg_max_drawdown_pct: sum(|s| s.max_drawdown_pct),
            avg_win_rate_pct: sum(|s| s.win_rate_pct),
            avg_num_trades: sum(|s| s.num_trades as f64),
            investment_amount: latest.stats.investment_amount,
            lookback_years: latest.stats.lookback_years,
            analyzed_at,
        })
    }
}
