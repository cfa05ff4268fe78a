//! Results persistence port trait.

use chrono::NaiveDateTime;
use std::path::PathBuf;

use crate::domain::analysis::{RunRecord, Summary};
use crate::domain::error::GaptraderError;
use crate::domain::metrics::StatsRecord;

pub trait ResultsPort {
    /// Persist one run's stats row; returns the path written.
    fn save_stats(
        &self,
        record: &StatsRecord,
        run_at: NaiveDateTime,
    ) -> Result<PathBuf, GaptraderError>;

    /// Load every readable `stats_*.csv` row, newest last. Malformed files
    /// are skipped, not fatal.
    fn load_all(&self) -> Result<Vec<RunRecord>, GaptraderError>;

    fn save_summary_csv(
        &self,
        summary: &Summary,
        analyzed_at: NaiveDateTime,
    ) -> Result<PathBuf, GaptraderError>;

    fn save_summary_json(
        &self,
        summary: &Summary,
        analyzed_at: NaiveDateTime,
    ) -> Result<PathBuf, GaptraderError>;
}
