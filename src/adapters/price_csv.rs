//! Shared CSV parsing for raw price downloads and cached files.
//!
//! Expects the provider's header row (Date, Open, High, Low, Close, Volume in
//! any order or casing). Empty cells are forward-filled from the previous row,
//! matching how the raw course data is cleaned; leading rows with no value to
//! inherit are dropped.

use chrono::NaiveDate;
use std::io::Read;

use crate::domain::error::GaptraderError;
use crate::domain::ohlcv::Bar;

const REQUIRED_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

fn data_error(ticker: &str, reason: impl Into<String>) -> GaptraderError {
    GaptraderError::DataFormat {
        ticker: ticker.to_string(),
        reason: reason.into(),
    }
}

pub fn parse_price_csv<R: Read>(ticker: &str, input: R) -> Result<Vec<Bar>, GaptraderError> {
    let mut rdr = csv::Reader::from_reader(input);

    let headers = rdr
        .headers()
        .map_err(|e| data_error(ticker, format!("unreadable header: {e}")))?
        .clone();

    let mut col = [0usize; 6];
    for (i, name) in REQUIRED_COLUMNS.iter().enumerate() {
        col[i] = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| data_error(ticker, format!("required column {name:?} not in data")))?;
    }
    let [date_col, open_col, high_col, low_col, close_col, volume_col] = col;

    let mut bars: Vec<Bar> = Vec::new();
    let mut prev: Option<[f64; 5]> = None;

    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| data_error(ticker, format!("row {}: {e}", row + 2)))?;

        let date_str = record.get(date_col).unwrap_or("").trim();
        if date_str.is_empty() {
            continue;
        }
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|e| data_error(ticker, format!("row {}: bad date {date_str:?}: {e}", row + 2)))?;

        let mut values = [0.0f64; 5];
        let mut complete = true;
        for (i, &c) in [open_col, high_col, low_col, close_col, volume_col]
            .iter()
            .enumerate()
        {
            let cell = record.get(c).unwrap_or("").trim();
            if cell.is_empty() {
                match prev {
                    Some(p) => values[i] = p[i],
                    None => {
                        complete = false;
                        break;
                    }
                }
            } else {
                values[i] = cell.parse::<f64>().map_err(|e| {
                    data_error(
                        ticker,
                        format!("row {}: bad {} value {cell:?}: {e}", row + 2, REQUIRED_COLUMNS[i + 1]),
                    )
                })?;
            }
        }

        // Leading rows with gaps have nothing to inherit from.
        if !complete {
            continue;
        }

        prev = Some(values);
        bars.push(Bar {
            ticker: ticker.to_string(),
            date,
            open: values[0],
            high: values[1],
            low: values[2],
            close: values[3],
            volume: values[4] as i64,
        });
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}
