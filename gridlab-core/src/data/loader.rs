//! CSV bar loading.
//!
//! Expected header: `timestamp,open,high,low,close,volume` with an optional
//! `symbol` column. Rows must be in non-decreasing timestamp order; repeated
//! timestamps are kept and left to the engine's duplicate check.

use super::DataError;
use crate::domain::Bar;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct BarRecord {
    timestamp: String,
    #[serde(default)]
    symbol: Option<String>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

/// Parse `YYYY-MM-DD` (midnight) or `YYYY-MM-DD HH:MM:SS` (also with a `T`).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Load bars from a CSV file. Rows without a `symbol` use `default_symbol`.
pub fn load_bars_csv(path: &Path, default_symbol: &str) -> Result<Vec<Bar>, DataError> {
    let file = std::fs::File::open(path)?;
    read_bars_csv(file, default_symbol)
}

pub fn read_bars_csv<R: Read>(reader: R, default_symbol: &str) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars: Vec<Bar> = Vec::new();

    for (i, record) in rdr.deserialize::<BarRecord>().enumerate() {
        let record = record?;
        // header is line 1
        let row = i + 2;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| DataError::Timestamp {
            row,
            value: record.timestamp.clone(),
        })?;
        if let Some(prev) = bars.last() {
            if timestamp < prev.timestamp {
                return Err(DataError::Unordered {
                    row,
                    timestamp,
                    previous: prev.timestamp,
                });
            }
        }
        bars.push(Bar {
            symbol: record
                .symbol
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| default_symbol.to_string()),
            timestamp,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        });
    }

    if bars.is_empty() {
        return Err(DataError::Empty);
    }
    Ok(bars)
}
