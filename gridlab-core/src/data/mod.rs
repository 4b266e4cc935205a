//! Bar sources: CSV files and seeded synthetic series.

pub mod loader;
pub mod synthetic;

pub use loader::{load_bars_csv, read_bars_csv};
pub use synthetic::{generate_synthetic_bars, BarInterval};

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("read bar file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse bar CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unrecognized timestamp '{value}' (expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)")]
    Timestamp { row: usize, value: String },

    #[error("row {row}: timestamp {timestamp} is earlier than the previous row ({previous})")]
    Unordered {
        row: usize,
        timestamp: NaiveDateTime,
        previous: NaiveDateTime,
    },

    #[error("bar file contains no rows")]
    Empty,
}
