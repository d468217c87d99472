use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Reasons a price series cannot be turned into features.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("non-positive close {price} on {date}")]
    NonPositivePrice { date: NaiveDate, price: f64 },

    #[error("bar dated {next} follows {prev}")]
    NonMonotonicDates { prev: NaiveDate, next: NaiveDate },

    #[error("duplicate bar for {0}")]
    DuplicateDate(NaiveDate),
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid price series for {symbol}: {source}")]
    Series {
        symbol: String,
        #[source]
        source: SeriesError,
    },

    #[error("Invalid date `{value}` in {}", .path.display())]
    Date { path: PathBuf, value: String },

    #[error("No ticker column in {}, available columns: {columns:?}", .path.display())]
    MissingTickerColumn { path: PathBuf, columns: Vec<String> },

    #[error("Invalid threshold `{name}`: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, ScanError>;
