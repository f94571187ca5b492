//! Error types for dataset ingestion and the filter/aggregate engine.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spreadsheet read error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("start date {from} is after end date {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    #[error("required column not found: {0}")]
    MissingColumn(String),

    #[error("row {row}: invalid {column} value {value:?}")]
    InvalidCell {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("workbook contains no sheets")]
    EmptyWorkbook,
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
