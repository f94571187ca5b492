//! Dataset ingestion: bytes plus a declared media type in, a loaded
//! [`Dataset`] out.
//!
//! CSV and plain-text sources go through the `csv` crate with lossy byte
//! decoding (Superstore exports are commonly ISO-8859-1); spreadsheets go
//! through calamine. Any other declared type is rejected up front.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::dataset::{Dataset, SaleRecord, parse_date};
use crate::error::{ExplorerError, Result};

/// The tabular formats the loader recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Csv,
    PlainText,
    Spreadsheet,
}

impl MediaType {
    /// Maps a declared MIME type onto a recognized format.
    ///
    /// # Errors
    ///
    /// [`ExplorerError::UnsupportedFormat`] for anything outside the
    /// csv/plain-text/spreadsheet set.
    pub fn from_mime(mime: &str) -> Result<Self> {
        match mime {
            "text/csv" => Ok(MediaType::Csv),
            "text/plain" => Ok(MediaType::PlainText),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            | "application/vnd.ms-excel" => Ok(MediaType::Spreadsheet),
            other => Err(ExplorerError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Infers the format from a file extension (`csv`, `txt`, `xlsx`,
    /// `xls`), used when no MIME type was declared.
    pub fn from_path(path: &str) -> Result<Self> {
        let extension = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(MediaType::Csv),
            "txt" => Ok(MediaType::PlainText),
            "xlsx" | "xls" => Ok(MediaType::Spreadsheet),
            _ => Err(ExplorerError::UnsupportedFormat(path.to_string())),
        }
    }
}

/// Loads a dataset from raw bytes in the declared format.
pub fn load_dataset(bytes: &[u8], media: MediaType) -> Result<Dataset> {
    let dataset = match media {
        MediaType::Csv | MediaType::PlainText => load_csv(bytes)?,
        MediaType::Spreadsheet => load_spreadsheet(bytes)?,
    };

    info!(rows = dataset.len(), ?media, "Dataset loaded");
    Ok(dataset)
}

fn load_csv(bytes: &[u8]) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new().from_reader(bytes);

    let headers = StringRecord::from_byte_record_lossy(reader.byte_headers()?.clone());
    debug!(columns = headers.len(), "CSV headers read");

    let mut rows = Vec::new();
    for record in reader.into_byte_records() {
        let record = StringRecord::from_byte_record_lossy(record?);
        let row: SaleRecord = record.deserialize(Some(&headers))?;
        rows.push(row);
    }

    Ok(Dataset::new(rows))
}

/// Column headers the spreadsheet reader looks up, in record order.
const REQUIRED_COLUMNS: [&str; 9] = [
    "Order Date",
    "Region",
    "State",
    "City",
    "Category",
    "Sub-Category",
    "Sales",
    "Profit",
    "Quantity",
];

fn load_spreadsheet(bytes: &[u8]) -> Result<Dataset> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ExplorerError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut sheet_rows = range.rows();
    let header_row = sheet_rows
        .next()
        .ok_or_else(|| ExplorerError::MissingColumn(REQUIRED_COLUMNS[0].to_string()))?;

    let columns = locate_columns(header_row)?;

    let mut rows = Vec::new();
    for (i, cells) in sheet_rows.enumerate() {
        if cells.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }

        // Worksheet row number, counting the header as row 1.
        let row_number = i + 2;
        rows.push(record_from_cells(cells, &columns, row_number)?);
    }

    Ok(Dataset::new(rows))
}

/// Index of each required column in the header row.
fn locate_columns(header_row: &[Data]) -> Result<[usize; REQUIRED_COLUMNS.len()]> {
    let mut indexes = [0usize; REQUIRED_COLUMNS.len()];

    for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
        let found = header_row.iter().position(|cell| match cell {
            Data::String(header) => header.trim() == *name,
            _ => false,
        });
        indexes[slot] = found.ok_or_else(|| ExplorerError::MissingColumn(name.to_string()))?;
    }

    Ok(indexes)
}

fn record_from_cells(
    cells: &[Data],
    columns: &[usize; REQUIRED_COLUMNS.len()],
    row: usize,
) -> Result<SaleRecord> {
    let cell = |slot: usize| cells.get(columns[slot]).unwrap_or(&Data::Empty);

    Ok(SaleRecord {
        order_date: date_cell(cell(0), row, "Order Date")?,
        region: string_cell(cell(1), row, "Region")?,
        state: string_cell(cell(2), row, "State")?,
        city: string_cell(cell(3), row, "City")?,
        category: string_cell(cell(4), row, "Category")?,
        sub_category: string_cell(cell(5), row, "Sub-Category")?,
        sales: number_cell(cell(6), row, "Sales")?,
        profit: number_cell(cell(7), row, "Profit")?,
        quantity: quantity_cell(cell(8), row)?,
    })
}

fn invalid(row: usize, column: &'static str, cell: &Data) -> ExplorerError {
    ExplorerError::InvalidCell {
        row,
        column,
        value: format!("{cell:?}"),
    }
}

fn string_cell(cell: &Data, row: usize, column: &'static str) -> Result<String> {
    match cell {
        Data::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        other => Err(invalid(row, column, other)),
    }
}

fn number_cell(cell: &Data, row: usize, column: &'static str) -> Result<f64> {
    match cell {
        Data::Float(f) => Ok(*f),
        Data::Int(i) => Ok(*i as f64),
        other => Err(invalid(row, column, other)),
    }
}

fn quantity_cell(cell: &Data, row: usize) -> Result<u32> {
    let value = number_cell(cell, row, "Quantity")?;
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(invalid(row, "Quantity", cell));
    }
    Ok(value as u32)
}

fn date_cell(cell: &Data, row: usize, column: &'static str) -> Result<chrono::NaiveDate> {
    let parsed = match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|dt| dt.date()),
        Data::DateTimeIso(s) => parse_date(s),
        Data::String(s) => parse_date(s),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(row, column, cell))
}
