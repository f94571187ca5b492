//! CSV serialization of filtered views and aggregate tables.
//!
//! Everything the dashboard offers as a download comes through here:
//! UTF-8, header row, one row per record.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use tracing::debug;

use crate::dataset::SaleRecord;
use crate::engine::aggregate::AggregateTable;
use crate::engine::pivot::PivotTable;
use crate::error::Result;

/// Column headers for exported rows, matching the source dataset's.
const ROW_HEADERS: [&str; 9] = [
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

/// Writes sale records as CSV with the Superstore column headers.
///
/// The header row is written even when there are no records, so an empty
/// filtered view still exports a well-formed file.
pub fn write_rows_csv<'a, W, I>(writer: W, rows: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut out = WriterBuilder::new().has_headers(false).from_writer(writer);

    out.write_record(&ROW_HEADERS)?;
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;

    Ok(())
}

/// Pretty-printed JSON rows of an aggregate table, for log consumers and
/// ad-hoc inspection.
pub fn table_json(table: &AggregateTable) -> Result<String> {
    Ok(serde_json::to_string_pretty(&table.to_rows())?)
}

/// Writes an aggregate table as CSV: one column per group key, then the
/// measure column.
pub fn write_table_csv<W: Write>(writer: W, table: &AggregateTable) -> Result<()> {
    let mut out = WriterBuilder::new().from_writer(writer);

    let mut header: Vec<&str> = table
        .group_columns()
        .iter()
        .map(|col| col.header())
        .collect();
    header.push(table.measure().header());
    out.write_record(&header)?;

    for (key, sum) in table.iter() {
        let mut record: Vec<String> = key.to_vec();
        record.push(sum.to_string());
        out.write_record(&record)?;
    }
    out.flush()?;

    Ok(())
}

/// Writes the monthly pivot as CSV: sub-category rows, month columns,
/// empty cells where a combination has no data.
pub fn write_pivot_csv<W: Write>(writer: W, pivot: &PivotTable) -> Result<()> {
    let mut out = WriterBuilder::new().from_writer(writer);

    let mut header = vec!["Sub-Category".to_string()];
    header.extend(pivot.columns().iter().cloned());
    out.write_record(&header)?;

    for (sub_category, cells) in pivot.iter() {
        let mut record = vec![sub_category.to_string()];
        record.extend(
            cells
                .iter()
                .map(|cell| cell.map(|v| v.to_string()).unwrap_or_default()),
        );
        out.write_record(&record)?;
    }
    out.flush()?;

    Ok(())
}

/// File-writing wrapper around [`write_rows_csv`].
pub fn export_rows<'a, I>(path: &Path, rows: I) -> Result<()>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    debug!(path = %path.display(), "Exporting rows as CSV");
    write_rows_csv(File::create(path)?, rows)
}

/// File-writing wrapper around [`write_table_csv`].
pub fn export_table(path: &Path, table: &AggregateTable) -> Result<()> {
    debug!(path = %path.display(), "Exporting aggregate table as CSV");
    write_table_csv(File::create(path)?, table)
}

/// File-writing wrapper around [`write_pivot_csv`].
pub fn export_pivot(path: &Path, pivot: &PivotTable) -> Result<()> {
    debug!(path = %path.display(), "Exporting pivot as CSV");
    write_pivot_csv(File::create(path)?, pivot)
}
