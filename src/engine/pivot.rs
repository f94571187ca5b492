//! The monthly Sub-Category pivot behind the summary table.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;

use crate::engine::filter::FilteredView;
use crate::engine::types::Measure;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Sub-Category rows crossed with calendar-month columns, each cell the
/// mean of the measure over the matching rows. Months with no data in the
/// view get no column; a sub-category absent in a present month gets an
/// empty cell rather than zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    columns: Vec<String>,
    rows: BTreeMap<String, Vec<Option<f64>>>,
    measure: Measure,
}

impl PivotTable {
    /// Month-name column headers, January through December among the
    /// months present.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn measure(&self) -> Measure {
        self.measure
    }

    /// Rows in sub-category order, each cell vector aligned to `columns`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.rows
            .iter()
            .map(|(name, cells)| (name.as_str(), cells.as_slice()))
    }

    pub fn get(&self, sub_category: &str, month: &str) -> Option<f64> {
        let col = self.columns.iter().position(|c| c == month)?;
        self.rows.get(sub_category)?[col]
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds the Sub-Category × month pivot over a filtered view.
pub fn monthly_pivot(view: &FilteredView<'_>, measure: Measure) -> PivotTable {
    // (sub-category, month index) -> (sum, count), for the per-cell mean
    let mut cells: BTreeMap<(String, usize), (f64, usize)> = BTreeMap::new();
    let mut months_present: BTreeSet<usize> = BTreeSet::new();

    for row in view.iter() {
        let month = row.order_date.month0() as usize;
        months_present.insert(month);

        let cell = cells
            .entry((row.sub_category.clone(), month))
            .or_insert((0.0, 0));
        cell.0 += measure.value_of(row);
        cell.1 += 1;
    }

    let col_of: BTreeMap<usize, usize> = months_present
        .iter()
        .enumerate()
        .map(|(col, &month)| (month, col))
        .collect();
    let columns: Vec<String> = months_present
        .iter()
        .map(|&m| MONTH_NAMES[m].to_string())
        .collect();

    let mut rows: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for ((sub_category, month), (sum, count)) in cells {
        let cells_for_row = rows
            .entry(sub_category)
            .or_insert_with(|| vec![None; columns.len()]);
        cells_for_row[col_of[&month]] = Some(sum / count as f64);
    }

    PivotTable {
        columns,
        rows,
        measure,
    }
}
