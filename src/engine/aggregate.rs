//! Grouped sums over a filtered view.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::filter::FilteredView;
use crate::engine::types::{GroupColumn, Measure};

/// One aggregate row in a serialization-friendly shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: Vec<String>,
    pub value: f64,
}

/// A grouped-sum table: one row per distinct combination of group-column
/// values present in the source view, paired with the sum of the measure
/// over exactly the rows matching that combination.
///
/// Keys are held in a `BTreeMap`, so iteration order is lexicographic by
/// group key tuple. Combinations with no matching rows do not appear.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable {
    group_columns: Vec<GroupColumn>,
    measure: Measure,
    rows: BTreeMap<Vec<String>, f64>,
}

impl AggregateTable {
    pub fn group_columns(&self) -> &[GroupColumn] {
        &self.group_columns
    }

    pub fn measure(&self) -> Measure {
        self.measure
    }

    /// Rows in lexicographic group-key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[String], f64)> {
        self.rows.iter().map(|(key, sum)| (key.as_slice(), *sum))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &[&str]) -> Option<f64> {
        let key: Vec<String> = key.iter().map(|k| k.to_string()).collect();
        self.rows.get(&key).copied()
    }

    /// Sum of all group sums; equals the measure total of the source view.
    pub fn total(&self) -> f64 {
        self.rows.values().sum()
    }

    /// This group's share of the table total, as a percentage. Used for
    /// treemap labels.
    pub fn share(&self, key: &[&str]) -> Option<f64> {
        let total = self.total();
        if total == 0.0 {
            return None;
        }
        self.get(key).map(|sum| sum / total * 100.0)
    }

    /// The table as a flat list of rows, in iteration order.
    pub fn to_rows(&self) -> Vec<AggregateRow> {
        self.iter()
            .map(|(key, value)| AggregateRow {
                key: key.to_vec(),
                value,
            })
            .collect()
    }

    /// Re-groups the table by its own keys. Summing each key's single row
    /// changes nothing, so the result always equals `self`.
    pub fn regroup(&self) -> AggregateTable {
        let mut rows: BTreeMap<Vec<String>, f64> = BTreeMap::new();
        for (key, sum) in &self.rows {
            *rows.entry(key.clone()).or_insert(0.0) += sum;
        }
        AggregateTable {
            group_columns: self.group_columns.clone(),
            measure: self.measure,
            rows,
        }
    }
}

/// Sums `measure` over `view`, grouped by the given columns (one to three
/// of them, ordered coarse to fine for hierarchical charts).
pub fn aggregate_by(
    view: &FilteredView<'_>,
    group_columns: &[GroupColumn],
    measure: Measure,
) -> AggregateTable {
    debug_assert!(!group_columns.is_empty());

    let mut rows: BTreeMap<Vec<String>, f64> = BTreeMap::new();

    for row in view.iter() {
        let key: Vec<String> = group_columns.iter().map(|col| col.key_of(row)).collect();
        *rows.entry(key).or_insert(0.0) += measure.value_of(row);
    }

    AggregateTable {
        group_columns: group_columns.to_vec(),
        measure,
        rows,
    }
}
