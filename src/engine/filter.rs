//! Conjunctive filtering and cascading option narrowing.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::dataset::{Dataset, SaleRecord};
use crate::engine::types::{Dimension, Measure};
use crate::error::{ExplorerError, Result};

/// The full set of user-chosen constraints for one interaction.
///
/// Date bounds are inclusive and required. Each geographic set is a
/// selection of allowed values; an empty set means the dimension is
/// unrestricted, not that nothing matches. A fresh value is built per
/// interaction; nothing here outlives the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub regions: BTreeSet<String>,
    pub states: BTreeSet<String>,
    pub cities: BTreeSet<String>,
}

impl Constraint {
    pub fn for_range(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            date_from,
            date_to,
            regions: BTreeSet::new(),
            states: BTreeSet::new(),
            cities: BTreeSet::new(),
        }
    }

    pub fn with_regions<I: IntoIterator<Item = String>>(mut self, regions: I) -> Self {
        self.regions = regions.into_iter().collect();
        self
    }

    pub fn with_states<I: IntoIterator<Item = String>>(mut self, states: I) -> Self {
        self.states = states.into_iter().collect();
        self
    }

    pub fn with_cities<I: IntoIterator<Item = String>>(mut self, cities: I) -> Self {
        self.cities = cities.into_iter().collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.date_from > self.date_to {
            return Err(ExplorerError::InvalidDateRange {
                from: self.date_from,
                to: self.date_to,
            });
        }
        Ok(())
    }

    /// The single conjunctive predicate: date clause AND one membership
    /// clause per dimension, where an empty selection passes every row.
    pub fn matches(&self, row: &SaleRecord) -> bool {
        self.date_from <= row.order_date
            && row.order_date <= self.date_to
            && Self::selected(&self.regions, &row.region)
            && Self::selected(&self.states, &row.state)
            && Self::selected(&self.cities, &row.city)
    }

    fn selected(selection: &BTreeSet<String>, value: &str) -> bool {
        selection.is_empty() || selection.contains(value)
    }

    /// A copy of this constraint keeping only the dimensions strictly
    /// coarser than `dimension` (date bounds always kept). This is what
    /// drives the cascade: state options only see the region selection,
    /// city options see region and state.
    fn coarser_than(&self, dimension: Dimension) -> Self {
        let mut narrowed = Self::for_range(self.date_from, self.date_to);
        if dimension > Dimension::Region {
            narrowed.regions = self.regions.clone();
        }
        if dimension > Dimension::State {
            narrowed.states = self.states.clone();
        }
        narrowed
    }
}

/// The subset of dataset rows satisfying a [`Constraint`]. Derived and
/// borrowed; recomputed whenever the constraint changes.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    rows: Vec<&'a SaleRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn rows(&self) -> &[&'a SaleRecord] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a SaleRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of a measure over the whole view.
    pub fn total(&self, measure: Measure) -> f64 {
        self.iter().map(|row| measure.value_of(row)).sum()
    }
}

/// Filters the dataset down to the rows matching every clause of the
/// constraint.
///
/// # Errors
///
/// Fails with [`ExplorerError::InvalidDateRange`] when `date_from` is after
/// `date_to`, before any rows are examined.
pub fn apply<'a>(dataset: &'a Dataset, constraint: &Constraint) -> Result<FilteredView<'a>> {
    constraint.validate()?;

    let rows = dataset
        .rows()
        .iter()
        .filter(|row| constraint.matches(row))
        .collect();

    Ok(FilteredView { rows })
}

/// Candidate values for `dimension`, narrowed by the strictly coarser
/// dimensions of `constraint` (and its date bounds).
///
/// With nothing coarser selected this is simply the distinct values of the
/// dimension column in the date range: no selection means no restriction.
pub fn narrow_options(
    dataset: &Dataset,
    constraint: &Constraint,
    dimension: Dimension,
) -> Result<BTreeSet<String>> {
    let coarser = constraint.coarser_than(dimension);
    let view = apply(dataset, &coarser)?;

    Ok(view
        .iter()
        .map(|row| dimension.value_of(row).to_string())
        .collect())
}
