//! Data types shared across the engine: dimensions, measures, group
//! columns, and the year-month bucket used by the time series.

use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::dataset::SaleRecord;

/// A geographic dimension the cascading filter operates on, from coarsest
/// to finest. `State` options are narrowed by the `Region` selection only;
/// `City` options by `Region` and `State`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Dimension {
    Region,
    State,
    City,
}

impl Dimension {
    pub fn value_of<'a>(&self, row: &'a SaleRecord) -> &'a str {
        match self {
            Dimension::Region => &row.region,
            Dimension::State => &row.state,
            Dimension::City => &row.city,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Region => "Region",
            Dimension::State => "State",
            Dimension::City => "City",
        };
        f.write_str(name)
    }
}

/// A column an aggregate can group by. `Month` is derived from the order
/// date via [`month_key`]; everything else reads a categorical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupColumn {
    Region,
    State,
    City,
    Category,
    SubCategory,
    Month,
}

impl GroupColumn {
    /// The group-key value this column contributes for one row.
    ///
    /// `Month` renders as `YYYY-MM`, so lexicographic key order is also
    /// chronological.
    pub fn key_of(&self, row: &SaleRecord) -> String {
        match self {
            GroupColumn::Region => row.region.clone(),
            GroupColumn::State => row.state.clone(),
            GroupColumn::City => row.city.clone(),
            GroupColumn::Category => row.category.clone(),
            GroupColumn::SubCategory => row.sub_category.clone(),
            GroupColumn::Month => month_key(row.order_date).to_string(),
        }
    }

    /// Header used when the table is rendered or exported.
    pub fn header(&self) -> &'static str {
        match self {
            GroupColumn::Region => "Region",
            GroupColumn::State => "State",
            GroupColumn::City => "City",
            GroupColumn::Category => "Category",
            GroupColumn::SubCategory => "Sub-Category",
            GroupColumn::Month => "Month",
        }
    }
}

/// The numeric column being summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Sales,
    Profit,
}

impl Measure {
    pub fn value_of(&self, row: &SaleRecord) -> f64 {
        match self {
            Measure::Sales => row.sales,
            Measure::Profit => row.profit,
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            Measure::Sales => "Sales",
            Measure::Profit => "Profit",
        }
    }
}

/// A calendar year-month bucket. Two dates share a bucket iff they share
/// calendar year and month, independent of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Derives the year-month bucket for a date.
pub fn month_key(date: NaiveDate) -> MonthKey {
    MonthKey {
        year: date.year(),
        month: date.month(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_key_ignores_day() {
        assert_eq!(month_key(date(2021, 3, 1)), month_key(date(2021, 3, 31)));
    }

    #[test]
    fn test_month_key_distinguishes_year_and_month() {
        assert_ne!(month_key(date(2021, 3, 15)), month_key(date(2021, 4, 15)));
        assert_ne!(month_key(date(2021, 3, 15)), month_key(date(2022, 3, 15)));
    }

    #[test]
    fn test_month_key_display_sorts_chronologically() {
        let keys = [
            month_key(date(2020, 12, 5)).to_string(),
            month_key(date(2021, 2, 5)).to_string(),
            month_key(date(2021, 11, 5)).to_string(),
        ];
        assert_eq!(keys, ["2020-12", "2021-02", "2021-11"]);

        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(sorted, keys);
    }
}
