//! The filter-and-aggregate engine behind the dashboard.
//!
//! Pure functions over an immutable [`Dataset`](crate::dataset::Dataset):
//! cascading option narrowing, conjunctive filtering, grouped sums, the
//! monthly pivot, and the one-pass report that feeds every chart.

pub mod aggregate;
pub mod filter;
pub mod pivot;
pub mod report;
pub mod types;

pub use aggregate::{AggregateRow, AggregateTable, aggregate_by};
pub use filter::{Constraint, FilteredView, apply, narrow_options};
pub use pivot::{PivotTable, monthly_pivot};
pub use report::{CategoryLevel, DashboardReport, ReportOptions, ScatterPoint};
pub use types::{Dimension, GroupColumn, Measure, MonthKey, month_key};
