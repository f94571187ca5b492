//! One full recomputation pass: everything the dashboard renders from a
//! single constraint, computed in one place.

use serde::Serialize;

use crate::dataset::{Dataset, SaleRecord};
use crate::engine::aggregate::{AggregateTable, aggregate_by};
use crate::engine::filter::{Constraint, apply};
use crate::engine::pivot::{PivotTable, monthly_pivot};
use crate::engine::types::{GroupColumn, Measure};
use crate::error::Result;

/// Granularity toggle for the sales bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryLevel {
    #[default]
    Category,
    SubCategory,
}

impl CategoryLevel {
    fn group_column(self) -> GroupColumn {
        match self {
            CategoryLevel::Category => GroupColumn::Category,
            CategoryLevel::SubCategory => GroupColumn::SubCategory,
        }
    }
}

/// User-facing knobs that shape the report without changing the filter:
/// the category/sub-category toggle, the sales/profit time-series toggle,
/// and the sample table row bound.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub level: CategoryLevel,
    pub time_series_measure: Measure,
    pub sample_rows: usize,
}

impl ReportOptions {
    /// The sample table accepts between 5 and 100 rows.
    pub const MIN_SAMPLE_ROWS: usize = 5;
    pub const MAX_SAMPLE_ROWS: usize = 100;
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            level: CategoryLevel::Category,
            time_series_measure: Measure::Sales,
            sample_rows: 10,
        }
    }
}

/// One point of the sales/profit relationship scatter, with quantity as
/// the size encoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub sales: f64,
    pub profit: f64,
    pub quantity: u32,
}

/// Every derived table for one interaction. Owns its data; nothing borrows
/// from the dataset once built.
#[derive(Debug, Clone)]
pub struct DashboardReport {
    /// Rows that survived the filter.
    pub filtered_rows: usize,
    /// Sales by category or sub-category, per the level toggle.
    pub category_sales: AggregateTable,
    /// Sales by region.
    pub region_sales: AggregateTable,
    /// Month-over-month sales or profit, per the time-series toggle.
    pub time_series: AggregateTable,
    /// Region → Category → Sub-Category sales hierarchy.
    pub sales_hierarchy: AggregateTable,
    pub category_profit: AggregateTable,
    pub sub_category_profit: AggregateTable,
    /// Sub-Category × month mean-sales pivot.
    pub monthly_pivot: PivotTable,
    /// First n filtered rows, n clamped to the sample bounds.
    pub sample: Vec<SaleRecord>,
    pub scatter: Vec<ScatterPoint>,
}

impl DashboardReport {
    /// Applies the constraint and computes every table in one pass.
    ///
    /// # Errors
    ///
    /// Fails before any aggregation when the constraint's date range is
    /// inverted.
    pub fn build(
        dataset: &Dataset,
        constraint: &Constraint,
        options: &ReportOptions,
    ) -> Result<DashboardReport> {
        let view = apply(dataset, constraint)?;

        let sample_rows = options
            .sample_rows
            .clamp(ReportOptions::MIN_SAMPLE_ROWS, ReportOptions::MAX_SAMPLE_ROWS);

        Ok(DashboardReport {
            filtered_rows: view.len(),
            category_sales: aggregate_by(
                &view,
                &[options.level.group_column()],
                Measure::Sales,
            ),
            region_sales: aggregate_by(&view, &[GroupColumn::Region], Measure::Sales),
            time_series: aggregate_by(
                &view,
                &[GroupColumn::Month],
                options.time_series_measure,
            ),
            sales_hierarchy: aggregate_by(
                &view,
                &[
                    GroupColumn::Region,
                    GroupColumn::Category,
                    GroupColumn::SubCategory,
                ],
                Measure::Sales,
            ),
            category_profit: aggregate_by(&view, &[GroupColumn::Category], Measure::Profit),
            sub_category_profit: aggregate_by(
                &view,
                &[GroupColumn::SubCategory],
                Measure::Profit,
            ),
            monthly_pivot: monthly_pivot(&view, Measure::Sales),
            sample: view.iter().take(sample_rows).cloned().collect(),
            scatter: view
                .iter()
                .map(|row| ScatterPoint {
                    sales: row.sales,
                    profit: row.profit,
                    quantity: row.quantity,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExplorerError;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(date_str: &str, region: &str, category: &str, sub: &str, sales: f64) -> SaleRecord {
        SaleRecord {
            order_date: crate::dataset::parse_date(date_str).unwrap(),
            region: region.to_string(),
            state: "Anystate".to_string(),
            city: "Anytown".to_string(),
            category: category.to_string(),
            sub_category: sub.to_string(),
            sales,
            profit: sales - 50.0,
            quantity: 3,
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![
            row("2021-01-05", "East", "Furniture", "Chairs", 100.0),
            row("2021-01-25", "East", "Furniture", "Tables", 80.0),
            row("2021-02-14", "West", "Technology", "Phones", 200.0),
            row("2021-03-03", "South", "Office", "Paper", 20.0),
        ])
    }

    fn whole_year() -> Constraint {
        Constraint::for_range(date(2021, 1, 1), date(2021, 12, 31))
    }

    #[test]
    fn test_report_covers_every_table() {
        let ds = dataset();
        let report =
            DashboardReport::build(&ds, &whole_year(), &ReportOptions::default()).unwrap();

        assert_eq!(report.filtered_rows, 4);
        assert_eq!(report.category_sales.get(&["Furniture"]), Some(180.0));
        assert_eq!(report.region_sales.get(&["East"]), Some(180.0));
        assert_eq!(report.time_series.get(&["2021-01"]), Some(180.0));
        assert_eq!(
            report.sales_hierarchy.get(&["West", "Technology", "Phones"]),
            Some(200.0)
        );
        assert_eq!(report.category_profit.get(&["Office"]), Some(-30.0));
        assert_eq!(report.sub_category_profit.get(&["Chairs"]), Some(50.0));
        assert_eq!(report.monthly_pivot.get("Phones", "February"), Some(200.0));
        assert_eq!(report.scatter.len(), 4);
    }

    #[test]
    fn test_level_toggle_switches_grouping() {
        let ds = dataset();
        let options = ReportOptions {
            level: CategoryLevel::SubCategory,
            ..Default::default()
        };
        let report = DashboardReport::build(&ds, &whole_year(), &options).unwrap();

        assert_eq!(report.category_sales.get(&["Chairs"]), Some(100.0));
        assert_eq!(report.category_sales.get(&["Furniture"]), None);
    }

    #[test]
    fn test_time_series_toggle_switches_measure() {
        let ds = dataset();
        let options = ReportOptions {
            time_series_measure: Measure::Profit,
            ..Default::default()
        };
        let report = DashboardReport::build(&ds, &whole_year(), &options).unwrap();

        // January: (100 - 50) + (80 - 50)
        assert_eq!(report.time_series.get(&["2021-01"]), Some(80.0));
    }

    #[test]
    fn test_sample_bound_is_clamped() {
        let ds = dataset();
        let options = ReportOptions {
            sample_rows: 1,
            ..Default::default()
        };
        let report = DashboardReport::build(&ds, &whole_year(), &options).unwrap();

        // Clamped up to the minimum of 5, capped by the 4 available rows.
        assert_eq!(report.sample.len(), 4);

        let options = ReportOptions {
            sample_rows: 1000,
            ..Default::default()
        };
        let report = DashboardReport::build(&ds, &whole_year(), &options).unwrap();
        assert_eq!(report.sample.len(), 4);
    }

    #[test]
    fn test_inverted_range_fails_before_aggregation() {
        let ds = dataset();
        let constraint = Constraint::for_range(date(2021, 5, 1), date(2021, 4, 1));
        let err =
            DashboardReport::build(&ds, &constraint, &ReportOptions::default()).unwrap_err();

        assert!(matches!(err, ExplorerError::InvalidDateRange { .. }));
    }
}
