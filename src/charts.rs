//! Declarative chart descriptors and the rendering seam.
//!
//! The engine never draws anything: it hands an aggregate plus a
//! [`ChartSpec`] to whatever [`Renderer`] the host environment provides.
//! The crate ships a plain-text renderer so the CLI can display every
//! table the dashboard would chart.

use std::io::Write;

use serde::Serialize;

use crate::dataset::SaleRecord;
use crate::engine::aggregate::AggregateTable;
use crate::engine::pivot::PivotTable;
use crate::engine::report::{DashboardReport, ReportOptions, ScatterPoint};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
    Treemap,
    Scatter,
    Table,
}

/// What to draw and which columns feed it. Opaque to the engine; a
/// renderer interprets the column names however its charting backend
/// needs.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    /// X axis, pie names, or treemap path, outermost first.
    pub axis_columns: Vec<String>,
    /// The measure column.
    pub value_column: String,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: &str, axis: &[&str], value: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            axis_columns: axis.iter().map(|c| c.to_string()).collect(),
            value_column: value.to_string(),
            color: None,
            size: None,
        }
    }

    pub fn with_color(mut self, column: &str) -> Self {
        self.color = Some(column.to_string());
        self
    }

    pub fn with_size(mut self, column: &str) -> Self {
        self.size = Some(column.to_string());
        self
    }
}

/// The data behind one chart.
pub enum ChartData<'a> {
    Aggregate(&'a AggregateTable),
    Pivot(&'a PivotTable),
    Points(&'a [ScatterPoint]),
    Rows(&'a [SaleRecord]),
}

/// Display collaborator: consumes a spec plus its data and produces some
/// artifact. The engine does not care what.
pub trait Renderer {
    fn render(&mut self, spec: &ChartSpec, data: ChartData<'_>) -> Result<()>;
}

/// The fixed chart family of the dashboard, paired with the report tables
/// that feed each one.
pub fn dashboard_charts<'a>(
    report: &'a DashboardReport,
    options: &ReportOptions,
) -> Vec<(ChartSpec, ChartData<'a>)> {
    use crate::engine::report::CategoryLevel;

    let level_name = match options.level {
        CategoryLevel::Category => "Category",
        CategoryLevel::SubCategory => "Sub-Category",
    };
    let series_name = options.time_series_measure.header();

    vec![
        (
            ChartSpec::new(
                ChartKind::Bar,
                &format!("Sales by {level_name}"),
                &[level_name],
                "Sales",
            ),
            ChartData::Aggregate(&report.category_sales),
        ),
        (
            ChartSpec::new(ChartKind::Pie, "Sales by Region", &["Region"], "Sales"),
            ChartData::Aggregate(&report.region_sales),
        ),
        (
            ChartSpec::new(
                ChartKind::Line,
                &format!("Time Series Analysis of {series_name}"),
                &["Month"],
                series_name,
            ),
            ChartData::Aggregate(&report.time_series),
        ),
        (
            ChartSpec::new(
                ChartKind::Treemap,
                "Hierarchical View of Sales",
                &["Region", "Category", "Sub-Category"],
                "Sales",
            )
            .with_color("Sub-Category"),
            ChartData::Aggregate(&report.sales_hierarchy),
        ),
        (
            ChartSpec::new(
                ChartKind::Pie,
                "Profits by Sub-Category",
                &["Sub-Category"],
                "Profit",
            ),
            ChartData::Aggregate(&report.sub_category_profit),
        ),
        (
            ChartSpec::new(ChartKind::Pie, "Profits by Category", &["Category"], "Profit"),
            ChartData::Aggregate(&report.category_profit),
        ),
        (
            ChartSpec::new(
                ChartKind::Table,
                "Monthly Sub-Category Sales",
                &["Sub-Category", "Month"],
                "Sales",
            ),
            ChartData::Pivot(&report.monthly_pivot),
        ),
        (
            ChartSpec::new(ChartKind::Table, "Sample Rows", &[], "Sales"),
            ChartData::Rows(&report.sample),
        ),
        (
            ChartSpec::new(
                ChartKind::Scatter,
                "Sales & Profits Relationship",
                &["Sales"],
                "Profit",
            )
            .with_size("Quantity"),
            ChartData::Points(&report.scatter),
        ),
    ]
}

/// Renders every chart as an aligned text table. Stands in for the real
/// charting collaborator when running from the terminal.
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn title(&mut self, spec: &ChartSpec) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", spec.title)?;
        writeln!(self.out, "{}", "-".repeat(spec.title.len()))?;
        Ok(())
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, spec: &ChartSpec, data: ChartData<'_>) -> Result<()> {
        self.title(spec)?;

        match data {
            ChartData::Aggregate(table) => {
                let show_share = spec.kind == ChartKind::Treemap;
                for (key, sum) in table.iter() {
                    let label = key.join(" / ");
                    if show_share {
                        let refs: Vec<&str> = key.iter().map(String::as_str).collect();
                        let share = table.share(&refs).unwrap_or(0.0);
                        writeln!(self.out, "  {label}: ${sum:.2} ({share:.1}%)")?;
                    } else {
                        writeln!(self.out, "  {label}: ${sum:.2}")?;
                    }
                }
            }
            ChartData::Pivot(pivot) => {
                writeln!(self.out, "  Sub-Category | {}", pivot.columns().join(" | "))?;
                for (sub_category, cells) in pivot.iter() {
                    let formatted: Vec<String> = cells
                        .iter()
                        .map(|cell| match cell {
                            Some(v) => format!("{v:.2}"),
                            None => "-".to_string(),
                        })
                        .collect();
                    writeln!(self.out, "  {sub_category} | {}", formatted.join(" | "))?;
                }
            }
            ChartData::Points(points) => {
                // A terminal is no place for a scatter cloud; report its
                // extent instead.
                let (mut min_s, mut max_s) = (f64::INFINITY, f64::NEG_INFINITY);
                let (mut min_p, mut max_p) = (f64::INFINITY, f64::NEG_INFINITY);
                for p in points {
                    min_s = min_s.min(p.sales);
                    max_s = max_s.max(p.sales);
                    min_p = min_p.min(p.profit);
                    max_p = max_p.max(p.profit);
                }
                writeln!(self.out, "  {} points", points.len())?;
                if !points.is_empty() {
                    writeln!(self.out, "  sales range: ${min_s:.2} to ${max_s:.2}")?;
                    writeln!(self.out, "  profit range: ${min_p:.2} to ${max_p:.2}")?;
                }
            }
            ChartData::Rows(rows) => {
                for row in rows {
                    writeln!(
                        self.out,
                        "  {} | {} | {} | {} | ${:.2} | ${:.2} | {}",
                        row.region,
                        row.state,
                        row.city,
                        row.category,
                        row.sales,
                        row.profit,
                        row.quantity
                    )?;
                }
            }
        }

        Ok(())
    }
}
