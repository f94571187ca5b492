use chrono::NaiveDate;
use sales_explorer::dataset::Dataset;
use sales_explorer::engine::{
    Constraint, DashboardReport, Dimension, GroupColumn, Measure, ReportOptions, aggregate_by,
    apply, narrow_options,
};
use sales_explorer::error::ExplorerError;
use sales_explorer::ingest::{MediaType, load_dataset};
use sales_explorer::output::{write_rows_csv, write_table_csv};

fn fixture_dataset() -> Dataset {
    let bytes = include_bytes!("fixtures/superstore_sample.csv");
    load_dataset(bytes, MediaType::Csv).expect("Failed to load fixture")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn whole_year() -> Constraint {
    Constraint::for_range(date(2021, 1, 1), date(2021, 12, 31))
}

#[test]
fn test_fixture_loads_with_extra_columns_ignored() {
    let ds = fixture_dataset();

    assert_eq!(ds.len(), 12);
    assert_eq!(
        ds.date_span(),
        Some((date(2021, 1, 5), date(2021, 12, 30)))
    );
}

#[test]
fn test_cascade_narrows_states_then_cities() {
    let ds = fixture_dataset();

    let east = whole_year().with_regions(["East".to_string()]);
    let states = narrow_options(&ds, &east, Dimension::State).unwrap();
    let expected: Vec<&str> = vec!["New York", "Ohio"];
    assert_eq!(states.iter().map(String::as_str).collect::<Vec<_>>(), expected);

    let east_ny = east.with_states(["New York".to_string()]);
    let cities = narrow_options(&ds, &east_ny, Dimension::City).unwrap();
    let expected: Vec<&str> = vec!["Buffalo", "New York City"];
    assert_eq!(cities.iter().map(String::as_str).collect::<Vec<_>>(), expected);
}

#[test]
fn test_filter_then_aggregate_is_conservative() {
    let ds = fixture_dataset();
    let view = apply(&ds, &whole_year()).unwrap();
    assert_eq!(view.len(), 12);

    let by_category = aggregate_by(&view, &[GroupColumn::Category], Measure::Sales);
    let diff = (by_category.total() - view.total(Measure::Sales)).abs();
    assert!(diff < 1e-9, "grouped total drifted by {diff}");
}

#[test]
fn test_east_region_category_sums() {
    let ds = fixture_dataset();
    let constraint = whole_year().with_regions(["East".to_string()]);
    let view = apply(&ds, &constraint).unwrap();

    assert_eq!(view.len(), 4);
    assert!(view.iter().all(|row| row.region == "East"));

    let table = aggregate_by(&view, &[GroupColumn::Category], Measure::Sales);
    assert!((table.get(&["Furniture"]).unwrap() - 993.90).abs() < 1e-9);
    assert_eq!(table.get(&["Office Supplies"]), Some(14.62));
    assert_eq!(table.get(&["Technology"]), Some(119.99));
}

#[test]
fn test_date_window_bounds_rows() {
    let ds = fixture_dataset();

    let march = Constraint::for_range(date(2021, 3, 1), date(2021, 3, 31));
    let view = apply(&ds, &march).unwrap();
    assert_eq!(view.len(), 2);

    let half_march = Constraint::for_range(date(2021, 3, 1), date(2021, 3, 14));
    let view = apply(&ds, &half_march).unwrap();
    assert_eq!(view.len(), 0);
}

#[test]
fn test_inverted_range_fails_fast() {
    let ds = fixture_dataset();
    let constraint = Constraint::for_range(date(2021, 5, 1), date(2021, 4, 1));

    let err = apply(&ds, &constraint).unwrap_err();
    assert!(matches!(err, ExplorerError::InvalidDateRange { .. }));
}

#[test]
fn test_report_over_fixture() {
    let ds = fixture_dataset();
    let report =
        DashboardReport::build(&ds, &whole_year(), &ReportOptions::default()).unwrap();

    assert_eq!(report.filtered_rows, 12);
    // Four regions in the fixture, each with sales.
    assert_eq!(report.region_sales.len(), 4);
    // One time-series bucket per distinct order month.
    let months: Vec<String> = report
        .time_series
        .iter()
        .map(|(key, _)| key[0].clone())
        .collect();
    assert_eq!(
        months,
        [
            "2021-01", "2021-02", "2021-03", "2021-04", "2021-05", "2021-06", "2021-07",
            "2021-08", "2021-09", "2021-12"
        ]
    );
    // Hierarchy drills to leaf level.
    assert_eq!(
        report.sales_hierarchy.get(&["West", "Furniture", "Tables"]),
        Some(957.58)
    );
    // Sample obeys the minimum bound but never exceeds the view.
    assert_eq!(report.sample.len(), 10);
    assert_eq!(report.scatter.len(), 12);
}

#[test]
fn test_filtered_view_exports_as_csv() {
    let ds = fixture_dataset();
    let constraint = whole_year().with_regions(["South".to_string()]);
    let view = apply(&ds, &constraint).unwrap();

    let mut buf = Vec::new();
    write_rows_csv(&mut buf, view.iter()).unwrap();
    let text = String::from_utf8(buf).unwrap();

    // Header plus one line per matching row.
    assert_eq!(text.lines().count(), 3);
    assert!(text.contains("Atlanta"));
    assert!(text.contains("Miami"));

    let table = aggregate_by(&view, &[GroupColumn::SubCategory], Measure::Profit);
    let mut buf = Vec::new();
    write_table_csv(&mut buf, &table).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.starts_with("Sub-Category,Profit\n"));
    assert!(text.contains("Chairs,66.43"));
}
