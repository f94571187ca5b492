//! CLI entry point for the sales explorer.
//!
//! Provides subcommands for summarizing a filtered dataset, listing the
//! cascading filter options for a dimension, and exporting views or
//! aggregate tables as CSV.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sales_explorer::charts::{Renderer, TextRenderer, dashboard_charts};
use sales_explorer::dataset::Dataset;
use sales_explorer::engine::{
    CategoryLevel, Constraint, DashboardReport, Dimension, GroupColumn, Measure, ReportOptions,
    aggregate_by, apply, narrow_options,
};
use sales_explorer::fetch::{BasicClient, fetch_bytes};
use sales_explorer::ingest::{MediaType, load_dataset};
use sales_explorer::output::{export_pivot, export_rows, export_table};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "sales_explorer")]
#[command(about = "A tool to explore and summarize Superstore sales data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every dashboard table for the filtered dataset
    Summary {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Bar chart granularity
        #[arg(long, value_enum, default_value_t = LevelArg::Category)]
        level: LevelArg,

        /// Measure for the month-over-month time series
        #[arg(long, value_enum, default_value_t = MeasureArg::Sales)]
        time_series: MeasureArg,

        /// Number of rows in the sample table (5-100)
        #[arg(short = 'n', long, default_value_t = 10)]
        rows: usize,
    },
    /// List the candidate values a dimension offers under the current selection
    Options {
        #[command(flatten)]
        source: SourceArgs,

        /// Dimension whose candidate values to compute
        #[arg(value_enum)]
        dimension: DimensionArg,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Export the filtered rows or an aggregate table as CSV
    Export {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Which table to export
        #[arg(short, long, value_enum, default_value_t = TableArg::Filtered)]
        table: TableArg,

        /// Measure summed in aggregate tables
        #[arg(long, value_enum, default_value_t = MeasureArg::Sales)]
        measure: MeasureArg,

        /// CSV file to write
        #[arg(short, long, default_value = "export.csv")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Path to file or URL to fetch
    #[arg(value_name = "FILE_OR_URL")]
    source: String,

    /// Declared media type (e.g. text/csv); inferred from the file
    /// extension when omitted
    #[arg(long)]
    media_type: Option<String>,
}

#[derive(Args)]
struct FilterArgs {
    /// Inclusive start date (YYYY-MM-DD); defaults to the earliest order date
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Inclusive end date (YYYY-MM-DD); defaults to the latest order date
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Region to include; repeat for several, omit for all
    #[arg(long)]
    region: Vec<String>,

    /// State to include; repeat for several, omit for all
    #[arg(long)]
    state: Vec<String>,

    /// City to include; repeat for several, omit for all
    #[arg(long)]
    city: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DimensionArg {
    Region,
    State,
    City,
}

impl From<DimensionArg> for Dimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::Region => Dimension::Region,
            DimensionArg::State => Dimension::State,
            DimensionArg::City => Dimension::City,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LevelArg {
    Category,
    SubCategory,
}

impl From<LevelArg> for CategoryLevel {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Category => CategoryLevel::Category,
            LevelArg::SubCategory => CategoryLevel::SubCategory,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MeasureArg {
    Sales,
    Profit,
}

impl From<MeasureArg> for Measure {
    fn from(arg: MeasureArg) -> Self {
        match arg {
            MeasureArg::Sales => Measure::Sales,
            MeasureArg::Profit => Measure::Profit,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TableArg {
    /// Rows matching the current selection
    Filtered,
    /// The unfiltered source dataset
    Full,
    Category,
    SubCategory,
    Region,
    TimeSeries,
    /// Region / Category / Sub-Category hierarchy
    Hierarchy,
    /// Monthly Sub-Category pivot
    Pivot,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/sales_explorer.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("sales_explorer.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summary {
            source,
            filter,
            level,
            time_series,
            rows,
        } => {
            let dataset = load(&source).await?;
            let constraint = build_constraint(&dataset, &filter)?;

            let options = ReportOptions {
                level: level.into(),
                time_series_measure: time_series.into(),
                sample_rows: rows,
            };
            let report = DashboardReport::build(&dataset, &constraint, &options)?;

            info!(
                total_rows = dataset.len(),
                filtered_rows = report.filtered_rows,
                "Report computed"
            );

            let stdout = std::io::stdout();
            let mut renderer = TextRenderer::new(stdout.lock());
            for (spec, data) in dashboard_charts(&report, &options) {
                renderer.render(&spec, data)?;
            }
        }
        Commands::Options {
            source,
            dimension,
            filter,
        } => {
            let dataset = load(&source).await?;
            let constraint = build_constraint(&dataset, &filter)?;

            let values = narrow_options(&dataset, &constraint, dimension.into())?;
            info!(
                dimension = %Dimension::from(dimension),
                count = values.len(),
                "Options narrowed"
            );
            for value in values {
                println!("{value}");
            }
        }
        Commands::Export {
            source,
            filter,
            table,
            measure,
            output,
        } => {
            let dataset = load(&source).await?;
            let constraint = build_constraint(&dataset, &filter)?;
            let view = apply(&dataset, &constraint)?;
            let measure = Measure::from(measure);

            match table {
                TableArg::Filtered => export_rows(&output, view.iter())?,
                TableArg::Full => export_rows(&output, dataset.rows().iter())?,
                TableArg::Category => {
                    export_table(&output, &aggregate_by(&view, &[GroupColumn::Category], measure))?
                }
                TableArg::SubCategory => export_table(
                    &output,
                    &aggregate_by(&view, &[GroupColumn::SubCategory], measure),
                )?,
                TableArg::Region => {
                    export_table(&output, &aggregate_by(&view, &[GroupColumn::Region], measure))?
                }
                TableArg::TimeSeries => {
                    export_table(&output, &aggregate_by(&view, &[GroupColumn::Month], measure))?
                }
                TableArg::Hierarchy => export_table(
                    &output,
                    &aggregate_by(
                        &view,
                        &[
                            GroupColumn::Region,
                            GroupColumn::Category,
                            GroupColumn::SubCategory,
                        ],
                        measure,
                    ),
                )?,
                TableArg::Pivot => export_pivot(
                    &output,
                    &sales_explorer::engine::monthly_pivot(&view, measure),
                )?,
            }

            info!(path = %output.display(), rows = view.len(), "Export written");
        }
    }

    Ok(())
}

/// Loads the dataset from a local file path or fetches it over HTTP,
/// using the declared media type when given and the extension otherwise.
#[tracing::instrument(skip(args), fields(source = %args.source))]
async fn load(args: &SourceArgs) -> Result<Dataset> {
    let media = match &args.media_type {
        Some(mime) => MediaType::from_mime(mime)?,
        None => MediaType::from_path(&args.source)?,
    };

    info!("Loading data");
    let bytes = if args.source.starts_with("http") {
        let client = BasicClient::new();
        fetch_bytes(&client, &args.source).await?
    } else {
        std::fs::read(&args.source)?
    };

    match load_dataset(&bytes, media) {
        Ok(dataset) => {
            info!("Data loaded successfully");
            Ok(dataset)
        }
        Err(e) => {
            // Terminal for this attempt; the user retries with a new source.
            error!(error = %e, "Data load failed");
            Err(e.into())
        }
    }
}

/// Builds the constraint for this interaction, defaulting the date bounds
/// to the dataset's own span.
fn build_constraint(dataset: &Dataset, filter: &FilterArgs) -> Result<Constraint> {
    let (earliest, latest) = dataset
        .date_span()
        .ok_or_else(|| anyhow::anyhow!("dataset has no rows"))?;

    let constraint = Constraint::for_range(
        filter.from.unwrap_or(earliest),
        filter.to.unwrap_or(latest),
    )
    .with_regions(filter.region.iter().cloned())
    .with_states(filter.state.iter().cloned())
    .with_cities(filter.city.iter().cloned());

    Ok(constraint)
}
