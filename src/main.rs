use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use diagplot::data::loader::{self, DEFAULT_VALUE_COLUMN};
use diagplot::data::records::MetricValueCollection;
use diagplot::report::ChartReport;
use diagplot::state::grouping::{self, DimensionChoice, GroupingOverrides};
use diagplot::state::settings::ChartSettings;

#[derive(Parser)]
#[command(name = "diagplot")]
#[command(about = "Prepare diagnostic metric values for box-plot and series charts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a collection: grouping, ensemble box plots and series styles
    Summary(SummaryArgs),
    /// List the dimensions and facets of a collection
    Dimensions(InputArgs),
}

#[derive(Args)]
struct InputArgs {
    /// JSON response, CSV or Excel file of metric values
    file: PathBuf,

    /// Numeric column of tabular inputs
    #[arg(long, default_value = DEFAULT_VALUE_COLUMN)]
    value_column: String,
}

#[derive(Args)]
struct SummaryArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Chart settings file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the effective settings to this file
    #[arg(long, value_name = "FILE")]
    save_config: Option<PathBuf>,

    /// Dimension for chart categories, or "none"
    #[arg(long)]
    group_by: Option<String>,

    /// Dimension for colours, or "none"
    #[arg(long)]
    hue: Option<String>,

    /// Dimension for line styles, or "none"
    #[arg(long)]
    style: Option<String>,

    /// Dimension along the ensemble x-axis
    #[arg(long)]
    ensemble_by: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    clip_min: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    clip_max: Option<f64>,

    /// Maximum number of series to lay out
    #[arg(long)]
    max_series: Option<usize>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Summary(args) => summary(args),
        Commands::Dimensions(args) => dimensions(args),
    }
}

fn load(input: &InputArgs) -> Result<MetricValueCollection> {
    loader::load_file(&input.file, &input.value_column)
        .with_context(|| format!("Failed to load {}", input.file.display()))
}

fn summary(args: SummaryArgs) -> Result<()> {
    let mut settings = match &args.config {
        Some(path) => ChartSettings::load(path).with_context(|| format!("Failed to read settings {}", path.display()))?,
        None => ChartSettings::default(),
    };
    if args.clip_min.is_some() {
        settings.clip_min = args.clip_min;
    }
    if args.clip_max.is_some() {
        settings.clip_max = args.clip_max;
    }
    if let Some(limit) = args.max_series {
        settings.max_series = limit;
    }
    if let Some(dim) = &args.ensemble_by {
        settings.ensemble_dimension = Some(DimensionChoice::named(dim.as_str()));
    }
    settings.validate()?;

    let overrides = GroupingOverrides {
        group_by: args.group_by.as_deref().map(DimensionChoice::from),
        hue: args.hue.as_deref().map(DimensionChoice::from),
        style: args.style.as_deref().map(DimensionChoice::from),
    };

    let collection = load(&args.input)?;
    let report = ChartReport::build(&collection, &settings, &overrides);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }

    if let Some(path) = &args.save_config {
        save_settings(&settings, &overrides, path)?;
    }
    Ok(())
}

fn save_settings(settings: &ChartSettings, overrides: &GroupingOverrides, path: &Path) -> Result<()> {
    let mut effective = settings.clone();
    effective.grouping = settings.grouping.merged_with(overrides);
    effective
        .save(path)
        .with_context(|| format!("Failed to save settings to {}", path.display()))
}

fn dimensions(args: InputArgs) -> Result<()> {
    let collection = load(&args)?;
    let available = grouping::extract_available_dimensions(&collection.data);

    println!("Default groupBy: {}", available.default_group_by);
    println!("Default hue: {}", available.default_hue);
    println!("Default style: {}", available.default_style);
    for facet in &collection.facets {
        println!("{}: {}", facet.key, facet.values.join(", "));
    }
    Ok(())
}
