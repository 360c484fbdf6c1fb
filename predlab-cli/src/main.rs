//! PredLab CLI — list and evaluate stock direction-prediction datasets.
//!
//! Commands:
//! - `list` — print the dataset catalogue
//! - `run <id>` — load a catalogued dataset, evaluate, print the report
//! - `run --file <path>` — evaluate a local `.csv` or `.json` dataset
//!
//! Datasets come from either a hosted tree (`--base-url`) or a local
//! directory (`--data-dir`); both can also be set in a TOML config file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use predlab_core::data::{
    parse_csv_dataset, Catalogue, DatasetSource, FileSource, HttpSource,
};
use predlab_core::domain::{Dataset, EvaluationReport};
use predlab_core::evaluate::evaluate;

#[derive(Parser)]
#[command(
    name = "predlab",
    about = "PredLab CLI — accuracy scoring for up/down stock predictions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalogued datasets.
    List {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Evaluate a dataset and print its accuracy report.
    Run {
        /// Catalogue id of the dataset to evaluate.
        id: Option<String>,

        /// Evaluate a local file instead (.csv or .json).
        #[arg(long, conflicts_with = "id")]
        file: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,

        /// Write the full report as pretty JSON.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the per-stock metric table as CSV.
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Base URL of a hosted dataset tree.
    #[arg(long, conflicts_with = "data_dir")]
    base_url: Option<String>,

    /// Local dataset tree containing data/index.json. Defaults to ".".
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// TOML config file with a [source] table; flags override it.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Optional config file shape.
#[derive(Debug, Default, Deserialize)]
struct CliConfig {
    #[serde(default)]
    source: SourceConfig,
}

#[derive(Debug, Default, Deserialize)]
struct SourceConfig {
    base_url: Option<String>,
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List { source } => cmd_list(&source),
        Commands::Run {
            id,
            file,
            source,
            output,
            export,
        } => cmd_run(id, file, &source, output, export),
    }
}

fn cmd_list(source_args: &SourceArgs) -> Result<()> {
    let mut catalogue = Catalogue::new(build_source(source_args)?);
    let entries = catalogue.list_datasets()?;

    if entries.is_empty() {
        println!("No datasets in the catalogue.");
        return Ok(());
    }

    println!("{:<24} {:<32} {:<8} Features", "Id", "Name", "Window");
    println!("{}", "-".repeat(78));
    for entry in &entries {
        let window = entry
            .feature_window
            .map(|w| format!("{w}"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<24} {:<32} {:<8} {}",
            entry.id,
            entry.name,
            window,
            entry.features.join(", ")
        );
    }
    Ok(())
}

fn cmd_run(
    id: Option<String>,
    file: Option<PathBuf>,
    source_args: &SourceArgs,
    output: Option<PathBuf>,
    export: Option<PathBuf>,
) -> Result<()> {
    let dataset = if let Some(path) = file {
        load_file_dataset(&path)?
    } else if let Some(id) = id {
        let catalogue = Catalogue::new(build_source(source_args)?);
        catalogue
            .load_dataset(&id)
            .with_context(|| format!("loading dataset '{id}'"))?
    } else {
        bail!("provide a dataset id or --file <path>");
    };

    let report = evaluate(&dataset);
    print_report(&report);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&report)
            .context("failed to serialize report to JSON")?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Report JSON saved to: {}", path.display());
    }
    if let Some(path) = export {
        std::fs::write(&path, metrics_csv(&report)?)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Metric table saved to: {}", path.display());
    }
    Ok(())
}

/// Evaluate a local file: CSV goes through the parser, JSON through the
/// catalogue's registration path (same checks as a dashboard upload).
fn load_file_dataset(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("upload");

    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => Ok(parse_csv_dataset(&text, name)?),
        Some("json") => {
            let payload: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("{} is not valid JSON", path.display()))?;
            let mut session = Catalogue::new(FileSource::new("."));
            let entry = session.register_custom_dataset(name, &payload)?;
            Ok(session.load_dataset(&entry.id)?)
        }
        _ => bail!(
            "unsupported file type: {} (expected .csv or .json)",
            path.display()
        ),
    }
}

/// Flags override the config file; the default is the current directory.
fn build_source(args: &SourceArgs) -> Result<Box<dyn DatasetSource>> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => CliConfig::default(),
    };

    if let Some(base_url) = args.base_url.clone().or(config.source.base_url) {
        return Ok(Box::new(HttpSource::new(base_url)));
    }
    let data_dir = args
        .data_dir
        .clone()
        .or(config.source.data_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(Box::new(FileSource::new(data_dir)))
}

fn load_config(path: &Path) -> Result<CliConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn print_report(report: &EvaluationReport) {
    println!();
    println!("=== Evaluation Report ===");
    if !report.metadata.label.is_empty() {
        println!("Dataset:          {}", report.metadata.label);
    }
    if let Some(description) = &report.metadata.description {
        println!("Description:      {description}");
    }
    if let Some(window) = report.metadata.feature_window {
        println!("Feature window:   {window} steps");
    }
    if !report.metadata.features.is_empty() {
        println!("Features:         {}", report.metadata.features.join(", "));
    }

    let total: usize = report.stock_metrics.iter().map(|m| m.total).sum();
    println!(
        "Predictions:      {} across {} stock(s)",
        total,
        report.stock_metrics.len()
    );
    println!(
        "Dataset accuracy: {}",
        format_percent(report.dataset_accuracy)
    );
    match &report.top_stock {
        Some(top) => println!(
            "Top stock:        {} ({}, {}/{} correct)",
            top.symbol,
            format_percent(top.accuracy),
            top.correct,
            top.total
        ),
        None => println!("Top stock:        -"),
    }

    if report.stock_metrics.is_empty() {
        return;
    }
    println!();
    println!(
        "{:<8} {:<28} {:>9} {:>9}",
        "Symbol", "Company", "Accuracy", "Correct"
    );
    println!("{}", "-".repeat(58));
    for metric in &report.stock_metrics {
        println!(
            "{:<8} {:<28} {:>9} {:>9}",
            metric.symbol,
            metric.company,
            format_percent(metric.accuracy),
            format!("{}/{}", metric.correct, metric.total)
        );
    }
    println!();
}

/// Per-stock metric table as CSV, one row per stock in ranked order.
fn metrics_csv(report: &EvaluationReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["symbol", "company", "accuracy", "total", "correct"])?;
    for metric in &report.stock_metrics {
        let accuracy = format!("{:.4}", metric.accuracy);
        let total = metric.total.to_string();
        let correct = metric.correct.to_string();
        wtr.write_record([
            metric.symbol.as_str(),
            metric.company.as_str(),
            accuracy.as_str(),
            total.as_str(),
            correct.as_str(),
        ])?;
    }
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}
