//! ECG Viewer - grid rendering and heart-rate report for one record

mod cli;
mod loader;
mod output;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::Args;
use ecg_core::RecordMetadata;
use ecg_processing::{HeartRateAnalyzer, ProcessingConfig};
use output::FigureWriter;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    run(Args::parse())
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            ProcessingConfig::from_json(&json)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => ProcessingConfig::default(),
    };
    let analyzer = HeartRateAnalyzer::new(&config)?;

    let (lead_set, mut metadata) = match (&args.input, args.synthetic_bpm) {
        (Some(path), _) => (loader::load_csv(path, args.fs)?, None),
        (None, Some(bpm)) => {
            let record = loader::synthesize(bpm, args.fs, args.seconds, args.seed)?;
            let metadata = record.metadata(&args.record);
            (record.lead_set, Some(metadata))
        }
        (None, None) => bail!("either --input or --synthetic-bpm is required"),
    };
    if let Some(path) = &args.comments {
        metadata = Some(loader::load_comments(path, &args.record)?);
    }

    let seconds = output::display_seconds(args.seconds, &lead_set);
    let writer = FigureWriter::new(&args.out_dir, &args.record)?;
    let mut figures = writer.write_leads(&lead_set, seconds, args.layout)?;

    let analysis = analyzer
        .analyze(&lead_set, args.lead.as_deref())
        .context("Heart-rate analysis failed")?;
    figures.push(writer.write_detection(&analysis, seconds)?);

    match analysis.rate_report() {
        Ok(report) => info!("{}", report.summary()),
        Err(err) => warn!(lead = %analysis.lead_used, "{err}"),
    }

    let report = output::run_report(&args.record, &analysis, figures);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(metadata) = metadata {
        print_comments(&metadata, args.dx_table.as_deref())?;
    }

    Ok(())
}

fn print_comments(metadata: &RecordMetadata, dx_table: Option<&std::path::Path>) -> Result<()> {
    let table = match dx_table {
        Some(path) => loader::load_dx_table(path)?,
        None => Default::default(),
    };
    println!("{}", metadata.annotated_comments(&table));
    Ok(())
}
