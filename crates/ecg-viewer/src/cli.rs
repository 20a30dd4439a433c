//! Command-line arguments

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Render ECG records on calibrated paper and report the heart rate
#[derive(Parser, Debug)]
#[command(name = "ecg-viewer")]
#[command(author, version, about = "ECG grid rendering and heart-rate analysis")]
pub struct Args {
    /// CSV record: header row of lead names, one column per lead
    #[arg(short, long, conflicts_with = "synthetic_bpm", required_unless_present = "synthetic_bpm")]
    pub input: Option<PathBuf>,

    /// Synthesise a regular 12-lead record at this rate instead of reading one
    #[arg(long)]
    pub synthetic_bpm: Option<f64>,

    /// Sampling rate of the input in Hz
    #[arg(long, default_value = "500")]
    pub fs: f64,

    /// Seconds of signal to draw
    #[arg(short, long, default_value = "10")]
    pub seconds: f64,

    #[arg(short, long, value_enum, default_value = "stacked")]
    pub layout: Layout,

    /// Lead to compute the rate on (default II, else the first lead)
    #[arg(long)]
    pub lead: Option<String>,

    /// Record identifier used in titles and file names
    #[arg(short, long, default_value = "record")]
    pub record: String,

    /// Text file of record comments, one per line (`Dx:` lines carry codes)
    #[arg(long)]
    pub comments: Option<PathBuf>,

    /// CSV of `code,description` rows used to expand `Dx:` codes
    #[arg(long)]
    pub dx_table: Option<PathBuf>,

    /// Processing configuration as JSON (default: clinical preset)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for the synthetic record
    #[arg(long, default_value = "0")]
    pub seed: u64,

    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    /// All leads stacked on one sheet
    Stacked,
    /// One sheet per lead
    PerLead,
}
