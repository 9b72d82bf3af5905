//! Command-line parsing for the MPG report.
//!
//! Parsing and dispatch stay separate from the statistics: arguments are
//! folded into a plain `ReportConfig` before any library code runs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::{resolve_url, synthetic};
use crate::domain::{DatasetSource, ReportConfig, TiePolicy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mpg", version, about = "Fuel economy vs. engine displacement (Auto MPG)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pipeline: prepare, fit the nested models, print the report.
    Report(ReportArgs),
    /// Load, clean, deduplicate and split only; print the stage counts.
    Prep(PrepArgs),
}

/// Dataset and preparation options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Read the dataset from a local file instead of downloading it.
    #[arg(long, value_name = "PATH", conflicts_with_all = ["url", "synthetic"])]
    pub input: Option<PathBuf>,

    /// Dataset URL (defaults to $MPG_DATA_URL, then the UCI mirror).
    #[arg(long, conflicts_with = "synthetic")]
    pub url: Option<String>,

    /// Generate a synthetic dataset offline instead of downloading.
    #[arg(long)]
    pub synthetic: bool,

    /// Number of rows for `--synthetic`.
    #[arg(long, default_value_t = 398)]
    pub synthetic_rows: usize,

    /// Seed for the exploration/evaluation split (and `--synthetic`).
    #[arg(long, default_value_t = ReportConfig::DEFAULT_SEED)]
    pub seed: u64,

    /// Fraction of records assigned to the exploration sample.
    #[arg(long, default_value_t = ReportConfig::DEFAULT_RATIO)]
    pub ratio: f64,

    /// How to treat several records of one car name in its latest model year.
    #[arg(long, value_enum, default_value_t = TiePolicy::KeepAll)]
    pub dedup_ties: TiePolicy,

    /// Expected number of rows with missing horsepower (a mismatch only warns).
    #[arg(long)]
    pub expected_missing: Option<usize>,

    /// Log debug detail to stderr.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Options for `report`.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Render ASCII plots in the terminal (the default; overrides an earlier `--no-plot`).
    #[arg(long, overrides_with = "no_plot")]
    pub plot: bool,

    /// Disable the terminal plots.
    #[arg(long, overrides_with = "plot")]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export prepared records with their sample assignment to CSV.
    #[arg(long, value_name = "CSV")]
    pub export_records: Option<PathBuf>,

    /// Export fitted models and diagnostics to JSON.
    #[arg(long, value_name = "JSON")]
    pub export_models: Option<PathBuf>,

    /// Write SVG figures into this directory.
    #[arg(long, value_name = "DIR")]
    pub figures: Option<PathBuf>,

    /// Flag covariates whose variance inflation factor exceeds this value.
    #[arg(long, default_value_t = ReportConfig::DEFAULT_VIF_THRESHOLD)]
    pub vif_threshold: f64,
}

/// Options for `prep`.
#[derive(Debug, Args, Clone)]
pub struct PrepArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Export prepared records with their sample assignment to CSV.
    #[arg(long, value_name = "CSV")]
    pub export_records: Option<PathBuf>,
}

impl DataArgs {
    pub fn source(&self) -> DatasetSource {
        if let Some(path) = &self.input {
            DatasetSource::File(path.clone())
        } else if self.synthetic {
            DatasetSource::Synthetic {
                n: self.synthetic_rows,
                seed: self.seed,
            }
        } else {
            DatasetSource::Remote(resolve_url(self.url.as_deref()))
        }
    }

    /// Config with the data options applied and report options at defaults.
    pub fn config(&self) -> ReportConfig {
        let source = self.source();
        let expected_missing = self.expected_missing.unwrap_or(match &source {
            DatasetSource::Synthetic { n, .. } => synthetic::expected_missing(*n),
            _ => ReportConfig::DEFAULT_EXPECTED_MISSING,
        });
        ReportConfig {
            expected_missing,
            tie_policy: self.dedup_ties,
            split_ratio: self.ratio,
            split_seed: self.seed,
            ..ReportConfig::with_source(source)
        }
    }
}

impl ReportArgs {
    pub fn config(&self) -> ReportConfig {
        ReportConfig {
            vif_threshold: self.vif_threshold,
            plot: !self.no_plot,
            plot_width: self.width,
            plot_height: self.height,
            export_records: self.export_records.clone(),
            export_models: self.export_models.clone(),
            figures_dir: self.figures.clone(),
            ..self.data.config()
        }
    }
}

impl PrepArgs {
    pub fn config(&self) -> ReportConfig {
        ReportConfig {
            export_records: self.export_records.clone(),
            ..self.data.config()
        }
    }
}
