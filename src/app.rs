//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - runs the pipeline
//! - prints the report and plots
//! - writes optional exports and figures

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, DataArgs, PrepArgs, ReportArgs};
use crate::domain::{ReportConfig, Sample};
use crate::error::AppError;
use crate::logging::{self, Verbosity};

pub mod pipeline;

/// Entry point for the `mpg` binary.
pub fn run() -> Result<(), AppError> {
    // `mpg` and `mpg --seed 1` behave like `mpg report ...`. Clap needs a
    // subcommand name, so argv is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(&args),
        Command::Prep(args) => handle_prep(&args),
    }
}

fn init_logging(data: &DataArgs) {
    logging::init(Verbosity::from_flags(data.verbose, data.quiet));
}

fn handle_report(args: &ReportArgs) -> Result<(), AppError> {
    init_logging(&args.data);
    let config = args.config();
    let run = pipeline::run(&config)?;

    println!("{}", render_text(&run, &config));

    if let Some(path) = &config.export_records {
        crate::io::write_records_csv(path, &run.prep.partition)?;
        info!(path = %path.display(), "exported records");
    }
    if let Some(path) = &config.export_models {
        crate::io::write_models_json(path, &run.fits, &run.diagnostics, run.narrative.as_ref(), &config)?;
        info!(path = %path.display(), "exported models");
    }
    if let Some(dir) = &config.figures_dir {
        let evaluation = run.prep.partition.evaluation();
        crate::plot::write_figures(dir, &evaluation, run.fits.fits.first())?;
    }

    Ok(())
}

/// The full report text, with plots when enabled.
pub fn render_text(run: &pipeline::RunOutput, config: &ReportConfig) -> String {
    let mut out = crate::report::render_report(
        &run.prep,
        &run.fits,
        &run.diagnostics,
        run.narrative.as_ref(),
        config,
    );

    if config.plot {
        let (w, h) = (config.plot_width, config.plot_height);
        let explore = run.prep.partition.sample(Sample::Exploration);
        let evaluation = run.prep.partition.sample(Sample::Evaluation);
        let mpg: Vec<f64> = explore.iter().map(|r| r.mpg).collect();
        let displacement: Vec<f64> = explore.iter().map(|r| r.displacement).collect();

        out.push('\n');
        out.push_str(&crate::plot::render_mpg_scatter(&evaluation, run.fits.fits.first(), w, h));
        out.push('\n');
        out.push_str(&crate::plot::render_year_scatter(&explore, w, h));
        out.push('\n');
        out.push_str(&crate::plot::render_histogram(&displacement, "displacement", 20, w, h / 2));
        out.push('\n');
        out.push_str(&crate::plot::render_histogram(&mpg, "mpg", 20, w, h / 2));
    }

    out
}

fn handle_prep(args: &PrepArgs) -> Result<(), AppError> {
    init_logging(&args.data);
    let config = args.config();
    let prep = pipeline::prepare(&config)?;

    println!("{}", crate::report::format_run_summary(&prep, &config));

    if let Some(path) = &config.export_records {
        crate::io::write_records_csv(path, &prep.partition)?;
        info!(path = %path.display(), "exported records");
    }
    Ok(())
}

/// Rewrite argv so `mpg` defaults to `mpg report`.
///
/// Rules:
/// - `mpg`                      -> `mpg report`
/// - `mpg --seed 1 ...`         -> `mpg report --seed 1 ...`
/// - `mpg --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic;
    use crate::domain::DatasetSource;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_report() {
        assert_eq!(rewrite_args(args(&["mpg"])), args(&["mpg", "report"]));
        assert_eq!(
            rewrite_args(args(&["mpg", "--seed", "1"])),
            args(&["mpg", "report", "--seed", "1"])
        );
        assert_eq!(rewrite_args(args(&["mpg", "prep"])), args(&["mpg", "prep"]));
        assert_eq!(rewrite_args(args(&["mpg", "--help"])), args(&["mpg", "--help"]));
    }

    #[test]
    fn report_text_contains_every_section() {
        let mut config = ReportConfig::with_source(DatasetSource::Synthetic { n: 300, seed: 9 });
        config.expected_missing = synthetic::expected_missing(300);
        config.plot = true;
        let run = pipeline::run(&config).unwrap();

        let text = render_text(&run, &config);
        assert!(text.contains("Dedup (latest model year per car name"));
        assert!(text.contains("Descriptive statistics (exploration sample"));
        assert!(text.contains("Dependent variable: mpg"));
        assert!(text.contains("Variance inflation factors"));
        assert!(text.contains("10% cut in displacement"));
        assert!(text.contains("MPG vs displacement by model year"));
        assert!(text.contains("Histogram of mpg"));
    }
}
