//! The analysis pipeline shared by `report` and `prep`.
//!
//! load -> clean -> dedup -> split -> fit nested models -> diagnostics ->
//! narrative figures. Front-ends only decide what to print or export.

use tracing::info;

use crate::data::{self, ParsedTable, parse_table};
use crate::diagnostics::{Diagnostics, run_diagnostics};
use crate::domain::ReportConfig;
use crate::error::AppError;
use crate::fit::{NestedFits, fit_nested};
use crate::prep::{self, PrepOutput};
use crate::report::{Narrative, narrative_figures};

/// All computed outputs of a `report` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub prep: PrepOutput,
    pub fits: NestedFits,
    pub diagnostics: Diagnostics,
    pub narrative: Option<Narrative>,
}

/// Load the configured source and run the preparation stages only.
pub fn prepare(config: &ReportConfig) -> Result<PrepOutput, AppError> {
    let table = data::load(&config.source)?;
    prepare_table(table, config)
}

fn prepare_table(table: ParsedTable, config: &ReportConfig) -> Result<PrepOutput, AppError> {
    info!(
        rows = table.rows_read,
        parsed = table.records.len(),
        errors = table.row_errors.len(),
        "parsed dataset"
    );
    prep::prepare(table, config)
}

/// Execute the full pipeline against the configured source.
pub fn run(config: &ReportConfig) -> Result<RunOutput, AppError> {
    let prep = prepare(config)?;
    analyze(prep, config)
}

/// Execute the full pipeline on already-fetched table text.
pub fn run_with_text(config: &ReportConfig, text: &str) -> Result<RunOutput, AppError> {
    let prep = prepare_table(parse_table(text)?, config)?;
    analyze(prep, config)
}

fn analyze(prep: PrepOutput, config: &ReportConfig) -> Result<RunOutput, AppError> {
    let evaluation = prep.partition.evaluation();
    let fits = fit_nested(&evaluation).map_err(|e| e.with_context("Fitting nested models"))?;
    let diagnostics = run_diagnostics(&evaluation, &fits, config.vif_threshold);
    let narrative = narrative_figures(&fits, &evaluation);

    Ok(RunOutput {
        prep,
        fits,
        diagnostics,
        narrative,
    })
}
