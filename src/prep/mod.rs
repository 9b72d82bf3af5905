//! Data preparation stages.
//!
//! Each stage borrows its input and returns a new value:
//! clean -> dedup -> split.

pub mod clean;
pub mod dedup;
pub mod split;

use tracing::info;

use crate::data::ParsedTable;
use crate::domain::{Record, ReportConfig};
use crate::error::AppError;

pub use clean::{CleanOutput, clean, derive};
pub use dedup::{dedup_latest, tied_names};
pub use split::{Partition, exploration_size, split};

/// Everything the preparation stages produce, kept for reporting.
#[derive(Debug, Clone)]
pub struct PrepOutput {
    pub table: ParsedTable,
    pub cleaned: CleanOutput,
    pub deduped: Vec<Record>,
    /// Names that kept more than one record (max-year ties).
    pub tied: Vec<String>,
    pub partition: Partition,
}

/// Run clean -> dedup -> split on a parsed table.
pub fn prepare(table: ParsedTable, config: &ReportConfig) -> Result<PrepOutput, AppError> {
    let cleaned = clean(&table.records, config.expected_missing);
    info!(
        rows = table.records.len(),
        kept = cleaned.records.len(),
        dropped_missing_hp = cleaned.dropped_missing_hp,
        "cleaned dataset"
    );
    if cleaned.records.is_empty() {
        return Err(AppError::no_data("No records left after cleaning."));
    }

    let deduped = dedup_latest(&cleaned.records, config.tie_policy);
    let tied = tied_names(&deduped);
    info!(
        before = cleaned.records.len(),
        after = deduped.len(),
        ties = tied.len(),
        "deduplicated car names"
    );

    let partition = split(&deduped, config.split_ratio, config.split_seed)?;
    let (n_explore, n_eval) = partition.counts();
    info!(
        seed = config.split_seed,
        ratio = config.split_ratio,
        exploration = n_explore,
        evaluation = n_eval,
        "split dataset"
    );

    Ok(PrepOutput {
        table,
        cleaned,
        deduped,
        tied,
        partition,
    })
}
