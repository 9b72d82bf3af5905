//! Reporting: text sections and the headline figures they quote.

pub mod format;
pub mod narrative;

use crate::diagnostics::Diagnostics;
use crate::domain::{ReportConfig, Sample};
use crate::fit::NestedFits;
use crate::prep::PrepOutput;

pub use format::{
    fmt_num, format_comparison_table, format_descriptives, format_diagnostics, format_narrative,
    format_run_summary, stars,
};
pub use narrative::{DisplacementEffect, Narrative, displacement_effect, narrative_figures};

/// Assemble the full text report (without plots).
pub fn render_report(
    prep: &PrepOutput,
    fits: &NestedFits,
    diagnostics: &Diagnostics,
    narrative: Option<&Narrative>,
    config: &ReportConfig,
) -> String {
    let mut out = String::new();
    out.push_str(&format_run_summary(prep, config));
    out.push('\n');
    out.push_str(&format_descriptives(&prep.partition.exploration(), Sample::Exploration));
    out.push('\n');
    out.push_str(&format_descriptives(&prep.partition.evaluation(), Sample::Evaluation));
    out.push('\n');
    out.push_str("Nested OLS models fitted on the evaluation sample:\n");
    out.push_str(&format_comparison_table(fits));
    out.push('\n');
    out.push_str(&format_diagnostics(diagnostics));
    if let Some(n) = narrative {
        out.push('\n');
        out.push_str(&format_narrative(n));
    }
    out
}
