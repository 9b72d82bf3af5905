//! Plain-text report sections.

use crate::diagnostics::Diagnostics;
use crate::domain::{Covariate, FittedModel, Record, ReportConfig, Sample};
use crate::fit::{INTERCEPT, NestedFits};
use crate::math::stats::{Summary, describe, pearson};
use crate::prep::PrepOutput;
use crate::report::narrative::{DISPLACEMENT_CUT, Narrative};

const LABEL_W: usize = 22;
const COL_W: usize = 14;

/// Significance stars at the 5%, 1% and 0.1% levels.
pub fn stars(p: f64) -> &'static str {
    if p < 0.001 {
        "***"
    } else if p < 0.01 {
        "**"
    } else if p < 0.05 {
        "*"
    } else {
        ""
    }
}

/// Three decimals, or scientific notation for very small magnitudes
/// (the displacement² coefficient lives around 1e-4).
pub fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return if v.is_nan() { "NaN".to_string() } else { "Inf".to_string() };
    }
    if v == 0.0 || v.abs() >= 0.001 {
        format!("{v:.3}")
    } else {
        format!("{v:.2e}")
    }
}

/// Dataset and pipeline stage summary.
pub fn format_run_summary(prep: &PrepOutput, config: &ReportConfig) -> String {
    let mut out = String::new();
    let (n_explore, n_eval) = prep.partition.counts();

    out.push_str("=== mpg - Fuel economy vs. engine displacement ===\n");
    out.push_str(&format!(
        "Rows read: {} | parse errors: {}\n",
        prep.table.rows_read,
        prep.table.row_errors.len()
    ));
    out.push_str(&format!(
        "Cleaning: dropped {} rows with missing horsepower (expected {}), {} invalid -> {} records\n",
        prep.cleaned.dropped_missing_hp,
        config.expected_missing,
        prep.cleaned.dropped_invalid,
        prep.cleaned.records.len()
    ));
    if let Some(warning) = &prep.cleaned.missing_warning {
        out.push_str(&format!("  warning: {warning}\n"));
    }
    out.push_str(&format!(
        "Dedup (latest model year per car name, ties: {:?}): {} -> {} records",
        config.tie_policy,
        prep.cleaned.records.len(),
        prep.deduped.len()
    ));
    if prep.tied.is_empty() {
        out.push('\n');
    } else {
        out.push_str(&format!(" ({} names tied at their latest year)\n", prep.tied.len()));
    }
    out.push_str(&format!(
        "Split (seed={}, ratio={}): exploration={} evaluation={}\n",
        prep.partition.seed, prep.partition.ratio, n_explore, n_eval
    ));

    out
}

/// Descriptive statistics for one sample.
pub fn format_descriptives(records: &[&Record], sample: Sample) -> String {
    let mut out = String::new();
    out.push_str(&format!("Descriptive statistics ({} sample, n={}):\n", sample.label(), records.len()));
    out.push_str(&format!(
        "{:<14} {:>9} {:>9} {:>9} {:>9} {:>9}\n",
        "variable", "mean", "sd", "min", "median", "max"
    ));
    out.push_str(&format!(
        "{:-<14} {:-<9} {:-<9} {:-<9} {:-<9} {:-<9}\n",
        "", "", "", "", "", ""
    ));

    let columns: [(&str, fn(&Record) -> f64); 6] = [
        ("mpg", |r| r.mpg),
        ("displacement", |r| r.displacement),
        ("horsepower", |r| r.horsepower),
        ("weight", |r| r.weight),
        ("acceleration", |r| r.acceleration),
        ("model_year", |r| f64::from(r.model_year)),
    ];
    for (name, get) in columns {
        let values: Vec<f64> = records.iter().map(|r| get(r)).collect();
        if let Some(s) = describe(&values) {
            out.push_str(&summary_row(name, &s));
        }
    }

    let mpg: Vec<f64> = records.iter().map(|r| r.mpg).collect();
    let disp: Vec<f64> = records.iter().map(|r| r.displacement).collect();
    if let Some(r) = pearson(&mpg, &disp) {
        out.push_str(&format!("corr(mpg, displacement) = {r:.3}\n"));
    }

    out
}

fn summary_row(name: &str, s: &Summary) -> String {
    format!(
        "{:<14} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2}\n",
        name, s.mean, s.sd, s.min, s.median, s.max
    )
}

/// Side-by-side comparison of the nested models.
///
/// Each covariate takes two lines: the estimate with stars, then the HC1
/// standard error in parentheses. Cells are blank where a model omits the
/// covariate; a model that failed to fit shows `n/a`.
pub fn format_comparison_table(fits: &NestedFits) -> String {
    let columns = fits.columns();
    let width = LABEL_W + COL_W * columns.len();
    let mut out = String::new();

    out.push_str(&"=".repeat(width));
    out.push('\n');
    let header = format!("{:<LABEL_W$}{:^w$}", "", "Dependent variable: mpg", w = COL_W * columns.len());
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&format!("{:<LABEL_W$}", ""));
    for (spec, _) in &columns {
        out.push_str(&format!("{:>COL_W$}", spec.label()));
    }
    out.push('\n');
    out.push_str(&"-".repeat(width));
    out.push('\n');

    let rows = Covariate::ALL.iter().map(|c| (c.name(), Some(*c))).chain(std::iter::once((INTERCEPT, None)));
    for (label, covariate) in rows {
        let cells: Vec<Option<(String, String)>> = columns
            .iter()
            .map(|(_, fit)| {
                let fit = (*fit)?;
                let coef = match covariate {
                    Some(c) => fit.coefficient(c)?,
                    None => fit.intercept(),
                };
                Some((
                    format!("{}{}", fmt_num(coef.estimate), stars(coef.p_value)),
                    format!("({})", fmt_num(coef.se_robust)),
                ))
            })
            .collect();
        if cells.iter().all(Option::is_none) {
            continue;
        }

        let mut est_line = format!("{label:<LABEL_W$}");
        let mut se_line = format!("{:<LABEL_W$}", "");
        for cell in &cells {
            let (est, se) = cell.clone().unwrap_or_default();
            est_line.push_str(&format!("{est:>COL_W$}"));
            se_line.push_str(&format!("{se:>COL_W$}"));
        }
        out.push_str(est_line.trim_end());
        out.push('\n');
        out.push_str(se_line.trim_end());
        out.push('\n');
    }

    out.push_str(&"-".repeat(width));
    out.push('\n');

    let summary_rows: [(&str, fn(&FittedModel) -> String); 4] = [
        ("Observations", |f| f.n.to_string()),
        ("R²", |f| format!("{:.3}", f.r_squared)),
        ("Adjusted R²", |f| format!("{:.3}", f.adj_r_squared)),
        ("Residual Std. Error", |f| format!("{:.3}", f.sigma)),
    ];
    for (label, value) in summary_rows {
        let mut line = format!("{label:<LABEL_W$}");
        for (_, fit) in &columns {
            let cell = fit.map(value).unwrap_or_else(|| "n/a".to_string());
            line.push_str(&format!("{cell:>COL_W$}"));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push_str(&"=".repeat(width));
    out.push('\n');
    out.push_str("Note: HC1 robust standard errors in parentheses. *p<0.05; **p<0.01; ***p<0.001\n");

    for (spec, reason) in &fits.skipped {
        out.push_str(&format!("Model {} not estimated: {reason}\n", spec.label()));
    }

    out
}

/// Collinearity and variance diagnostics.
pub fn format_diagnostics(diagnostics: &Diagnostics) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Variance inflation factors (flag: VIF > {}):\n",
        diagnostics.vif_threshold
    ));
    for m in &diagnostics.vif {
        let parts: Vec<String> = m
            .entries
            .iter()
            .map(|e| {
                let flag = if e.flagged { " !" } else { "" };
                format!("{}={}{flag}", e.covariate.name(), fmt_vif(e.vif))
            })
            .collect();
        out.push_str(&format!("  ({}) {}\n", m.model, parts.join(", ")));
    }

    let flagged = diagnostics.flagged();
    if flagged.is_empty() {
        out.push_str("  No covariate exceeds the threshold.\n");
    } else {
        out.push_str(&format!(
            "  {} covariate/model pairs exceed the threshold; their standard errors are inflated by collinearity.\n",
            flagged.len()
        ));
    }

    out.push_str("Finite-variance check (sample variance finite and > 0):\n");
    for c in &diagnostics.variance {
        let status = if c.ok { "ok" } else { "FAILED" };
        let value = c.variance.map(fmt_num).unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("  {:<16} {:>14}  {status}\n", c.variable, value));
    }

    out
}

fn fmt_vif(v: f64) -> String {
    if v.is_infinite() { "inf".to_string() } else { format!("{v:.2}") }
}

/// Headline figures as short sentences.
pub fn format_narrative(n: &Narrative) -> String {
    let mut out = String::new();
    let pct = DISPLACEMENT_CUT * 100.0;
    out.push_str(&format!(
        "Evaluation sample: n={}, mean mpg={:.2}, mean displacement={:.1} cu in\n",
        n.n_evaluation, n.mean_mpg, n.mean_displacement
    ));
    out.push_str(&format!(
        "Displacement coefficient ranges from {} (model ({})) to {} (model ({})).\n",
        fmt_num(n.coef_min.1),
        n.coef_min.0,
        fmt_num(n.coef_max.1),
        n.coef_max.0
    ));
    let (lo, hi) = n.linear_change_range();
    out.push_str(&format!(
        "A {pct:.0}% cut in displacement at the mean implies {lo:+.2} to {hi:+.2} mpg from the linear term alone.\n"
    ));
    for e in &n.effects {
        out.push_str(&format!(
            "  ({}) {pct:.0}% cut at the mean: {:+.2} mpg (all displacement terms)\n",
            e.model, e.mpg_change
        ));
    }
    out
}
