//! Model diagnostics: collinearity (VIF) and finite-variance checks.
//!
//! Both are informational. They are surfaced in the report and logs but never
//! alter the fitted values.

pub mod variance;
pub mod vif;

use serde::Serialize;
use tracing::info;

use crate::domain::Record;
use crate::fit::NestedFits;

pub use variance::{VarianceCheck, variance_checks};
pub use vif::{VifEntry, model_vif, vif};

/// VIFs for one fitted model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelVif {
    pub model: usize,
    pub entries: Vec<VifEntry>,
}

/// All diagnostics for a run.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub vif: Vec<ModelVif>,
    pub variance: Vec<VarianceCheck>,
    pub vif_threshold: f64,
}

impl Diagnostics {
    /// `(model, covariate name, vif)` for every flagged entry.
    pub fn flagged(&self) -> Vec<(usize, &'static str, f64)> {
        self.vif
            .iter()
            .flat_map(|m| {
                m.entries
                    .iter()
                    .filter(|e| e.flagged)
                    .map(move |e| (m.model, e.covariate.name(), e.vif))
            })
            .collect()
    }
}

/// Compute VIFs for every fitted model and variance checks on `records`.
pub fn run_diagnostics(records: &[&Record], fits: &NestedFits, vif_threshold: f64) -> Diagnostics {
    let vif = fits
        .fits
        .iter()
        .map(|fit| ModelVif {
            model: fit.spec.index,
            entries: model_vif(records, fit, vif_threshold),
        })
        .collect();

    let diagnostics = Diagnostics {
        vif,
        variance: variance_checks(records),
        vif_threshold,
    };

    for (model, name, value) in diagnostics.flagged() {
        info!(model, covariate = name, vif = value, "multicollinearity concern");
    }
    for check in diagnostics.variance.iter().filter(|c| !c.ok) {
        info!(variable = check.variable, "variance is not finite and positive");
    }

    diagnostics
}
