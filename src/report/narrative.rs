//! Headline figures quoted in the report text.

use serde::Serialize;

use crate::domain::{Covariate, FittedModel, Record};
use crate::fit::NestedFits;
use crate::math::stats::mean;

/// Relative displacement change used for the headline effect.
pub const DISPLACEMENT_CUT: f64 = 0.10;

/// Effect of cutting displacement by 10% at the mean, for one model.
#[derive(Debug, Clone, Serialize)]
pub struct DisplacementEffect {
    pub model: usize,
    pub coefficient: f64,
    /// `coefficient · (-0.1 · mean displacement)`: the linear-term-only effect.
    pub linear_change: f64,
    /// `f(0.9·d̄) - f(d̄)` using every displacement term in the model.
    pub mpg_change: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Narrative {
    pub n_evaluation: usize,
    pub mean_mpg: f64,
    pub mean_displacement: f64,
    /// `(model, coefficient)` with the smallest displacement coefficient.
    pub coef_min: (usize, f64),
    /// `(model, coefficient)` with the largest displacement coefficient.
    pub coef_max: (usize, f64),
    pub effects: Vec<DisplacementEffect>,
}

impl Narrative {
    /// Linear-term MPG changes implied by the min and max coefficients.
    pub fn linear_change_range(&self) -> (f64, f64) {
        let delta = -DISPLACEMENT_CUT * self.mean_displacement;
        let a = self.coef_min.1 * delta;
        let b = self.coef_max.1 * delta;
        (a.min(b), a.max(b))
    }
}

/// MPG change from cutting displacement by `DISPLACEMENT_CUT` at `d`.
pub fn displacement_effect(fit: &FittedModel, d: f64) -> Option<DisplacementEffect> {
    let b1 = fit.coefficient(Covariate::Displacement)?.estimate;
    let b2 = fit
        .coefficient(Covariate::DisplacementSq)
        .map(|c| c.estimate)
        .unwrap_or(0.0);
    let d_new = (1.0 - DISPLACEMENT_CUT) * d;
    Some(DisplacementEffect {
        model: fit.spec.index,
        coefficient: b1,
        linear_change: b1 * (d_new - d),
        mpg_change: b1 * (d_new - d) + b2 * (d_new * d_new - d * d),
    })
}

/// Compute the narrative figures from the fitted models and evaluation sample.
///
/// Returns `None` when there is nothing to summarize.
pub fn narrative_figures(fits: &NestedFits, evaluation: &[&Record]) -> Option<Narrative> {
    let displacement: Vec<f64> = evaluation.iter().map(|r| r.displacement).collect();
    let mpg: Vec<f64> = evaluation.iter().map(|r| r.mpg).collect();
    let mean_displacement = mean(&displacement)?;
    let mean_mpg = mean(&mpg)?;

    let effects: Vec<DisplacementEffect> = fits
        .fits
        .iter()
        .filter_map(|f| displacement_effect(f, mean_displacement))
        .collect();

    let coef_min = effects
        .iter()
        .min_by(|a, b| a.coefficient.total_cmp(&b.coefficient))
        .map(|e| (e.model, e.coefficient))?;
    let coef_max = effects
        .iter()
        .max_by(|a, b| a.coefficient.total_cmp(&b.coefficient))
        .map(|e| (e.model, e.coefficient))?;

    Some(Narrative {
        n_evaluation: evaluation.len(),
        mean_mpg,
        mean_displacement,
        coef_min,
        coef_max,
        effects,
    })
}
