//! Variance inflation factors.
//!
//! For covariate `X_j` in a model, regress `X_j` on an intercept and the
//! model's other covariates and compute `VIF_j = 1 / (1 - R²_j)`.
//! VIF is infinite when `X_j` is (numerically) an exact linear combination
//! of the others, and exactly `1` when the model has a single covariate.

use nalgebra::DVector;
use serde::Serialize;

use crate::domain::{Covariate, FittedModel, Record};
use crate::fit::design_matrix;
use crate::math::{min_norm_least_squares, r_squared};

/// `1 - R²` at or below this is treated as an exact linear dependence.
const EXACT_FIT_EPS: f64 = 1e-10;

#[derive(Debug, Clone, Serialize)]
pub struct VifEntry {
    pub covariate: Covariate,
    pub vif: f64,
    /// `vif > threshold`.
    pub flagged: bool,
}

/// VIFs for each covariate in `covariates`, evaluated on `records`.
pub fn vif(records: &[&Record], covariates: &[Covariate], threshold: f64) -> Vec<VifEntry> {
    covariates
        .iter()
        .enumerate()
        .map(|(j, &target)| {
            let others: Vec<Covariate> = covariates
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != j)
                .map(|(_, &c)| c)
                .collect();
            let value = single_vif(records, target, &others);
            VifEntry {
                covariate: target,
                vif: value,
                flagged: value > threshold,
            }
        })
        .collect()
}

/// VIFs for a fitted model's covariates.
pub fn model_vif(records: &[&Record], model: &FittedModel, threshold: f64) -> Vec<VifEntry> {
    vif(records, &model.spec.covariates, threshold)
}

fn single_vif(records: &[&Record], target: Covariate, others: &[Covariate]) -> f64 {
    if others.is_empty() {
        return 1.0;
    }
    let x = design_matrix(records, others);
    let y = DVector::from_iterator(records.len(), records.iter().map(|r| target.value(r)));

    if x.nrows() <= x.ncols() {
        return f64::NAN;
    }

    // The other covariates may themselves be collinear; the minimum-norm
    // solution still gives the projection of the target onto their span.
    let Some(beta) = min_norm_least_squares(&x, &y) else {
        return f64::NAN;
    };
    let residuals = &y - &x * beta;

    // A constant target is collinear with the intercept.
    let Some(r2) = r_squared(&y, &residuals) else {
        return f64::INFINITY;
    };
    let tolerance = 1.0 - r2;
    if tolerance <= EXACT_FIT_EPS {
        f64::INFINITY
    } else {
        1.0 / tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRecord;
    use crate::prep::clean::derive;

    fn rec(displacement: f64, weight: f64, acceleration: f64) -> Record {
        let raw = RawRecord {
            mpg: 20.0,
            cylinders: 4,
            displacement,
            horsepower: Some(90.0),
            weight,
            acceleration,
            model_year: 76,
            origin: 1,
            car_name: "x".to_string(),
        };
        derive(&raw, 90.0).unwrap()
    }

    #[test]
    fn orthogonal_covariates_have_unit_vif() {
        // Centered, balanced 2x2 design: displacement and weight are uncorrelated.
        let recs = vec![
            rec(100.0, 2000.0, 15.0),
            rec(100.0, 3000.0, 15.0),
            rec(200.0, 2000.0, 15.0),
            rec(200.0, 3000.0, 15.0),
        ];
        let refs: Vec<&Record> = recs.iter().collect();
        let out = vif(&refs, &[Covariate::Displacement, Covariate::Weight], 4.0);
        for e in &out {
            assert!((e.vif - 1.0).abs() < 1e-9, "{:?}", e);
            assert!(!e.flagged);
        }
    }

    #[test]
    fn exact_linear_combination_is_infinite() {
        // weight = 10 * displacement + 500
        let recs: Vec<Record> = (0..6)
            .map(|i| {
                let d = 100.0 + 25.0 * i as f64;
                rec(d, 10.0 * d + 500.0, 12.0 + (i * i) as f64)
            })
            .collect();
        let refs: Vec<&Record> = recs.iter().collect();
        let out = vif(&refs, &[Covariate::Displacement, Covariate::Weight, Covariate::Acceleration], 4.0);
        assert!(out[0].vif.is_infinite());
        assert!(out[1].vif.is_infinite());
        assert!(out[0].flagged);
        // Acceleration is not part of the dependence.
        assert!(out[2].vif.is_finite());
    }

    #[test]
    fn displacement_and_its_square_are_flagged() {
        let recs: Vec<Record> = (0..30)
            .map(|i| rec(80.0 + 10.0 * i as f64, 2000.0 + (i % 7) as f64 * 150.0, 15.0))
            .collect();
        let refs: Vec<&Record> = recs.iter().collect();
        let out = vif(&refs, &[Covariate::Displacement, Covariate::DisplacementSq], 4.0);
        assert!(out.iter().all(|e| e.flagged && e.vif > 4.0));
    }

    #[test]
    fn single_covariate_has_unit_vif() {
        let recs = vec![rec(100.0, 2000.0, 15.0), rec(150.0, 2500.0, 16.0)];
        let refs: Vec<&Record> = recs.iter().collect();
        let out = vif(&refs, &[Covariate::Displacement], 4.0);
        assert_eq!(out[0].vif, 1.0);
    }
}
