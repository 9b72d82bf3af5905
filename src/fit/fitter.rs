//! Ordinary least squares for one specification.
//!
//! Given records and an ordered covariate list we:
//! - build the design `[1, x_1, ..., x_p]` and the MPG response
//! - factor the design once (SVD), rejecting rank-deficient designs
//! - solve for β, then compute residuals, R², classical and HC1 covariance
//! - attach t statistics and p-values based on the HC1 standard errors

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::{Coefficient, Covariate, FittedModel, ModelSpec, Record};
use crate::error::AppError;
use crate::fit::robust::{classical_covariance, hc1_covariance, standard_errors};
use crate::math::{FullRankSvd, r_squared, student_t_two_sided_p};

pub const INTERCEPT: &str = "(Intercept)";

/// Raw least-squares output on an explicit design.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub beta: DVector<f64>,
    pub residuals: DVector<f64>,
    pub xtx_inv: DMatrix<f64>,
}

/// Why a design could not be fitted.
#[derive(Debug, Clone, PartialEq)]
pub enum DesignError {
    /// Fewer observations than coefficients plus one.
    TooFewRows { n: usize, k: usize },
    /// Columns are (numerically) linearly dependent.
    RankDeficient { rank: usize, k: usize },
    /// The solve produced non-finite values.
    NonFinite,
}

impl std::fmt::Display for DesignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DesignError::TooFewRows { n, k } => {
                write!(f, "underdetermined: n={n} observations for k={k} coefficients")
            }
            DesignError::RankDeficient { rank, k } => {
                write!(f, "design matrix is rank-deficient (rank {rank} < {k} columns)")
            }
            DesignError::NonFinite => write!(f, "least squares produced non-finite values"),
        }
    }
}

impl From<DesignError> for AppError {
    fn from(err: DesignError) -> Self {
        match err {
            DesignError::TooFewRows { .. } => AppError::no_data(err.to_string()),
            DesignError::RankDeficient { .. } | DesignError::NonFinite => AppError::data(err.to_string()),
        }
    }
}

/// Fit `y ~ x` by OLS. `x` must already contain the intercept column.
pub fn fit_design(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<OlsFit, DesignError> {
    let (n, k) = (x.nrows(), x.ncols());
    if n <= k {
        return Err(DesignError::TooFewRows { n, k });
    }
    let svd = FullRankSvd::new(x).map_err(|rank| DesignError::RankDeficient { rank, k })?;
    let beta = svd.solve(y).ok_or(DesignError::NonFinite)?;
    let xtx_inv = svd.xtx_inverse().ok_or(DesignError::NonFinite)?;
    let residuals = y - x * &beta;
    Ok(OlsFit {
        beta,
        residuals,
        xtx_inv,
    })
}

/// Design matrix `[1, covariates...]` for `records`.
pub fn design_matrix(records: &[&Record], covariates: &[Covariate]) -> DMatrix<f64> {
    let k = covariates.len() + 1;
    DMatrix::from_fn(records.len(), k, |i, j| match j {
        0 => 1.0,
        _ => covariates[j - 1].value(records[i]),
    })
}

pub fn response(records: &[&Record]) -> DVector<f64> {
    DVector::from_iterator(records.len(), records.iter().map(|r| r.mpg))
}

/// Fit one specification of `mpg ~ covariates` on `records`.
pub fn fit_ols(spec: &ModelSpec, records: &[&Record]) -> Result<FittedModel, AppError> {
    let x = design_matrix(records, &spec.covariates);
    let y = response(records);
    let ols = fit_design(&x, &y).map_err(|e| AppError::from(e).with_context(&format!("Model {}", spec.label())))?;

    let n = x.nrows();
    let k = x.ncols();
    let df_resid = n - k;

    let r2 = r_squared(&y, &ols.residuals)
        .ok_or_else(|| AppError::data(format!("Model {}: MPG has no variation.", spec.label())))?;
    let adj_r2 = 1.0 - (1.0 - r2) * (n as f64 - 1.0) / df_resid as f64;
    let sigma = (ols.residuals.norm_squared() / df_resid as f64).sqrt();

    let se_classical = standard_errors(&classical_covariance(&ols.xtx_inv, &ols.residuals, df_resid));
    let se_robust = standard_errors(&hc1_covariance(&x, &ols.residuals, &ols.xtx_inv));

    let names = std::iter::once(INTERCEPT.to_string())
        .chain(spec.covariates.iter().map(|c| c.name().to_string()));
    let coefficients: Vec<Coefficient> = names
        .enumerate()
        .map(|(j, name)| {
            let estimate = ols.beta[j];
            let t_stat = estimate / se_robust[j];
            Coefficient {
                name,
                estimate,
                se_classical: se_classical[j],
                se_robust: se_robust[j],
                t_stat,
                p_value: student_t_two_sided_p(t_stat, df_resid as f64),
            }
        })
        .collect();

    debug!(model = spec.index, n, r2, "fitted OLS model");

    Ok(FittedModel {
        spec: spec.clone(),
        coefficients,
        r_squared: r2,
        adj_r_squared: adj_r2,
        sigma,
        n,
        df_resid,
        residuals: ols.residuals.iter().copied().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRecord;
    use crate::prep::clean::derive;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    fn rec(displacement: f64, weight: f64, mpg: f64) -> Record {
        let raw = RawRecord {
            mpg,
            cylinders: 4,
            displacement,
            horsepower: Some(90.0),
            weight,
            acceleration: 15.0,
            model_year: 76,
            origin: 1,
            car_name: "x".to_string(),
        };
        derive(&raw, 90.0).unwrap()
    }

    #[test]
    fn recovers_exact_linear_relation() {
        let recs: Vec<Record> = (0..10)
            .map(|i| {
                let d = 100.0 + 20.0 * i as f64;
                rec(d, 2000.0, 40.0 - 0.05 * d)
            })
            .collect();
        let refs: Vec<&Record> = recs.iter().collect();
        let fit = fit_ols(&ModelSpec::new(1, vec![Covariate::Displacement]), &refs).unwrap();

        assert!((fit.intercept().estimate - 40.0).abs() < 1e-9);
        let slope = fit.coefficient(Covariate::Displacement).unwrap();
        assert!((slope.estimate + 0.05).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(fit.df_resid, 8);
        assert!(fit.coefficient(Covariate::Weight).is_none());
    }

    #[test]
    fn rank_deficient_design_is_fatal_for_the_model() {
        // Constant weight is collinear with the intercept.
        let recs: Vec<Record> = (0..8).map(|i| rec(100.0 + i as f64, 2500.0, 20.0 + i as f64)).collect();
        let refs: Vec<&Record> = recs.iter().collect();
        let spec = ModelSpec::new(3, vec![Covariate::Displacement, Covariate::Weight]);
        let err = fit_ols(&spec, &refs).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
        assert!(err.to_string().contains("rank-deficient"), "{err}");
    }

    #[test]
    fn too_few_rows_is_no_data() {
        let recs = vec![rec(100.0, 2000.0, 30.0), rec(200.0, 3000.0, 20.0)];
        let refs: Vec<&Record> = recs.iter().collect();
        let spec = ModelSpec::new(2, vec![Covariate::Displacement, Covariate::Weight]);
        assert_eq!(fit_ols(&spec, &refs).unwrap_err().exit_code(), crate::error::EXIT_NO_DATA);
    }

    #[test]
    fn hc1_close_to_classical_under_homoskedasticity() {
        let mut rng = StdRng::seed_from_u64(42);
        let noise = Normal::<f64>::new(0.0, 2.0).unwrap();
        let recs: Vec<Record> = (0..4000)
            .map(|i| {
                let d = 70.0 + (i % 400) as f64;
                let w = 1800.0 + ((i * 37) % 2500) as f64;
                let mpg = 45.0 - 0.04 * d - 0.004 * w + noise.sample(&mut rng);
                rec(d, w, mpg)
            })
            .collect();
        let refs: Vec<&Record> = recs.iter().collect();
        let spec = ModelSpec::new(3, vec![Covariate::Displacement, Covariate::Weight]);
        let fit = fit_ols(&spec, &refs).unwrap();

        for c in &fit.coefficients {
            let rel = (c.se_robust - c.se_classical).abs() / c.se_classical;
            assert!(rel < 0.1, "{}: robust={} classical={}", c.name, c.se_robust, c.se_classical);
        }
        assert!((fit.sigma - 2.0).abs() < 0.1);
    }

    #[test]
    fn design_matrix_has_intercept_first() {
        let recs = vec![rec(100.0, 2000.0, 30.0)];
        let refs: Vec<&Record> = recs.iter().collect();
        let x = design_matrix(&refs, &[Covariate::DisplacementSq, Covariate::Weight]);
        assert_eq!(x.ncols(), 3);
        assert_eq!(x[(0, 0)], 1.0);
        assert_eq!(x[(0, 1)], 10_000.0);
        assert_eq!(x[(0, 2)], 2000.0);
    }
}
