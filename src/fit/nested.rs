//! Fit the nested MPG specifications.
//!
//! Each specification is fitted independently on the same records. A model
//! that cannot be fitted (rank-deficient design, too few rows) is recorded in
//! `skipped` with its reason; the remaining models are still reported.

use tracing::{info, warn};

use crate::domain::{FittedModel, ModelSpec, Record};
use crate::error::{AppError, EXIT_DATA};
use crate::fit::fitter::fit_ols;

/// Output of fitting the nested sequence.
#[derive(Debug, Clone)]
pub struct NestedFits {
    /// Successfully fitted models, in specification order.
    pub fits: Vec<FittedModel>,
    /// Models that failed, and why.
    pub skipped: Vec<(ModelSpec, String)>,
}

impl NestedFits {
    /// All specifications in order, each paired with its fit when it succeeded.
    pub fn columns(&self) -> Vec<(ModelSpec, Option<&FittedModel>)> {
        let mut cols: Vec<(ModelSpec, Option<&FittedModel>)> = self
            .fits
            .iter()
            .map(|f| (f.spec.clone(), Some(f)))
            .chain(self.skipped.iter().map(|(spec, _)| (spec.clone(), None)))
            .collect();
        cols.sort_by_key(|(spec, _)| spec.index);
        cols
    }
}

/// Fit every spec in `specs` on `records`.
///
/// Only an empty result is an error: individual failures are kept in `skipped`.
/// The error then carries the exit code of the first failure.
pub fn fit_specs(specs: &[ModelSpec], records: &[&Record]) -> Result<NestedFits, AppError> {
    let mut fits = Vec::with_capacity(specs.len());
    let mut skipped = Vec::new();
    let mut exit_code = EXIT_DATA;

    for spec in specs {
        match fit_ols(spec, records) {
            Ok(fit) => {
                info!(model = spec.index, n = fit.n, r2 = fit.r_squared, "model fitted");
                fits.push(fit);
            }
            Err(err) => {
                warn!(model = spec.index, "model skipped: {err}");
                if skipped.is_empty() {
                    exit_code = err.exit_code();
                }
                skipped.push((spec.clone(), err.message().to_string()));
            }
        }
    }

    if fits.is_empty() {
        let first = skipped.first().map_or("no specifications", |(_, reason)| reason.as_str());
        return Err(AppError::new(
            exit_code,
            format!("No model could be fitted on the evaluation sample ({first})."),
        ));
    }

    Ok(NestedFits { fits, skipped })
}

/// Fit the four nested specifications from [`ModelSpec::nested`].
pub fn fit_nested(records: &[&Record]) -> Result<NestedFits, AppError> {
    fit_specs(&ModelSpec::nested(), records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{parse_table, synthetic};
    use crate::domain::Covariate;
    use crate::prep::clean;

    fn synthetic_records(n: usize, seed: u64) -> Vec<Record> {
        let table = parse_table(&synthetic::generate(n, seed).unwrap()).unwrap();
        clean(&table.records, synthetic::expected_missing(n)).records
    }

    #[test]
    fn nested_r_squared_never_decreases() {
        let recs = synthetic_records(300, 11);
        let refs: Vec<&Record> = recs.iter().collect();
        let nested = fit_nested(&refs).unwrap();

        assert_eq!(nested.fits.len(), 4);
        assert!(nested.skipped.is_empty());
        for pair in nested.fits.windows(2) {
            assert!(
                pair[1].r_squared >= pair[0].r_squared - 1e-12,
                "R² fell from {} to {}",
                pair[0].r_squared,
                pair[1].r_squared
            );
        }
    }

    #[test]
    fn failing_model_is_skipped_not_fatal() {
        // All records share one model year, so the year column is collinear
        // with the intercept and only the last spec fails.
        let recs: Vec<Record> = synthetic_records(120, 5)
            .into_iter()
            .map(|mut r| {
                r.model_year = 76;
                r
            })
            .collect();
        let refs: Vec<&Record> = recs.iter().collect();
        let nested = fit_nested(&refs).unwrap();

        assert_eq!(nested.fits.len(), 3);
        assert_eq!(nested.skipped.len(), 1);
        assert!(nested.skipped[0].0.contains(Covariate::ModelYear));
        assert!(nested.skipped[0].1.contains("rank-deficient"));

        let cols = nested.columns();
        assert_eq!(cols.len(), 4);
        assert!(cols[3].1.is_none());
    }

    #[test]
    fn too_few_rows_everywhere_is_no_data() {
        let recs = synthetic_records(40, 2);
        let refs: Vec<&Record> = recs.iter().take(2).collect();
        let err = fit_nested(&refs).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_NO_DATA);
        assert!(err.message().contains("No model could be fitted"));
    }

    #[test]
    fn rank_deficient_everywhere_is_a_data_error() {
        // One repeated record: every non-intercept column is constant.
        let recs = synthetic_records(40, 2);
        let refs: Vec<&Record> = std::iter::repeat_n(&recs[0], 10).collect();
        let err = fit_nested(&refs).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }
}
