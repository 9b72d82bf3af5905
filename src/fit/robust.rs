//! Coefficient covariance estimators.
//!
//! Classical OLS:
//!
//! ```text
//! V = s² (X'X)^-1,                 s² = e'e / (n - k)
//! ```
//!
//! HC1 (White's sandwich with a degrees-of-freedom correction):
//!
//! ```text
//! V = n/(n-k) · (X'X)^-1 X' diag(e²) X (X'X)^-1
//! ```

use nalgebra::{DMatrix, DVector};

/// Classical (homoskedastic) covariance of the OLS coefficients.
pub fn classical_covariance(xtx_inv: &DMatrix<f64>, residuals: &DVector<f64>, df_resid: usize) -> DMatrix<f64> {
    let s2 = residuals.norm_squared() / df_resid as f64;
    xtx_inv * s2
}

/// HC1 heteroskedasticity-consistent covariance of the OLS coefficients.
///
/// `x` is the n×k design (intercept included), `residuals` the OLS residuals
/// and `xtx_inv` the inverse of `X'X`. Requires `n > k`.
pub fn hc1_covariance(x: &DMatrix<f64>, residuals: &DVector<f64>, xtx_inv: &DMatrix<f64>) -> DMatrix<f64> {
    let n = x.nrows();
    let k = x.ncols();

    // X' diag(e²) X == (|e| ∘ X)' (|e| ∘ X), scaling each row by |e_i|.
    let mut xe = x.clone();
    for (i, mut row) in xe.row_iter_mut().enumerate() {
        row.scale_mut(residuals[i].abs());
    }
    let meat = xe.transpose() * &xe;

    let correction = n as f64 / (n - k) as f64;
    xtx_inv * meat * xtx_inv * correction
}

/// Square roots of the diagonal (standard errors).
pub fn standard_errors(cov: &DMatrix<f64>) -> Vec<f64> {
    cov.diagonal().iter().map(|v| v.max(0.0).sqrt()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::FullRankSvd;

    #[test]
    fn hc1_matches_hand_computation_for_mean_model() {
        // Intercept-only model: beta = mean(y), HC1 var = n/(n-1) * Σe² / n².
        let y = [1.0, 2.0, 4.0, 7.0];
        let n = y.len() as f64;
        let mean = y.iter().sum::<f64>() / n;
        let x = DMatrix::from_element(4, 1, 1.0);
        let e = DVector::from_iterator(4, y.iter().map(|v| v - mean));
        let xtx_inv = FullRankSvd::new(&x).unwrap().xtx_inverse().unwrap();

        let cov = hc1_covariance(&x, &e, &xtx_inv);
        let expected = n / (n - 1.0) * e.norm_squared() / (n * n);
        assert!((cov[(0, 0)] - expected).abs() < 1e-12);

        // For the mean model HC1 coincides with the classical estimator.
        let classical = classical_covariance(&xtx_inv, &e, 3);
        assert!((classical[(0, 0)] - expected).abs() < 1e-12);
    }

    #[test]
    fn hc1_sandwich_on_two_column_design() {
        // x = 0..4 with an intercept; (X'X)^-1 = [[3/5, -1/5], [-1/5, 1/10]].
        // X' diag(e²) X = [[15/2, 22], [22, 73]], so with n/(n-k) = 5/3:
        // V = [[17/30, -4/15], [-4/15, 1/4]].
        let x = DMatrix::from_row_slice(5, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0, 1.0, 4.0]);
        let e = DVector::from_row_slice(&[0.5, -1.0, 0.0, 2.0, -1.5]);
        let xtx_inv = FullRankSvd::new(&x).unwrap().xtx_inverse().unwrap();

        let expected_inv = [[0.6, -0.2], [-0.2, 0.1]];
        let expected_cov = [[17.0 / 30.0, -4.0 / 15.0], [-4.0 / 15.0, 0.25]];
        let cov = hc1_covariance(&x, &e, &xtx_inv);
        for i in 0..2 {
            for j in 0..2 {
                assert!((xtx_inv[(i, j)] - expected_inv[i][j]).abs() < 1e-10);
                assert!(
                    (cov[(i, j)] - expected_cov[i][j]).abs() < 1e-10,
                    "cov[{i},{j}] = {}",
                    cov[(i, j)]
                );
            }
        }

        // Heteroskedastic residuals: the sandwich differs from s²(X'X)^-1.
        let classical = classical_covariance(&xtx_inv, &e, 3);
        assert!((classical[(0, 0)] - 1.5).abs() < 1e-10);
        assert!((classical[(1, 1)] - 0.25).abs() < 1e-10);
        assert!((classical[(0, 1)] - cov[(0, 1)]).abs() > 0.1);
    }

    #[test]
    fn standard_errors_are_sqrt_of_diagonal() {
        let cov = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 9.0]);
        assert_eq!(standard_errors(&cov), vec![2.0, 3.0]);
    }
}
