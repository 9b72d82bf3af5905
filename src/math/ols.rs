//! Least squares primitives on `nalgebra` matrices.
//!
//! All solves go through the SVD of the design matrix:
//!
//! - it handles tall (n > k) systems directly (`QR::solve` is meant for
//!   square systems)
//! - the singular values give a numerical rank for free, which is how we
//!   detect collinear designs (e.g. displacement vs. displacement²)
//! - `(X'X)^-1 = V Σ^-2 V'` comes out of the same factorization

use nalgebra::{DMatrix, DVector, SVD};

/// A design whose SVD has been checked for full column rank.
pub struct FullRankSvd {
    svd: SVD<f64, nalgebra::Dyn, nalgebra::Dyn>,
    tol: f64,
}

impl FullRankSvd {
    /// Factor `x`. Returns `Err(rank)` when `x` is rank-deficient.
    pub fn new(x: &DMatrix<f64>) -> Result<Self, usize> {
        let svd = x.clone().svd(true, true);
        let tol = rank_tolerance(x, &svd.singular_values);
        let rank = svd.rank(tol);
        if rank < x.ncols() {
            return Err(rank);
        }
        Ok(Self { svd, tol })
    }

    /// Least-squares coefficients `argmin ||y - Xβ||²`.
    pub fn solve(&self, y: &DVector<f64>) -> Option<DVector<f64>> {
        let beta = self.svd.solve(y, self.tol).ok()?;
        beta.iter().all(|v| v.is_finite()).then_some(beta)
    }

    /// `(X'X)^-1` from the right singular vectors.
    pub fn xtx_inverse(&self) -> Option<DMatrix<f64>> {
        let v_t = self.svd.v_t.as_ref()?;
        let mut v_scaled = v_t.transpose();
        for (j, &s) in self.svd.singular_values.iter().enumerate() {
            v_scaled.column_mut(j).scale_mut(1.0 / (s * s));
        }
        let inv = v_scaled * v_t;
        inv.iter().all(|v| v.is_finite()).then_some(inv)
    }
}

/// Singular values at or below this are treated as zero
/// (`σ_max · max(n, k) · ε`, the usual numerical-rank cutoff).
fn rank_tolerance(x: &DMatrix<f64>, singular_values: &DVector<f64>) -> f64 {
    let s_max = singular_values.iter().cloned().fold(0.0_f64, f64::max);
    s_max * (x.nrows().max(x.ncols()) as f64) * f64::EPSILON
}

/// Numerical column rank of `x`.
pub fn numerical_rank(x: &DMatrix<f64>) -> usize {
    let svd = x.clone().svd(false, false);
    let tol = rank_tolerance(x, &svd.singular_values);
    svd.rank(tol)
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the design is rank-deficient or the solution is not finite.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    FullRankSvd::new(x).ok()?.solve(y)
}

/// Minimum-norm least squares, truncating singular values below the rank
/// cutoff. Works for rank-deficient designs; the fitted values are still the
/// orthogonal projection of `y` onto the column space of `x`.
pub fn min_norm_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);
    let tol = rank_tolerance(x, &svd.singular_values);
    let beta = svd.solve(y, tol).ok()?;
    beta.iter().all(|v| v.is_finite()).then_some(beta)
}

/// Coefficient of determination for a model with an intercept.
///
/// Returns `None` when `y` has no variation.
pub fn r_squared(y: &DVector<f64>, residuals: &DVector<f64>) -> Option<f64> {
    let n = y.len() as f64;
    if n == 0.0 {
        return None;
    }
    let mean = y.sum() / n;
    let tss: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    if tss <= 0.0 {
        return None;
    }
    let ssr = residuals.norm_squared();
    Some(1.0 - ssr / tss)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn collinear_columns_are_rank_deficient() {
        // Third column = 2 * second column.
        let x = DMatrix::from_row_slice(
            4,
            3,
            &[1.0, 1.0, 2.0, 1.0, 2.0, 4.0, 1.0, 3.0, 6.0, 1.0, 4.0, 8.0],
        );
        assert_eq!(numerical_rank(&x), 2);
        assert_eq!(FullRankSvd::new(&x).err(), Some(2));
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0, 4.0]);
        assert!(solve_least_squares(&x, &y).is_none());
    }

    #[test]
    fn min_norm_handles_collinear_design() {
        let x = DMatrix::from_row_slice(
            4,
            3,
            &[1.0, 1.0, 2.0, 1.0, 2.0, 4.0, 1.0, 3.0, 6.0, 1.0, 4.0, 8.0],
        );
        let y = DVector::from_row_slice(&[3.0, 5.0, 7.0, 9.0]);
        let beta = min_norm_least_squares(&x, &y).unwrap();
        let fitted = &x * beta;
        for (a, b) in fitted.iter().zip(y.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn xtx_inverse_matches_direct_inverse() {
        let x = DMatrix::from_row_slice(
            5,
            2,
            &[1.0, 0.5, 1.0, 1.5, 1.0, 2.0, 1.0, 3.5, 1.0, 4.0],
        );
        let svd = FullRankSvd::new(&x).unwrap();
        let via_svd = svd.xtx_inverse().unwrap();
        let direct = (x.transpose() * &x).try_inverse().unwrap();
        for (a, b) in via_svd.iter().zip(direct.iter()) {
            assert!((a - b).abs() < 1e-10, "{a} vs {b}");
        }
    }

    #[test]
    fn r_squared_of_perfect_fit_is_one() {
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        let e = DVector::from_row_slice(&[0.0, 0.0, 0.0]);
        assert_eq!(r_squared(&y, &e), Some(1.0));

        let flat = DVector::from_row_slice(&[2.0, 2.0, 2.0]);
        assert_eq!(r_squared(&flat, &e), None);
    }
}
