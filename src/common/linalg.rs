//! Linear algebra utilities
//!
//! Numerical building blocks for the Kalman update and candidate gating:
//! robust solves against possibly ill-conditioned covariances, Mahalanobis
//! distance, and small matrix hygiene helpers.

use nalgebra::{DMatrix, DVector};

/// Solve `A x = b` for a symmetric positive-definite `A`.
///
/// Tries a Cholesky factorization first and falls back to an explicit
/// inverse. Returns `None` when the matrix is singular either way.
pub fn solve_spd(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    if let Some(chol) = a.clone().cholesky() {
        return Some(chol.solve(b));
    }
    a.clone().try_inverse().map(|inv| inv * b)
}

/// Kalman gain `K = C Hᵗ (V + H C Hᵗ)⁻¹`.
///
/// `covariance` is the prior state covariance `C`, `projection` the
/// measurement matrix `H`, `noise` the measurement covariance `V`.
/// Returns `None` when the innovation covariance cannot be inverted.
pub fn kalman_gain(
    covariance: &DMatrix<f64>,
    projection: &DMatrix<f64>,
    noise: &DMatrix<f64>,
) -> Option<DMatrix<f64>> {
    let cht = covariance * projection.transpose();
    let innovation_cov = projection * &cht + noise;

    // Solve S Kᵗ = (C Hᵗ)ᵗ instead of forming S⁻¹ explicitly.
    if let Some(chol) = innovation_cov.clone().cholesky() {
        let kt = chol.solve(&cht.transpose());
        return Some(kt.transpose());
    }
    innovation_cov.try_inverse().map(|s_inv| &cht * s_inv)
}

/// Quadratic form `rᵗ A⁻¹ r`.
///
/// Returns `None` when `A` is singular.
pub fn quadratic_form(residual: &DVector<f64>, a: &DMatrix<f64>) -> Option<f64> {
    solve_spd(a, residual).map(|solved| residual.dot(&solved))
}

/// Mahalanobis distance of a residual under a covariance.
///
/// Returns `f64::INFINITY` for a singular covariance so that gating rejects
/// the candidate instead of crashing.
pub fn mahalanobis_distance(residual: &DVector<f64>, covariance: &DMatrix<f64>) -> f64 {
    match quadratic_form(residual, covariance) {
        Some(q) if q >= 0.0 => q.sqrt(),
        _ => f64::INFINITY,
    }
}

/// Check whether a matrix is positive definite.
pub fn is_positive_definite(matrix: &DMatrix<f64>) -> bool {
    matrix.clone().cholesky().is_some()
}

/// Force symmetry by averaging a matrix with its transpose.
///
/// The posterior covariance picks up asymmetry of order machine epsilon per
/// update step; re-symmetrizing keeps Cholesky factorizations viable over
/// long paths.
pub fn symmetrize(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    0.5 * (matrix + matrix.transpose())
}

/// Check that every entry of a vector and a matrix is finite.
pub fn all_finite(mean: &DVector<f64>, covariance: &DMatrix<f64>) -> bool {
    mean.iter().all(|v| v.is_finite()) && covariance.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_spd_identity() {
        let a = DMatrix::identity(3, 3);
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let x = solve_spd(&a, &b).unwrap();
        assert!((x - b).norm() < 1e-12);
    }

    #[test]
    fn test_solve_spd_singular() {
        let a = DMatrix::zeros(2, 2);
        let b = DVector::from_vec(vec![1.0, 1.0]);
        assert!(solve_spd(&a, &b).is_none());
    }

    #[test]
    fn test_kalman_gain_scalar() {
        // 1-d state, 1-d measurement: K = C / (C + V)
        let c = DMatrix::from_element(1, 1, 4.0);
        let h = DMatrix::identity(1, 1);
        let v = DMatrix::from_element(1, 1, 1.0);
        let k = kalman_gain(&c, &h, &v).unwrap();
        assert!((k[(0, 0)] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_kalman_gain_singular() {
        let c = DMatrix::zeros(2, 2);
        let h = DMatrix::identity(2, 2);
        let v = DMatrix::zeros(2, 2);
        assert!(kalman_gain(&c, &h, &v).is_none());
    }

    #[test]
    fn test_mahalanobis_distance() {
        let r = DVector::from_vec(vec![3.0, 4.0]);
        let cov = DMatrix::identity(2, 2);
        assert!((mahalanobis_distance(&r, &cov) - 5.0).abs() < 1e-12);

        let singular = DMatrix::zeros(2, 2);
        assert!(mahalanobis_distance(&r, &singular).is_infinite());
    }

    #[test]
    fn test_symmetrize() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 0.0, 1.0]);
        let s = symmetrize(&m);
        assert!((s[(0, 1)] - 1.0).abs() < 1e-12);
        assert!((s[(1, 0)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_is_positive_definite() {
        assert!(is_positive_definite(&DMatrix::identity(3, 3)));
        assert!(!is_positive_definite(&DMatrix::zeros(3, 3)));
    }
}
