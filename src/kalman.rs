//! Kalman measurement update
//!
//! Folds one candidate hit into an extrapolated state estimate and scores
//! the combination. The caller guarantees state and hit share a plane; the
//! updater turns every numerical failure (singular innovation, off-plane
//! measurement model) into a recoverable [`FitFailure`] that the search
//! consumes by rejecting the candidate branch.

use crate::common::linalg::{kalman_gain, quadratic_form, symmetrize};
use crate::errors::FitFailure;
use crate::extrapolation::TrackState;
use crate::measurement::Hit;
use nalgebra::DVector;

/// Outcome of folding a hit into a state.
#[derive(Debug, Clone)]
pub struct FittedUpdate {
    /// Posterior state on the hit's plane
    pub state: TrackState,
    /// chi2 contribution of this single step, >= 0 for a well-conditioned
    /// update. The path total is accumulated by the caller.
    pub chi2_increment: f64,
    /// Filtered residual `m - H x'`
    pub residual: DVector<f64>,
}

/// Stateless Kalman update component.
#[derive(Debug, Clone, Copy, Default)]
pub struct KalmanUpdater;

impl KalmanUpdater {
    /// Mahalanobis distance of the predicted residual `m - H x` under the
    /// innovation covariance `V + H C Hᵗ`.
    ///
    /// Used as a cheap pre-fit gate; a singular innovation yields
    /// `f64::INFINITY` so gating rejects the candidate.
    pub fn predicted_mahalanobis(state: &TrackState, hit: &Hit) -> Result<f64, FitFailure> {
        let projection = hit.project_on_plane(&state.plane, state.x_dim())?;
        let residual = &projection.m - &projection.h * &state.mean;
        let innovation_cov =
            &projection.h * &state.covariance * projection.h.transpose() + &projection.v;
        Ok(crate::common::linalg::mahalanobis_distance(
            &residual,
            &innovation_cov,
        ))
    }

    /// Fold `hit` into `state` and score the step.
    ///
    /// Implements the standard gain/posterior/chi2 sequence:
    ///
    /// ```text
    /// K   = C Hᵗ (V + H C Hᵗ)⁻¹
    /// x'  = x + K (m - H x)
    /// C'  = C - K H C
    /// χ²  = (m - H x')ᵗ (V - H C' Hᵗ)⁻¹ (m - H x')
    /// ```
    ///
    /// The chi2 uses the filtered residual against its own covariance, so a
    /// measurement lying exactly on the prediction contributes exactly zero.
    pub fn fit(state: &TrackState, hit: &Hit) -> Result<FittedUpdate, FitFailure> {
        let projection = hit.project_on_plane(&state.plane, state.x_dim())?;
        let (m, h, v) = (&projection.m, &projection.h, &projection.v);

        let gain =
            kalman_gain(&state.covariance, h, v).ok_or(FitFailure::SingularInnovation)?;

        let predicted_residual = m - h * &state.mean;
        let mean = &state.mean + &gain * &predicted_residual;
        let covariance = symmetrize(&(&state.covariance - &gain * h * &state.covariance));

        let residual = m - h * &mean;
        let residual_cov = v - h * &covariance * h.transpose();
        let chi2_increment = quadratic_form(&residual, &residual_cov)
            .ok_or(FitFailure::SingularInnovation)?
            .max(0.0);

        Ok(FittedUpdate {
            state: TrackState::new(state.plane, mean, covariance),
            chi2_increment,
            residual,
        })
    }
}
