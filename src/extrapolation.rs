//! Track states and the extrapolation seam
//!
//! The physical extrapolation engine (magnetic field, material effects) is an
//! external collaborator. The finder only depends on the [`Extrapolator`]
//! capability: map a statistical state estimate onto a target plane or fail.
//!
//! [`LineExtrapolator`] is the in-crate implementation used by tests and
//! benchmarks: straight-line, field-free transport between telescope planes
//! with exact covariance propagation.

use crate::common::linalg::all_finite;
use crate::errors::ExtrapolationFailure;
use crate::geometry::Plane;
use nalgebra::{DMatrix, DVector};

/// A statistical state estimate anchored on a plane.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackState {
    /// Plane the estimate lives on
    pub plane: Plane,
    /// State mean
    pub mean: DVector<f64>,
    /// State covariance
    pub covariance: DMatrix<f64>,
}

impl TrackState {
    /// Create a new state estimate
    pub fn new(plane: Plane, mean: DVector<f64>, covariance: DMatrix<f64>) -> Self {
        Self {
            plane,
            mean,
            covariance,
        }
    }

    /// State dimension
    #[inline]
    pub fn x_dim(&self) -> usize {
        self.mean.len()
    }
}

/// An externally supplied seed trajectory: the root estimate of a search
/// tree. Read-only to the finder.
#[derive(Debug, Clone, PartialEq)]
pub struct Seed {
    /// State estimate at the seed's reference surface
    pub state: TrackState,
}

impl Seed {
    /// Create a seed from a state estimate on a reference plane
    pub fn new(plane: Plane, mean: DVector<f64>, covariance: DMatrix<f64>) -> Self {
        Self {
            state: TrackState::new(plane, mean, covariance),
        }
    }
}

/// Capability of mapping a state estimate onto a target plane.
///
/// Implementations must be pure with respect to the search: the same input
/// state and target produce the same output, and failures are reported as
/// values, never as panics. Extrapolating backward (target behind the
/// state's plane) must be supported; the search's sibling-caching strategy
/// relies on it.
pub trait Extrapolator: Sync {
    /// Extrapolate `state` onto `target`, transporting mean and covariance.
    fn extrapolate(
        &self,
        state: &TrackState,
        target: &Plane,
    ) -> Result<TrackState, ExtrapolationFailure>;
}

/// Straight-line extrapolation between telescope planes.
///
/// State ordering: `[u, v, du/dw, dv/dw]`, local coordinates first, then
/// slopes against the propagation axis. Transport over `dw`:
///
/// ```text
/// F = | 1 0 dw 0 |
///     | 0 1 0 dw |
///     | 0 0 1  0 |
///     | 0 0 0  1 |
/// ```
///
/// with covariance `C' = F C Fᵗ`. No process noise is added; the material
/// model belongs to the host framework's extrapolation service.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineExtrapolator;

impl LineExtrapolator {
    /// State dimension this extrapolator transports
    pub const X_DIM: usize = 4;

    fn transport_matrix(dw: f64) -> DMatrix<f64> {
        let mut f = DMatrix::identity(Self::X_DIM, Self::X_DIM);
        f[(0, 2)] = dw;
        f[(1, 3)] = dw;
        f
    }
}

impl Extrapolator for LineExtrapolator {
    fn extrapolate(
        &self,
        state: &TrackState,
        target: &Plane,
    ) -> Result<TrackState, ExtrapolationFailure> {
        if state.x_dim() != Self::X_DIM {
            return Err(ExtrapolationFailure::TargetUnreachable {
                context: format!(
                    "line extrapolation expects a {}-dimensional state, got {}",
                    Self::X_DIM,
                    state.x_dim()
                ),
            });
        }

        let dw = target.w - state.plane.w;
        let f = Self::transport_matrix(dw);
        let mean = &f * &state.mean;
        let covariance = &f * &state.covariance * f.transpose();

        if !all_finite(&mean, &covariance) {
            return Err(ExtrapolationFailure::NonFiniteState);
        }

        Ok(TrackState::new(*target, mean, covariance))
    }
}
