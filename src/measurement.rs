//! Hits and their measurement models
//!
//! A [`Hit`] is an immutable measurement owned by the caller for one event.
//! Its [`MeasurementModel`] is a tagged variant per sensor technology and is
//! evaluated on a plane to produce the measured coordinate vector `m`, the
//! projection matrix `H` and the measurement covariance `V` used by the
//! Kalman update. Evaluation fails when the requested plane is not the plane
//! the hit lives on; the caller treats that as a rejected candidate.
//!
//! State vector convention: the first two components of a track state are
//! the local in-plane coordinates `(u, v)`, any further components are
//! direction/curvature parameters the projections ignore.

use crate::errors::FitFailure;
use crate::geometry::{Plane, SensorId};
use nalgebra::{DMatrix, DVector};

/// Measurement model variants per sensor technology.
///
/// Matched explicitly at the fit site; adding a technology means adding a
/// variant and its projection arm, not a runtime type lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementModel {
    /// Two-dimensional pixel measurement in local plane coordinates
    Pixel {
        /// Measured local u coordinate
        u: f64,
        /// Measured local v coordinate
        v: f64,
        /// 2x2 measurement covariance, row-major `[uu, uv, vu, vv]`
        covariance: [f64; 4],
    },
    /// One-dimensional strip measurement along the local u axis
    Strip {
        /// Measured local u coordinate
        u: f64,
        /// Measurement variance
        variance: f64,
    },
}

impl MeasurementModel {
    /// Measurement dimension of this model
    #[inline]
    pub fn z_dim(&self) -> usize {
        match self {
            MeasurementModel::Pixel { .. } => 2,
            MeasurementModel::Strip { .. } => 1,
        }
    }

    /// Local u coordinate, used as the in-bucket sort key of the hit cache
    #[inline]
    pub fn local_u(&self) -> f64 {
        match self {
            MeasurementModel::Pixel { u, .. } => *u,
            MeasurementModel::Strip { u, .. } => *u,
        }
    }
}

/// Measurement projection on a plane: `(m, H, V)`.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Measured coordinate vector `m`
    pub m: DVector<f64>,
    /// Projection matrix `H` (z_dim x x_dim)
    pub h: DMatrix<f64>,
    /// Measurement covariance `V`
    pub v: DMatrix<f64>,
}

/// An immutable measurement on a detector plane.
///
/// The finder never owns hits; it holds indices into the caller-provided
/// collection for the duration of one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// Sensor the hit was measured on
    pub id: SensorId,
    /// Plane the measurement model is defined on
    pub plane: Plane,
    /// Measurement model
    pub model: MeasurementModel,
}

impl Hit {
    /// Create a new hit
    pub fn new(id: SensorId, plane: Plane, model: MeasurementModel) -> Self {
        Self { id, plane, model }
    }

    /// Convenience constructor for a pixel hit with diagonal covariance
    pub fn pixel(id: SensorId, plane: Plane, u: f64, v: f64, var_u: f64, var_v: f64) -> Self {
        Self::new(
            id,
            plane,
            MeasurementModel::Pixel {
                u,
                v,
                covariance: [var_u, 0.0, 0.0, var_v],
            },
        )
    }

    /// Convenience constructor for a strip hit
    pub fn strip(id: SensorId, plane: Plane, u: f64, variance: f64) -> Self {
        Self::new(id, plane, MeasurementModel::Strip { u, variance })
    }

    /// Evaluate the measurement model on a plane for a given state dimension.
    ///
    /// The caller guarantees the state has been extrapolated onto `plane`
    /// before fitting; a plane that does not coincide with the hit's own
    /// plane is a recoverable failure, as is a state too small to carry the
    /// local coordinates.
    pub fn project_on_plane(&self, plane: &Plane, x_dim: usize) -> Result<Projection, FitFailure> {
        if !self.plane.coincides_with(plane) {
            return Err(FitFailure::PlaneMismatch {
                state_plane: plane.w,
                hit_plane: self.plane.w,
            });
        }
        if x_dim < 2 {
            return Err(FitFailure::DimensionMismatch {
                expected: 2,
                actual: x_dim,
            });
        }

        match &self.model {
            MeasurementModel::Pixel { u, v, covariance } => {
                let m = DVector::from_vec(vec![*u, *v]);
                let mut h = DMatrix::zeros(2, x_dim);
                h[(0, 0)] = 1.0;
                h[(1, 1)] = 1.0;
                let cov = DMatrix::from_row_slice(2, 2, covariance);
                Ok(Projection { m, h, v: cov })
            }
            MeasurementModel::Strip { u, variance } => {
                let m = DVector::from_element(1, *u);
                let mut h = DMatrix::zeros(1, x_dim);
                h[(0, 0)] = 1.0;
                let cov = DMatrix::from_element(1, 1, *variance);
                Ok(Projection { m, h, v: cov })
            }
        }
    }
}
