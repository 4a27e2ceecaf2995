//! Error types for configuration, extrapolation, and the Kalman fit.
//!
//! These are plain, hand-written enums carrying just enough context to be
//! actionable. They implement [`Display`](std::fmt::Display) and
//! [`std::error::Error`]; none of them wrap another error, so `source()`
//! returns `None`.

use std::error::Error;
use std::fmt;

/// A search configuration was rejected during validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `terminal_depth` must be even and at least 2.
    InvalidTerminalDepth {
        /// The offending depth.
        value: usize,
    },
    /// `branch_keep_count` must be at least 1.
    InvalidBranchKeepCount {
        /// The offending count.
        value: usize,
    },
    /// `hole_penalty` must be finite and non-negative.
    InvalidHolePenalty {
        /// The offending penalty.
        value: f64,
    },
    /// A visited layer has no configured ladder count.
    MissingLadderCount {
        /// The 1-based layer index.
        layer: usize,
    },
    /// A visited layer's ladder count is invalid (e.g. zero).
    InvalidLadderCount {
        /// The 1-based layer index.
        layer: usize,
        /// The offending ladder count.
        value: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTerminalDepth { value } => {
                write!(f, "terminal_depth must be even and >= 2, got {value}")
            }
            ConfigError::InvalidBranchKeepCount { value } => {
                write!(f, "branch_keep_count must be >= 1, got {value}")
            }
            ConfigError::InvalidHolePenalty { value } => {
                write!(f, "hole_penalty must be finite and >= 0, got {value}")
            }
            ConfigError::MissingLadderCount { layer } => {
                write!(f, "no ladder count configured for layer {layer}")
            }
            ConfigError::InvalidLadderCount { layer, value } => {
                write!(f, "ladder count for layer {layer} is invalid: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Extrapolating a track state onto a target plane failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtrapolationFailure {
    /// The target plane could not be reached from the current state.
    TargetUnreachable {
        /// Human-readable description of why.
        context: String,
    },
    /// The extrapolated state contained non-finite values.
    NonFiniteState,
}

impl fmt::Display for ExtrapolationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtrapolationFailure::TargetUnreachable { context } => {
                write!(f, "target plane unreachable: {context}")
            }
            ExtrapolationFailure::NonFiniteState => {
                write!(f, "extrapolated state is not finite")
            }
        }
    }
}

impl Error for ExtrapolationFailure {}

/// Folding a measurement into a track state failed.
#[derive(Debug, Clone, PartialEq)]
pub enum FitFailure {
    /// The hit plane and the state plane do not coincide.
    PlaneMismatch {
        /// The state's plane coordinate.
        state_plane: f64,
        /// The hit's plane coordinate.
        hit_plane: f64,
    },
    /// The state is too small to carry the measurement's coordinates.
    DimensionMismatch {
        /// The minimum dimension required.
        expected: usize,
        /// The dimension actually provided.
        actual: usize,
    },
    /// The innovation covariance was singular and could not be inverted.
    SingularInnovation,
}

impl fmt::Display for FitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitFailure::PlaneMismatch {
                state_plane,
                hit_plane,
            } => write!(
                f,
                "plane mismatch: state at {state_plane}, hit at {hit_plane}"
            ),
            FitFailure::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected >= {expected}, got {actual}")
            }
            FitFailure::SingularInnovation => {
                write!(f, "innovation covariance is singular")
            }
        }
    }
}

impl Error for FitFailure {}
