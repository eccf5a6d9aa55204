//! Error types for curve operations.

use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Errors arising from interpolation and composite-curve construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// Curve has no usable points.
    #[error("Curve '{name}' has no points")]
    EmptyCurve {
        /// Name of the offending curve.
        name: String,
    },

    /// Interpolation input was invalid.
    #[error("Interpolation error: {reason}")]
    Interpolation {
        /// Description of the failure.
        reason: String,
    },

    /// Forward-rate derivation received a non-increasing time pair.
    #[error("Forward rate requires t2 > t1 (got t1={t1}, t2={t2})")]
    InvalidForwardInterval {
        /// Earlier time in years.
        t1: f64,
        /// Later time in years.
        t2: f64,
    },
}

impl CurveError {
    /// Creates an empty-curve error.
    #[must_use]
    pub fn empty_curve(name: impl Into<String>) -> Self {
        Self::EmptyCurve { name: name.into() }
    }

    /// Creates an interpolation error.
    #[must_use]
    pub fn interpolation(reason: impl Into<String>) -> Self {
        Self::Interpolation {
            reason: reason.into(),
        }
    }
}
