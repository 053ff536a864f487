//! Error types for the engraving pipeline.
//!
//! Every variant of [`EngraveError`] is fatal to the whole job: a truncated
//! program means truncated physical motion, so no partial G-code is ever
//! produced. Curve fitting deliberately has no error path at all; it
//! degrades to straight segments instead (see the biarc module).

use beamkit_core::Point;
use thiserror::Error;

/// Errors that abort an engraving job.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngraveError {
    /// The number of orientation points is not 2 or 3.
    #[error("need 2 or 3 orientation points, got {count}")]
    InsufficientOrientation { count: usize },

    /// The document-side orientation points are coincident or collinear, so
    /// the transform system is singular. Carries the offending document
    /// points so the caller can tell the user which markers to move.
    #[error("orientation points are degenerate ({reason}): {points:?}")]
    DegenerateOrientation { reason: String, points: Vec<Point> },

    /// A subpath violates the segment-chain continuity contract.
    #[error("subpath {subpath}: segment {segment} does not start where the previous segment ends")]
    InvalidSubpath { subpath: usize, segment: usize },

    /// A non-finite coordinate reached the emitter (e.g. from a poisoned
    /// transform). Never written into the program text.
    #[error("non-finite value {value} for {word} word")]
    NumericFault { word: &'static str, value: f64 },

    /// A job parameter failed validation.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),
}

/// Errors related to job parameter validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Result type alias for pipeline operations.
pub type EngraveResult<T> = Result<T, EngraveError>;
