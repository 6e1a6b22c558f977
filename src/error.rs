//! Error types shared by every module of the crate.

use crate::precision::RealKind;

/// Result alias used throughout ampgrad.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the precision context, the math facade, the
/// interpolation kernel and the gradient evaluator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A gradient was requested before any objective was bound.
    #[error("no objective bound: call create_gradient before evaluating")]
    NotBound,

    /// The parameter vector does not match the bound floating parameters.
    #[error("expected {expected} parameter values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Two tensors that must agree in shape do not.
    #[error("shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Axis index beyond the tensor rank.
    #[error("axis {axis} out of range for a rank-{ndim} tensor")]
    InvalidAxis { axis: usize, ndim: usize },

    /// An operation that needs at least one operand received none.
    #[error("{0} needs at least one tensor")]
    EmptyInput(&'static str),

    /// Shape error raised by ndarray (stacking, concatenation, reshaping).
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    /// The objective looked up a parameter that is not part of the binding.
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    /// A value type does not match the active precision.
    #[error("precision mismatch: context is {expected}, value type is {actual}")]
    PrecisionMismatch { expected: RealKind, actual: RealKind },

    /// The interpolation grid cannot be padded.
    #[error("invalid interpolation grid: {0}")]
    InvalidGrid(String),

    /// Empty or inverted sampling range.
    #[error("invalid uniform range [{min}, {max})")]
    InvalidRange { min: f64, max: f64 },

    /// Failure raised by the bound objective, passed through untouched.
    #[error("objective evaluation failed")]
    Objective(#[source] Box<dyn std::error::Error + Send + Sync>),
}
