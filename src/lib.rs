pub mod error;
pub mod float;
pub mod gradient;
pub mod interpolate;
pub mod math;
pub mod parameter;
pub mod precision;
pub mod reverse;
pub mod scalar;
pub mod tape;
mod traits;

pub use error::{Error, Result};
pub use float::Float;
pub use gradient::{GradientEvaluator, Objective, ObjectiveFn, ParameterValues};
pub use interpolate::interpolate;
pub use parameter::{FitParameter, Variable};
pub use precision::{ComplexKind, ComplexTensor, PrecisionContext, RealKind, RealTensor};
pub use reverse::Reverse;
pub use scalar::Scalar;

/// Type alias for reverse-mode values over `f64`.
pub type Reverse64 = Reverse<f64>;
/// Type alias for reverse-mode values over `f32`.
pub type Reverse32 = Reverse<f32>;
