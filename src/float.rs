use std::fmt::{Debug, Display};

use num_traits::{Float as NumFloat, FloatConst, FromPrimitive};

use crate::precision::RealKind;

/// Marker trait for the primitive float types a fit can run in (`f32`, `f64`).
///
/// Only primitive floats implement this; the tape-tracked [`crate::Reverse`]
/// wrapper does not.
pub trait Float:
    NumFloat + FloatConst + FromPrimitive + Copy + Send + Sync + Default + Debug + Display + 'static
{
    /// Width this type occupies, matched against [`crate::PrecisionContext`].
    const KIND: RealKind;
}

impl Float for f32 {
    const KIND: RealKind = RealKind::F32;
}

impl Float for f64 {
    const KIND: RealKind = RealKind::F64;
}
