//! The [`Scalar`] trait: per-element math primitives behind a stable name set.
//!
//! Model code written as `fn f<T: Scalar>(x: T) -> T` runs on plain `f32`/`f64`
//! for evaluation and on [`Reverse`] inside a recording scope for gradients.
//! Primitive floats forward to the standard library; `Reverse` records each
//! primitive on the active tape with its analytic derivative.

use std::fmt::{Debug, Display};
use std::ops::Neg;

use num_traits::{FromPrimitive, Num};

use crate::float::Float;
use crate::reverse::Reverse;
use crate::tape::TapeThreadLocal;

/// Element type for model code and the [`crate::math`] facade.
pub trait Scalar:
    Num + FromPrimitive + Neg<Output = Self> + PartialOrd + Copy + Default + Debug + Display + Send + 'static
{
    /// Underlying primitive float.
    type Float: Float;

    /// Lift a plain float (a constant, zero derivative).
    fn from_f(val: Self::Float) -> Self;

    /// Primal value as a plain float.
    fn value(&self) -> Self::Float;

    fn abs(self) -> Self;
    fn sqrt(self) -> Self;
    fn exp(self) -> Self;
    fn ln(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn tan(self) -> Self;
    fn asin(self) -> Self;
    fn acos(self) -> Self;
    fn atan(self) -> Self;
    fn tanh(self) -> Self;
    /// Four-quadrant arctangent of `self / x`.
    fn atan2(self, x: Self) -> Self;
    fn powf(self, n: Self) -> Self;
    fn powi(self, n: i32) -> Self;
    fn max(self, other: Self) -> Self;
    fn min(self, other: Self) -> Self;
    /// Largest integer not greater than `self`; carries no derivative.
    fn floor(self) -> Self;
}

macro_rules! impl_scalar_primitive {
    ($f:ident) => {
        impl Scalar for $f {
            type Float = $f;

            #[inline]
            fn from_f(val: $f) -> Self {
                val
            }
            #[inline]
            fn value(&self) -> $f {
                *self
            }
            #[inline]
            fn abs(self) -> Self {
                $f::abs(self)
            }
            #[inline]
            fn sqrt(self) -> Self {
                $f::sqrt(self)
            }
            #[inline]
            fn exp(self) -> Self {
                $f::exp(self)
            }
            #[inline]
            fn ln(self) -> Self {
                $f::ln(self)
            }
            #[inline]
            fn sin(self) -> Self {
                $f::sin(self)
            }
            #[inline]
            fn cos(self) -> Self {
                $f::cos(self)
            }
            #[inline]
            fn tan(self) -> Self {
                $f::tan(self)
            }
            #[inline]
            fn asin(self) -> Self {
                $f::asin(self)
            }
            #[inline]
            fn acos(self) -> Self {
                $f::acos(self)
            }
            #[inline]
            fn atan(self) -> Self {
                $f::atan(self)
            }
            #[inline]
            fn tanh(self) -> Self {
                $f::tanh(self)
            }
            #[inline]
            fn atan2(self, x: Self) -> Self {
                $f::atan2(self, x)
            }
            #[inline]
            fn powf(self, n: Self) -> Self {
                $f::powf(self, n)
            }
            #[inline]
            fn powi(self, n: i32) -> Self {
                $f::powi(self, n)
            }
            #[inline]
            fn max(self, other: Self) -> Self {
                $f::max(self, other)
            }
            #[inline]
            fn min(self, other: Self) -> Self {
                $f::min(self, other)
            }
            #[inline]
            fn floor(self) -> Self {
                $f::floor(self)
            }
        }
    };
}

impl_scalar_primitive!(f32);
impl_scalar_primitive!(f64);

impl<F: TapeThreadLocal> Scalar for Reverse<F> {
    type Float = F;

    #[inline]
    fn from_f(val: F) -> Self {
        Reverse::constant(val)
    }

    #[inline]
    fn value(&self) -> F {
        self.value
    }

    fn abs(self) -> Self {
        let x = self.value;
        let slope = if x > F::zero() {
            F::one()
        } else if x < F::zero() {
            -F::one()
        } else {
            F::zero()
        };
        self.unary(x.abs(), slope)
    }

    fn sqrt(self) -> Self {
        let s = self.value.sqrt();
        self.unary(s, F::one() / (s + s))
    }

    fn exp(self) -> Self {
        let e = self.value.exp();
        self.unary(e, e)
    }

    fn ln(self) -> Self {
        self.unary(self.value.ln(), self.value.recip())
    }

    fn sin(self) -> Self {
        self.unary(self.value.sin(), self.value.cos())
    }

    fn cos(self) -> Self {
        self.unary(self.value.cos(), -self.value.sin())
    }

    fn tan(self) -> Self {
        let t = self.value.tan();
        self.unary(t, F::one() + t * t)
    }

    fn asin(self) -> Self {
        let x = self.value;
        self.unary(x.asin(), (F::one() - x * x).sqrt().recip())
    }

    fn acos(self) -> Self {
        let x = self.value;
        self.unary(x.acos(), -(F::one() - x * x).sqrt().recip())
    }

    fn atan(self) -> Self {
        let x = self.value;
        self.unary(x.atan(), (F::one() + x * x).recip())
    }

    fn tanh(self) -> Self {
        let t = self.value.tanh();
        self.unary(t, F::one() - t * t)
    }

    fn atan2(self, x: Self) -> Self {
        let (yv, xv) = (self.value, x.value);
        let r2 = xv * xv + yv * yv;
        self.binary(x, yv.atan2(xv), xv / r2, -yv / r2)
    }

    fn powf(self, n: Self) -> Self {
        let (x, p) = (self.value, n.value);
        let value = x.powf(p);
        let d_base = if p == F::zero() {
            F::zero()
        } else {
            p * x.powf(p - F::one())
        };
        // Exponent sensitivity only exists for a positive base.
        let d_exp = if x > F::zero() { value * x.ln() } else { F::zero() };
        self.binary(n, value, d_base, d_exp)
    }

    fn powi(self, n: i32) -> Self {
        let x = self.value;
        let d = match n {
            0 => F::zero(),
            _ => F::from_i32(n).unwrap_or_else(F::nan) * x.powi(n - 1),
        };
        self.unary(x.powi(n), d)
    }

    // The selected operand passes through unchanged, keeping its tape slot.
    fn max(self, other: Self) -> Self {
        if self.value >= other.value || other.value.is_nan() {
            self
        } else {
            other
        }
    }

    fn min(self, other: Self) -> Self {
        if self.value <= other.value || other.value.is_nan() {
            self
        } else {
            other
        }
    }

    fn floor(self) -> Self {
        Reverse::constant(self.value.floor())
    }
}
