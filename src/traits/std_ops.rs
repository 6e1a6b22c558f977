use std::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign,
};

use crate::float::Float;
use crate::reverse::Reverse;
use crate::tape::TapeThreadLocal;

// ──────────────────────────────────────────────
//  Reverse<F> with Reverse<F>
// ──────────────────────────────────────────────

impl<F: TapeThreadLocal> Add for Reverse<F> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.binary(rhs, self.value + rhs.value, F::one(), F::one())
    }
}

impl<F: TapeThreadLocal> Sub for Reverse<F> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.binary(rhs, self.value - rhs.value, F::one(), -F::one())
    }
}

impl<F: TapeThreadLocal> Mul for Reverse<F> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.binary(rhs, self.value * rhs.value, rhs.value, self.value)
    }
}

impl<F: TapeThreadLocal> Div for Reverse<F> {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        let inv = F::one() / rhs.value;
        let value = self.value * inv;
        self.binary(rhs, value, inv, -value * inv)
    }
}

impl<F: TapeThreadLocal> Rem for Reverse<F> {
    type Output = Self;
    #[inline]
    fn rem(self, rhs: Self) -> Self {
        // x % y = x - trunc(x / y) * y, piecewise constant in the quotient.
        let q = (self.value / rhs.value).trunc();
        self.binary(rhs, self.value % rhs.value, F::one(), -q)
    }
}

impl<F: TapeThreadLocal> Neg for Reverse<F> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        self.unary(-self.value, -F::one())
    }
}

macro_rules! impl_assign_ops {
    ($($trait:ident :: $method:ident => $op:tt),* $(,)?) => {
        $(
            impl<F: TapeThreadLocal> $trait for Reverse<F> {
                #[inline]
                fn $method(&mut self, rhs: Self) {
                    *self = *self $op rhs;
                }
            }
        )*
    };
}

impl_assign_ops!(
    AddAssign::add_assign => +,
    SubAssign::sub_assign => -,
    MulAssign::mul_assign => *,
    DivAssign::div_assign => /,
    RemAssign::rem_assign => %,
);

// ──────────────────────────────────────────────
//  Mixed ops with primitive floats
// ──────────────────────────────────────────────

// A primitive operand is lifted to a constant; the tape skips constant
// operands, so only the tracked side is recorded.
macro_rules! impl_reverse_primitive_ops {
    ($f:ty) => {
        impl_reverse_primitive_ops!(@op $f, Add, add);
        impl_reverse_primitive_ops!(@op $f, Sub, sub);
        impl_reverse_primitive_ops!(@op $f, Mul, mul);
        impl_reverse_primitive_ops!(@op $f, Div, div);
        impl_reverse_primitive_ops!(@op $f, Rem, rem);
    };
    (@op $f:ty, $trait:ident, $method:ident) => {
        impl $trait<$f> for Reverse<$f> {
            type Output = Reverse<$f>;
            #[inline]
            fn $method(self, rhs: $f) -> Reverse<$f> {
                $trait::$method(self, Reverse::constant(rhs))
            }
        }

        impl $trait<Reverse<$f>> for $f {
            type Output = Reverse<$f>;
            #[inline]
            fn $method(self, rhs: Reverse<$f>) -> Reverse<$f> {
                $trait::$method(Reverse::constant(self), rhs)
            }
        }
    };
}

impl_reverse_primitive_ops!(f32);
impl_reverse_primitive_ops!(f64);

// Comparisons look at primal values only.
impl<F: Float> PartialEq for Reverse<F> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<F: Float> PartialOrd for Reverse<F> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl<F: TapeThreadLocal> std::iter::Sum for Reverse<F> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Reverse::constant(F::zero()), |acc, x| acc + x)
    }
}
