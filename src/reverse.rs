use std::fmt::{self, Display};

use crate::tape::{self, TapeThreadLocal, CONSTANT};
use crate::Float;

/// Reverse-mode AD value: a primal value plus its slot on the active tape.
///
/// `Copy` because the tape lives in a thread-local, not inside this struct.
/// Values built only from constants never touch the tape and can be used
/// outside a recording scope.
#[derive(Clone, Copy, Debug)]
pub struct Reverse<F: Float> {
    pub(crate) value: F,
    pub(crate) index: u32,
}

impl<F: Float> Reverse<F> {
    /// Untracked value (zero derivative with respect to everything).
    #[inline]
    pub fn constant(value: F) -> Self {
        Reverse {
            value,
            index: CONSTANT,
        }
    }

    /// Value tied to an existing tape slot.
    #[inline]
    pub fn from_tape(value: F, index: u32) -> Self {
        Reverse { value, index }
    }

    /// Tape slot, or [`CONSTANT`] when untracked.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.index == CONSTANT
    }
}

impl<F: TapeThreadLocal> Reverse<F> {
    /// Record a unary elemental with derivative `deriv`.
    #[inline]
    pub(crate) fn unary(self, value: F, deriv: F) -> Self {
        if self.is_constant() {
            return Reverse::constant(value);
        }
        let index = tape::with_active_tape(|t| t.push_unary(self.index, deriv));
        Reverse { value, index }
    }

    /// Record a binary elemental with partials `d_lhs` and `d_rhs`.
    #[inline]
    pub(crate) fn binary(self, rhs: Self, value: F, d_lhs: F, d_rhs: F) -> Self {
        if self.is_constant() && rhs.is_constant() {
            return Reverse::constant(value);
        }
        let index =
            tape::with_active_tape(|t| t.push_binary(self.index, d_lhs, rhs.index, d_rhs));
        Reverse { value, index }
    }
}

impl<F: Float> Display for Reverse<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<F: Float> Default for Reverse<F> {
    fn default() -> Self {
        Reverse::constant(F::zero())
    }
}
