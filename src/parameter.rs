//! Fit parameters: named, bounded, steppable scalars with a mutable cell.
//!
//! The live value sits in a [`Variable`] owned by its [`FitParameter`];
//! names, limits, step size and post-fit errors are plain metadata next to it.
//! Limits are advisory and never enforced here; they are read by the external
//! minimizer.

use crate::float::Float;

/// Step size given to parameters constructed without one.
pub const DEFAULT_STEP_SIZE: f64 = 1e-6;

/// In-place updatable numeric cell.
///
/// Counts its writes so callers can tell a suppressed update from a real one.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable<F> {
    value: F,
    writes: u64,
}

impl<F: Float> Variable<F> {
    pub fn new(value: F) -> Self {
        Variable { value, writes: 0 }
    }

    #[inline]
    pub fn read(&self) -> F {
        self.value
    }

    pub fn assign(&mut self, value: F) {
        self.value = value;
        self.writes += 1;
    }

    /// Number of [`Variable::assign`] calls since construction.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

/// A model parameter that can float in a fit or be held fixed.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitParameter<F> {
    name: String,
    var: Variable<F>,
    init_value: F,
    lower_limit: F,
    upper_limit: F,
    step_size: F,
    fixed: bool,
    prev_value: Option<F>,
    /// Symmetric error reported by the minimizer.
    pub error: F,
    /// Upper asymmetric error.
    pub positive_error: F,
    /// Lower asymmetric error.
    pub negative_error: F,
    /// Value at the minimum of the last fit.
    pub fitted_value: F,
}

impl<F: Float> FitParameter<F> {
    /// New floating parameter with the default step size.
    ///
    /// `lower_limit <= init_value <= upper_limit` is the caller's business.
    pub fn new(name: impl Into<String>, init_value: F, lower_limit: F, upper_limit: F) -> Self {
        FitParameter {
            name: name.into(),
            var: Variable::new(init_value),
            init_value,
            lower_limit,
            upper_limit,
            step_size: F::from_f64(DEFAULT_STEP_SIZE).unwrap_or_else(F::epsilon),
            fixed: false,
            prev_value: None,
            error: F::zero(),
            positive_error: F::zero(),
            negative_error: F::zero(),
            fitted_value: init_value,
        }
    }

    /// Builder-style step size; zero makes the parameter fixed.
    pub fn with_step_size(mut self, step_size: F) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn set_step_size(&mut self, step_size: F) {
        self.step_size = step_size;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn init_value(&self) -> F {
        self.init_value
    }

    pub fn lower_limit(&self) -> F {
        self.lower_limit
    }

    pub fn upper_limit(&self) -> F {
        self.upper_limit
    }

    pub fn step_size(&self) -> F {
        self.step_size
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Last value pushed through [`FitParameter::update`].
    pub fn prev_value(&self) -> Option<F> {
        self.prev_value
    }

    /// Push `value` into the cell unless it equals the last pushed value.
    ///
    /// Returns whether a write happened. A NaN never compares equal, so it is
    /// always written.
    pub fn update(&mut self, value: F) -> bool {
        if self.prev_value == Some(value) {
            return false;
        }
        self.var.assign(value);
        self.prev_value = Some(value);
        true
    }

    /// The backing cell.
    pub fn var(&self) -> &Variable<F> {
        &self.var
    }

    /// Current value as a plain number.
    pub fn value(&self) -> F {
        self.var.read()
    }

    pub fn fix(&mut self) {
        self.fixed = true;
    }

    pub fn float(&mut self) {
        self.fixed = false;
    }

    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
    }

    /// True iff the step size is positive and the parameter is not fixed.
    pub fn floating(&self) -> bool {
        self.step_size > F::zero() && !self.fixed
    }

    /// Push the initial value back into the cell.
    pub fn reset(&mut self) -> bool {
        self.update(self.init_value)
    }

    /// Record the minimizer's result; the cell is left alone.
    pub fn set_fit_result(&mut self, value: F, error: F) {
        self.fitted_value = value;
        self.error = error;
    }

    /// Record asymmetric (MINOS-style) errors.
    pub fn set_asymmetric_errors(&mut self, negative: F, positive: F) {
        self.negative_error = negative;
        self.positive_error = positive;
    }
}
