//! Gradient evaluation for an external minimizer.
//!
//! A [`GradientEvaluator`] holds at most one binding: an objective (typically
//! a negative log-likelihood), its positional arguments, and the ordered list
//! of floating [`FitParameter`]s. Each evaluation pushes the minimizer's
//! vector into the parameters, re-runs the objective inside a recording
//! scope and returns one partial derivative per parameter, in binding order.
//!
//! ```
//! use ampgrad::{FitParameter, GradientEvaluator};
//!
//! let mut eval = GradientEvaluator::<f64, ()>::new();
//! eval.create_gradient(
//!     |_: &(), p| {
//!         let a = p.get("a")?;
//!         Ok((a - 2.0) * (a - 2.0))
//!     },
//!     (),
//!     vec![FitParameter::new("a", 0.0, -10.0, 10.0)],
//! );
//! assert_eq!(eval.gradient(&[3.0]).unwrap(), vec![2.0]);
//! ```

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::parameter::FitParameter;
use crate::reverse::Reverse;
use crate::tape::{self, TapeThreadLocal};

/// Parameter values handed to an objective, keyed by parameter name.
///
/// Entries keep binding order. On duplicate names the later entry wins.
#[derive(Clone, Debug)]
pub struct ParameterValues<T> {
    entries: Vec<(String, T)>,
}

impl<T: Copy> ParameterValues<T> {
    pub fn new() -> Self {
        ParameterValues {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: T) {
        self.entries.push((name.into(), value));
    }

    /// Value bound to `name`.
    pub fn get(&self, name: &str) -> Result<T> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|&(_, v)| v)
            .ok_or_else(|| Error::UnknownParameter(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, T)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }
}

impl<T: Copy> Default for ParameterValues<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> FromIterator<(String, T)> for ParameterValues<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        ParameterValues {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Objective signature: positional arguments plus the tracked parameter map.
pub type ObjectiveFn<F, A> =
    Box<dyn FnMut(&A, &ParameterValues<Reverse<F>>) -> Result<Reverse<F>>>;

struct Binding<F: TapeThreadLocal, A> {
    objective: ObjectiveFn<F, A>,
    args: A,
    parameters: Vec<FitParameter<F>>,
}

/// Evaluates objective gradients for a minimizer. See the module docs.
///
/// Single-threaded: one evaluator serves one fit at a time.
pub struct GradientEvaluator<F: TapeThreadLocal, A> {
    binding: Option<Binding<F, A>>,
    calls: u64,
    tape_capacity: Option<usize>,
}

impl<F: TapeThreadLocal, A> Default for GradientEvaluator<F, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: TapeThreadLocal, A> GradientEvaluator<F, A> {
    /// Unbound evaluator with a zero call counter.
    pub fn new() -> Self {
        GradientEvaluator {
            binding: None,
            calls: 0,
            tape_capacity: None,
        }
    }

    /// Pre-size each recording tape for `est_ops` operations.
    pub fn with_tape_capacity(mut self, est_ops: usize) -> Self {
        self.tape_capacity = Some(est_ops);
        self
    }

    /// Bind `objective`, its `args` and the floating `parameters`, replacing
    /// any previous binding wholesale.
    ///
    /// The order of `parameters` fixes the order of every value and gradient
    /// vector until the next bind. Returns the previously bound parameters.
    pub fn create_gradient<O>(
        &mut self,
        objective: O,
        args: A,
        parameters: Vec<FitParameter<F>>,
    ) -> Option<Vec<FitParameter<F>>>
    where
        O: FnMut(&A, &ParameterValues<Reverse<F>>) -> Result<Reverse<F>> + 'static,
    {
        {
            let mut seen = HashSet::with_capacity(parameters.len());
            for p in &parameters {
                if !seen.insert(p.name()) {
                    log::warn!(
                        "parameter `{}` bound more than once; the last one shadows the others",
                        p.name()
                    );
                }
                if !p.floating() {
                    log::warn!(
                        "parameter `{}` is not floating but was bound for gradients",
                        p.name()
                    );
                }
            }
        }
        log::debug!(
            "binding objective with {} floating parameters: [{}]",
            parameters.len(),
            parameters.iter().map(|p| p.name()).collect::<Vec<_>>().join(", ")
        );

        let previous = self.binding.replace(Binding {
            objective: Box::new(objective),
            args,
            parameters,
        });
        previous.map(|b| b.parameters)
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Bound parameters in binding order (empty when unbound).
    pub fn parameters(&self) -> &[FitParameter<F>] {
        match self.binding.as_ref() {
            Some(b) => b.parameters.as_slice(),
            None => &[],
        }
    }

    pub fn parameters_mut(&mut self) -> &mut [FitParameter<F>] {
        match self.binding.as_mut() {
            Some(b) => b.parameters.as_mut_slice(),
            None => &mut [],
        }
    }

    /// Names of the bound parameters in binding order.
    pub fn names(&self) -> Vec<&str> {
        self.parameters().iter().map(|p| p.name()).collect()
    }

    /// Drop the binding, handing back its arguments and parameters.
    pub fn release(&mut self) -> Option<(A, Vec<FitParameter<F>>)> {
        self.binding.take().map(|b| (b.args, b.parameters))
    }

    /// Number of evaluations run so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    pub fn reset_calls(&mut self) {
        self.calls = 0;
    }

    /// Gradient of the objective at `values`, one entry per bound parameter.
    pub fn gradient(&mut self, values: &[F]) -> Result<Vec<F>> {
        self.value_and_gradient(values).map(|(_, grad)| grad)
    }

    /// Objective value and gradient at `values`.
    ///
    /// Parameters whose value did not change since the last call are not
    /// rewritten. Parameters the objective never touches get a zero gradient.
    pub fn value_and_gradient(&mut self, values: &[F]) -> Result<(F, Vec<F>)> {
        let binding = self.binding.as_mut().ok_or(Error::NotBound)?;
        let expected = binding.parameters.len();
        if values.len() != expected {
            return Err(Error::LengthMismatch {
                expected,
                actual: values.len(),
            });
        }

        for (p, &v) in binding.parameters.iter_mut().zip(values) {
            p.update(v);
        }
        self.calls += 1;
        log::trace!("gradient evaluation #{} at {:?}", self.calls, values);

        let Binding {
            objective,
            args,
            parameters,
        } = binding;
        let cells: Vec<F> = parameters.iter().map(|p| p.value()).collect();
        let est_ops = self.tape_capacity.unwrap_or(cells.len() * 10);

        tape::record_with_capacity(&cells, est_ops, |tracked| {
            let kwargs: ParameterValues<Reverse<F>> = parameters
                .iter()
                .zip(tracked)
                .map(|(p, &x)| (p.name().to_string(), x))
                .collect();
            objective(args, &kwargs)
        })
    }

    /// Copy a minimizer's result into the bound parameters' bookkeeping.
    pub fn store_fit_result(&mut self, values: &[F], errors: &[F]) -> Result<()> {
        let binding = self.binding.as_mut().ok_or(Error::NotBound)?;
        let expected = binding.parameters.len();
        for actual in [values.len(), errors.len()] {
            if actual != expected {
                return Err(Error::LengthMismatch { expected, actual });
            }
        }
        for ((p, &v), &e) in binding.parameters.iter_mut().zip(values).zip(errors) {
            p.set_fit_result(v, e);
        }
        Ok(())
    }
}

/// What a gradient-based minimizer needs from an objective.
pub trait Objective<F> {
    /// Number of free variables.
    fn dim(&self) -> usize;

    /// Evaluate the objective and its gradient at `x`.
    ///
    /// Returns `(f(x), ∇f(x))`.
    fn eval_grad(&mut self, x: &[F]) -> Result<(F, Vec<F>)>;
}

impl<F: TapeThreadLocal, A> Objective<F> for GradientEvaluator<F, A> {
    fn dim(&self) -> usize {
        self.parameters().len()
    }

    fn eval_grad(&mut self, x: &[F]) -> Result<(F, Vec<F>)> {
        self.value_and_gradient(x)
    }
}
