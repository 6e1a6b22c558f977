//! Two-stack tape for reverse-mode AD and the recording scope built on it.
//!
//! During the forward pass every operation stores its precomputed partial
//! derivatives (multipliers) and operand indices. The reverse sweep is one
//! multiply-accumulate loop that skips statements with a zero adjoint. The
//! active tape is reached through a thread-local pointer installed by
//! [`TapeGuard`], so [`crate::Reverse`] stays `Copy`.

use std::cell::Cell;

use crate::reverse::Reverse;
use crate::Float;

/// Sentinel index for values that are not recorded on any tape.
pub const CONSTANT: u32 = u32::MAX;

/// Result lives at `lhs_index`; its operands occupy
/// `[previous.end_plus_one .. end_plus_one)` of the multiplier stack.
#[derive(Clone, Copy, Debug)]
struct Statement {
    lhs_index: u32,
    end_plus_one: u32,
}

/// Operation record for one forward pass.
pub struct Tape<F: Float> {
    statements: Vec<Statement>,
    multipliers: Vec<F>,
    indices: Vec<u32>,
    num_variables: u32,
}

impl<F: Float> Default for Tape<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> Tape<F> {
    /// Create an empty tape.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a tape sized for roughly `est_ops` recorded operations.
    pub fn with_capacity(est_ops: usize) -> Self {
        let mut statements = Vec::with_capacity(est_ops + 1);
        // Sentinel so `statements[i - 1]` is valid for every real statement.
        statements.push(Statement {
            lhs_index: 0,
            end_plus_one: 0,
        });
        Tape {
            statements,
            multipliers: Vec::with_capacity(est_ops * 2),
            indices: Vec::with_capacity(est_ops * 2),
            num_variables: 0,
        }
    }

    /// Register an independent variable and return its adjoint slot.
    ///
    /// Leaves push no statement, so their adjoints survive the sweep.
    #[inline]
    pub fn new_variable(&mut self, value: F) -> Reverse<F> {
        let index = self.num_variables;
        self.num_variables += 1;
        Reverse::from_tape(value, index)
    }

    /// Number of adjoint slots allocated so far (leaves and results).
    pub fn num_variables(&self) -> usize {
        self.num_variables as usize
    }

    /// Number of recorded operations.
    pub fn num_statements(&self) -> usize {
        self.statements.len() - 1
    }

    #[inline]
    fn push_operand(&mut self, index: u32, multiplier: F) {
        if index != CONSTANT {
            self.multipliers.push(multiplier);
            self.indices.push(index);
        }
    }

    #[inline]
    fn close_statement(&mut self) -> u32 {
        let lhs_index = self.num_variables;
        self.num_variables += 1;
        self.statements.push(Statement {
            lhs_index,
            end_plus_one: self.multipliers.len() as u32,
        });
        lhs_index
    }

    /// Record `result = f(operand)` with `multiplier = df/d(operand)`.
    #[inline]
    pub fn push_unary(&mut self, operand: u32, multiplier: F) -> u32 {
        self.push_operand(operand, multiplier);
        self.close_statement()
    }

    /// Record `result = f(lhs, rhs)` with both partial derivatives.
    #[inline]
    pub fn push_binary(&mut self, lhs: u32, lhs_mult: F, rhs: u32, rhs_mult: F) -> u32 {
        self.push_operand(lhs, lhs_mult);
        self.push_operand(rhs, rhs_mult);
        self.close_statement()
    }

    /// Reverse sweep seeded with 1 at `seed`; returns every adjoint.
    ///
    /// A `CONSTANT` seed has no dependence on anything, so all adjoints are zero.
    pub fn reverse(&self, seed: u32) -> Vec<F> {
        let mut adjoints = vec![F::zero(); self.num_variables as usize];
        if seed == CONSTANT {
            return adjoints;
        }
        adjoints[seed as usize] = F::one();

        for i in (1..self.statements.len()).rev() {
            let stmt = self.statements[i];
            let a = adjoints[stmt.lhs_index as usize];
            if a == F::zero() {
                continue;
            }
            adjoints[stmt.lhs_index as usize] = F::zero();
            let start = self.statements[i - 1].end_plus_one as usize;
            for j in start..stmt.end_plus_one as usize {
                let target = self.indices[j] as usize;
                adjoints[target] = adjoints[target] + self.multipliers[j] * a;
            }
        }
        adjoints
    }
}

thread_local! {
    static TAPE_F32: Cell<*mut Tape<f32>> = const { Cell::new(std::ptr::null_mut()) };
    static TAPE_F64: Cell<*mut Tape<f64>> = const { Cell::new(std::ptr::null_mut()) };
}

/// Selects the thread-local slot holding the active tape for a float type.
pub trait TapeThreadLocal: Float {
    fn cell() -> &'static std::thread::LocalKey<Cell<*mut Tape<Self>>>;
}

impl TapeThreadLocal for f32 {
    fn cell() -> &'static std::thread::LocalKey<Cell<*mut Tape<Self>>> {
        &TAPE_F32
    }
}

impl TapeThreadLocal for f64 {
    fn cell() -> &'static std::thread::LocalKey<Cell<*mut Tape<Self>>> {
        &TAPE_F64
    }
}

/// Run `f` on the active tape of this thread.
///
/// Panics if no recording scope is open: a tracked value was used after its
/// scope ended.
#[inline]
pub fn with_active_tape<F: TapeThreadLocal, R>(f: impl FnOnce(&mut Tape<F>) -> R) -> R {
    F::cell().with(|cell| {
        let ptr = cell.get();
        assert!(
            !ptr.is_null(),
            "tracked value used outside a recording scope (see ampgrad::tape::record)"
        );
        // SAFETY: TapeGuard keeps the pointee alive while the pointer is
        // installed, and the thread-local slot hands out one reference at a time.
        let tape = unsafe { &mut *ptr };
        f(tape)
    })
}

/// Installs a tape as the thread's active tape; the previous one comes back
/// on drop, including during unwinding.
pub struct TapeGuard<F: TapeThreadLocal> {
    prev: *mut Tape<F>,
}

impl<F: TapeThreadLocal> TapeGuard<F> {
    pub fn new(tape: &mut Tape<F>) -> Self {
        let prev = F::cell().with(|cell| cell.replace(tape as *mut Tape<F>));
        TapeGuard { prev }
    }
}

impl<F: TapeThreadLocal> Drop for TapeGuard<F> {
    fn drop(&mut self) {
        F::cell().with(|cell| cell.set(self.prev));
    }
}

/// Recording scope: watch `targets`, run `computation`, differentiate.
///
/// Each target becomes a tracked leaf on a fresh tape, in order. The
/// computation's scalar result is swept in reverse and the partial
/// derivative with respect to every target is returned alongside the value.
/// Targets with no path to the result get exactly zero. The tape is
/// deactivated before an error from `computation` is returned.
///
/// ```
/// let (value, grad) = ampgrad::tape::record(&[3.0_f64, 4.0], |x| {
///     Ok::<_, std::convert::Infallible>(x[0] * x[0] + x[1] * x[1])
/// })
/// .unwrap();
/// assert_eq!(value, 25.0);
/// assert_eq!(grad, vec![6.0, 8.0]);
/// ```
pub fn record<F, E>(
    targets: &[F],
    computation: impl FnOnce(&[Reverse<F>]) -> Result<Reverse<F>, E>,
) -> Result<(F, Vec<F>), E>
where
    F: TapeThreadLocal,
{
    record_with_capacity(targets, targets.len() * 10, computation)
}

/// [`record`] with an explicit operation estimate for the tape.
pub fn record_with_capacity<F, E>(
    targets: &[F],
    est_ops: usize,
    computation: impl FnOnce(&[Reverse<F>]) -> Result<Reverse<F>, E>,
) -> Result<(F, Vec<F>), E>
where
    F: TapeThreadLocal,
{
    let mut tape = Tape::with_capacity(est_ops);
    let inputs: Vec<Reverse<F>> = targets.iter().map(|&v| tape.new_variable(v)).collect();

    let output = {
        let _guard = TapeGuard::new(&mut tape);
        computation(&inputs)?
    };

    let adjoints = tape.reverse(output.index());
    let grad = (0..inputs.len()).map(|i| adjoints[i]).collect();
    Ok((output.value, grad))
}
