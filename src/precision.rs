//! Precision context: which real and complex widths new tensors are built at.
//!
//! A [`PrecisionContext`] is an explicit value rather than process state, so
//! independent fits (and tests) can run side by side. Every constant, cast and
//! random draw it creates uses the width active at that moment; tensors own
//! their storage, so switching later leaves them untouched.

use std::fmt;

use ndarray::{ArrayD, Dimension, IxDyn, Zip};
use num_complex::{Complex32, Complex64};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Error, Result};
use crate::float::Float;
use crate::parameter::FitParameter;

/// Real floating-point width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RealKind {
    F32,
    #[default]
    F64,
}

impl RealKind {
    pub fn bits(self) -> u32 {
        match self {
            RealKind::F32 => 32,
            RealKind::F64 => 64,
        }
    }

    /// Complex kind built from two reals of this width.
    pub fn complex(self) -> ComplexKind {
        match self {
            RealKind::F32 => ComplexKind::C64,
            RealKind::F64 => ComplexKind::C128,
        }
    }
}

impl fmt::Display for RealKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "float{}", self.bits())
    }
}

/// Complex floating-point width (twice the real width).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComplexKind {
    C64,
    #[default]
    C128,
}

impl ComplexKind {
    pub fn bits(self) -> u32 {
        match self {
            ComplexKind::C64 => 64,
            ComplexKind::C128 => 128,
        }
    }

    /// Width of each component.
    pub fn real(self) -> RealKind {
        match self {
            ComplexKind::C64 => RealKind::F32,
            ComplexKind::C128 => RealKind::F64,
        }
    }
}

impl fmt::Display for ComplexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "complex{}", self.bits())
    }
}

/// Real tensor tagged with the width it was created at.
#[derive(Clone, Debug, PartialEq)]
pub enum RealTensor {
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

impl RealTensor {
    pub fn kind(&self) -> RealKind {
        match self {
            RealTensor::F32(_) => RealKind::F32,
            RealTensor::F64(_) => RealKind::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            RealTensor::F32(a) => a.shape(),
            RealTensor::F64(a) => a.shape(),
        }
    }

    /// Values widened to `f64`, whatever the stored width.
    pub fn to_f64(&self) -> ArrayD<f64> {
        match self {
            RealTensor::F32(a) => a.mapv(f64::from),
            RealTensor::F64(a) => a.clone(),
        }
    }

    /// Values converted to the float type `F`.
    pub fn to_array<F: Float>(&self) -> ArrayD<F> {
        match self {
            RealTensor::F32(a) => a.mapv(|v| F::from_f32(v).unwrap_or_else(F::nan)),
            RealTensor::F64(a) => a.mapv(|v| F::from_f64(v).unwrap_or_else(F::nan)),
        }
    }

    fn at(kind: RealKind, values: ArrayD<f64>) -> Self {
        match kind {
            RealKind::F32 => RealTensor::F32(values.mapv(|v| v as f32)),
            RealKind::F64 => RealTensor::F64(values),
        }
    }
}

/// Complex tensor tagged with the width it was created at.
#[derive(Clone, Debug, PartialEq)]
pub enum ComplexTensor {
    C64(ArrayD<Complex32>),
    C128(ArrayD<Complex64>),
}

impl ComplexTensor {
    pub fn kind(&self) -> ComplexKind {
        match self {
            ComplexTensor::C64(_) => ComplexKind::C64,
            ComplexTensor::C128(_) => ComplexKind::C128,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            ComplexTensor::C64(a) => a.shape(),
            ComplexTensor::C128(a) => a.shape(),
        }
    }

    /// Values widened to `Complex64`.
    pub fn to_c128(&self) -> ArrayD<Complex64> {
        match self {
            ComplexTensor::C64(a) => a.mapv(|c| Complex64::new(f64::from(c.re), f64::from(c.im))),
            ComplexTensor::C128(a) => a.clone(),
        }
    }
}

/// Active numeric widths plus the random source used for uniform draws.
///
/// Defaults to double precision. Not shared between threads; a fit owns one.
#[derive(Debug)]
pub struct PrecisionContext {
    real: RealKind,
    rng: StdRng,
    constants_created: usize,
}

impl Default for PrecisionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PrecisionContext {
    /// Double-precision context with an entropy-seeded generator.
    pub fn new() -> Self {
        PrecisionContext {
            real: RealKind::F64,
            rng: StdRng::from_entropy(),
            constants_created: 0,
        }
    }

    /// Context starting at `kind`.
    pub fn with_kind(kind: RealKind) -> Self {
        let mut ctx = Self::new();
        ctx.real = kind;
        ctx
    }

    pub fn set_single_precision(&mut self) {
        self.switch(RealKind::F32);
    }

    pub fn set_double_precision(&mut self) {
        self.switch(RealKind::F64);
    }

    fn switch(&mut self, kind: RealKind) {
        if kind == self.real {
            return;
        }
        if self.constants_created > 0 {
            log::warn!(
                "switching precision {} -> {} after {} tensors were created; \
                 existing tensors keep their width",
                self.real,
                kind,
                self.constants_created
            );
        } else {
            log::debug!("precision {} -> {}", self.real, kind);
        }
        self.real = kind;
    }

    pub fn real_kind(&self) -> RealKind {
        self.real
    }

    pub fn complex_kind(&self) -> ComplexKind {
        self.real.complex()
    }

    /// Fail unless `F` has the active real width.
    pub fn ensure<F: Float>(&self) -> Result<()> {
        if F::KIND == self.real {
            Ok(())
        } else {
            Err(Error::PrecisionMismatch {
                expected: self.real,
                actual: F::KIND,
            })
        }
    }

    /// Scalar (rank-0) constant.
    pub fn constant(&mut self, c: f64) -> RealTensor {
        self.tensor(ndarray::arr0(c).into_dyn())
    }

    /// Constant of arbitrary shape.
    pub fn tensor<D: Dimension>(&mut self, values: ndarray::Array<f64, D>) -> RealTensor {
        self.constants_created += 1;
        RealTensor::at(self.real, values.into_dyn())
    }

    /// Shape-`[1]` constant.
    pub fn invariant(&mut self, c: f64) -> RealTensor {
        self.tensor(ndarray::arr1(&[c]))
    }

    pub fn pi(&mut self) -> RealTensor {
        self.constant(std::f64::consts::PI)
    }

    /// Boolean constant; the active precision has no bearing on it.
    pub fn bool_const<D: Dimension>(&self, values: ndarray::Array<bool, D>) -> ArrayD<bool> {
        values.into_dyn()
    }

    /// Convert `x` to the active real width.
    pub fn cast_real(&mut self, x: &RealTensor) -> RealTensor {
        self.tensor(x.to_f64())
    }

    /// Convert `x` to the active complex width with zero imaginary part.
    pub fn cast_complex(&mut self, x: &RealTensor) -> ComplexTensor {
        let re = x.to_f64();
        let im = ArrayD::zeros(re.raw_dim());
        self.build_complex(&re, &im)
    }

    /// Complex tensor from real and imaginary parts of equal shape.
    pub fn complex(&mut self, re: &RealTensor, im: &RealTensor) -> Result<ComplexTensor> {
        if re.shape() != im.shape() {
            return Err(Error::ShapeMismatch {
                context: "PrecisionContext::complex",
                expected: re.shape().to_vec(),
                actual: im.shape().to_vec(),
            });
        }
        Ok(self.build_complex(&re.to_f64(), &im.to_f64()))
    }

    fn build_complex(&mut self, re: &ArrayD<f64>, im: &ArrayD<f64>) -> ComplexTensor {
        self.constants_created += 1;
        match self.complex_kind() {
            ComplexKind::C64 => ComplexTensor::C64(
                Zip::from(re)
                    .and(im)
                    .map_collect(|&r, &i| Complex32::new(r as f32, i as f32)),
            ),
            ComplexKind::C128 => {
                ComplexTensor::C128(Zip::from(re).and(im).map_collect(|&r, &i| Complex64::new(r, i)))
            }
        }
    }

    /// Reseed the generator used by [`Self::random_uniform`].
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Uniform samples in `[minval, maxval)`.
    ///
    /// Samples are drawn at the active width, so a range that collapses
    /// when rounded to `f32` is rejected in single precision.
    pub fn random_uniform(&mut self, shape: &[usize], minval: f64, maxval: f64) -> Result<RealTensor> {
        let invalid = || Error::InvalidRange {
            min: minval,
            max: maxval,
        };
        let shape = IxDyn(shape);
        let rng = &mut self.rng;
        // Also rejects NaN bounds and spans that overflow.
        let tensor = match self.real {
            RealKind::F32 => {
                let (lo, hi) = (minval as f32, maxval as f32);
                if !(lo < hi && (hi - lo).is_finite()) {
                    return Err(invalid());
                }
                let dist = Uniform::new(lo, hi);
                RealTensor::F32(ArrayD::from_shape_simple_fn(shape, || dist.sample(&mut *rng)))
            }
            RealKind::F64 => {
                if !(minval < maxval && (maxval - minval).is_finite()) {
                    return Err(invalid());
                }
                let dist = Uniform::new(minval, maxval);
                RealTensor::F64(ArrayD::from_shape_simple_fn(shape, || dist.sample(&mut *rng)))
            }
        };
        self.constants_created += 1;
        Ok(tensor)
    }

    /// Fit parameter whose cell type must match the active width.
    pub fn fit_parameter<F: Float>(
        &self,
        name: impl Into<String>,
        init_value: F,
        lower_limit: F,
        upper_limit: F,
    ) -> Result<FitParameter<F>> {
        self.ensure::<F>()?;
        Ok(FitParameter::new(name, init_value, lower_limit, upper_limit))
    }
}
