//! Array-level math facade under the fitting toolkit's stable names.
//!
//! Every function is a direct pass-through to the matching [`Scalar`]
//! primitive or ndarray operation, applied elementwise. Nothing is rescaled
//! or clamped. Shape disagreements come back as errors instead of panics.

use ndarray::{Array, ArrayBase, ArrayD, ArrayViewD, Axis, Data, Dimension, Zip};
use num_complex::Complex;

use crate::error::{Error, Result};
use crate::scalar::Scalar;

macro_rules! elementwise_unary {
    ($($(#[$doc:meta])* $name:ident => $method:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name<T, S, D>(x: &ArrayBase<S, D>) -> Array<T, D>
            where
                T: Scalar,
                S: Data<Elem = T>,
                D: Dimension,
            {
                x.mapv(T::$method)
            }
        )*
    };
}

elementwise_unary! {
    abs => abs;
    sqrt => sqrt;
    exp => exp;
    /// Natural logarithm.
    log => ln;
    sin => sin;
    cos => cos;
    tan => tan;
    asin => asin;
    acos => acos;
    atan => atan;
    tanh => tanh;
}

fn check_same_shape(context: &'static str, expected: &[usize], actual: &[usize]) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            context,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        })
    }
}

fn zip_map<A, B, S1, S2, D, R>(
    context: &'static str,
    a: &ArrayBase<S1, D>,
    b: &ArrayBase<S2, D>,
    f: impl Fn(A, B) -> R,
) -> Result<Array<R, D>>
where
    A: Copy,
    B: Copy,
    S1: Data<Elem = A>,
    S2: Data<Elem = B>,
    D: Dimension,
{
    check_same_shape(context, a.shape(), b.shape())?;
    Ok(Zip::from(a).and(b).map_collect(|&x, &y| f(x, y)))
}

macro_rules! elementwise_binary {
    ($($(#[$doc:meta])* $name:ident => $method:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name<T, S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<Array<T, D>>
            where
                T: Scalar,
                S1: Data<Elem = T>,
                S2: Data<Elem = T>,
                D: Dimension,
            {
                zip_map(stringify!($name), a, b, T::$method)
            }
        )*
    };
}

elementwise_binary! {
    max => max;
    min => min;
    /// Four-quadrant arctangent of `a / b`.
    atan2 => atan2;
    /// `a` raised to the power `b`.
    pow => powf;
}

/// Elementwise sum of equally shaped tensors.
pub fn sum<T, S, D>(xs: &[ArrayBase<S, D>]) -> Result<Array<T, D>>
where
    T: Scalar,
    S: Data<Elem = T>,
    D: Dimension,
{
    let (first, rest) = xs.split_first().ok_or(Error::EmptyInput("sum"))?;
    let mut acc = first.to_owned();
    for x in rest {
        check_same_shape("sum", acc.shape(), x.shape())?;
        Zip::from(&mut acc).and(x).for_each(|a, &b| *a = *a + b);
    }
    Ok(acc)
}

/// Zeros shaped like `x`.
pub fn zeros<T, S, D>(x: &ArrayBase<S, D>) -> Array<T, D>
where
    T: Scalar,
    S: Data<Elem = T>,
    D: Dimension,
{
    Array::from_elem(x.raw_dim(), T::zero())
}

/// Ones shaped like `x`.
pub fn ones<T, S, D>(x: &ArrayBase<S, D>) -> Array<T, D>
where
    T: Scalar,
    S: Data<Elem = T>,
    D: Dimension,
{
    Array::from_elem(x.raw_dim(), T::one())
}

/// Cross product along the last axis, which must have length 3.
pub fn cross<T, S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<Array<T, D>>
where
    T: Scalar,
    S1: Data<Elem = T>,
    S2: Data<Elem = T>,
    D: Dimension,
{
    check_same_shape("cross", a.shape(), b.shape())?;
    if a.shape().last() != Some(&3) {
        let mut expected = a.shape().to_vec();
        match expected.last_mut() {
            Some(n) => *n = 3,
            None => expected.push(3),
        }
        return Err(Error::ShapeMismatch {
            context: "cross (last axis)",
            expected,
            actual: a.shape().to_vec(),
        });
    }

    let axis = Axis(a.ndim() - 1);
    let mut out = a.to_owned();
    for ((mut o, x), y) in out
        .lanes_mut(axis)
        .into_iter()
        .zip(a.lanes(axis))
        .zip(b.lanes(axis))
    {
        o[0] = x[1] * y[2] - x[2] * y[1];
        o[1] = x[2] * y[0] - x[0] * y[2];
        o[2] = x[0] * y[1] - x[1] * y[0];
    }
    Ok(out)
}

fn checked_axis(axis: usize, ndim: usize) -> Result<Axis> {
    if axis < ndim {
        Ok(Axis(axis))
    } else {
        Err(Error::InvalidAxis { axis, ndim })
    }
}

/// Sum over `axis`, or over every element when `axis` is `None`.
pub fn reduce_sum<T: Scalar>(x: &ArrayD<T>, axis: Option<usize>) -> Result<ArrayD<T>> {
    match axis {
        None => Ok(ndarray::arr0(x.iter().fold(T::zero(), |acc, &v| acc + v)).into_dyn()),
        Some(axis) => {
            let axis = checked_axis(axis, x.ndim())?;
            Ok(x.fold_axis(axis, T::zero(), |&acc, &v| acc + v))
        }
    }
}

/// Maximum over `axis` (or everything); an empty reduction gives -inf.
pub fn reduce_max<T: Scalar>(x: &ArrayD<T>, axis: Option<usize>) -> Result<ArrayD<T>> {
    let floor = T::from_f(<T::Float as num_traits::Float>::neg_infinity());
    match axis {
        None => Ok(ndarray::arr0(x.iter().fold(floor, |acc, &v| acc.max(v))).into_dyn()),
        Some(axis) => {
            let axis = checked_axis(axis, x.ndim())?;
            Ok(x.fold_axis(axis, floor, |&acc, &v| acc.max(v)))
        }
    }
}

/// Mean over `axis` (or everything); an empty reduction gives NaN.
pub fn reduce_mean<T: Scalar>(x: &ArrayD<T>, axis: Option<usize>) -> Result<ArrayD<T>> {
    let count = match axis {
        None => x.len(),
        Some(axis) => x.len_of(checked_axis(axis, x.ndim())?),
    };
    let n = T::from_usize(count).unwrap_or_else(T::zero);
    Ok(reduce_sum(x, axis)?.mapv(|s| s / n))
}

/// Pick from `a` where `cond` holds and from `b` elsewhere.
pub fn where_<T, S, D>(
    cond: &ArrayBase<S, D>,
    a: &Array<T, D>,
    b: &Array<T, D>,
) -> Result<Array<T, D>>
where
    T: Scalar,
    S: Data<Elem = bool>,
    D: Dimension,
{
    check_same_shape("where", cond.shape(), a.shape())?;
    check_same_shape("where", cond.shape(), b.shape())?;
    Ok(Zip::from(cond)
        .and(a)
        .and(b)
        .map_collect(|&c, &x, &y| if c { x } else { y }))
}

pub fn equal<T, S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<Array<bool, D>>
where
    T: Scalar,
    S1: Data<Elem = T>,
    S2: Data<Elem = T>,
    D: Dimension,
{
    zip_map("equal", a, b, |x: T, y: T| x == y)
}

pub fn greater<T, S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<Array<bool, D>>
where
    T: Scalar,
    S1: Data<Elem = T>,
    S2: Data<Elem = T>,
    D: Dimension,
{
    zip_map("greater", a, b, |x: T, y: T| x > y)
}

pub fn less<T, S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<Array<bool, D>>
where
    T: Scalar,
    S1: Data<Elem = T>,
    S2: Data<Elem = T>,
    D: Dimension,
{
    zip_map("less", a, b, |x: T, y: T| x < y)
}

pub fn logical_and<S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<Array<bool, D>>
where
    S1: Data<Elem = bool>,
    S2: Data<Elem = bool>,
    D: Dimension,
{
    zip_map("logical_and", a, b, |x: bool, y: bool| x && y)
}

/// Stack equally shaped tensors along a new `axis`.
pub fn stack<T: Clone>(xs: &[ArrayViewD<'_, T>], axis: usize) -> Result<ArrayD<T>> {
    if xs.is_empty() {
        return Err(Error::EmptyInput("stack"));
    }
    // The new axis may sit after the last existing one.
    checked_axis(axis, xs[0].ndim() + 1)?;
    Ok(ndarray::stack(Axis(axis), xs)?)
}

/// Join tensors along an existing `axis`.
pub fn concat<T: Clone>(xs: &[ArrayViewD<'_, T>], axis: usize) -> Result<ArrayD<T>> {
    if xs.is_empty() {
        return Err(Error::EmptyInput("concat"));
    }
    checked_axis(axis, xs[0].ndim())?;
    Ok(ndarray::concatenate(Axis(axis), xs)?)
}

/// Complex tensor from real and imaginary parts.
pub fn complex<T, S1, S2, D>(re: &ArrayBase<S1, D>, im: &ArrayBase<S2, D>) -> Result<Array<Complex<T>, D>>
where
    T: Scalar,
    S1: Data<Elem = T>,
    S2: Data<Elem = T>,
    D: Dimension,
{
    zip_map("complex", re, im, Complex::new)
}

pub fn conjugate<T, S, D>(z: &ArrayBase<S, D>) -> Array<Complex<T>, D>
where
    T: Scalar,
    S: Data<Elem = Complex<T>>,
    D: Dimension,
{
    z.map(Complex::conj)
}

pub fn real<T, S, D>(z: &ArrayBase<S, D>) -> Array<T, D>
where
    T: Scalar,
    S: Data<Elem = Complex<T>>,
    D: Dimension,
{
    z.map(|c| c.re)
}

pub fn imaginary<T, S, D>(z: &ArrayBase<S, D>) -> Array<T, D>
where
    T: Scalar,
    S: Data<Elem = Complex<T>>,
    D: Dimension,
{
    z.map(|c| c.im)
}
