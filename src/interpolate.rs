//! Multilinear interpolation on a rectangular grid of any rank.
//!
//! Grid nodes sit at integer coordinates `0..n` along each axis. The grid is
//! padded by one mirrored cell on every side, so queries next to (or slightly
//! beyond) the boundary need no special casing; beyond the domain the result
//! is an extrapolation biased towards the edge values. No query is ever
//! rejected for lying outside the grid.
//!
//! Generic over [`Scalar`], so interpolating `Reverse` values inside a
//! recording scope differentiates through both the grid and the coordinates.

use ndarray::{Array1, ArrayD, ArrayView2, IxDyn};
use num_traits::ToPrimitive;

use crate::error::{Error, Result};
use crate::float::Float;
use crate::scalar::Scalar;

/// Interpolate `grid` (rank R) at each row of `coordinates` (batch x R).
///
/// Returns one value per query row, in order.
///
/// ```
/// use ndarray::{arr1, arr2};
///
/// let grid = arr1(&[0.0_f64, 1.0, 2.0, 3.0]).into_dyn();
/// let out = ampgrad::interpolate(&grid, arr2(&[[1.5], [0.25]]).view()).unwrap();
/// assert_eq!(out.to_vec(), vec![1.5, 0.25]);
/// ```
pub fn interpolate<T: Scalar>(grid: &ArrayD<T>, coordinates: ArrayView2<'_, T>) -> Result<Array1<T>> {
    let rank = grid.ndim();
    if coordinates.ncols() != rank {
        return Err(Error::ShapeMismatch {
            context: "interpolate (coordinate columns vs grid rank)",
            expected: vec![coordinates.nrows(), rank],
            actual: coordinates.shape().to_vec(),
        });
    }
    if let Some(axis) = grid.shape().iter().position(|&n| n == 0) {
        return Err(Error::InvalidGrid(format!("axis {axis} has no nodes")));
    }

    let padded = pad_symmetric(grid);
    let upper: Vec<isize> = padded.shape().iter().map(|&n| n as isize - 1).collect();

    let mut lower = vec![0isize; rank];
    let mut frac = vec![T::zero(); rank];
    let mut index = vec![0usize; rank];
    let mut out = Vec::with_capacity(coordinates.nrows());

    for point in coordinates.rows() {
        for ((l, f), &c) in lower.iter_mut().zip(frac.iter_mut()).zip(point.iter()) {
            let floor = c.floor();
            // Fractional part taken in T itself: no integer round trip, so
            // coordinates beyond `isize` still weight their own cell.
            *f = c - floor;
            *l = gather_corner(floor.value());
        }

        let mut acc = T::zero();
        for vertex in 0..(1usize << rank) {
            let mut weight = T::one();
            for axis in 0..rank {
                // Last axis varies fastest across vertices.
                let bit = (vertex >> (rank - 1 - axis)) & 1;
                weight = weight
                    * if bit == 1 {
                        frac[axis]
                    } else {
                        T::one() - frac[axis]
                    };
                let corner = lower[axis].saturating_add(bit as isize + 1);
                index[axis] = corner.clamp(0, upper[axis]) as usize;
            }
            acc = acc + weight * padded[IxDyn(&index)];
        }
        out.push(acc);
    }

    Ok(Array1::from_vec(out))
}

/// Integer lower corner for the gather, saturated for coordinates beyond
/// `isize`. NaN lands on the low edge; its weights carry the NaN through.
fn gather_corner<F: Float>(floor: F) -> isize {
    match ToPrimitive::to_isize(&floor) {
        Some(corner) => corner,
        None if floor > F::zero() => isize::MAX,
        None => isize::MIN,
    }
}

/// Pad one cell on both sides of every axis by mirroring the edge.
///
/// A one-cell symmetric pad repeats the boundary node, so padded index `i`
/// reads the source at `i - 1` clamped into range.
fn pad_symmetric<T: Scalar>(grid: &ArrayD<T>) -> ArrayD<T> {
    let shape = grid.shape();
    let padded_shape: Vec<usize> = shape.iter().map(|&n| n + 2).collect();
    let mut src = vec![0usize; shape.len()];
    ArrayD::from_shape_fn(IxDyn(&padded_shape), |idx| {
        for (axis, s) in src.iter_mut().enumerate() {
            *s = idx[axis].saturating_sub(1).min(shape[axis] - 1);
        }
        grid[IxDyn(&src)]
    })
}
