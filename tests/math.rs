use std::convert::Infallible;

use ampgrad::{math, tape, Error, Reverse, Scalar};
use approx::assert_relative_eq;
use ndarray::{arr1, arr2, Array1, ArrayD, IxDyn};
use num_complex::Complex64;

#[test]
fn unary_primitives_match_std() {
    let x = arr1(&[0.1, 0.4, 0.9]);
    let checks: [(fn(&Array1<f64>) -> Array1<f64>, fn(f64) -> f64); 8] = [
        (math::exp, f64::exp),
        (math::log, f64::ln),
        (math::sqrt, f64::sqrt),
        (math::sin, f64::sin),
        (math::cos, f64::cos),
        (math::asin, f64::asin),
        (math::acos, f64::acos),
        (math::tanh, f64::tanh),
    ];
    for (ours, reference) in checks {
        let got = ours(&x);
        for (g, &v) in got.iter().zip(x.iter()) {
            assert_relative_eq!(*g, reference(v), max_relative = 1e-15);
        }
    }
}

#[test]
fn abs_and_atan() {
    let x = arr1(&[-2.0, 0.0, 3.0]);
    assert_eq!(math::abs(&x), arr1(&[2.0, 0.0, 3.0]));
    assert_relative_eq!(math::atan(&x)[2], 3.0_f64.atan());
    assert_relative_eq!(math::tan(&x)[0], (-2.0_f64).tan());
}

#[test]
fn binary_primitives() {
    let a = arr1(&[1.0, 5.0, -1.0]);
    let b = arr1(&[2.0, 3.0, -1.0]);
    assert_eq!(math::max(&a, &b).unwrap(), arr1(&[2.0, 5.0, -1.0]));
    assert_eq!(math::min(&a, &b).unwrap(), arr1(&[1.0, 3.0, -1.0]));
    assert_relative_eq!(math::pow(&a, &b).unwrap()[1], 125.0, max_relative = 1e-12);
    assert_relative_eq!(math::atan2(&a, &b).unwrap()[0], 1.0_f64.atan2(2.0));
}

#[test]
fn binary_shape_mismatch_is_an_error() {
    let a = arr1(&[1.0, 2.0]);
    let b = arr1(&[1.0, 2.0, 3.0]);
    assert!(matches!(math::max(&a, &b), Err(Error::ShapeMismatch { .. })));
}

#[test]
fn elementwise_sum() {
    let xs = [arr1(&[1.0, 2.0]), arr1(&[10.0, 20.0]), arr1(&[100.0, 200.0])];
    assert_eq!(math::sum(&xs).unwrap(), arr1(&[111.0, 222.0]));

    let empty: [Array1<f64>; 0] = [];
    assert!(matches!(math::sum(&empty), Err(Error::EmptyInput(_))));
}

#[test]
fn zeros_and_ones_follow_shape() {
    let x = arr2(&[[1.5, 2.5, 3.5]]);
    assert_eq!(math::zeros(&x), arr2(&[[0.0, 0.0, 0.0]]));
    assert_eq!(math::ones(&x), arr2(&[[1.0, 1.0, 1.0]]));
}

#[test]
fn cross_product_per_row() {
    let a = arr2(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    let b = arr2(&[[0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
    assert_eq!(
        math::cross(&a, &b).unwrap(),
        arr2(&[[0.0, 0.0, 1.0], [1.0, 0.0, 0.0]])
    );
}

#[test]
fn cross_requires_three_components() {
    let a = arr1(&[1.0, 2.0]);
    assert!(matches!(math::cross(&a, &a), Err(Error::ShapeMismatch { .. })));
}

#[test]
fn reductions() {
    let x = arr2(&[[1.0, 4.0], [3.0, 2.0]]).into_dyn();
    assert_eq!(math::reduce_sum(&x, None).unwrap().sum(), 10.0);
    assert_eq!(math::reduce_sum(&x, Some(0)).unwrap(), arr1(&[4.0, 6.0]).into_dyn());
    assert_eq!(math::reduce_max(&x, Some(1)).unwrap(), arr1(&[4.0, 3.0]).into_dyn());
    assert_eq!(math::reduce_max(&x, None).unwrap().sum(), 4.0);
    assert_eq!(math::reduce_mean(&x, Some(0)).unwrap(), arr1(&[2.0, 3.0]).into_dyn());
    assert!(matches!(
        math::reduce_sum(&x, Some(2)),
        Err(Error::InvalidAxis { axis: 2, ndim: 2 })
    ));
}

#[test]
fn empty_reductions() {
    let x = ArrayD::<f64>::zeros(IxDyn(&[0]));
    assert_eq!(math::reduce_sum(&x, None).unwrap().sum(), 0.0);
    assert_eq!(math::reduce_max(&x, None).unwrap().sum(), f64::NEG_INFINITY);
    assert!(math::reduce_mean(&x, None).unwrap().sum().is_nan());
}

#[test]
fn comparisons_and_where() {
    let a = arr1(&[1.0, 5.0, 3.0]);
    let b = arr1(&[2.0, 5.0, 1.0]);
    let gt = math::greater(&a, &b).unwrap();
    assert_eq!(gt, arr1(&[false, false, true]));
    assert_eq!(math::less(&a, &b).unwrap(), arr1(&[true, false, false]));
    assert_eq!(math::equal(&a, &b).unwrap(), arr1(&[false, true, false]));
    assert_eq!(
        math::logical_and(&gt, &arr1(&[true, true, true])).unwrap(),
        gt
    );
    assert_eq!(math::where_(&gt, &a, &b).unwrap(), arr1(&[2.0, 5.0, 3.0]));
}

#[test]
fn stack_and_concat() {
    let a = arr1(&[1.0, 2.0]).into_dyn();
    let b = arr1(&[3.0, 4.0]).into_dyn();
    let views = [a.view(), b.view()];

    let stacked = math::stack(&views, 0).unwrap();
    assert_eq!(stacked.shape(), &[2, 2]);
    let stacked = math::stack(&views, 1).unwrap();
    assert_eq!(stacked, arr2(&[[1.0, 3.0], [2.0, 4.0]]).into_dyn());

    let joined = math::concat(&views, 0).unwrap();
    assert_eq!(joined, arr1(&[1.0, 2.0, 3.0, 4.0]).into_dyn());

    assert!(matches!(math::stack(&views, 2), Err(Error::InvalidAxis { .. })));
    assert!(matches!(math::concat(&views, 1), Err(Error::InvalidAxis { .. })));
    assert!(matches!(
        math::concat::<f64>(&[], 0),
        Err(Error::EmptyInput(_))
    ));
}

#[test]
fn stack_shape_mismatch_comes_from_ndarray() {
    let a = arr1(&[1.0, 2.0]).into_dyn();
    let b = arr1(&[3.0]).into_dyn();
    assert!(matches!(
        math::stack(&[a.view(), b.view()], 0),
        Err(Error::Shape(_))
    ));
}

#[test]
fn complex_helpers() {
    let z = math::complex(&arr1(&[1.0, -2.0]), &arr1(&[0.5, 3.0])).unwrap();
    assert_eq!(z[1], Complex64::new(-2.0, 3.0));
    let zc = math::conjugate(&z);
    assert_eq!(math::real(&zc), arr1(&[1.0, -2.0]));
    assert_eq!(math::imaginary(&zc), arr1(&[-0.5, -3.0]));
}

#[test]
fn facade_is_differentiable() {
    // d/dx sum(exp(x_i) * x_i) = exp(x_i) (1 + x_i)
    let (_, g) = tape::record(&[0.5_f64, -1.0], |v| {
        let x = Array1::from_vec(v.to_vec());
        let y = &math::exp(&x) * &x;
        Ok::<_, Infallible>(y.sum())
    })
    .unwrap();
    for (gi, xi) in g.iter().zip([0.5_f64, -1.0]) {
        assert_relative_eq!(*gi, xi.exp() * (1.0 + xi), max_relative = 1e-12);
    }
}

#[test]
fn reduce_max_routes_gradient_to_winner() {
    let (value, g) = tape::record(&[1.0_f64, 7.0, 3.0], |v| {
        let x = Array1::from_vec(v.to_vec()).into_dyn();
        let m = math::reduce_max(&x, None).expect("non-empty");
        Ok::<_, Infallible>(m.iter().copied().fold(Reverse::constant(0.0), |a, b| a + b))
    })
    .unwrap();
    assert_eq!(value, 7.0);
    assert_eq!(g, vec![0.0, 1.0, 0.0]);
}

#[test]
fn scalar_trait_value_of_primitive() {
    assert_eq!(Scalar::value(&2.5_f64), 2.5);
    assert_eq!(<f32 as Scalar>::from_f(1.5), 1.5_f32);
}
