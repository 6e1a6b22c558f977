use ampgrad::{FitParameter, Variable};

fn par() -> FitParameter<f64> {
    FitParameter::new("mass", 1.0, 0.5, 1.5)
}

// ── floating() ──

#[test]
fn floating_requires_positive_step_and_not_fixed() {
    let cases = [
        (0.1, false, true),
        (0.1, true, false),
        (0.0, false, false),
        (0.0, true, false),
    ];
    for (step, fixed, expected) in cases {
        let mut p = par().with_step_size(step);
        p.set_fixed(fixed);
        assert_eq!(p.floating(), expected, "step {step}, fixed {fixed}");
    }
}

#[test]
fn default_step_size_floats() {
    let p = par();
    assert_eq!(p.step_size(), 1e-6);
    assert!(p.floating());
}

#[test]
fn fix_and_float_toggle() {
    let mut p = par();
    p.fix();
    assert!(p.is_fixed());
    assert!(!p.floating());
    p.fix();
    assert!(p.is_fixed());
    p.float();
    assert!(!p.is_fixed());
    assert!(p.floating());
}

#[test]
fn negative_step_size_is_not_floating() {
    let mut p = par();
    p.set_step_size(-0.1);
    assert!(!p.floating());
}

// ── update() ──

#[test]
fn update_writes_once_for_repeated_value() {
    let mut p = par();
    assert_eq!(p.prev_value(), None);
    assert!(p.update(1.2));
    assert!(!p.update(1.2));
    assert_eq!(p.var().writes(), 1);
    assert_eq!(p.prev_value(), Some(1.2));
    assert_eq!(p.value(), 1.2);
}

#[test]
fn update_writes_each_new_value() {
    let mut p = par();
    for v in [1.1, 1.2, 1.1] {
        assert!(p.update(v));
    }
    assert_eq!(p.var().writes(), 3);
    assert_eq!(p.value(), 1.1);
}

#[test]
fn first_update_writes_even_the_initial_value() {
    let mut p = par();
    assert!(p.update(1.0));
    assert_eq!(p.var().writes(), 1);
}

#[test]
fn update_does_not_enforce_limits() {
    let mut p = par();
    p.update(100.0);
    assert_eq!(p.value(), 100.0);
    assert_eq!(p.upper_limit(), 1.5);
}

#[test]
fn nan_is_always_written() {
    let mut p = par();
    p.update(f64::NAN);
    p.update(f64::NAN);
    assert_eq!(p.var().writes(), 2);
    assert!(p.value().is_nan());
}

#[test]
fn fixing_keeps_the_cell() {
    let mut p = par();
    p.update(1.3);
    p.fix();
    assert_eq!(p.value(), 1.3);
}

#[test]
fn reset_restores_init_value() {
    let mut p = par();
    p.update(1.4);
    assert!(p.reset());
    assert_eq!(p.value(), 1.0);
    assert!(!p.reset());
}

// ── metadata ──

#[test]
fn construction_records_metadata() {
    let p = par();
    assert_eq!(p.name(), "mass");
    assert_eq!(p.init_value(), 1.0);
    assert_eq!(p.lower_limit(), 0.5);
    assert_eq!(p.upper_limit(), 1.5);
    assert_eq!(p.fitted_value, 1.0);
    assert_eq!(p.error, 0.0);
    assert_eq!(p.value(), 1.0);
    assert_eq!(p.var().writes(), 0);
}

#[test]
fn fit_results_leave_cell_alone() {
    let mut p = par();
    p.set_fit_result(1.25, 0.01);
    p.set_asymmetric_errors(-0.02, 0.03);
    assert_eq!(p.fitted_value, 1.25);
    assert_eq!(p.error, 0.01);
    assert_eq!(p.negative_error, -0.02);
    assert_eq!(p.positive_error, 0.03);
    assert_eq!(p.value(), 1.0);
}

#[test]
fn variable_counts_writes() {
    let mut v = Variable::new(0.0_f32);
    v.assign(1.0);
    v.assign(1.0);
    assert_eq!(v.read(), 1.0);
    assert_eq!(v.writes(), 2);
}
