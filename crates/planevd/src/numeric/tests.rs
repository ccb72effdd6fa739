use super::*;
use proptest::prelude::*;

#[test]
fn accumulator_survives_cancellation() {
    let acc = Accumulator::from_terms(&[1e16, 1.0, -1e16]);
    assert_eq!(acc.sum(), 1.0);
    // naive left-to-right summation loses the small term
    assert_eq!(1e16 + 1.0 - 1e16, 0.0);
}

#[test]
fn accumulator_algebra() {
    let a = Accumulator::from_terms(&[1.0, 2.0]);
    let b = Accumulator::from_terms(&[3.0, -1.0]);
    assert_eq!((a.clone() * b.clone()).sum(), 6.0);
    assert_eq!((a.clone() - b.clone()).sum(), 1.0);
    assert_eq!((a.clone() * 2.0).sum(), 6.0);
    assert_eq!((-b).sum(), -2.0);
    assert_eq!(Accumulator::<f64>::new().sum(), 0.0);
    assert_eq!(Accumulator::from_terms(&[0.0, 0.0]).len(), 0);
    assert_eq!(a.positive_sum(), 3.0);
}

#[test]
fn quadratic_roots_cases() {
    // (x-1)(x-3)
    let mut r = quadratic_roots(1.0, -4.0, 3.0);
    r.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert!((r[0] - 1.0).abs() < 1e-14 && (r[1] - 3.0).abs() < 1e-14);
    // linear
    assert_eq!(quadratic_roots(0.0, 2.0, -4.0), vec![2.0]);
    // pure square
    let r = quadratic_roots(1.0, 0.0, -4.0);
    assert_eq!(r.len(), 2);
    assert!(r.contains(&2.0) && r.contains(&-2.0));
    assert!(quadratic_roots(1.0, 0.0, 4.0).is_empty());
    // double root after chopping
    assert_eq!(quadratic_roots(1.0, -2.0, 1.0), vec![1.0]);
    assert!(quadratic_roots(0.0, 0.0, 1.0).is_empty());
    assert!(quadratic_roots(1.0, 1.0, 1.0).is_empty());
}

#[test]
fn quadratic_roots_in_double_double() {
    let r = quadratic_roots(Dd::new(2.0), Dd::new(-6.0), Dd::new(4.0));
    let mut v: Vec<f64> = r.into_iter().map(Scalar::to_f64).collect();
    v.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert!((v[0] - 1.0).abs() < 1e-28 && (v[1] - 2.0).abs() < 1e-28);
}

#[test]
fn chop_and_determinant() {
    assert_eq!(chop(1e-12, CHOP_TOL), 0.0);
    assert_eq!(chop(-3.0, CHOP_TOL), -3.0);
    let d = determinant(2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 4.0);
    assert_eq!(d, 24.0);
    let d = determinant(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
    assert!(d.abs() < 1e-12);
}

#[test]
fn double_double_keeps_low_bits() {
    let big = Dd::new(1e16);
    let x = (big + Dd::new(1.0)) - big;
    assert_eq!(x.to_f64(), 1.0);
    let third = Dd::ONE / Dd::new(3.0);
    let back = third * Dd::new(3.0) - Dd::ONE;
    assert!(back.to_f64().abs() < 1e-30);
    let r = Dd::new(2.0).sqrt();
    let err = r * r - Dd::new(2.0);
    assert!(err.to_f64().abs() < 1e-30);
    assert!(Dd::new(-1.0) < Dd::new(0.5));
    assert_eq!(Dd::new(-2.5).abs().to_f64(), 2.5);
}

#[test]
fn diangle_axes_and_inverse() {
    assert_eq!(diangle(1.0, 0.0), 0.0);
    assert_eq!(diangle(0.0, 1.0), 1.0);
    assert_eq!(diangle(-1.0, 0.0), 2.0);
    assert_eq!(diangle(0.0, -1.0), 3.0);
    for k in 0..16 {
        let th = k as f64 * std::f64::consts::PI / 8.0 + 0.01;
        let a = diangle(th.cos(), th.sin());
        let (x, y) = diangle_xy(a);
        assert!((x - th.cos()).abs() < 1e-12, "x at {th}");
        assert!((y - th.sin()).abs() < 1e-12, "y at {th}");
    }
}

#[test]
fn diangle_bracket_and_mid_wrap() {
    assert!(diangle_bracket(1.0, 1.5, 2.0));
    assert!(!diangle_bracket(1.0, 2.5, 2.0));
    // wrapping range [3.5, 0.5)
    assert!(diangle_bracket(3.5, 3.9, 0.5));
    assert!(diangle_bracket(3.5, 0.2, 0.5));
    assert!(!diangle_bracket(3.5, 1.0, 0.5));
    assert!(!diangle_bracket(1.0, 1.0, 1.0));
    assert_eq!(diangle_mid(1.0, 2.0), 1.5);
    assert!((diangle_mid(3.5, 0.5) - 0.0).abs() < 1e-15);
    assert!((diangle_mid(3.0, 0.0) - 3.5).abs() < 1e-15);
}

proptest! {
    #[test]
    fn diangle_is_monotone(t1 in 0.0f64..6.28, t2 in 0.0f64..6.28) {
        let a1 = diangle(t1.cos(), t1.sin());
        let a2 = diangle(t2.cos(), t2.sin());
        prop_assert!((0.0..4.0).contains(&a1));
        if t1 + 1e-9 < t2 {
            prop_assert!(a1 <= a2);
        }
    }

    #[test]
    fn accumulator_recovers_hidden_term(big in 1e10f64..1e16, small in -100i32..100) {
        let s = small as f64;
        let acc = Accumulator::from_terms(&[big, s, -big]);
        prop_assert_eq!(acc.sum(), s);
    }

    #[test]
    fn accumulator_matches_naive_without_cancellation(xs in proptest::collection::vec(0i32..1000, 0..20)) {
        let terms: Vec<f64> = xs.iter().map(|&x| x as f64).collect();
        let naive: f64 = terms.iter().sum();
        prop_assert_eq!(Accumulator::from_terms(&terms).sum(), naive);
    }
}
