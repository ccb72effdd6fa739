use super::*;
use crate::cfg::VdCfg;
use crate::diagram::Bisector;
use crate::graph::EdgeId;
use crate::numeric::Dd;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn assert_equidistant(sites: [&Site; 3], roots: &Roots) {
    assert!(!roots.is_empty(), "expected at least one root");
    for (p, t) in roots {
        for s in sites {
            let d = s.distance(p);
            assert!((d - t).abs() < 1e-9, "site {s:?}: distance {d} vs clearance {t}");
        }
    }
}

#[test]
fn ppp_circumcenter_any_order() {
    let a = Site::point(pt(0.0, 0.0));
    let b = Site::point(pt(4.0, 0.0));
    let c = Site::point(pt(0.0, 3.0));
    for (x, y, z) in [(&a, &b, &c), (&b, &a, &c), (&c, &b, &a)] {
        let r = solve::<f64>(x, y, z).unwrap();
        assert_eq!(r.len(), 1);
        assert!((r[0].0 - pt(2.0, 1.5)).norm() < 1e-12);
        assert!((r[0].1 - 2.5).abs() < 1e-12);
    }
}

#[test]
fn ppp_collinear_is_degenerate() {
    let a = Site::point(pt(0.0, 0.0));
    let b = Site::point(pt(1.0, 1.0));
    let c = Site::point(pt(2.0, 2.0));
    assert_eq!(solve::<f64>(&a, &b, &c), Err(NumericError::Degenerate));
    assert_eq!(solve::<Dd>(&a, &b, &c), Err(NumericError::Degenerate));
}

#[test]
fn ppp_near_collinear_never_returns_bad_vertex() {
    // Thin triangle: either a correct circumcenter or an explicit degeneracy report.
    let a = Site::point(pt(-1.0, 0.0));
    let b = Site::point(pt(1.0, 0.0));
    for eps in [1e-3, 1e-6, 1e-9, 1e-12, 1e-15] {
        let c = Site::point(pt(0.1, eps));
        for res in [solve::<f64>(&a, &b, &c), solve::<Dd>(&a, &b, &c)] {
            match res {
                Ok(roots) => {
                    for (p, t) in &roots {
                        let tol = 1e-7 * t.max(1.0);
                        for s in [&a, &b, &c] {
                            assert!((s.distance(p) - t).abs() <= tol, "eps {eps}: bad vertex {p:?}");
                        }
                    }
                }
                Err(e) => assert_eq!(e, NumericError::Degenerate),
            }
        }
    }
}

#[test]
fn ppl_two_roots() {
    let a = Site::point(pt(-1.0, 1.0));
    let b = Site::point(pt(1.0, 1.0));
    let l = Site::line(pt(-5.0, 0.0), pt(5.0, 0.0), 1.0);
    let r = solve::<f64>(&a, &b, &l).unwrap();
    // bisector x = 0: q = (0, y), √(1 + (y−1)²) = y → y = 1
    assert_eq!(r.len(), 1);
    assert!((r[0].0 - pt(0.0, 1.0)).norm() < 1e-12);

    let a = Site::point(pt(0.0, 1.0));
    let b = Site::point(pt(0.0, 3.0));
    let r = solve::<f64>(&a, &b, &l).unwrap();
    assert_eq!(r.len(), 2);
    assert_equidistant([&a, &b, &l], &r);
    let r_dd = solve::<Dd>(&a, &b, &l).unwrap();
    assert_eq!(r_dd.len(), 2);
}

#[test]
fn pll_corner_and_parallel() {
    // lines x-axis (up) and y-axis (right): bisector y = x
    let l1 = Site::line(pt(0.0, 0.0), pt(10.0, 0.0), 1.0);
    let l2 = Site::line(pt(0.0, 10.0), pt(0.0, 0.0), 1.0);
    let p = Site::point(pt(3.0, 1.0));
    let r = solve::<f64>(&p, &l1, &l2).unwrap();
    assert_equidistant([&p, &l1, &l2], &r);

    // facing parallels y = 0 (up) and y = 4 (down), point at (0, 3)
    let bottom = Site::line(pt(-10.0, 0.0), pt(10.0, 0.0), 1.0);
    let top = Site::line(pt(10.0, 4.0), pt(-10.0, 4.0), 1.0);
    let q = Site::point(pt(0.0, 3.0));
    let r = solve::<f64>(&q, &bottom, &top).unwrap();
    assert_eq!(r.len(), 2);
    assert_equidistant([&q, &bottom, &top], &r);
    for (p, t) in &r {
        assert!((t - 2.0).abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
    }
}

#[test]
fn lll_incenter_and_capped_channel() {
    // right triangle (0,0), (4,0), (0,3): incircle radius 1 at (1, 1)
    let l1 = Site::line(pt(0.0, 0.0), pt(4.0, 0.0), 1.0);
    let l2 = Site::line(pt(4.0, 0.0), pt(0.0, 3.0), 1.0);
    let l3 = Site::line(pt(0.0, 3.0), pt(0.0, 0.0), 1.0);
    let r = solve::<f64>(&l1, &l2, &l3).unwrap();
    assert_eq!(r.len(), 1);
    assert!((r[0].0 - pt(1.0, 1.0)).norm() < 1e-12);
    assert!((r[0].1 - 1.0).abs() < 1e-12);

    // channel between y = 0 and y = 2, capped by x = 5 from the right
    let top = Site::line(pt(10.0, 2.0), pt(-10.0, 2.0), 1.0);
    let cap = Site::line(pt(5.0, 0.0), pt(5.0, 2.0), 1.0);
    let r = solve::<f64>(&l1, &top, &cap).unwrap();
    assert_eq!(r.len(), 1);
    assert!((r[0].0 - pt(4.0, 1.0)).norm() < 1e-12);
}

#[test]
fn separator_roots() {
    let l = Site::line(pt(0.0, 0.0), pt(4.0, 0.0), 1.0);
    let e = Site::point(pt(0.0, 0.0));
    let q = Site::point(pt(-2.0, 2.0));
    let r = solve::<f64>(&e, &l, &q).unwrap();
    // (0, ρ) with 4 + (ρ − 2)² = ρ² → ρ = 2
    assert_eq!(r, vec![(pt(0.0, 2.0), 2.0)]);

    let other = Site::line(pt(-1.0, 5.0), pt(3.0, 5.0), -1.0);
    let r = solve::<f64>(&l, &other, &e).unwrap();
    assert!((r[0].0 - pt(0.0, 2.5)).norm() < 1e-12);

    let shared = Site::line(pt(0.0, 0.0), pt(0.0, -3.0), 1.0);
    assert!(solve::<f64>(&e, &l, &shared).unwrap().is_empty());
}

#[test]
fn positioner_picks_root_on_edge() {
    let a = Site::point(pt(0.0, 1.0));
    let b = Site::point(pt(0.0, 3.0));
    let l = Site::line(pt(-5.0, 0.0), pt(5.0, 0.0), 1.0);
    let (_, geom) = Bisector::between(&a, &b);
    let src = pt(0.0, 2.0);
    let trg = pt(3.0, 2.0);
    let geom = geom.oriented(&src, &trg);
    let span = EdgeSpan {
        id: EdgeId(7),
        s1: &a,
        s2: &b,
        src,
        src_dist: (src - a.as_point().unwrap()).norm(),
        trg,
        trg_dist: (trg - a.as_point().unwrap()).norm(),
        geom,
    };
    let sol = position(&span, &[&l], &VdCfg::default()).unwrap();
    // y = 2 meets the parabola of l at x = ±√3; only +√3 lies on this edge
    assert!((sol.p - pt(3f64.sqrt(), 2.0)).norm() < 1e-9, "picked {sol:?}");
    for s in [&a, &b, &l] {
        assert!((s.distance(&sol.p) - sol.t).abs() < 1e-9);
    }
    assert_eq!(sol.k3, 1.0);
}

#[test]
fn positioner_reports_missing_solution() {
    let a = Site::point(pt(-1.0, 0.0));
    let b = Site::point(pt(1.0, 0.0));
    let c = Site::point(pt(0.0, 10.0));
    let (_, geom) = Bisector::between(&a, &b);
    let src = pt(0.0, -1.0);
    let trg = pt(0.0, -2.0);
    let span = EdgeSpan {
        id: EdgeId(3),
        s1: &a,
        s2: &b,
        src,
        src_dist: 2f64.sqrt(),
        trg,
        trg_dist: 5f64.sqrt(),
        geom: geom.oriented(&src, &trg),
    };
    assert_eq!(
        position(&span, &[&c], &VdCfg::default()),
        Err(NumericError::NoSolution { edge: EdgeId(3) })
    );
}
