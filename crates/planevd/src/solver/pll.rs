//! Point-line-line.

use super::{nonnegative, Line, Roots, V2};
use crate::numeric::{quadratic_roots, Scalar};
use crate::point::Point;
use crate::site::LineSite;

/// Vertices equidistant from `p`, `l1` and `l2`.
///
/// For non-parallel lines the line-line bisector is `q = Q0 + t·Q1` and `|q − p| = t`
/// becomes a quadratic in `t`. Parallel lines facing each other fix `t` at half their
/// separation, leaving a circle-line intersection.
pub fn solve<S: Scalar>(p: &Point, l1: &LineSite, l2: &LineSite) -> Roots {
    let p = V2::<S>::lift(p);
    let a = Line::<S>::lift(l1);
    let b = Line::<S>::lift(l2);
    let det = a.n.x * b.n.y - a.n.y * b.n.x;
    if det.abs() < S::from_f64(1e-12) {
        return parallel(p, a, b);
    }
    let solve2 = |r1: S, r2: S| {
        V2::new(
            (b.n.y * r1 - a.n.y * r2) / det,
            (-b.n.x * r1 + a.n.x * r2) / det,
        )
    };
    let q0 = solve2(-a.c, -b.c);
    let q1 = solve2(S::one(), S::one());
    let d = q0 - p;
    let two = S::from_f64(2.0);
    let roots = quadratic_roots(q1.norm2() - S::one(), two * d.dot(q1), d.norm2());
    nonnegative(roots.into_iter().map(|t| (q0 + q1 * t, t)))
}

fn parallel<S: Scalar>(p: V2<S>, a: Line<S>, b: Line<S>) -> Roots {
    // same-facing parallels have no equidistant point at positive clearance
    if a.n.dot(b.n) > S::zero() {
        return Vec::new();
    }
    let t = (a.c + b.c) * S::from_f64(0.5);
    // q on n_a·q + c_a = t, |q − p| = t
    let off = t - a.eval(p);
    let foot = p + a.n * off;
    let r2 = t * t - off * off;
    let r2 = crate::numeric::chop(r2, crate::numeric::CHOP_TOL);
    if r2 < S::zero() {
        return Vec::new();
    }
    let u = a.n.rot90();
    let r = r2.sqrt();
    nonnegative([(foot + u * r, t), (foot - u * r, t)])
}
