//! Point-point-line: intersect the point-point bisector with the parabola of the line.

use super::{nonnegative, Line, Roots, V2};
use crate::numeric::{quadratic_roots, Scalar};
use crate::point::Point;
use crate::site::LineSite;

/// Vertices on the bisector of `a`, `b` at equal distance from `l`.
///
/// With `q = M + s·w` on the bisector (`M` midpoint, `w` unit perpendicular, `h` half
/// length), `|q − a| = √(h² + s²)` and `dist(q, l) = α + β·s`. Squaring gives
/// `(β² − 1)s² + 2αβ·s + α² − h² = 0`; roots with `α + β·s < 0` lie on the wrong side.
pub fn solve<S: Scalar>(a: &Point, b: &Point, l: &LineSite) -> Roots {
    let pa = V2::<S>::lift(a);
    let pb = V2::<S>::lift(b);
    let line = Line::<S>::lift(l);
    let half = S::from_f64(0.5);
    let m = (pa + pb) * half;
    let d = pb - pa;
    let len = d.norm2().sqrt();
    if len == S::zero() {
        return Vec::new();
    }
    let w = d.rot90() * (S::one() / len);
    let h = len * half;
    let alpha = line.eval(m);
    let beta = line.n.dot(w);
    let two = S::from_f64(2.0);
    let roots = quadratic_roots(
        beta * beta - S::one(),
        two * alpha * beta,
        alpha * alpha - h * h,
    );
    nonnegative(roots.into_iter().map(|s| (m + w * s, alpha + beta * s)))
}
