//! Line-line-line.

use super::{nonnegative, Line, Roots, V2};
use crate::error::NumericError;
use crate::numeric::{determinant, Scalar};
use crate::site::LineSite;

/// Solve `n_i·q − t = −c_i` for `(q, t)` by Cramer's rule. When the system is singular a
/// pair of opposite parallel lines fixes `t`, and the third line fixes `q`.
pub fn solve<S: Scalar>(l1: &LineSite, l2: &LineSite, l3: &LineSite) -> Result<Roots, NumericError> {
    let ls = [Line::<S>::lift(l1), Line::<S>::lift(l2), Line::<S>::lift(l3)];
    let m1 = -S::one();
    let [a, b, c] = ls;
    let det = determinant(
        a.n.x, a.n.y, m1, //
        b.n.x, b.n.y, m1, //
        c.n.x, c.n.y, m1,
    );
    if det.abs() > S::from_f64(S::DEGENERATE_REL) {
        let (ra, rb, rc) = (-a.c, -b.c, -c.c);
        let x = determinant(ra, a.n.y, m1, rb, b.n.y, m1, rc, c.n.y, m1) / det;
        let y = determinant(a.n.x, ra, m1, b.n.x, rb, m1, c.n.x, rc, m1) / det;
        let t = determinant(a.n.x, a.n.y, ra, b.n.x, b.n.y, rb, c.n.x, c.n.y, rc) / det;
        return Ok(nonnegative([(V2::new(x, y), t)]));
    }
    for (i, j, k) in [(0, 1, 2), (0, 2, 1), (1, 2, 0)] {
        if let Some(root) = parallel_pair(ls[i], ls[j], ls[k]) {
            return Ok(nonnegative([root]));
        }
    }
    Err(NumericError::Degenerate)
}

fn parallel_pair<S: Scalar>(a: Line<S>, b: Line<S>, c: Line<S>) -> Option<(V2<S>, S)> {
    let tol = S::from_f64(1e-12);
    let cross = |u: V2<S>, v: V2<S>| u.x * v.y - u.y * v.x;
    if cross(a.n, b.n).abs() > tol || a.n.dot(b.n) > S::zero() {
        return None;
    }
    let det = cross(a.n, c.n);
    if det.abs() <= tol {
        return None;
    }
    let t = (a.c + b.c) * S::from_f64(0.5);
    let (r1, r2) = (t - a.c, t - c.c);
    let q = V2::new(
        (c.n.y * r1 - a.n.y * r2) / det,
        (-c.n.x * r1 + a.n.x * r2) / det,
    );
    Some((q, t))
}
