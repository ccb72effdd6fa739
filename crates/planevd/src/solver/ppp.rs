//! Point-point-point: the circumcenter.

use super::{nonnegative, Roots, V2};
use crate::error::NumericError;
use crate::numeric::{Accumulator, Scalar};
use crate::point::{Point, PointExt};

/// Circumcenter of `a`, `b`, `c`.
///
/// The triangle is first made counter-clockwise and rotated so that `pi → pj` is the
/// longest side (the circumcenter is then computed relative to the opposite vertex `pk`).
/// The determinant and both numerators are summed with [`Accumulator`]s.
pub fn solve<S: Scalar>(a: &Point, b: &Point, c: &Point) -> Result<Roots, NumericError> {
    let (mut pi, mut pj, mut pk) = (*a, *b, *c);
    if pi.is_right(&pj, &pk) {
        std::mem::swap(&mut pi, &mut pj);
    }
    for _ in 0..2 {
        let lij = (pi - pj).norm_squared();
        if (pj - pk).norm_squared() > lij || (pk - pi).norm_squared() > lij {
            (pi, pj, pk) = (pk, pi, pj);
        }
    }
    let (xi, yi) = (S::from_f64(pi.x), S::from_f64(pi.y));
    let (xj, yj) = (S::from_f64(pj.x), S::from_f64(pj.y));
    let (xk, yk) = (S::from_f64(pk.x), S::from_f64(pk.y));
    let ac = |u: S, v: S| Accumulator::from_terms(&[u, -v]);

    let j4 = (ac(xi, xk) * ac(yj, yk) - ac(xj, xk) * ac(yi, yk)).sum();
    let sq = |x: S, y: S| {
        let dx = ac(x, xk);
        let dy = ac(y, yk);
        (dx.clone() * dx + dy.clone() * dy).sum()
    };
    let sq_i = sq(xi, yi);
    let sq_j = sq(xj, yj);
    let scale = if sq_i > sq_j { sq_i } else { sq_j };
    if j4.abs() <= S::from_f64(S::DEGENERATE_REL) * scale {
        return Err(NumericError::Degenerate);
    }
    let half = S::from_f64(0.5) / j4;

    let x = (ac(yj, yk) * (half * sq_i) - ac(yi, yk) * (half * sq_j)).sum() + xk;
    let y = (ac(xi, xk) * (half * sq_j) - ac(xj, xk) * (half * sq_i)).sum() + yk;
    let q = V2::new(x, y);
    let t = (q - V2::lift(&pi)).norm2().sqrt();
    Ok(nonnegative([(q, t)]))
}
