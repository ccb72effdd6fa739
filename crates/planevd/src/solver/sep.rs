//! Separator solver: vertices on the perpendicular from a segment endpoint.

use super::{nonnegative, Line, Roots, V2};
use crate::numeric::Scalar;
use crate::point::Point;
use crate::site::{LineSite, Site};

/// Points `p + ρ·m` (with `m` the side normal of `l`, `p` its endpoint) at distance `ρ`
/// from `other` as well.
pub fn solve<S: Scalar>(p: &Point, l: &LineSite, other: &Site) -> Roots {
    let pe = V2::<S>::lift(p);
    let m = V2::<S>::lift(&l.side_normal());
    let rho = match other {
        Site::Point(q) => {
            // |p + ρm − q|² = ρ²
            let d = V2::<S>::lift(&q.p) - pe;
            let den = S::from_f64(2.0) * m.dot(d);
            if den <= S::zero() {
                return Vec::new();
            }
            d.norm2() / den
        }
        Site::Line(l3) => {
            if l3.has_endpoint(p) {
                return Vec::new();
            }
            // n3·(p + ρm) + c3 = ρ
            let line = Line::<S>::lift(l3);
            let den = S::one() - line.n.dot(m);
            if den.abs() < S::from_f64(1e-14) {
                return Vec::new();
            }
            line.eval(pe) / den
        }
    };
    nonnegative([(pe + m * rho, rho)])
}
