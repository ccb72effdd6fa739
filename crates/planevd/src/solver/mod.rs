//! Vertex solvers: points equidistant from three sites.
//!
//! Purpose
//! - Closed-form solvers per site-type triple (`ppp`, `ppl`, `pll`, `lll`) and the
//!   endpoint-separator solver (`sep`), all generic over [`Scalar`] so the positioner can
//!   repeat a failed solve in [`Dd`](crate::numeric::Dd) without touching the algebra.
//! - Every solver returns all candidate `(position, clearance)` pairs with non-negative
//!   clearance; choosing among them is the positioner's job.
//!
//! Line sites enter through their side normal `n` and offset `c` (`k` already applied), so
//! the signed distance is `n·q + c` and only the site's own side is solved for.
//!
//! References
//! - Code cross-refs: `positioner::position`, `diagram::edge::Bisector`

mod lll;
mod pll;
mod positioner;
mod ppl;
mod ppp;
mod sep;
#[cfg(test)]
mod tests;

pub use positioner::{position, EdgeSpan, Solution};

use crate::error::NumericError;
use crate::numeric::Scalar;
use crate::point::Point;
use crate::site::{LineSite, Site};
use std::ops::{Add, Mul, Sub};

/// Candidate vertex positions with their clearance.
pub type Roots = Vec<(Point, f64)>;

/// Minimal 2-vector over a generic scalar.
#[derive(Clone, Copy, Debug)]
pub(crate) struct V2<S> {
    pub x: S,
    pub y: S,
}

impl<S: Scalar> V2<S> {
    #[inline]
    pub fn new(x: S, y: S) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn lift(p: &Point) -> Self {
        Self::new(S::from_f64(p.x), S::from_f64(p.y))
    }

    #[inline]
    pub fn lower(self) -> Point {
        Point::new(self.x.to_f64(), self.y.to_f64())
    }

    #[inline]
    pub fn dot(self, o: Self) -> S {
        self.x * o.x + self.y * o.y
    }

    #[inline]
    pub fn norm2(self) -> S {
        self.dot(self)
    }

    #[inline]
    pub fn rot90(self) -> Self {
        Self::new(-self.y, self.x)
    }
}

impl<S: Scalar> Add for V2<S> {
    type Output = Self;
    fn add(self, o: Self) -> Self {
        V2::new(self.x + o.x, self.y + o.y)
    }
}

impl<S: Scalar> Sub for V2<S> {
    type Output = Self;
    fn sub(self, o: Self) -> Self {
        V2::new(self.x - o.x, self.y - o.y)
    }
}

impl<S: Scalar> Mul<S> for V2<S> {
    type Output = Self;
    fn mul(self, k: S) -> Self {
        V2::new(self.x * k, self.y * k)
    }
}

/// A line site as `n·q + c = signed distance`, lifted to `S`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Line<S> {
    pub n: V2<S>,
    pub c: S,
}

impl<S: Scalar> Line<S> {
    pub fn lift(l: &LineSite) -> Self {
        let n = l.side_normal();
        Self {
            n: V2::lift(&n),
            c: S::from_f64(l.k * l.c),
        }
    }

    #[inline]
    pub fn eval(&self, q: V2<S>) -> S {
        self.n.dot(q) + self.c
    }
}

/// Solve for vertices equidistant from `s1`, `s2`, `s3`.
///
/// A (point, line) pair where the point is an endpoint of the line routes to the separator
/// solver with the remaining site; otherwise the triple is dispatched by its point count.
pub fn solve<S: Scalar>(s1: &Site, s2: &Site, s3: &Site) -> Result<Roots, NumericError> {
    let sites = [s1, s2, s3];
    for i in 0..3 {
        for j in 0..3 {
            if i == j {
                continue;
            }
            if let (Site::Point(p), Site::Line(l)) = (sites[i], sites[j]) {
                if l.has_endpoint(&p.p) {
                    let other = sites[3 - i - j];
                    return Ok(sep::solve::<S>(&p.p, l, other));
                }
            }
        }
    }
    let mut points = Vec::with_capacity(3);
    let mut lines = Vec::with_capacity(3);
    for s in sites {
        match s {
            Site::Point(p) => points.push(p.p),
            Site::Line(l) => lines.push(*l),
        }
    }
    match (points.as_slice(), lines.as_slice()) {
        ([a, b, c], []) => ppp::solve::<S>(a, b, c),
        ([a, b], [l]) => Ok(ppl::solve::<S>(a, b, l)),
        ([p], [l1, l2]) => Ok(pll::solve::<S>(p, l1, l2)),
        ([], [l1, l2, l3]) => lll::solve::<S>(l1, l2, l3),
        _ => Err(NumericError::Degenerate),
    }
}

/// Keep candidates with `t ≥ -tol`, clamping tiny negatives to zero.
pub(crate) fn nonnegative<S: Scalar>(cands: impl IntoIterator<Item = (V2<S>, S)>) -> Roots {
    let tol = 1e-14;
    cands
        .into_iter()
        .filter_map(|(q, t)| {
            let t = t.to_f64();
            let q = q.lower();
            if !(t.is_finite() && q.x.is_finite() && q.y.is_finite()) || t < -tol {
                None
            } else {
                Some((q, t.max(0.0)))
            }
        })
        .collect()
}
