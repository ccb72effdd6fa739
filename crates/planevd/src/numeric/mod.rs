//! Numeric core: scalar abstraction, chopping, quadratic roots, and pseudo-angles.
//!
//! Purpose
//! - Keep the geometric predicates reliable near degeneracies. Every solver is generic over
//!   [`Scalar`], so the positioner can retry a failed double-precision solve in [`Dd`]
//!   without changing the algebra.
//! - Provide the "diangle" pseudo-angle: a monotone, trig-free surrogate for `atan2` on
//!   `[0, 4)`, used to order directions around segment endpoints.
//!
//! References
//! - Code cross-refs: `Accumulator`, `Dd`, `solver::ppp`, `diagram::null`

mod accum;
mod dd;

pub use accum::Accumulator;
pub use dd::Dd;

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Default absolute tolerance for [`chop`].
pub const CHOP_TOL: f64 = 1e-10;

/// Field-like scalar used by the solvers (`f64` or [`Dd`]).
pub trait Scalar:
    Copy
    + Debug
    + PartialOrd
    + num_traits::Zero
    + num_traits::One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Relative magnitude below which a controlling determinant counts as zero.
    const DEGENERATE_REL: f64;

    fn from_f64(x: f64) -> Self;
    fn to_f64(self) -> f64;
    fn sqrt(self) -> Self;
    fn abs(self) -> Self;
}

impl Scalar for f64 {
    const DEGENERATE_REL: f64 = 1e-13;

    #[inline]
    fn from_f64(x: f64) -> Self {
        x
    }
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
    #[inline]
    fn abs(self) -> Self {
        f64::abs(self)
    }
}

/// Zero out `val` when `|val| < tol`.
#[inline]
pub fn chop<S: Scalar>(val: S, tol: f64) -> S {
    if val.abs() < S::from_f64(tol) {
        S::zero()
    } else {
        val
    }
}

/// Real roots of `a x² + b x + c = 0`.
///
/// Handles the linear (`a == 0`) and pure-square (`b == 0`) cases separately. The
/// discriminant is chopped to zero below [`CHOP_TOL`] so touching roots collapse into one.
/// Uses the cancellation-free `q = -(b ± √disc)/2` form.
pub fn quadratic_roots<S: Scalar>(a: S, b: S, c: S) -> Vec<S> {
    let zero = S::zero();
    let two = S::from_f64(2.0);
    if a == zero && b == zero {
        return Vec::new();
    }
    if a == zero {
        return vec![-c / b];
    }
    if b == zero {
        let sqr = -c / a;
        return if sqr > zero {
            let r = sqr.sqrt();
            vec![r, -r]
        } else if sqr == zero {
            vec![zero]
        } else {
            Vec::new()
        };
    }
    let disc = chop(b * b - S::from_f64(4.0) * a * c, CHOP_TOL);
    if disc > zero {
        let q = if b > zero {
            -(b + disc.sqrt()) / two
        } else {
            -(b - disc.sqrt()) / two
        };
        vec![q / a, c / q]
    } else if disc == zero {
        vec![-b / (two * a)]
    } else {
        Vec::new()
    }
}

/// 3×3 determinant, row-major.
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn determinant<S: Scalar>(a: S, b: S, c: S, d: S, e: S, f: S, g: S, h: S, i: S) -> S {
    a * (e * i - h * f) - b * (d * i - g * f) + c * (d * h - g * e)
}

/// Pseudo-angle of direction `(x, y)` in `[0, 4)`; monotone in the true angle.
pub fn diangle(x: f64, y: f64) -> f64 {
    if y >= 0.0 {
        if x >= 0.0 {
            y / (x + y)
        } else {
            1.0 - x / (-x + y)
        }
    } else if x < 0.0 {
        2.0 - y / (-x - y)
    } else {
        3.0 + x / (x - y)
    }
}

/// Unnormalized x-component of pseudo-angle `a`.
#[inline]
pub fn diangle_x(a: f64) -> f64 {
    if a < 2.0 {
        1.0 - a
    } else {
        a - 3.0
    }
}

/// Unnormalized y-component of pseudo-angle `a`.
#[inline]
pub fn diangle_y(a: f64) -> f64 {
    if a < 3.0 {
        if a > 1.0 {
            2.0 - a
        } else {
            a
        }
    } else {
        a - 4.0
    }
}

/// Unit direction for pseudo-angle `a`.
pub fn diangle_xy(a: f64) -> (f64, f64) {
    let x = diangle_x(a);
    let y = diangle_y(a);
    let n = x.hypot(y);
    (x / n, y / n)
}

/// True if `a` lies in the half-open counter-clockwise range `[less, more)`, wrapping at 4.
pub fn diangle_bracket(less: f64, a: f64, more: f64) -> bool {
    if less == more {
        false
    } else if less < more {
        less <= a && a < more
    } else {
        (less <= a && a <= 4.0) || (0.0 <= a && a < more)
    }
}

/// Pseudo-angle halfway along the counter-clockwise range from `alfa1` to `alfa2`.
pub fn diangle_mid(alfa1: f64, alfa2: f64) -> f64 {
    if alfa1 <= alfa2 {
        (alfa1 + alfa2) / 2.0
    } else {
        let mut mid = alfa2 + (alfa1 - alfa2) / 2.0 + 2.0;
        if mid >= 4.0 {
            mid -= 4.0;
        }
        mid
    }
}

#[cfg(test)]
mod tests;
