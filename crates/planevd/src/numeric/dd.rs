//! Double-double scalar: an unevaluated sum `hi + lo` with `|lo| <= ulp(hi)/2`.
//!
//! Roughly 106 bits of mantissa from error-free transformations (`two_sum`, fused
//! `two_prod`). Only the operations the solvers need are provided.

use super::Scalar;
use std::ops::{Add, Div, Mul, Neg, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Dd {
    hi: f64,
    lo: f64,
}

#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    let err = (a - (s - bb)) + (b - bb);
    (s, err)
}

#[inline]
fn quick_two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    (s, b - (s - a))
}

#[inline]
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    (p, a.mul_add(b, -p))
}

impl Dd {
    pub const ZERO: Dd = Dd { hi: 0.0, lo: 0.0 };
    pub const ONE: Dd = Dd { hi: 1.0, lo: 0.0 };

    #[inline]
    pub fn new(x: f64) -> Self {
        Self { hi: x, lo: 0.0 }
    }

    #[inline]
    pub fn hi(self) -> f64 {
        self.hi
    }

    #[inline]
    pub fn lo(self) -> f64 {
        self.lo
    }

    fn normalized(hi: f64, lo: f64) -> Self {
        let (hi, lo) = quick_two_sum(hi, lo);
        Self { hi, lo }
    }

    /// Square root via one Newton correction of the double estimate.
    pub fn sqrt(self) -> Self {
        if self.hi < 0.0 {
            return Dd::new(f64::NAN);
        }
        if self.hi == 0.0 {
            return Dd::ZERO;
        }
        let x = self.hi.sqrt();
        let y = Dd::new(x);
        y + (self - y * y) * Dd::new(0.5 / x)
    }

    #[inline]
    pub fn abs(self) -> Self {
        if self.hi < 0.0 {
            -self
        } else {
            self
        }
    }
}

impl From<f64> for Dd {
    fn from(x: f64) -> Self {
        Dd::new(x)
    }
}

impl Add for Dd {
    type Output = Dd;
    fn add(self, rhs: Dd) -> Dd {
        let (s, e) = two_sum(self.hi, rhs.hi);
        let (t, f) = two_sum(self.lo, rhs.lo);
        let (s, e) = quick_two_sum(s, e + t);
        Dd::normalized(s, e + f)
    }
}

impl Neg for Dd {
    type Output = Dd;
    fn neg(self) -> Dd {
        Dd {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl Sub for Dd {
    type Output = Dd;
    fn sub(self, rhs: Dd) -> Dd {
        self + (-rhs)
    }
}

impl Mul for Dd {
    type Output = Dd;
    fn mul(self, rhs: Dd) -> Dd {
        let (p, e) = two_prod(self.hi, rhs.hi);
        let e = e + (self.hi * rhs.lo + self.lo * rhs.hi);
        Dd::normalized(p, e)
    }
}

impl Div for Dd {
    type Output = Dd;
    fn div(self, rhs: Dd) -> Dd {
        let q1 = self.hi / rhs.hi;
        let r = self - rhs * Dd::new(q1);
        let q2 = r.hi / rhs.hi;
        let r = r - rhs * Dd::new(q2);
        let q3 = r.hi / rhs.hi;
        Dd::normalized(q1, q2) + Dd::new(q3)
    }
}

impl num_traits::Zero for Dd {
    fn zero() -> Self {
        Dd::ZERO
    }
    fn is_zero(&self) -> bool {
        self.hi == 0.0
    }
}

impl num_traits::One for Dd {
    fn one() -> Self {
        Dd::ONE
    }
}

impl Scalar for Dd {
    const DEGENERATE_REL: f64 = 1e-28;

    #[inline]
    fn from_f64(x: f64) -> Self {
        Dd::new(x)
    }
    #[inline]
    fn to_f64(self) -> f64 {
        self.hi + self.lo
    }
    #[inline]
    fn sqrt(self) -> Self {
        Dd::sqrt(self)
    }
    #[inline]
    fn abs(self) -> Self {
        Dd::abs(self)
    }
}
