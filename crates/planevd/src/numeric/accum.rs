//! Compensated summation accumulator.
//!
//! Terms are kept in two same-sign partitions and only summed on demand: each partition is
//! sorted by increasing magnitude and added with a Neumaier running compensation, then the
//! two partial sums and their compensations are combined last. Sums without cancellation
//! match naive summation; with severe cancellation the small terms survive
//! (`1e16 + 1 - 1e16 == 1`).

use super::Scalar;
use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

#[derive(Clone, Debug)]
pub struct Accumulator<S = f64> {
    pos: Vec<S>,
    neg: Vec<S>,
}

impl<S: Scalar> Default for Accumulator<S> {
    fn default() -> Self {
        Self {
            pos: Vec::new(),
            neg: Vec::new(),
        }
    }
}

impl<S: Scalar> Accumulator<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_terms(terms: &[S]) -> Self {
        let mut acc = Self::new();
        for &t in terms {
            acc.push(t);
        }
        acc
    }

    /// Append one term. Zeros are dropped.
    #[inline]
    pub fn push(&mut self, x: S) {
        let zero = S::zero();
        if x > zero {
            self.pos.push(x);
        } else if x < zero {
            self.neg.push(x);
        }
    }

    /// Number of stored non-zero terms.
    pub fn len(&self) -> usize {
        self.pos.len() + self.neg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos.is_empty() && self.neg.is_empty()
    }

    /// Compensated sum of the positive partition.
    pub fn positive_sum(&self) -> S {
        let (s, c) = partition_sum(&self.pos);
        s + c
    }

    /// Compensated sum of the negative partition.
    pub fn negative_sum(&self) -> S {
        let (s, c) = partition_sum(&self.neg);
        s + c
    }

    /// Compensated total.
    pub fn sum(&self) -> S {
        let (sp, cp) = partition_sum(&self.pos);
        let (sn, cn) = partition_sum(&self.neg);
        (sp + sn) + (cp + cn)
    }

    /// Multiply every term by `k`.
    pub fn scale(&self, k: S) -> Self {
        let mut out = Self::new();
        for &t in self.pos.iter().chain(self.neg.iter()) {
            out.push(t * k);
        }
        out
    }

    fn terms(&self) -> impl Iterator<Item = S> + '_ {
        self.pos.iter().chain(self.neg.iter()).copied()
    }
}

/// Sorted Neumaier summation of same-sign terms; returns `(sum, compensation)`.
fn partition_sum<S: Scalar>(terms: &[S]) -> (S, S) {
    let mut sorted = terms.to_vec();
    sorted.sort_by(|a, b| {
        a.abs()
            .partial_cmp(&b.abs())
            .unwrap_or(Ordering::Equal)
    });
    let mut s = S::zero();
    let mut c = S::zero();
    for x in sorted {
        let t = s + x;
        if s.abs() >= x.abs() {
            c = c + ((s - t) + x);
        } else {
            c = c + ((x - t) + s);
        }
        s = t;
    }
    (s, c)
}

impl<S: Scalar> Add for Accumulator<S> {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self {
        self.pos.extend(rhs.pos);
        self.neg.extend(rhs.neg);
        self
    }
}

impl<S: Scalar> Add<S> for Accumulator<S> {
    type Output = Self;
    fn add(mut self, rhs: S) -> Self {
        self.push(rhs);
        self
    }
}

impl<S: Scalar> Neg for Accumulator<S> {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            pos: self.neg.into_iter().map(|t| -t).collect(),
            neg: self.pos.into_iter().map(|t| -t).collect(),
        }
    }
}

impl<S: Scalar> Sub for Accumulator<S> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl<S: Scalar> Mul<S> for Accumulator<S> {
    type Output = Self;
    fn mul(self, rhs: S) -> Self {
        self.scale(rhs)
    }
}

/// Distributes the product over every pair of terms.
impl<S: Scalar> Mul for Accumulator<S> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let mut out = Self::new();
        for a in self.terms() {
            for b in rhs.terms() {
                out.push(a * b);
            }
        }
        out
    }
}
