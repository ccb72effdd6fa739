//! Vertex positioner: pick the solver root that belongs on a given edge.
//!
//! The three governing sites of a new vertex are the two faces of the edge it splits and
//! the site being inserted. A segment insertion offers both of its oriented sites; the
//! winning root also decides which of the two new faces the vertex borders (`k3`).
//!
//! Roots are filtered twice: the clearance must lie within the edge's clearance range, and
//! the recomputed distances to all three sites must agree. Survivors are ranked by their
//! distance from the edge curve, ties going to the smaller clearance. A solve that leaves
//! no survivor in `f64` is repeated in [`Dd`].

use super::{solve, Roots};
use crate::cfg::VdCfg;
use crate::diagram::Bisector;
use crate::error::NumericError;
use crate::graph::EdgeId;
use crate::numeric::{chop, Dd, Scalar};
use crate::point::{Point, PointExt};
use crate::site::Site;
use tracing::{trace, warn};

/// An edge about to be split, seen from the positioner.
#[derive(Clone, Copy, Debug)]
pub struct EdgeSpan<'a> {
    pub id: EdgeId,
    pub s1: &'a Site,
    pub s2: &'a Site,
    pub src: Point,
    pub src_dist: f64,
    pub trg: Point,
    pub trg_dist: f64,
    pub geom: Bisector,
}

impl EdgeSpan<'_> {
    /// Distance of `p` from the edge curve.
    fn deviation(&self, p: &Point, t: f64) -> f64 {
        match self.geom.point_at(t) {
            Some(q) => (q - p).norm(),
            None => p.dist_to_segment(&self.src, &self.trg),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Solution {
    pub p: Point,
    /// Clearance.
    pub t: f64,
    /// Side of the inserted segment the vertex borders; `+1` for point sites.
    pub k3: f64,
}

/// Position a new vertex on `span`, equidistant from its two faces and one of `new_sites`.
pub fn position(span: &EdgeSpan<'_>, new_sites: &[&Site], cfg: &VdCfg) -> Result<Solution, NumericError> {
    match attempt::<f64>(span, new_sites, cfg) {
        Ok(sol) => Ok(sol),
        Err(first) => {
            warn!(edge = %span.id, error = %first, "escalating vertex solve to double-double");
            attempt::<Dd>(span, new_sites, cfg).map_err(|second| match (first, second) {
                (NumericError::Degenerate, NumericError::Degenerate) => NumericError::Degenerate,
                _ => NumericError::NoSolution { edge: span.id },
            })
        }
    }
}

fn attempt<S: Scalar>(span: &EdgeSpan<'_>, new_sites: &[&Site], cfg: &VdCfg) -> Result<Solution, NumericError> {
    let lo = span.src_dist.min(span.trg_dist);
    let hi = span.src_dist.max(span.trg_dist);
    let slack = cfg.edge_tol * hi.max(1.0);
    let mut best: Option<(f64, Solution)> = None;
    let mut degenerate = false;
    for s3 in new_sites {
        let k3 = s3.as_line().map_or(1.0, |l| l.k);
        let roots: Roots = match solve::<S>(span.s1, span.s2, s3) {
            Ok(r) => r,
            Err(NumericError::Degenerate) => {
                degenerate = true;
                continue;
            }
            Err(e) => return Err(e),
        };
        for (p, t) in roots {
            let t = chop(t, cfg.chop_tol);
            if t < lo - slack || t > hi + slack {
                trace!(edge = %span.id, t, lo, hi, "root outside edge clearance range");
                continue;
            }
            let tol = cfg.dist_tol * t.max(1.0);
            if [span.s1, span.s2, *s3]
                .iter()
                .any(|s| (s.distance(&p) - t).abs() > tol)
            {
                trace!(edge = %span.id, t, "root fails equidistance");
                continue;
            }
            let dev = span.deviation(&p, t);
            let better = match &best {
                None => true,
                Some((d, sol)) => dev < *d || (dev == *d && t < sol.t),
            };
            if better {
                best = Some((dev, Solution { p, t, k3 }));
            }
        }
    }
    match best {
        Some((_, sol)) => Ok(sol),
        None if degenerate => Err(NumericError::Degenerate),
        None => Err(NumericError::NoSolution { edge: span.id }),
    }
}
