//! Read-only invariant checks over the whole diagram.

use super::types::{EdgeType, VertexType};
use super::VoronoiDiagram;
use crate::graph::{EdgeId, FaceId, VertexId};
use std::fmt;
use tracing::warn;

/// Sample positions used for the equidistance check.
const EQUIDISTANCE_SAMPLES: [f64; 3] = [0.25, 0.5, 0.75];

/// Offending ids found by [`VoronoiDiagram::check_report`]; empty lists mean a clean diagram.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckReport {
    /// `(vertex, degree, expected degree)`.
    pub degree: Vec<(VertexId, usize, usize)>,
    /// Edges whose twin link is missing or not symmetric.
    pub twins: Vec<EdgeId>,
    /// Edges whose `next` is missing, invalid, not adjacent, or on another face.
    pub next: Vec<EdgeId>,
    /// Faces whose cycle does not close, is shorter than 3, or strays onto other faces.
    pub open_faces: Vec<FaceId>,
    /// Edges not equidistant from their two sites.
    pub equidistance: Vec<EdgeId>,
    /// Vertices whose clearance disagrees with an adjacent site.
    pub clearance: Vec<VertexId>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.degree.is_empty()
            && self.twins.is_empty()
            && self.next.is_empty()
            && self.open_faces.is_empty()
            && self.equidistance.is_empty()
            && self.clearance.is_empty()
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "ok");
        }
        write!(
            f,
            "{} degree, {} twin, {} next, {} face, {} equidistance, {} clearance violations",
            self.degree.len(),
            self.twins.len(),
            self.next.len(),
            self.open_faces.len(),
            self.equidistance.len(),
            self.clearance.len()
        )?;
        if let Some((v, got, want)) = self.degree.first() {
            write!(f, "; first: {v} has degree {got}, expected {want}")?;
        }
        Ok(())
    }
}

impl VoronoiDiagram {
    /// True if every invariant holds.
    pub fn check(&self) -> bool {
        let report = self.check_report();
        if !report.is_ok() {
            warn!(%report, "diagram check failed");
        }
        report.is_ok()
    }

    pub fn check_report(&self) -> CheckReport {
        let mut report = CheckReport::default();
        self.check_vertices(&mut report);
        self.check_edges(&mut report);
        self.check_faces(&mut report);
        report
    }

    fn check_vertices(&self, report: &mut CheckReport) {
        let tol = self.cfg.check_tol;
        for v in self.g.vertex_ids() {
            let d = self.g.vertex(v);
            let (got, want) = (self.g.degree(v), d.kind.expected_degree());
            if got != want {
                report.degree.push((v, got, want));
            }
            if d.kind == VertexType::PointSite {
                continue;
            }
            let off = self
                .g
                .adjacent_faces(v)
                .into_iter()
                .any(|f| (self.face_site(f).distance(&d.position) - d.dist).abs() > tol * d.dist.max(1.0));
            if off {
                report.clearance.push(v);
            }
        }
    }

    fn check_edges(&self, report: &mut CheckReport) {
        let tol = self.cfg.check_tol;
        for e in self.g.edge_ids() {
            match self.g.twin(e) {
                Some(tw) => {
                    if !self.g.is_valid(tw)
                        || self.g.twin(tw) != Some(e)
                        || self.g.source(tw) != self.g.target(e)
                    {
                        report.twins.push(e);
                    }
                }
                None if self.g.edge(e).kind != EdgeType::OutEdge => report.twins.push(e),
                None => {}
            }
            match self.g.next(e) {
                Some(n)
                    if self.g.is_valid(n)
                        && self.g.source(n) == self.g.target(e)
                        && self.g.face(n) == self.g.face(e) => {}
                _ => report.next.push(e),
            }

            let Some(tw) = self.g.twin(e) else { continue };
            if e > tw || self.g.edge(e).kind == EdgeType::NullEdge {
                continue;
            }
            let (Some(f1), Some(f2)) = (self.g.face(e), self.g.face(tw)) else {
                continue;
            };
            let (s1, s2) = (self.face_site(f1), self.face_site(f2));
            let skewed = EQUIDISTANCE_SAMPLES.iter().any(|&u| {
                let p = self.edge_point_at(e, u);
                let (d1, d2) = (s1.distance(&p), s2.distance(&p));
                (d1 - d2).abs() > tol * d1.max(1.0)
            });
            if skewed {
                report.equidistance.push(e);
            }
        }
    }

    fn check_faces(&self, report: &mut CheckReport) {
        let cap = self.g.edge_capacity();
        for f in self.g.face_ids() {
            let Some(start) = self.g.face_edge(f) else {
                report.open_faces.push(f);
                continue;
            };
            let mut cur = start;
            let mut len = 0;
            let closed = loop {
                if !self.g.is_valid(cur) || self.g.face(cur) != Some(f) || len > cap {
                    break false;
                }
                len += 1;
                match self.g.next(cur) {
                    Some(n) if n == start => break true,
                    Some(n) => cur = n,
                    None => break false,
                }
            };
            if !closed || len < 3 {
                report.open_faces.push(f);
            }
        }
    }
}
