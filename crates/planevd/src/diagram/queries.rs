//! Read-only query surface for offsetting, medial-axis and rendering collaborators.

use super::types::{EdgeType, VertexStatus, VertexType};
use super::{SiteRole, VoronoiDiagram};
use crate::graph::{EdgeId, FaceId, VertexId};
use crate::point::Point;
use crate::site::{Site, SiteId};

/// Snapshot of one vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexView {
    pub id: VertexId,
    pub position: Point,
    pub kind: VertexType,
    /// Classification is scoped to one insertion, so between insertions this is `Out` for
    /// the OUTER vertices and `Undecided` for every other vertex.
    pub status: VertexStatus,
    pub degree: usize,
    /// Clearance.
    pub dist: f64,
}

/// Snapshot of one half-edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeView {
    pub id: EdgeId,
    pub kind: EdgeType,
    /// False for a removed edge whose slot is kept.
    pub valid: bool,
    pub source: VertexId,
    pub target: VertexId,
    pub twin: Option<EdgeId>,
    pub next: Option<EdgeId>,
    pub face: Option<FaceId>,
}

/// Snapshot of one face with its ordered boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceView {
    pub id: FaceId,
    pub site: SiteId,
    pub null: bool,
    pub edges: Vec<EdgeId>,
}

impl VoronoiDiagram {
    pub fn vertices(&self) -> Vec<VertexView> {
        self.g
            .vertex_ids()
            .map(|id| {
                let d = self.g.vertex(id);
                VertexView {
                    id,
                    position: d.position,
                    kind: d.kind,
                    status: if d.kind == VertexType::Outer {
                        VertexStatus::Out
                    } else {
                        VertexStatus::Undecided
                    },
                    degree: self.g.degree(id),
                    dist: d.dist,
                }
            })
            .collect()
    }

    /// Every edge slot, removed ones included (`valid == false`).
    pub fn edges(&self) -> Vec<EdgeView> {
        (0..self.g.edge_capacity())
            .map(EdgeId)
            .map(|id| EdgeView {
                id,
                kind: self.g.edge(id).kind,
                valid: self.g.is_valid(id),
                source: self.g.source(id),
                target: self.g.target(id),
                twin: self.g.twin(id),
                next: self.g.next(id),
                face: self.g.face(id),
            })
            .collect()
    }

    pub fn faces(&self) -> Vec<FaceView> {
        self.g
            .face_ids()
            .map(|id| {
                let fd = self.g.face_data(id);
                FaceView {
                    id,
                    site: fd.site,
                    null: fd.null,
                    edges: self.g.face_edges(id).collect(),
                }
            })
            .collect()
    }

    /// Point on edge `e` for `u ∈ [0, 1]`, `u = 0` at the source. Clearance is interpolated
    /// linearly between the end clearances and mapped onto the bisector.
    ///
    /// The edge queries below return `None` for a removed or unknown edge.
    pub fn edge_point(&self, e: EdgeId, u: f64) -> Option<Point> {
        self.live(e).map(|e| self.edge_point_at(e, u.clamp(0.0, 1.0)))
    }

    /// Point of edge `e` at clearance `t`, if `t` lies within the edge's clearance range and
    /// the edge is parameterized by clearance.
    pub fn point_at_clearance(&self, e: EdgeId, t: f64) -> Option<Point> {
        let e = self.live(e)?;
        let s = self.g.vertex(self.g.source(e)).dist;
        let r = self.g.vertex(self.g.target(e)).dist;
        if t < s.min(r) || t > s.max(r) {
            return None;
        }
        self.g.edge(e).geom.point_at(t)
    }

    /// `n + 1` points along edge `e`, source first, for drawing curved edges as polylines.
    pub fn sample(&self, e: EdgeId, n: usize) -> Option<Vec<Point>> {
        let e = self.live(e)?;
        let n = n.max(1);
        Some((0..=n).map(|i| self.edge_point_at(e, i as f64 / n as f64)).collect())
    }

    /// Site of the face owning `e`.
    pub fn edge_site(&self, e: EdgeId) -> Option<&Site> {
        let e = self.live(e)?;
        self.g.face(e).map(|f| self.face_site(f))
    }

    fn live(&self, e: EdgeId) -> Option<EdgeId> {
        self.g.is_valid(e).then_some(e)
    }

    pub fn num_point_sites(&self) -> usize {
        self.sites.iter().filter(|r| r.role == SiteRole::Point).count()
    }

    pub fn num_line_sites(&self) -> usize {
        self.segments.len()
    }

    /// Live vertices, not counting POINTSITE vertices.
    pub fn num_vertices(&self) -> usize {
        self.g
            .vertex_ids()
            .filter(|&v| self.g.vertex(v).kind != VertexType::PointSite)
            .count()
    }

    pub fn num_faces(&self) -> usize {
        self.g.num_faces()
    }

    pub fn num_split_vertices(&self) -> usize {
        self.num_vertex_type(VertexType::Split)
    }

    pub fn num_vertex_type(&self, kind: VertexType) -> usize {
        self.g
            .vertex_ids()
            .filter(|&v| self.g.vertex(v).kind == kind)
            .count()
    }
}
