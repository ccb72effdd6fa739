//! Null faces: the zero-area faces around segment endpoints.
//!
//! All vertices of a null face sit at the endpoint itself and are ordered by the
//! pseudo-angle `alfa` of the direction they stand for, counter-clockwise around the face.
//! - ENDPOINT: one per segment ending here, at the segment's direction.
//! - SEPPOINT: start of a separator, perpendicular to a segment on the side facing the
//!   endpoint's point face.
//! - NORMAL (zero clearance): start of the LINELINE bisector between two neighbouring segments.

use super::pass::{Boundary, Pass, SegTarget};
use super::types::{EdgeData, EdgeType, VertexData, VertexStatus, VertexType};
use super::{SiteRole, VoronoiDiagram};
use crate::error::{Result, TopologyError};
use crate::graph::{EdgeId, FaceId, VertexId};
use crate::numeric::{diangle, diangle_bracket, diangle_xy};
use crate::point::{Point, PointExt};
use crate::site::{Site, SiteId};
use tracing::trace;

#[inline]
fn alfa_of(w: &Point) -> f64 {
    diangle(w.x, w.y)
}

impl VoronoiDiagram {
    /// Angular in-circle value of null vertex `v` at end `end` of the segment being
    /// inserted. Compares how close the new segment comes to `v`'s direction with how close
    /// `v`'s current segments come, both as the sine of the angle.
    pub(super) fn null_ratio(&self, v: VertexId, end: usize, seg: &SegTarget) -> Option<f64> {
        let d = self.g.vertex(v);
        let (x, y) = diangle_xy(d.alfa?);
        let w = Point::new(x, y);
        let u = seg.dir_from(end);
        let ratio_new = if w.dot(&u) > 0.0 { w.perp(&u).abs() } else { 1.0 };
        let ratio_old = match d.kind {
            VertexType::SepPoint => 1.0,
            VertexType::Normal => self
                .fan(seg.end_site(end), Some(seg.index))
                .into_iter()
                .max_by(|p, q| w.dot(p).total_cmp(&w.dot(q)))
                .map_or(0.0, |dj| w.perp(&dj).abs()),
            _ => return None,
        };
        Some(ratio_new - ratio_old)
    }

    /// NEW vertex for null edge `e`, running from an IN null vertex to an OUT one.
    pub(super) fn null_edge_vertex(&mut self, e: EdgeId, pass: &mut Pass) -> Result<VertexId> {
        let (x, y) = (self.g.source(e), self.g.target(e));
        let pe = self.vpos(x);
        let seg = pass
            .segment()
            .cloned()
            .ok_or_else(|| TopologyError::FaceBoundary {
                reason: format!("null edge {e} in a point insertion"),
            })?;
        let Some(end) = seg.end_of(&pe) else {
            return Err(TopologyError::FaceBoundary {
                reason: format!("null edge {e} away from the new segment"),
            }
            .into());
        };
        let bad = TopologyError::NullVertexState(seg.end_site(end));
        let (Some(tw), Some(f)) = (self.g.twin(e), self.g.face(e)) else {
            return Err(bad.into());
        };
        let (Some(ft), Some(ax), Some(ay)) = (self.g.face(tw), self.g.vertex(x).alfa, self.g.vertex(y).alfa) else {
            return Err(bad.into());
        };
        let (outer, lo, hi) = if self.g.face_data(f).null {
            (ft, ax, ay)
        } else {
            (f, ay, ax)
        };
        let u = seg.dir_from(end);
        let (w, kind) = match *self.face_site(outer) {
            Site::Point(_) => {
                let w = [u.rot90(), -u.rot90()]
                    .into_iter()
                    .find(|w| diangle_bracket(lo, alfa_of(w), hi))
                    .ok_or(bad)?;
                (w, VertexType::SepPoint)
            }
            Site::Line(l) => {
                let d = if l.start == pe { l.direction() } else { -l.direction() };
                ((d + u).normalize(), VertexType::Normal)
            }
        };
        let k3 = if seg.dir().perp(&w) < 0.0 { -1.0 } else { 1.0 };
        let nv = self.g.add_vertex(VertexData::null(pe, kind, alfa_of(&w)));
        pass.k3.insert(nv, k3);
        trace!(vertex = %nv, edge = %e, ?kind, k3, "null vertex");
        Ok(nv)
    }

    /// After growth the null face at an endpoint must lose exactly one vertex.
    pub(super) fn resolve_null_state(&mut self, nf: FaceId, site: SiteId, pass: &mut Pass) -> Result<()> {
        let ring: Vec<VertexId> = self.g.face_edges(nf).map(|e| self.g.target(e)).collect();
        match ring.iter().filter(|&&v| pass.status(v) == VertexStatus::In).count() {
            1 => Ok(()),
            0 => {
                let pick = ring.iter().copied().find(|&v| {
                    self.g.vertex(v).kind != VertexType::EndPoint
                        && self.g.adjacent_vertices(v).into_iter().any(|w| {
                            !self.g.vertex(w).is_null() && pass.status(w) == VertexStatus::In
                        })
                });
                let v = pick.ok_or(TopologyError::NullVertexState(site))?;
                self.mark_in(v, pass)?;
                self.grow_delete_set(pass)
            }
            _ => Err(TopologyError::NullVertexState(site).into()),
        }
    }

    /// Repair an existing null face: the IN chain is replaced by the new ENDPOINT.
    pub(super) fn repair_null_face(&mut self, f: FaceId, end: usize, b: &Boundary, pass: &mut Pass) -> Result<()> {
        let (pe, u) = match pass.segment() {
            Some(seg) => (seg.end_point(end), seg.dir_from(end)),
            None => return Ok(()),
        };
        let en = self
            .g
            .add_vertex(VertexData::null(pe, VertexType::EndPoint, alfa_of(&u)));
        let (k1, k2) = (pass.k3_of(b.v1), pass.k3_of(b.v2));
        let (f1, f2) = (pass.face_for(k1), pass.face_for(k2));
        let null = EdgeData::straight(EdgeType::NullEdge);
        let (e1, _) = self.add_repair_edge(b.v1, en, f, f1, null, pass);
        let (e2, _) = self.add_repair_edge(en, b.v2, f, f2, null, pass);
        self.splice(f, b, &[e1, e2]);
        if let Some(seg) = pass.segment_mut() {
            seg.endpoints[end] = Some(en);
        }
        Ok(())
    }

    /// Repair the point face of an endpoint reached for the first time: two separators and
    /// a fresh null face holding the ENDPOINT and both SEPPOINTs.
    pub(super) fn repair_endpoint_face(
        &mut self,
        f: FaceId,
        end: usize,
        b: &Boundary,
        pass: &mut Pass,
    ) -> Result<()> {
        let (pe, u, n, site) = match pass.segment() {
            Some(seg) => (
                seg.end_point(end),
                seg.dir_from(end),
                seg.dir().rot90(),
                seg.end_site(end),
            ),
            None => return Ok(()),
        };
        let (k1, k2) = (pass.k3_of(b.v1), pass.k3_of(b.v2));
        if k1 == k2 {
            return Err(TopologyError::SideMismatch.into());
        }
        let s1 = self
            .g
            .add_vertex(VertexData::null(pe, VertexType::SepPoint, alfa_of(&(n * k1))));
        let s2 = self
            .g
            .add_vertex(VertexData::null(pe, VertexType::SepPoint, alfa_of(&(n * k2))));
        let en = self
            .g
            .add_vertex(VertexData::null(pe, VertexType::EndPoint, alfa_of(&u)));
        let (_, nf) = self.push_site(Site::point(pe), SiteRole::Null, true);
        let (f1, f2) = (pass.face_for(k1), pass.face_for(k2));
        let null = EdgeData::straight(EdgeType::NullEdge);

        let sep1 = self.bisector_data(f, k1, &self.vpos(b.v1), &pe, pass);
        let sep2 = self.bisector_data(f, k2, &pe, &self.vpos(b.v2), pass);
        let (a1, _) = self.add_repair_edge(b.v1, s1, f, f1, sep1, pass);
        let (a2, a2_twin) = self.add_repair_edge(s1, s2, f, nf, null, pass);
        let (a3, _) = self.add_repair_edge(s2, b.v2, f, f2, sep2, pass);
        self.splice(f, b, &[a1, a2, a3]);

        let (n1, _) = self.add_repair_edge(en, s2, nf, f2, null, pass);
        let (n2, _) = self.add_repair_edge(s1, en, nf, f1, null, pass);
        self.g.set_next(n1, a2_twin);
        self.g.set_next(a2_twin, n2);
        self.g.set_next(n2, n1);
        self.g.set_face_edge(nf, n1);

        if let Some(pv) = self.sites[site.0].vertex {
            self.g.vertex_mut(pv).null_face = Some(nf);
        }
        if let Some(seg) = pass.segment_mut() {
            seg.endpoints[end] = Some(en);
        }
        trace!(site = %site, face = %nf, "created null face");
        Ok(())
    }
}
