//! Segment-site insertion: validation, SPLIT vertices, seeding and the driver.
//!
//! A segment joins two existing point sites. It is inserted as two oriented line sites,
//! each with its own face, plus a LINESITE edge between the two ENDPOINT vertices. The
//! endpoint bookkeeping (null faces, ENDPOINT and SEPPOINT vertices) lives in `null`.

use super::pass::{Pass, SegTarget, Target};
use super::types::{EdgeData, EdgeType, VertexData, VertexStatus, VertexType};
use super::{Segment, SiteRole, VoronoiDiagram};
use crate::error::{InputError, NumericError, Result, TopologyError};
use crate::graph::{EdgeId, FaceId, VertexId};
use crate::numeric::diangle;
use crate::point::{orientation, Point, PointExt};
use crate::site::{Site, SiteId};
use tracing::{debug, trace, warn};

/// Where a ray leaves a face.
#[derive(Clone, Copy, Debug)]
enum Crossing {
    Vertex(VertexId),
    Edge(EdgeId, Point),
}

impl VoronoiDiagram {
    /// Insert the segment between point sites `a` and `b`.
    ///
    /// Both ids must name user point sites. The segment may not cross or overlap an existing
    /// segment, pass through another point site, or close the angular fan at an endpoint.
    pub fn insert_line_site(&mut self, a: SiteId, b: SiteId) -> Result<()> {
        let (pa, pb) = self.validate_segment(a, b)?;
        let mark = self.mark();
        self.g.begin();
        match self.line_pass(a, b, pa, pb) {
            Ok(pass) => {
                self.g.commit();
                self.update_grid(&pass);
                debug!(
                    a = %a,
                    b = %b,
                    deleted = pass.in_set.len(),
                    incident = pass.incident.len(),
                    splits = pass.splits.len(),
                    "inserted line site"
                );
                Ok(())
            }
            Err(err) => {
                warn!(a = %a, b = %b, error = %err, "line insertion rolled back");
                self.restore(mark);
                Err(err)
            }
        }
    }

    fn validate_segment(&self, a: SiteId, b: SiteId) -> Result<(Point, Point)> {
        for id in [a, b] {
            let rec = self.sites.get(id.0).ok_or(InputError::UnknownSite(id))?;
            if rec.role != SiteRole::Point {
                return Err(InputError::NotAPointSite(id).into());
            }
        }
        if a == b {
            return Err(InputError::SameEndpoints.into());
        }
        let (pa, pb) = (self.point_of(a), self.point_of(b));
        for seg in &self.segments {
            if (seg.a, seg.b) == (a, b) || (seg.a, seg.b) == (b, a) {
                return Err(InputError::DuplicateSegment { a, b }.into());
            }
        }
        for seg in &self.segments {
            let shares = [seg.a, seg.b].iter().any(|s| *s == a || *s == b);
            if !shares && segments_intersect(&pa, &pb, &self.point_of(seg.a), &self.point_of(seg.b)) {
                return Err(InputError::SegmentsIntersect { a: seg.a, b: seg.b }.into());
            }
        }
        let tol = self.cfg.dist_tol * (pb - pa).norm().max(1.0);
        for (i, rec) in self.sites.iter().enumerate() {
            if rec.role != SiteRole::Point || i == a.0 || i == b.0 {
                continue;
            }
            let p = self.point_of(SiteId(i));
            if p.dist_to_segment(&pa, &pb) <= tol {
                return Err(InputError::PointOnSegment { x: p.x, y: p.y }.into());
            }
        }
        self.check_fan(a, &(pb - pa).normalize())?;
        self.check_fan(b, &(pa - pb).normalize())?;
        Ok((pa, pb))
    }

    /// Reject a new direction `u` at endpoint `e` that overlaps or continues an existing
    /// segment, or leaves no angular gap wider than a half-turn.
    fn check_fan(&self, e: SiteId, u: &Point) -> Result<()> {
        let mut dirs = self.fan(e, None);
        if dirs.is_empty() {
            return Ok(());
        }
        let tol = self.cfg.angle_tol;
        if dirs.iter().any(|d| d.perp(u).abs() <= tol && d.dot(u) > 0.0) {
            return Err(InputError::CollinearAtEndpoint(e).into());
        }
        dirs.push(*u);
        dirs.sort_by(|p, q| diangle(p.x, p.y).total_cmp(&diangle(q.x, q.y)));
        let n = dirs.len();
        let mut wide_gap = false;
        for i in 0..n {
            let (d1, d2) = (dirs[i], dirs[(i + 1) % n]);
            let cr = d1.perp(&d2);
            if cr.abs() <= tol && d1.dot(&d2) < 0.0 {
                return Err(InputError::CollinearAtEndpoint(e).into());
            }
            wide_gap |= cr < 0.0;
        }
        if !wide_gap {
            return Err(InputError::EndpointEnclosed(e).into());
        }
        Ok(())
    }

    /// Unit directions of the segments leaving point site `e`, optionally skipping one.
    pub(super) fn fan(&self, e: SiteId, skip: Option<usize>) -> Vec<Point> {
        let pe = self.point_of(e);
        self.segments
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .filter_map(|(_, seg)| {
                let other = if seg.a == e {
                    seg.b
                } else if seg.b == e {
                    seg.a
                } else {
                    return None;
                };
                Some((self.point_of(other) - pe).normalize())
            })
            .collect()
    }

    /// Null face around the endpoint vertex of point site `id`, if a segment already ends there.
    pub(super) fn null_face_of(&self, id: SiteId) -> Option<FaceId> {
        self.sites[id.0]
            .vertex
            .and_then(|v| self.g.vertex(v).null_face)
    }

    fn line_pass(&mut self, a: SiteId, b: SiteId, pa: Point, pb: Point) -> Result<Pass> {
        let index = self.segments.len();
        let (pos, pos_face) = self.push_site(Site::line(pa, pb, 1.0), SiteRole::Segment(index), false);
        let (neg, neg_face) = self.push_site(Site::line(pa, pb, -1.0), SiteRole::Segment(index), false);
        self.segments.push(Segment { a, b, pos, neg });
        let seg = SegTarget {
            index,
            a,
            b,
            pa,
            pb,
            had_null: [self.null_face_of(a), self.null_face_of(b)],
            endpoints: [None, None],
        };
        let mut pass = Pass::new(Target::Segment(seg.clone()), vec![pos, neg], vec![pos_face, neg_face]);

        // keep each endpoint face's delete chain from wrapping around behind the endpoint
        for end in 0..2 {
            if seg.had_null[end].is_some() {
                continue;
            }
            let site = seg.end_site(end);
            let f = self.sites[site.0].face;
            let origin = self.point_of(site);
            if let Some((v, true)) = self.split_face(f, &origin, &-seg.dir_from(end), &mut pass) {
                pass.set(v, VertexStatus::Out);
            }
        }

        let seed = self.segment_seed(&seg, &mut pass)?;
        self.mark_in(seed, &mut pass)?;
        self.grow_delete_set(&mut pass)?;
        for end in 0..2 {
            if let Some(nf) = seg.had_null[end] {
                self.resolve_null_state(nf, seg.end_site(end), &mut pass)?;
            }
        }
        self.add_new_vertices(&mut pass)?;

        for f in pass.incident.clone() {
            let b = self.face_boundary(f, &pass)?;
            let fd = *self.g.face_data(f);
            if fd.null {
                let p = self.sites[fd.site.0].site.apex_point(&pa);
                let end = seg
                    .end_of(&p)
                    .ok_or(TopologyError::NullVertexState(fd.site))?;
                self.repair_null_face(f, end, &b, &mut pass)?;
            } else if let Some(end) = (0..2).find(|&i| fd.site == seg.end_site(i)) {
                if seg.had_null[end].is_some() {
                    self.repair_with_edge(f, &b, &mut pass)?;
                } else {
                    self.repair_endpoint_face(f, end, &b, &mut pass)?;
                }
            } else {
                self.repair_with_edge(f, &b, &mut pass)?;
            }
        }

        let ends = pass.segment().map(|s| s.endpoints).unwrap_or_default();
        let ea = ends[0].ok_or(TopologyError::EndpointMissing(a))?;
        let eb = ends[1].ok_or(TopologyError::EndpointMissing(b))?;
        self.add_repair_edge(ea, eb, pos_face, neg_face, EdgeData::straight(EdgeType::LineSite), &mut pass);

        self.link_new_faces(&pass)?;
        self.split_apexes(&mut pass);
        self.remove_in_vertices(&mut pass);
        self.merge_splits(&pass);
        self.check_pass()?;
        Ok(pass)
    }

    /// Seed the delete set at `a`, falling back to `b`.
    fn segment_seed(&mut self, seg: &SegTarget, pass: &mut Pass) -> Result<VertexId> {
        for end in 0..2 {
            let site = seg.end_site(end);
            let origin = self.point_of(site);
            match seg.had_null[end] {
                None => {
                    let f = self.sites[site.0].face;
                    let u = seg.dir_from(end);
                    let len = (seg.pb - seg.pa).norm();
                    let Some(crossing) = self.find_crossing(f, &origin, &u) else {
                        continue;
                    };
                    let p = match crossing {
                        Crossing::Vertex(v) => self.vpos(v),
                        Crossing::Edge(_, p) => p,
                    };
                    let s = (p - origin).dot(&u);
                    if s <= 0.0 || s >= len {
                        continue;
                    }
                    if let Some((v, _)) = self.split_face(f, &origin, &u, pass) {
                        return Ok(v);
                    }
                }
                Some(nf) => {
                    let best = self
                        .g
                        .face_edges(nf)
                        .map(|e| self.g.target(e))
                        .filter_map(|v| self.segment_in_circle(v, seg).map(|h| (h, v)))
                        .min_by(|x, y| x.0.total_cmp(&y.0));
                    if let Some((h, v)) = best {
                        if h < 0.0 {
                            return Ok(v);
                        }
                    }
                }
            }
        }
        Err(NumericError::NoSeed.into())
    }

    /// In-circle value of `v` for the segment being inserted; `None` keeps `v`.
    pub(super) fn segment_in_circle(&self, v: VertexId, seg: &SegTarget) -> Option<f64> {
        let d = self.g.vertex(v);
        match d.kind {
            VertexType::Outer | VertexType::EndPoint | VertexType::PointSite | VertexType::Split => {
                return None
            }
            _ => {}
        }
        if d.is_null() {
            return seg.end_of(&d.position).and_then(|end| self.null_ratio(v, end, seg));
        }
        let t = d.position.segment_param(&seg.pa, &seg.pb);
        if t <= 0.0 || t >= 1.0 {
            return None;
        }
        Some(d.position.dist_to_segment(&seg.pa, &seg.pb) - d.dist)
    }

    /// Called when face `f` first becomes incident: point faces other than the two
    /// endpoints get a SPLIT vertex on their far side.
    pub(super) fn on_incident(&mut self, f: FaceId, pass: &mut Pass) -> Result<()> {
        let Some(seg) = pass.segment() else {
            return Ok(());
        };
        let fd = *self.g.face_data(f);
        if fd.null || fd.site == seg.a || fd.site == seg.b {
            return Ok(());
        }
        let Some(q) = self.sites[fd.site.0].site.as_point() else {
            return Ok(());
        };
        let foot = Site::line(seg.pa, seg.pb, 1.0).apex_point(&q);
        let dir = q - foot;
        if dir.norm() == 0.0 {
            return Ok(());
        }
        if let Some((v, true)) = self.split_face(f, &q, &dir.normalize(), pass) {
            pass.set(v, VertexStatus::Out);
        }
        Ok(())
    }

    /// Nearest boundary crossing of the ray `origin + s·dir` (`s > 0`) on face `f`.
    fn find_crossing(&self, f: FaceId, origin: &Point, dir: &Point) -> Option<Crossing> {
        let side = |p: &Point| dir.perp(&(p - origin));
        let ahead = |p: &Point| dir.dot(&(p - origin));
        let mut best: Option<(f64, Crossing)> = None;
        let mut keep = |s: f64, c: Crossing| {
            if s > 0.0 && best.map_or(true, |b| s < b.0) {
                best = Some((s, c));
            }
        };
        for e in self.g.face_edges(f) {
            if self.g.edge(e).kind == EdgeType::NullEdge {
                continue;
            }
            let (ps, pt) = (self.vpos(self.g.source(e)), self.vpos(self.g.target(e)));
            let (ss, st) = (side(&ps), side(&pt));
            if st == 0.0 {
                keep(ahead(&pt), Crossing::Vertex(self.g.target(e)));
                continue;
            }
            if ss * st >= 0.0 {
                continue;
            }
            let (mut lo, mut hi) = (0.0, 1.0);
            for _ in 0..64 {
                let mid = 0.5 * (lo + hi);
                if side(&self.edge_point_at(e, mid)) * ss > 0.0 {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            let x = self.edge_point_at(e, 0.5 * (lo + hi));
            keep(ahead(&x), Crossing::Edge(e, x));
        }
        best.map(|b| b.1)
    }

    /// Put a SPLIT vertex where the ray leaves `f`. Returns the vertex and whether it was
    /// created; an existing vertex exactly on the ray is returned as is.
    ///
    /// The split goes in even when an end of the crossed edge is already IN: every point on
    /// the ray beyond the face's site is farther from the new segment than from that site,
    /// so the split is outside the new region and keeps the face from being deleted whole.
    fn split_face(&mut self, f: FaceId, origin: &Point, dir: &Point, pass: &mut Pass) -> Option<(VertexId, bool)> {
        match self.find_crossing(f, origin, dir)? {
            Crossing::Vertex(v) => Some((v, false)),
            Crossing::Edge(e, x) => {
                self.g.twin(e)?;
                let dist = self.face_site(f).distance(&x);
                let v = self.g.add_vertex(VertexData::new(x, VertexType::Split, dist));
                self.g.split_edge(e, v);
                pass.splits.push(v);
                trace!(vertex = %v, face = %f, "split vertex");
                Some((v, true))
            }
        }
    }
}

/// Closed-segment intersection test, counting collinear touching as intersecting.
fn segments_intersect(p1: &Point, p2: &Point, q1: &Point, q2: &Point) -> bool {
    let d1 = orientation(p1, p2, q1);
    let d2 = orientation(p1, p2, q2);
    let d3 = orientation(q1, q2, p1);
    let d4 = orientation(q1, q2, p2);
    if d1 * d2 < 0.0 && d3 * d4 < 0.0 {
        return true;
    }
    let within = |a: &Point, b: &Point, p: &Point| {
        p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
    };
    (d1 == 0.0 && within(p1, p2, q1))
        || (d2 == 0.0 && within(p1, p2, q2))
        || (d3 == 0.0 && within(q1, q2, p1))
        || (d4 == 0.0 && within(q1, q2, p2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_and_touching_segments() {
        let p = |x: f64, y: f64| Point::new(x, y);
        assert!(segments_intersect(&p(0.0, 0.0), &p(2.0, 2.0), &p(0.0, 2.0), &p(2.0, 0.0)));
        assert!(!segments_intersect(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.0, 1.0), &p(1.0, 1.0)));
        // T-junction: the end of one segment on the other
        assert!(segments_intersect(&p(0.0, 0.0), &p(2.0, 0.0), &p(1.0, 0.0), &p(1.0, 1.0)));
        // collinear, disjoint
        assert!(!segments_intersect(&p(0.0, 0.0), &p(1.0, 0.0), &p(2.0, 0.0), &p(3.0, 0.0)));
    }
}
