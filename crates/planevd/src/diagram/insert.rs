//! Point-site insertion.

use super::pass::{Pass, Target};
use super::types::{EdgeType, VertexData, VertexType};
use super::{SiteRole, VoronoiDiagram};
use crate::error::{InputError, NumericError, Result};
use crate::graph::{EdgeId, FaceId, VertexId};
use crate::point::{Point, PointExt};
use crate::site::{Site, SiteId};
use tracing::{debug, trace, warn};

/// Where a point insertion starts its delete set.
#[derive(Clone, Copy, Debug)]
enum Seed {
    Vertex(VertexId),
    /// No vertex of the face is inside the new region; the region only bulges into the
    /// interior of edge `e`, which gets a SPLIT vertex at `x`.
    Edge { e: EdgeId, x: Point, dist: f64 },
}

impl VoronoiDiagram {
    /// Insert a point site strictly inside the far radius and return its id.
    ///
    /// Rejected input and failed insertions leave the diagram unchanged.
    pub fn insert_point_site(&mut self, p: Point) -> Result<SiteId> {
        self.validate_point(&p)?;
        let face = self.nearest_face(&p)?;
        let tol = self.cfg.dist_tol * p.norm().max(1.0);
        let rec = &self.sites[self.g.face_data(face).site.0];
        if rec.role == SiteRole::Point && rec.site.distance(&p) <= tol {
            return Err(InputError::DuplicatePoint { x: p.x, y: p.y }.into());
        }
        let seed = self.point_seed(face, &p)?;

        let mark = self.mark();
        self.g.begin();
        match self.point_pass(p, seed) {
            Ok((id, pass)) => {
                self.g.commit();
                self.update_grid(&pass);
                debug!(
                    site = %id,
                    deleted = pass.in_set.len(),
                    incident = pass.incident.len(),
                    "inserted point site"
                );
                Ok(id)
            }
            Err(err) => {
                warn!(x = p.x, y = p.y, error = %err, "point insertion rolled back");
                self.restore(mark);
                Err(err)
            }
        }
    }

    fn validate_point(&self, p: &Point) -> Result<()> {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return Err(InputError::NonFinite.into());
        }
        if p.norm() >= self.far {
            return Err(InputError::OutsideFarRadius {
                x: p.x,
                y: p.y,
                far: self.far,
            }
            .into());
        }
        let tol = self.cfg.dist_tol * p.norm().max(1.0);
        for seg in &self.segments {
            let (a, b) = (self.point_of(seg.a), self.point_of(seg.b));
            if p.dist_to_segment(&a, &b) <= tol {
                return Err(InputError::PointOnSegment { x: p.x, y: p.y }.into());
            }
        }
        Ok(())
    }

    /// Position of a point site (generator or user point).
    pub(super) fn point_of(&self, id: SiteId) -> Point {
        self.sites[id.0].site.apex_point(&Point::zeros())
    }

    /// Face of the site closest to `p`: start at the faces around the nearest grid vertex
    /// and walk to neighbouring faces while the site distance drops.
    ///
    /// The two faces of a segment are equally far from `p`; the face on the wrong side
    /// (or whose slab misses `p`) ranks behind every face that can contain `p`.
    pub(super) fn nearest_face(&self, p: &Point) -> Result<FaceId> {
        let start = self.grid.nearest(p).ok_or(NumericError::NoSeed)?;
        let d = self.g.vertex(start);
        let mut faces = match (d.kind, d.face) {
            (VertexType::PointSite, Some(f)) => vec![f],
            _ => self.g.adjacent_faces(start),
        };
        faces.retain(|&f| !self.g.face_data(f).null);
        let key = |f: FaceId| self.face_key(f, p);
        let mut best = faces
            .into_iter()
            .map(|f| (key(f), f))
            .min_by(|a, b| a.0 .0.cmp(&b.0 .0).then(a.0 .1.total_cmp(&b.0 .1)))
            .ok_or(NumericError::NoSeed)?;
        loop {
            let mut improved = false;
            for e in self.g.face_edges(best.1) {
                let Some(nf) = self.g.twin(e).and_then(|tw| self.g.face(tw)) else {
                    continue;
                };
                if self.g.face_data(nf).null {
                    continue;
                }
                let k = key(nf);
                if k < best.0 {
                    best = (k, nf);
                    improved = true;
                }
            }
            if !improved {
                break;
            }
        }
        if !best.0 .0 {
            return Ok(best.1);
        }
        // the walk stalled on a face that cannot hold `p`
        trace!(x = p.x, y = p.y, "nearest-face walk stalled, scanning all faces");
        self.g
            .face_ids()
            .filter(|&f| !self.g.face_data(f).null)
            .map(|f| (key(f), f))
            .filter(|(k, _)| !k.0)
            .min_by(|a, b| a.0 .1.total_cmp(&b.0 .1))
            .map(|(_, f)| f)
            .ok_or_else(|| NumericError::NoSeed.into())
    }

    /// Walk key of face `f` for `p`: whether `p` lies outside the site's own half-slab,
    /// then the site distance.
    fn face_key(&self, f: FaceId, p: &Point) -> (bool, f64) {
        let site = self.face_site(f);
        let off_side = site
            .as_line()
            .is_some_and(|l| l.signed_dist(p) < 0.0 || !site.in_region(p));
        (off_side, site.distance(p))
    }

    /// Vertex of `f` with the most negative in-circle value for a new point `p`, or else
    /// the edge point of `f` deepest inside the new region.
    fn point_seed(&self, f: FaceId, p: &Point) -> Result<Seed> {
        let best = self
            .g
            .face_edges(f)
            .map(|e| self.g.target(e))
            .filter(|&v| {
                !matches!(
                    self.g.vertex(v).kind,
                    VertexType::Outer | VertexType::EndPoint | VertexType::Split | VertexType::PointSite
                )
            })
            .map(|v| {
                let d = self.g.vertex(v);
                ((d.position - p).norm() - d.dist, v)
            })
            .min_by(|a, b| a.0.total_cmp(&b.0));
        if let Some((h, v)) = best {
            if h < 0.0 {
                return Ok(Seed::Vertex(v));
            }
        }
        self.edge_seed(f, p).ok_or_else(|| NumericError::NoSeed.into())
    }

    /// Minimise the in-circle value over the interior of every splittable edge of `f`:
    /// a coarse scan followed by a golden-section search around the best sample.
    fn edge_seed(&self, f: FaceId, p: &Point) -> Option<Seed> {
        const SAMPLES: usize = 16;
        let site = *self.face_site(f);
        let h = |e: EdgeId, u: f64| {
            let x = self.edge_point_at(e, u);
            (x - p).norm() - site.distance(&x)
        };
        let mut best: Option<(f64, EdgeId, f64)> = None;
        for e in self.g.face_edges(f) {
            if self.g.twin(e).is_none()
                || matches!(
                    self.g.edge(e).kind,
                    EdgeType::NullEdge | EdgeType::LineSite | EdgeType::OutEdge
                )
            {
                continue;
            }
            let Some((i, _)) = (1..SAMPLES)
                .map(|i| (i, h(e, i as f64 / SAMPLES as f64)))
                .min_by(|a, b| a.1.total_cmp(&b.1))
            else {
                continue;
            };
            let (mut lo, mut hi) = ((i - 1) as f64 / SAMPLES as f64, (i + 1) as f64 / SAMPLES as f64);
            let r = 0.5 * (5f64.sqrt() - 1.0);
            for _ in 0..48 {
                let (m1, m2) = (hi - r * (hi - lo), lo + r * (hi - lo));
                if h(e, m1) < h(e, m2) {
                    hi = m2;
                } else {
                    lo = m1;
                }
            }
            let u = 0.5 * (lo + hi);
            let hu = h(e, u);
            if best.map_or(true, |b| hu < b.0) {
                best = Some((hu, e, u));
            }
        }
        let (hu, e, u) = best.filter(|b| b.0 < 0.0)?;
        let x = self.edge_point_at(e, u);
        trace!(edge = %e, h = hu, "point seed on an edge interior");
        Some(Seed::Edge {
            e,
            x,
            dist: site.distance(&x),
        })
    }

    fn point_pass(&mut self, p: Point, seed: Seed) -> Result<(SiteId, Pass)> {
        let (id, face) = self.push_site(Site::point(p), SiteRole::Point, false);
        let v = self.g.add_vertex(VertexData {
            site: Some(id),
            face: Some(face),
            ..VertexData::new(p, VertexType::PointSite, 0.0)
        });
        self.sites[id.0].vertex = Some(v);

        let mut pass = Pass::new(Target::Point(p), vec![id], vec![face]);
        pass.added.push(v);
        let seed = match seed {
            Seed::Vertex(v) => v,
            Seed::Edge { e, x, dist } => {
                // deleted with the rest of the delete set, so it never needs merging
                let s = self.g.add_vertex(VertexData::new(x, VertexType::Split, dist));
                self.g.split_edge(e, s);
                s
            }
        };
        self.mark_in(seed, &mut pass)?;
        self.grow_delete_set(&mut pass)?;
        self.add_new_vertices(&mut pass)?;
        for f in pass.incident.clone() {
            let b = self.face_boundary(f, &pass)?;
            self.repair_with_edge(f, &b, &mut pass)?;
        }
        self.link_new_faces(&pass)?;
        self.split_apexes(&mut pass);
        self.remove_in_vertices(&mut pass);
        self.check_pass()?;
        Ok((id, pass))
    }
}
