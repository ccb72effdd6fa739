//! Incremental generalized Voronoi diagram of point and segment sites.
//!
//! Purpose
//! - Own the half-edge graph, the site table, the face grid and the tolerances, and keep the
//!   diagram valid after every single-site insertion.
//! - Each insertion runs as one [`Pass`](pass::Pass) inside a graph transaction: seed, grow
//!   the delete set, position NEW vertices, repair the incident faces, link the new face(s),
//!   split apexes, drop the delete set. Any error rolls the transaction back.
//!
//! Layout
//! - `types`: vertex/edge/face records. `edge`: bisector geometry.
//! - `pass`: machinery shared by point and segment insertion.
//! - `insert`: point sites. `linesite` + `null`: segment sites, splits and null faces.
//! - `checker`: invariant verification. `queries`: the read-only surface.
//!
//! Initial diagram
//! - Three generator point sites at radius `3·far` and one NORMAL vertex at the origin,
//!   three APEX vertices at the generator midpoints and three OUTER vertices at radius
//!   `18·far` joined by twinless OUTEDGEs. All user sites lie strictly inside `far`.
//!
//! References
//! - Code cross-refs: `graph::HalfEdgeGraph`, `solver::position`, `grid::FaceGrid`

mod checker;
mod edge;
mod insert;
mod linesite;
mod null;
mod pass;
mod queries;
mod types;

pub use checker::CheckReport;
pub use edge::Bisector;
pub use queries::{EdgeView, FaceView, VertexView};
pub use types::{EdgeData, EdgeType, FaceData, VdGraph, VertexData, VertexStatus, VertexType};

use crate::cfg::VdCfg;
use crate::error::{InputError, Result};
use crate::graph::{EdgeId, FaceId, VertexId};
use crate::grid::FaceGrid;
use crate::point::Point;
use crate::site::{Site, SiteId};
use tracing::debug;

/// What a row of the site table stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SiteRole {
    /// One of the three far-away sites of the initial diagram.
    Generator,
    /// A user point site.
    Point,
    /// One side of user segment `i`.
    Segment(usize),
    /// The degenerate site of a null face.
    Null,
}

#[derive(Clone, Debug)]
pub(crate) struct SiteRec {
    pub site: Site,
    pub role: SiteRole,
    pub face: FaceId,
    /// POINTSITE vertex of a user point site.
    pub vertex: Option<VertexId>,
}

/// A user segment and the two oriented sites that represent it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub a: SiteId,
    pub b: SiteId,
    /// Site of the face left of `a → b`.
    pub pos: SiteId,
    pub neg: SiteId,
}

/// Registry sizes captured before an insertion, for rollback.
#[derive(Clone, Copy, Debug)]
struct Mark {
    sites: usize,
    segments: usize,
}

#[derive(Clone, Debug)]
pub struct VoronoiDiagram {
    g: VdGraph,
    sites: Vec<SiteRec>,
    segments: Vec<Segment>,
    grid: FaceGrid,
    cfg: VdCfg,
    far: f64,
}

impl VoronoiDiagram {
    /// Empty diagram for sites strictly inside the disk of radius `far`, with a
    /// `bins × bins` face grid.
    pub fn new(far: f64, bins: usize) -> Result<Self> {
        Self::with_cfg(far, bins, VdCfg::default())
    }

    pub fn with_cfg(far: f64, bins: usize, cfg: VdCfg) -> Result<Self> {
        if !(far.is_finite() && far > 0.0) {
            return Err(InputError::InvalidConfig {
                reason: format!("far radius must be positive and finite, got {far}"),
            }
            .into());
        }
        if bins == 0 {
            return Err(InputError::InvalidConfig {
                reason: "grid needs at least one bin".into(),
            }
            .into());
        }
        cfg.validate()?;
        let mut vd = Self {
            g: VdGraph::new(),
            sites: Vec::new(),
            segments: Vec::new(),
            grid: FaceGrid::new(far, bins),
            cfg,
            far,
        };
        vd.initialize();
        debug!(far, bins, "initialized voronoi diagram");
        Ok(vd)
    }

    fn initialize(&mut self) {
        let r = self.far;
        let polar = |radius: f64, deg: f64| {
            let a = deg.to_radians();
            Point::new(radius * a.cos(), radius * a.sin())
        };
        let gens = [polar(3.0 * r, 90.0), polar(3.0 * r, 210.0), polar(3.0 * r, 330.0)];
        let faces: Vec<FaceId> = gens
            .iter()
            .map(|p| self.push_site(Site::point(*p), SiteRole::Generator, false).1)
            .collect();

        // pair k is the generator pair opposite generator k
        let pair = |k: usize| ((k + 1) % 3, (k + 2) % 3);
        let center = self
            .g
            .add_vertex(VertexData::new(Point::zeros(), VertexType::Normal, 3.0 * r));
        let mut apex = [center; 3];
        let mut outer = [center; 3];
        for (k, deg) in [270.0, 30.0, 150.0].into_iter().enumerate() {
            let (i, j) = pair(k);
            let mid = (gens[i] + gens[j]) * 0.5;
            apex[k] = self.g.add_vertex(VertexData::new(
                mid,
                VertexType::Apex,
                (gens[i] - gens[j]).norm() * 0.5,
            ));
            let o = polar(18.0 * r, deg);
            outer[k] = self
                .g
                .add_vertex(VertexData::new(o, VertexType::Outer, (o - gens[i]).norm()));
        }

        let mut spoke = Vec::with_capacity(3);
        let mut ray = Vec::with_capacity(3);
        let mut rim = Vec::with_capacity(3);
        for k in 0..3 {
            let (i, j) = pair(k);
            let (_, bis) = Bisector::between(&self.sites[i].site, &self.sites[j].site);
            let pc = self.g.vertex(center).position;
            let pa = self.g.vertex(apex[k]).position;
            let po = self.g.vertex(outer[k]).position;
            spoke.push(self.g.add_edge(
                center,
                apex[k],
                EdgeData::new(EdgeType::Line, bis.oriented(&pc, &pa)),
            ));
            ray.push(self.g.add_edge(
                apex[k],
                outer[k],
                EdgeData::new(EdgeType::Line, bis.oriented(&pa, &po)),
            ));
        }
        for k in 0..3 {
            rim.push(self.g.add_half_edge(
                outer[k],
                outer[(k + 1) % 3],
                EdgeData::straight(EdgeType::OutEdge),
            ));
        }
        for (j, &f) in faces.iter().enumerate() {
            let (k1, k2) = ((j + 1) % 3, (j + 2) % 3);
            let cycle = [spoke[k1].0, ray[k1].0, rim[k1], ray[k2].1, spoke[k2].1];
            for (n, &e) in cycle.iter().enumerate() {
                self.g.set_face(e, f);
                self.g.set_next(e, cycle[(n + 1) % cycle.len()]);
            }
            self.g.set_face_edge(f, cycle[0]);
        }

        for v in std::iter::once(center).chain(apex).chain(outer) {
            let p = self.g.vertex(v).position;
            self.grid.insert(v, p);
        }
    }

    /// Append a site with a fresh face.
    fn push_site(&mut self, site: Site, role: SiteRole, null: bool) -> (SiteId, FaceId) {
        let id = SiteId(self.sites.len());
        let face = self.g.add_face(FaceData { site: id, null });
        self.sites.push(SiteRec {
            site,
            role,
            face,
            vertex: None,
        });
        (id, face)
    }

    fn mark(&self) -> Mark {
        Mark {
            sites: self.sites.len(),
            segments: self.segments.len(),
        }
    }

    /// Undo an open insertion: graph journal plus registries. The grid is only touched
    /// after commit and needs no restoring.
    fn restore(&mut self, mark: Mark) {
        self.g.rollback();
        self.sites.truncate(mark.sites);
        self.segments.truncate(mark.segments);
    }

    pub fn cfg(&self) -> &VdCfg {
        &self.cfg
    }

    pub fn far_radius(&self) -> f64 {
        self.far
    }

    /// Read-only access to the underlying half-edge graph.
    pub fn graph(&self) -> &VdGraph {
        &self.g
    }

    pub fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.get(id.0).map(|r| &r.site)
    }

    /// Face owned by site `id`.
    pub fn site_face(&self, id: SiteId) -> Option<FaceId> {
        self.sites.get(id.0).map(|r| r.face)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub(crate) fn face_site(&self, f: FaceId) -> &Site {
        &self.sites[self.g.face_data(f).site.0].site
    }

    #[inline]
    fn vpos(&self, v: VertexId) -> Point {
        self.g.vertex(v).position
    }

    /// Vertices tracked by the face grid: everything except null and split vertices.
    fn in_grid(d: &VertexData) -> bool {
        !d.is_null() && d.kind != VertexType::Split
    }

    /// Point on edge `e` at clearance `t` interpolated between its end clearances by `u`.
    fn edge_point_at(&self, e: EdgeId, u: f64) -> Point {
        let s = self.g.vertex(self.g.source(e));
        let t = self.g.vertex(self.g.target(e));
        let clearance = s.dist + (t.dist - s.dist) * u;
        self.g
            .edge(e)
            .geom
            .point_at(clearance)
            .unwrap_or_else(|| s.position + (t.position - s.position) * u)
    }
}
