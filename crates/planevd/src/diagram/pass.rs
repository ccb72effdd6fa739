//! One insertion pass: delete-set growth, NEW vertices, face repair and cleanup.
//!
//! Point and segment insertions share everything here; they differ in the in-circle
//! predicate, in how null edges are split, and in the per-face repair paths, which live in
//! `insert`, `linesite` and `null`.

use super::types::{EdgeData, EdgeType, VertexData, VertexStatus, VertexType};
use super::{Bisector, VoronoiDiagram};
use crate::error::{Result, TopologyError};
use crate::graph::{EdgeId, FaceId, VertexId};
use crate::point::Point;
use crate::site::SiteId;
use crate::solver::{position, EdgeSpan};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::{trace, warn};

/// The site being inserted.
#[derive(Clone, Debug)]
pub(super) enum Target {
    Point(Point),
    Segment(SegTarget),
}

#[derive(Clone, Debug)]
pub(super) struct SegTarget {
    /// Position in the segment registry.
    pub index: usize,
    pub a: SiteId,
    pub b: SiteId,
    pub pa: Point,
    pub pb: Point,
    /// Null face at each endpoint before the insertion started.
    pub had_null: [Option<FaceId>; 2],
    /// ENDPOINT vertices created by the repair, one per end.
    pub endpoints: [Option<VertexId>; 2],
}

impl SegTarget {
    /// Unit direction `a → b`.
    pub fn dir(&self) -> Point {
        (self.pb - self.pa).normalize()
    }

    /// Which end `p` sits at, by exact position.
    pub fn end_of(&self, p: &Point) -> Option<usize> {
        if *p == self.pa {
            Some(0)
        } else if *p == self.pb {
            Some(1)
        } else {
            None
        }
    }

    /// Direction of the segment leaving end `end`.
    pub fn dir_from(&self, end: usize) -> Point {
        if end == 0 {
            self.dir()
        } else {
            -self.dir()
        }
    }

    pub fn end_point(&self, end: usize) -> Point {
        if end == 0 {
            self.pa
        } else {
            self.pb
        }
    }

    pub fn end_site(&self, end: usize) -> SiteId {
        if end == 0 {
            self.a
        } else {
            self.b
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Queued {
    key: f64,
    v: VertexId,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Queued {}
impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| other.v.cmp(&self.v))
    }
}

/// Where the IN chain of a face starts and ends.
#[derive(Clone, Copy, Debug)]
pub(super) struct Boundary {
    /// NEW vertex entering the IN chain, and the face edge arriving at it.
    pub v1: VertexId,
    pub v1_prv: EdgeId,
    /// NEW vertex leaving the IN chain, and the face edge departing from it.
    pub v2: VertexId,
    pub v2_nxt: EdgeId,
}

/// Transient state of one insertion; dropped when the insertion ends.
#[derive(Debug)]
pub(super) struct Pass {
    pub target: Target,
    /// New site(s): the point, or the `[pos, neg]` sides of a segment.
    pub sites: Vec<SiteId>,
    pub faces: Vec<FaceId>,
    status: HashMap<VertexId, VertexStatus>,
    queue: BinaryHeap<Queued>,
    queued: HashSet<VertexId>,
    pub in_set: Vec<VertexId>,
    pub incident: Vec<FaceId>,
    /// Side of the inserted segment each NEW vertex borders.
    pub k3: HashMap<VertexId, f64>,
    /// Half-edges created during repair.
    pub created: Vec<EdgeId>,
    pub apex_candidates: Vec<EdgeId>,
    pub splits: Vec<VertexId>,
    pub added: Vec<VertexId>,
    pub removed: Vec<(VertexId, Point)>,
}

impl Pass {
    pub fn new(target: Target, sites: Vec<SiteId>, faces: Vec<FaceId>) -> Self {
        Self {
            target,
            sites,
            faces,
            status: HashMap::new(),
            queue: BinaryHeap::new(),
            queued: HashSet::new(),
            in_set: Vec::new(),
            incident: Vec::new(),
            k3: HashMap::new(),
            created: Vec::new(),
            apex_candidates: Vec::new(),
            splits: Vec::new(),
            added: Vec::new(),
            removed: Vec::new(),
        }
    }

    #[inline]
    pub fn status(&self, v: VertexId) -> VertexStatus {
        self.status.get(&v).copied().unwrap_or_default()
    }

    #[inline]
    pub fn set(&mut self, v: VertexId, s: VertexStatus) {
        self.status.insert(v, s);
    }

    fn push(&mut self, v: VertexId, key: f64) {
        if self.queued.insert(v) {
            self.queue.push(Queued { key, v });
        }
    }

    fn pop(&mut self) -> Option<VertexId> {
        self.queue.pop().map(|q| q.v)
    }

    /// Index into `sites`/`faces` for side `k3`.
    #[inline]
    fn side(&self, k3: f64) -> usize {
        if k3 < 0.0 && self.sites.len() > 1 {
            1
        } else {
            0
        }
    }

    pub fn site_for(&self, k3: f64) -> SiteId {
        self.sites[self.side(k3)]
    }

    pub fn face_for(&self, k3: f64) -> FaceId {
        self.faces[self.side(k3)]
    }

    pub fn k3_of(&self, v: VertexId) -> f64 {
        self.k3.get(&v).copied().unwrap_or(1.0)
    }

    pub fn segment(&self) -> Option<&SegTarget> {
        match &self.target {
            Target::Segment(s) => Some(s),
            Target::Point(_) => None,
        }
    }

    pub fn segment_mut(&mut self) -> Option<&mut SegTarget> {
        match &mut self.target {
            Target::Segment(s) => Some(s),
            Target::Point(_) => None,
        }
    }
}

impl VoronoiDiagram {
    /// Signed in-circle value of `v` for the site being inserted; negative means the new
    /// site is closer than `v`'s own sites. `None` marks vertices that always stay.
    pub(super) fn in_circle(&self, v: VertexId, pass: &Pass) -> Option<f64> {
        match &pass.target {
            Target::Point(p) => {
                let d = self.g.vertex(v);
                match d.kind {
                    VertexType::Outer
                    | VertexType::EndPoint
                    | VertexType::Split
                    | VertexType::PointSite => None,
                    _ => Some((d.position - p).norm() - d.dist),
                }
            }
            Target::Segment(seg) => self.segment_in_circle(v, seg),
        }
    }

    /// Two or more IN neighbours: adding `v` would close a cycle in the delete set.
    fn c4(&self, v: VertexId, pass: &Pass) -> bool {
        self.g
            .adjacent_vertices(v)
            .into_iter()
            .filter(|&w| pass.status(w) == VertexStatus::In)
            .count()
            >= 2
    }

    /// On every incident face around `v`, one of `v`'s neighbours along that face is IN,
    /// so each face keeps a single connected IN chain.
    fn c5(&self, v: VertexId, pass: &Pass) -> bool {
        for f in self.g.adjacent_faces(v) {
            if !pass.incident.contains(&f) {
                continue;
            }
            let outs = self
                .g
                .out_edges(v)
                .iter()
                .filter(|&&e| self.g.face(e) == Some(f))
                .map(|&e| self.g.target(e));
            let ins = self
                .g
                .in_edges(v)
                .iter()
                .filter(|&&e| self.g.face(e) == Some(f))
                .map(|&e| self.g.source(e));
            if !outs.chain(ins).any(|w| pass.status(w) == VertexStatus::In) {
                return false;
            }
        }
        true
    }

    /// Mark `v` IN, make its faces incident and queue its undecided neighbours.
    pub(super) fn mark_in(&mut self, v: VertexId, pass: &mut Pass) -> Result<()> {
        pass.set(v, VertexStatus::In);
        pass.in_set.push(v);
        for f in self.g.adjacent_faces(v) {
            if !pass.incident.contains(&f) {
                pass.incident.push(f);
                self.on_incident(f, pass)?;
            }
        }
        for w in self.g.adjacent_vertices(v) {
            if pass.status(w) == VertexStatus::Undecided {
                let key = self.in_circle(w, pass).map_or(f64::INFINITY, f64::abs);
                pass.push(w, key);
            }
        }
        Ok(())
    }

    /// Grow the delete set from the already-marked seed(s), most certain vertices first.
    pub(super) fn grow_delete_set(&mut self, pass: &mut Pass) -> Result<()> {
        while let Some(v) = pass.pop() {
            if pass.status(v) != VertexStatus::Undecided || !self.g.is_live_vertex(v) {
                continue;
            }
            let h = self.in_circle(v, pass);
            let inside = matches!(h, Some(h) if h < 0.0) && !self.c4(v, pass) && self.c5(v, pass);
            trace!(vertex = %v, ?h, inside, "classified vertex");
            if inside {
                self.mark_in(v, pass)?;
            } else {
                pass.set(v, VertexStatus::Out);
            }
        }
        Ok(())
    }

    /// Put a NEW vertex on every edge leaving the delete set.
    pub(super) fn add_new_vertices(&mut self, pass: &mut Pass) -> Result<()> {
        let mut crossing = Vec::new();
        for &v in &pass.in_set {
            for &e in self.g.out_edges(v) {
                if pass.status(self.g.target(e)) != VertexStatus::In {
                    crossing.push(e);
                }
            }
        }
        for e in crossing {
            let nv = if self.g.edge(e).kind == EdgeType::NullEdge {
                self.null_edge_vertex(e, pass)?
            } else {
                self.positioned_vertex(e, pass)?
            };
            self.g.split_edge(e, nv);
            pass.set(nv, VertexStatus::New);
        }
        Ok(())
    }

    fn positioned_vertex(&mut self, e: EdgeId, pass: &mut Pass) -> Result<VertexId> {
        let (Some(tw), Some(f1)) = (self.g.twin(e), self.g.face(e)) else {
            return Err(TopologyError::FaceBoundary {
                reason: format!("{e} leaves the delete set without a twin"),
            }
            .into());
        };
        let Some(f2) = self.g.face(tw) else {
            return Err(TopologyError::FaceBoundary {
                reason: format!("twin of {e} has no face"),
            }
            .into());
        };
        let src = self.g.vertex(self.g.source(e));
        let trg = self.g.vertex(self.g.target(e));
        let span = EdgeSpan {
            id: e,
            s1: self.face_site(f1),
            s2: self.face_site(f2),
            src: src.position,
            src_dist: src.dist,
            trg: trg.position,
            trg_dist: trg.dist,
            geom: self.g.edge(e).geom,
        };
        let news: Vec<_> = pass.sites.iter().map(|s| &self.sites[s.0].site).collect();
        let sol = position(&span, &news, &self.cfg)?;
        let nv = self
            .g
            .add_vertex(VertexData::new(sol.p, VertexType::Normal, sol.t));
        pass.k3.insert(nv, sol.k3);
        pass.added.push(nv);
        trace!(vertex = %nv, edge = %e, t = sol.t, k3 = sol.k3, "positioned NEW vertex");
        Ok(nv)
    }

    /// Locate the unique NEW→IN and IN→NEW steps on the cycle of `f`.
    pub(super) fn face_boundary(&self, f: FaceId, pass: &Pass) -> Result<Boundary> {
        let cycle: Vec<EdgeId> = self.g.face_edges(f).collect();
        let n = cycle.len();
        let mut enter = None;
        let mut leave = None;
        for (i, &e) in cycle.iter().enumerate() {
            let (s, t) = (self.g.source(e), self.g.target(e));
            match (pass.status(s), pass.status(t)) {
                (VertexStatus::New, VertexStatus::In) => {
                    if enter.replace((s, cycle[(i + n - 1) % n])).is_some() {
                        return Err(boundary_err(f, "delete set enters the face twice"));
                    }
                }
                (VertexStatus::In, VertexStatus::New) => {
                    let nxt = self
                        .g
                        .next(e)
                        .ok_or_else(|| boundary_err(f, "face cycle is open"))?;
                    if leave.replace((t, nxt)).is_some() {
                        return Err(boundary_err(f, "delete set leaves the face twice"));
                    }
                }
                _ => {}
            }
        }
        match (enter, leave) {
            (Some((v1, v1_prv)), Some((v2, v2_nxt))) => Ok(Boundary {
                v1,
                v1_prv,
                v2,
                v2_nxt,
            }),
            _ => Err(boundary_err(f, "no NEW vertex pair on the face")),
        }
    }

    /// Add a twinned edge `src → trg` on face `f`, with its twin on `twin_face`.
    pub(super) fn add_repair_edge(
        &mut self,
        src: VertexId,
        trg: VertexId,
        f: FaceId,
        twin_face: FaceId,
        data: EdgeData,
        pass: &mut Pass,
    ) -> (EdgeId, EdgeId) {
        let (e, tw) = self.g.add_edge(src, trg, data);
        self.g.set_face(e, f);
        self.g.set_face(tw, twin_face);
        pass.created.push(e);
        pass.created.push(tw);
        if matches!(data.kind, EdgeType::Line | EdgeType::Parabola) {
            pass.apex_candidates.push(e);
        }
        (e, tw)
    }

    /// Route the cycle of `f` through `path` instead of the IN chain.
    pub(super) fn splice(&mut self, f: FaceId, b: &Boundary, path: &[EdgeId]) {
        let Some((&first, _)) = path.split_first() else {
            return;
        };
        self.g.set_next(b.v1_prv, first);
        for w in path.windows(2) {
            self.g.set_next(w[0], w[1]);
        }
        self.g.set_next(path[path.len() - 1], b.v2_nxt);
        self.g.set_face_edge(f, first);
    }

    /// The bisector between the site of `f` and the new site on side `k3`, as edge data
    /// running from `pa` to `pb`.
    pub(super) fn bisector_data(&self, f: FaceId, k3: f64, pa: &Point, pb: &Point, pass: &Pass) -> EdgeData {
        let new_site = &self.sites[pass.site_for(k3).0].site;
        let (kind, geom) = Bisector::between(self.face_site(f), new_site);
        EdgeData::new(kind, geom.oriented(pa, pb))
    }

    /// Single-edge repair: `v1 → v2` on `f`, twin on the new face of `v1`'s side.
    pub(super) fn repair_with_edge(&mut self, f: FaceId, b: &Boundary, pass: &mut Pass) -> Result<()> {
        let (k1, k2) = (pass.k3_of(b.v1), pass.k3_of(b.v2));
        if k1 != k2 {
            return Err(TopologyError::SideMismatch.into());
        }
        let data = self.bisector_data(f, k1, &self.vpos(b.v1), &self.vpos(b.v2), pass);
        let nf = pass.face_for(k1);
        let (e, _) = self.add_repair_edge(b.v1, b.v2, f, nf, data, pass);
        self.splice(f, b, &[e]);
        Ok(())
    }

    /// Close the cycles of the new face(s) from the half-edges placed on them.
    pub(super) fn link_new_faces(&mut self, pass: &Pass) -> Result<()> {
        for &nf in &pass.faces {
            let edges: Vec<EdgeId> = pass
                .created
                .iter()
                .copied()
                .filter(|&e| self.g.is_valid(e) && self.g.face(e) == Some(nf))
                .collect();
            let open = |reason: String| TopologyError::OpenFaceCycle { reason };
            let Some(&start) = edges.first() else {
                return Err(open(format!("{nf} received no edges")).into());
            };
            let mut by_source = HashMap::with_capacity(edges.len());
            for &e in &edges {
                if by_source.insert(self.g.source(e), e).is_some() {
                    return Err(open(format!("{nf} has two edges leaving {}", self.g.source(e))).into());
                }
            }
            for &e in &edges {
                let t = self.g.target(e);
                let nx = *by_source
                    .get(&t)
                    .ok_or_else(|| open(format!("{nf} has no edge leaving {t}")))?;
                self.g.set_next(e, nx);
            }
            let mut cur = start;
            let mut steps = 0;
            loop {
                cur = self.g.next(cur).unwrap_or(start);
                steps += 1;
                if cur == start || steps > edges.len() {
                    break;
                }
            }
            if steps != edges.len() {
                return Err(open(format!("{nf} splits into several cycles")).into());
            }
            self.g.set_face_edge(nf, start);
        }
        Ok(())
    }

    /// Split new point-point and point-line edges that pass through their bisector's apex.
    pub(super) fn split_apexes(&mut self, pass: &mut Pass) {
        for e in std::mem::take(&mut pass.apex_candidates) {
            let data = *self.g.edge(e);
            let (ps, pt) = (self.vpos(self.g.source(e)), self.vpos(self.g.target(e)));
            let (Some(a), Some(b)) = (data.geom.along(&ps), data.geom.along(&pt)) else {
                continue;
            };
            let tiny = 1e-12 * (a.abs() + b.abs()).max(1.0);
            if a * b >= 0.0 || a.abs() <= tiny || b.abs() <= tiny {
                continue;
            }
            let Some((pa, ta)) = data.geom.apex() else {
                continue;
            };
            let av = self.g.add_vertex(VertexData::new(pa, VertexType::Apex, ta));
            let tw = self.g.twin(e);
            let (e2, tw2) = self.g.split_edge(e, av);
            let head = EdgeData::new(data.kind, data.geom.oriented(&ps, &pa));
            let tail = EdgeData::new(data.kind, data.geom.oriented(&pa, &pt));
            *self.g.edge_mut(e) = head;
            *self.g.edge_mut(e2) = tail;
            if let (Some(tw), Some(tw2)) = (tw, tw2) {
                *self.g.edge_mut(tw2) = head;
                *self.g.edge_mut(tw) = tail;
            }
            pass.added.push(av);
            trace!(vertex = %av, edge = %e, "apex split");
        }
    }

    /// Physically remove the delete set.
    pub(super) fn remove_in_vertices(&mut self, pass: &mut Pass) {
        for &v in &pass.in_set {
            if !self.g.is_live_vertex(v) {
                continue;
            }
            let d = self.g.vertex(v);
            if Self::in_grid(d) {
                pass.removed.push((v, d.position));
            }
            self.g.remove_vertex(v);
        }
    }

    /// Merge surviving SPLIT vertices back into their edges.
    pub(super) fn merge_splits(&mut self, pass: &Pass) {
        for &s in &pass.splits {
            if self.g.is_live_vertex(s) && !self.g.merge_vertex(s) {
                warn!(vertex = %s, "split vertex could not be merged");
            }
        }
    }

    /// Optional checker run, before commit.
    pub(super) fn check_pass(&self) -> Result<()> {
        if self.cfg.check_each_insert {
            let report = self.check_report();
            if !report.is_ok() {
                return Err(TopologyError::CheckFailed(report).into());
            }
        }
        Ok(())
    }

    /// Mirror a committed pass into the face grid.
    pub(super) fn update_grid(&mut self, pass: &Pass) {
        for (v, p) in &pass.removed {
            self.grid.remove(*v, p);
        }
        for &v in &pass.added {
            if self.g.is_live_vertex(v) {
                let d = self.g.vertex(v);
                if Self::in_grid(d) {
                    let p = d.position;
                    self.grid.insert(v, p);
                }
            }
        }
    }
}

fn boundary_err(f: FaceId, reason: &str) -> crate::error::VdError {
    TopologyError::FaceBoundary {
        reason: format!("{f}: {reason}"),
    }
    .into()
}
