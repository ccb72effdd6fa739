//! Generic half-edge graph over arenas of vertex, edge and face records.
//!
//! Purpose
//! - Stable integer ids with twin/next/face links stored as indices, so nothing owns
//!   anything cyclically and ids stay meaningful across a whole insertion pass.
//! - Transactions: while a transaction is open every first write to a pre-existing record
//!   snapshots it into an undo journal. `rollback` restores the snapshots and truncates the
//!   arenas; `commit` drops the journal.
//!
//! Removal never reuses ids: removed vertices and faces leave empty slots, removed edges
//! keep their slot with `valid == false`.
//!
//! References
//! - Code cross-refs: `diagram::VoronoiDiagram`, `diagram::checker`

mod journal;
#[cfg(test)]
mod tests;

use journal::Journal;
use std::fmt;

macro_rules! idx {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

idx!(VertexId);
idx!(EdgeId);
idx!(FaceId);

#[derive(Clone, Debug)]
pub(crate) struct VertexRec<V> {
    data: V,
    out_edges: Vec<EdgeId>,
    in_edges: Vec<EdgeId>,
}

#[derive(Clone, Debug)]
pub(crate) struct EdgeRec<E> {
    data: E,
    source: VertexId,
    target: VertexId,
    twin: Option<EdgeId>,
    next: Option<EdgeId>,
    face: Option<FaceId>,
    valid: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct FaceRec<F> {
    data: F,
    edge: Option<EdgeId>,
}

#[derive(Clone, Debug)]
pub struct HalfEdgeGraph<V, E, F> {
    vertices: Vec<Option<VertexRec<V>>>,
    edges: Vec<EdgeRec<E>>,
    faces: Vec<Option<FaceRec<F>>>,
    journal: Option<Journal<V, E, F>>,
}

impl<V, E, F> Default for HalfEdgeGraph<V, E, F> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            journal: None,
        }
    }
}

impl<V: Clone, E: Clone, F: Clone> HalfEdgeGraph<V, E, F> {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Transactions
    // ---------------------------------------------------------------------

    /// Start recording undo information. Nested transactions are not supported.
    pub fn begin(&mut self) {
        debug_assert!(self.journal.is_none(), "transaction already open");
        self.journal = Some(Journal::new(
            self.vertices.len(),
            self.edges.len(),
            self.faces.len(),
        ));
    }

    /// Keep all changes since `begin`.
    pub fn commit(&mut self) {
        self.journal = None;
    }

    /// Undo all changes since `begin`.
    pub fn rollback(&mut self) {
        if let Some(journal) = self.journal.take() {
            journal.undo(&mut self.vertices, &mut self.edges, &mut self.faces);
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.journal.is_some()
    }

    fn touch_vertex(&mut self, v: VertexId) {
        if let Some(j) = self.journal.as_mut() {
            j.save_vertex(v, &self.vertices);
        }
    }

    fn touch_edge(&mut self, e: EdgeId) {
        if let Some(j) = self.journal.as_mut() {
            j.save_edge(e, &self.edges);
        }
    }

    fn touch_face(&mut self, f: FaceId) {
        if let Some(j) = self.journal.as_mut() {
            j.save_face(f, &self.faces);
        }
    }

    // ---------------------------------------------------------------------
    // Vertices
    // ---------------------------------------------------------------------

    pub fn add_vertex(&mut self, data: V) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(Some(VertexRec {
            data,
            out_edges: Vec::new(),
            in_edges: Vec::new(),
        }));
        id
    }

    fn vrec(&self, v: VertexId) -> &VertexRec<V> {
        match self.vertices.get(v.0) {
            Some(Some(rec)) => rec,
            _ => panic!("{v} is not a live vertex"),
        }
    }

    fn vrec_mut(&mut self, v: VertexId) -> &mut VertexRec<V> {
        self.touch_vertex(v);
        match self.vertices.get_mut(v.0) {
            Some(Some(rec)) => rec,
            _ => panic!("{v} is not a live vertex"),
        }
    }

    pub fn is_live_vertex(&self, v: VertexId) -> bool {
        matches!(self.vertices.get(v.0), Some(Some(_)))
    }

    pub fn vertex(&self, v: VertexId) -> &V {
        &self.vrec(v).data
    }

    pub fn vertex_mut(&mut self, v: VertexId) -> &mut V {
        &mut self.vrec_mut(v).data
    }

    pub fn out_edges(&self, v: VertexId) -> &[EdgeId] {
        &self.vrec(v).out_edges
    }

    pub fn in_edges(&self, v: VertexId) -> &[EdgeId] {
        &self.vrec(v).in_edges
    }

    /// Number of incident half-edges (in + out).
    pub fn degree(&self, v: VertexId) -> usize {
        let r = self.vrec(v);
        r.out_edges.len() + r.in_edges.len()
    }

    /// Neighbours through out-edges, plus sources of twinless in-edges.
    pub fn adjacent_vertices(&self, v: VertexId) -> Vec<VertexId> {
        let r = self.vrec(v);
        let mut out: Vec<VertexId> = r.out_edges.iter().map(|&e| self.edges[e.0].target).collect();
        for &e in &r.in_edges {
            if self.edges[e.0].twin.is_none() {
                out.push(self.edges[e.0].source);
            }
        }
        out
    }

    /// Faces of all incident half-edges, without duplicates.
    pub fn adjacent_faces(&self, v: VertexId) -> Vec<FaceId> {
        let r = self.vrec(v);
        let mut out = Vec::new();
        for &e in r.out_edges.iter().chain(r.in_edges.iter()) {
            if let Some(f) = self.edges[e.0].face {
                if !out.contains(&f) {
                    out.push(f);
                }
            }
        }
        out
    }

    /// Remove `v` and every half-edge incident to it.
    pub fn remove_vertex(&mut self, v: VertexId) {
        let r = self.vrec(v);
        let incident: Vec<EdgeId> = r.out_edges.iter().chain(r.in_edges.iter()).copied().collect();
        for e in incident {
            if self.edges[e.0].valid {
                self.remove_edge(e);
            }
        }
        self.touch_vertex(v);
        self.vertices[v.0] = None;
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_some())
            .map(|(i, _)| VertexId(i))
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.iter().filter(|r| r.is_some()).count()
    }

    // ---------------------------------------------------------------------
    // Edges
    // ---------------------------------------------------------------------

    fn push_edge(&mut self, source: VertexId, target: VertexId, data: E) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(EdgeRec {
            data,
            source,
            target,
            twin: None,
            next: None,
            face: None,
            valid: true,
        });
        self.vrec_mut(source).out_edges.push(id);
        self.vrec_mut(target).in_edges.push(id);
        id
    }

    /// Add two twinned half-edges `source → target` and `target → source` sharing `data`.
    /// The caller links `next` and `face`.
    pub fn add_edge(&mut self, source: VertexId, target: VertexId, data: E) -> (EdgeId, EdgeId) {
        let e1 = self.push_edge(source, target, data.clone());
        let e2 = self.push_edge(target, source, data);
        self.edges[e1.0].twin = Some(e2);
        self.edges[e2.0].twin = Some(e1);
        (e1, e2)
    }

    /// Add a single half-edge without twin (used on the outer boundary).
    pub fn add_half_edge(&mut self, source: VertexId, target: VertexId, data: E) -> EdgeId {
        self.push_edge(source, target, data)
    }

    /// Invalidate one half-edge and drop it from its endpoints' adjacency. The twin is
    /// left alone.
    pub fn remove_edge(&mut self, e: EdgeId) {
        let (s, t) = (self.edges[e.0].source, self.edges[e.0].target);
        if self.is_live_vertex(s) {
            self.vrec_mut(s).out_edges.retain(|&x| x != e);
        }
        if self.is_live_vertex(t) {
            self.vrec_mut(t).in_edges.retain(|&x| x != e);
        }
        self.touch_edge(e);
        self.edges[e.0].valid = false;
    }

    /// Remove `e` and its twin.
    pub fn remove_edge_pair(&mut self, e: EdgeId) {
        let tw = self.edges[e.0].twin;
        self.remove_edge(e);
        if let Some(tw) = tw {
            if self.edges[tw.0].valid {
                self.remove_edge(tw);
            }
        }
    }

    pub fn edge(&self, e: EdgeId) -> &E {
        &self.edges[e.0].data
    }

    pub fn edge_mut(&mut self, e: EdgeId) -> &mut E {
        self.touch_edge(e);
        &mut self.edges[e.0].data
    }

    #[inline]
    pub fn source(&self, e: EdgeId) -> VertexId {
        self.edges[e.0].source
    }

    #[inline]
    pub fn target(&self, e: EdgeId) -> VertexId {
        self.edges[e.0].target
    }

    #[inline]
    pub fn twin(&self, e: EdgeId) -> Option<EdgeId> {
        self.edges[e.0].twin
    }

    #[inline]
    pub fn next(&self, e: EdgeId) -> Option<EdgeId> {
        self.edges[e.0].next
    }

    #[inline]
    pub fn face(&self, e: EdgeId) -> Option<FaceId> {
        self.edges[e.0].face
    }

    #[inline]
    pub fn is_valid(&self, e: EdgeId) -> bool {
        self.edges.get(e.0).is_some_and(|r| r.valid)
    }

    pub fn set_next(&mut self, e: EdgeId, next: EdgeId) {
        self.touch_edge(e);
        self.edges[e.0].next = Some(next);
    }

    pub fn set_face(&mut self, e: EdgeId, f: FaceId) {
        self.touch_edge(e);
        self.edges[e.0].face = Some(f);
    }

    /// First half-edge `v → w`, if any.
    pub fn find_edge(&self, v: VertexId, w: VertexId) -> Option<EdgeId> {
        self.vrec(v)
            .out_edges
            .iter()
            .copied()
            .find(|&e| self.edges[e.0].target == w)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, r)| r.valid)
            .map(|(i, _)| EdgeId(i))
    }

    pub fn num_edges(&self) -> usize {
        self.edges.iter().filter(|r| r.valid).count()
    }

    /// Insert vertex `v` into edge `e: a → b` (and its twin, if any).
    ///
    /// `e` becomes `a → v` and a new half-edge `v → b` follows it on the same face; the twin
    /// `b → a` becomes `b → v` followed by a new `v → a`. Twins are re-paired so that
    /// `a → v` ↔ `v → a` and `v → b` ↔ `b → v`. Returns the two new half-edges.
    pub fn split_edge(&mut self, e: EdgeId, v: VertexId) -> (EdgeId, Option<EdgeId>) {
        let rec = self.edges[e.0].clone();
        let b = rec.target;
        let e2 = self.push_edge(v, b, rec.data.clone());
        self.edges[e2.0].next = rec.next;
        self.edges[e2.0].face = rec.face;
        self.retarget(e, v);
        self.touch_edge(e);
        self.edges[e.0].next = Some(e2);

        let Some(tw) = rec.twin else {
            return (e2, None);
        };
        let trec = self.edges[tw.0].clone();
        let a = trec.target;
        let tw2 = self.push_edge(v, a, trec.data.clone());
        self.edges[tw2.0].next = trec.next;
        self.edges[tw2.0].face = trec.face;
        self.retarget(tw, v);
        self.touch_edge(tw);
        self.edges[tw.0].next = Some(tw2);

        self.edges[e.0].twin = Some(tw2);
        self.edges[tw2.0].twin = Some(e);
        self.edges[tw.0].twin = Some(e2);
        self.edges[e2.0].twin = Some(tw);
        (e2, Some(tw2))
    }

    fn retarget(&mut self, e: EdgeId, v: VertexId) {
        let old = self.edges[e.0].target;
        self.vrec_mut(old).in_edges.retain(|&x| x != e);
        self.vrec_mut(v).in_edges.push(e);
        self.touch_edge(e);
        self.edges[e.0].target = v;
    }

    /// Undo a [`split_edge`](Self::split_edge): remove the degree-4 vertex `v` whose two
    /// in-edges continue (via `next`) into its two out-edges. Returns false and leaves the
    /// graph untouched if `v` does not have that shape.
    pub fn merge_vertex(&mut self, v: VertexId) -> bool {
        let r = self.vrec(v);
        if r.in_edges.len() != 2 || r.out_edges.len() != 2 {
            return false;
        }
        let ins = [r.in_edges[0], r.in_edges[1]];
        let mut pairs = Vec::with_capacity(2);
        for x in ins {
            match self.edges[x.0].next {
                Some(y) if self.edges[y.0].source == v && self.edges[y.0].valid => pairs.push((x, y)),
                _ => return false,
            }
        }
        let (x1, y1) = pairs[0];
        let (x2, y2) = pairs[1];
        if self.edges[x1.0].twin != Some(y2) || self.edges[x2.0].twin != Some(y1) {
            return false;
        }
        for (x, y) in [(x1, y1), (x2, y2)] {
            let (w, nxt, face) = (self.edges[y.0].target, self.edges[y.0].next, self.edges[y.0].face);
            if let Some(f) = face {
                if self.face_edge(f) == Some(y) {
                    self.set_face_edge(f, x);
                }
            }
            self.remove_edge(y);
            self.retarget(x, w);
            self.touch_edge(x);
            self.edges[x.0].next = nxt;
        }
        self.edges[x1.0].twin = Some(x2);
        self.edges[x2.0].twin = Some(x1);
        self.touch_vertex(v);
        self.vertices[v.0] = None;
        true
    }

    // ---------------------------------------------------------------------
    // Faces
    // ---------------------------------------------------------------------

    pub fn add_face(&mut self, data: F) -> FaceId {
        let id = FaceId(self.faces.len());
        self.faces.push(Some(FaceRec { data, edge: None }));
        id
    }

    fn frec(&self, f: FaceId) -> &FaceRec<F> {
        match self.faces.get(f.0) {
            Some(Some(rec)) => rec,
            _ => panic!("{f} is not a live face"),
        }
    }

    pub fn is_live_face(&self, f: FaceId) -> bool {
        matches!(self.faces.get(f.0), Some(Some(_)))
    }

    pub fn face_data(&self, f: FaceId) -> &F {
        &self.frec(f).data
    }

    pub fn face_data_mut(&mut self, f: FaceId) -> &mut F {
        self.touch_face(f);
        match self.faces.get_mut(f.0) {
            Some(Some(rec)) => &mut rec.data,
            _ => panic!("{f} is not a live face"),
        }
    }

    /// Some half-edge on the boundary of `f`.
    pub fn face_edge(&self, f: FaceId) -> Option<EdgeId> {
        self.frec(f).edge
    }

    pub fn set_face_edge(&mut self, f: FaceId, e: EdgeId) {
        self.touch_face(f);
        if let Some(Some(rec)) = self.faces.get_mut(f.0) {
            rec.edge = Some(e);
        }
    }

    /// Lazily walk the boundary of `f` by `next` links, starting at its stored edge.
    pub fn face_edges(&self, f: FaceId) -> FaceEdges<'_, V, E, F> {
        let start = self.frec(f).edge;
        FaceEdges {
            graph: self,
            start,
            current: start,
            steps: 0,
        }
    }

    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_some())
            .map(|(i, _)| FaceId(i))
    }

    pub fn num_faces(&self) -> usize {
        self.faces.iter().filter(|r| r.is_some()).count()
    }

    /// Total number of edge slots (valid or not); an upper bound for cycle walks.
    pub fn edge_capacity(&self) -> usize {
        self.edges.len()
    }
}

/// Iterator over the half-edges of one face. Stops when it returns to the start, when a
/// `next` link is missing, or after visiting more edges than the graph holds.
pub struct FaceEdges<'g, V, E, F> {
    graph: &'g HalfEdgeGraph<V, E, F>,
    start: Option<EdgeId>,
    current: Option<EdgeId>,
    steps: usize,
}

impl<V, E, F> Iterator for FaceEdges<'_, V, E, F> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<EdgeId> {
        let e = self.current?;
        if self.steps > self.graph.edges.len() {
            return None;
        }
        self.steps += 1;
        let nxt = self.graph.edges[e.0].next;
        self.current = match nxt {
            Some(n) if Some(n) != self.start => Some(n),
            _ => None,
        };
        Some(e)
    }
}
