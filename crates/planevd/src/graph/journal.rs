//! Undo journal for graph transactions.

use super::{EdgeId, EdgeRec, FaceId, FaceRec, VertexId, VertexRec};
use std::collections::HashSet;

/// First-write snapshots of records that existed when the transaction began. Records
/// created inside the transaction are not snapshotted; rollback truncates them away.
#[derive(Clone, Debug)]
pub(super) struct Journal<V, E, F> {
    base_vertices: usize,
    base_edges: usize,
    base_faces: usize,
    vertices: Vec<(VertexId, Option<VertexRec<V>>)>,
    edges: Vec<(EdgeId, EdgeRec<E>)>,
    faces: Vec<(FaceId, Option<FaceRec<F>>)>,
    seen_vertices: HashSet<VertexId>,
    seen_edges: HashSet<EdgeId>,
    seen_faces: HashSet<FaceId>,
}

impl<V: Clone, E: Clone, F: Clone> Journal<V, E, F> {
    pub(super) fn new(base_vertices: usize, base_edges: usize, base_faces: usize) -> Self {
        Self {
            base_vertices,
            base_edges,
            base_faces,
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            seen_vertices: HashSet::new(),
            seen_edges: HashSet::new(),
            seen_faces: HashSet::new(),
        }
    }

    pub(super) fn save_vertex(&mut self, v: VertexId, arena: &[Option<VertexRec<V>>]) {
        if v.0 < self.base_vertices && self.seen_vertices.insert(v) {
            self.vertices.push((v, arena[v.0].clone()));
        }
    }

    pub(super) fn save_edge(&mut self, e: EdgeId, arena: &[EdgeRec<E>]) {
        if e.0 < self.base_edges && self.seen_edges.insert(e) {
            self.edges.push((e, arena[e.0].clone()));
        }
    }

    pub(super) fn save_face(&mut self, f: FaceId, arena: &[Option<FaceRec<F>>]) {
        if f.0 < self.base_faces && self.seen_faces.insert(f) {
            self.faces.push((f, arena[f.0].clone()));
        }
    }

    pub(super) fn undo(
        self,
        vertices: &mut Vec<Option<VertexRec<V>>>,
        edges: &mut Vec<EdgeRec<E>>,
        faces: &mut Vec<Option<FaceRec<F>>>,
    ) {
        vertices.truncate(self.base_vertices);
        edges.truncate(self.base_edges);
        faces.truncate(self.base_faces);
        for (v, rec) in self.vertices {
            vertices[v.0] = rec;
        }
        for (e, rec) in self.edges {
            edges[e.0] = rec;
        }
        for (f, rec) in self.faces {
            faces[f.0] = rec;
        }
    }
}
