use super::*;

type G = HalfEdgeGraph<u32, &'static str, u8>;

/// Triangle a → b → c with an inner face (0) and an outer face (1).
fn triangle() -> (G, [VertexId; 3], FaceId, FaceId) {
    let mut g = G::new();
    let a = g.add_vertex(0);
    let b = g.add_vertex(1);
    let c = g.add_vertex(2);
    let inner = g.add_face(0);
    let outer = g.add_face(1);
    let (ab, ba) = g.add_edge(a, b, "ab");
    let (bc, cb) = g.add_edge(b, c, "bc");
    let (ca, ac) = g.add_edge(c, a, "ca");
    for (e, n) in [(ab, bc), (bc, ca), (ca, ab)] {
        g.set_next(e, n);
        g.set_face(e, inner);
    }
    for (e, n) in [(ba, ac), (ac, cb), (cb, ba)] {
        g.set_next(e, n);
        g.set_face(e, outer);
    }
    g.set_face_edge(inner, ab);
    g.set_face_edge(outer, ba);
    (g, [a, b, c], inner, outer)
}

#[test]
fn face_walk_and_twins() {
    let (g, [a, b, _c], inner, outer) = triangle();
    let cycle: Vec<EdgeId> = g.face_edges(inner).collect();
    assert_eq!(cycle.len(), 3);
    assert_eq!(g.face_edges(outer).count(), 3);
    for e in g.edge_ids() {
        let tw = g.twin(e).unwrap();
        assert_eq!(g.twin(tw), Some(e));
        assert_eq!(g.source(tw), g.target(e));
    }
    assert_eq!(g.degree(a), 4);
    let mut adj = g.adjacent_vertices(a);
    adj.sort();
    assert_eq!(adj.len(), 2);
    assert!(g.find_edge(a, b).is_some());
    // restartable
    let again: Vec<EdgeId> = g.face_edges(inner).collect();
    assert_eq!(cycle, again);
}

#[test]
fn split_then_merge_restores_cycle() {
    let (mut g, [a, b, _c], inner, outer) = triangle();
    let ab = g.find_edge(a, b).unwrap();
    let m = g.add_vertex(9);
    let (mb, ma) = g.split_edge(ab, m);
    let ma = ma.unwrap();
    assert_eq!(g.target(ab), m);
    assert_eq!(g.source(mb), m);
    assert_eq!(g.target(mb), b);
    assert_eq!(g.twin(ab), Some(ma));
    assert_eq!(g.degree(m), 4);
    assert_eq!(g.face_edges(inner).count(), 4);
    assert_eq!(g.face_edges(outer).count(), 4);
    for e in g.edge_ids() {
        assert_eq!(g.face(g.next(e).unwrap()), g.face(e));
    }

    assert!(g.merge_vertex(m));
    assert!(!g.is_live_vertex(m));
    assert_eq!(g.target(ab), b);
    assert_eq!(g.face_edges(inner).count(), 3);
    assert_eq!(g.face_edges(outer).count(), 3);
    assert_eq!(g.num_edges(), 6);
}

#[test]
fn rollback_restores_previous_state() {
    let (mut g, [a, b, c], inner, _outer) = triangle();
    let before: Vec<EdgeId> = g.face_edges(inner).collect();
    g.begin();
    let ab = g.find_edge(a, b).unwrap();
    let m = g.add_vertex(7);
    g.split_edge(ab, m);
    *g.vertex_mut(c) = 42;
    g.remove_vertex(c);
    g.add_face(3);
    g.rollback();
    assert!(!g.in_transaction());
    assert_eq!(g.num_vertices(), 3);
    assert_eq!(g.num_faces(), 2);
    assert_eq!(*g.vertex(c), 2);
    assert_eq!(g.degree(c), 4);
    assert_eq!(g.face_edges(inner).collect::<Vec<_>>(), before);
    assert_eq!(g.num_edges(), 6);
}

#[test]
fn commit_keeps_changes_and_twinless_edges_count_once() {
    let mut g = G::new();
    let a = g.add_vertex(0);
    let b = g.add_vertex(1);
    g.begin();
    let e = g.add_half_edge(a, b, "out");
    g.commit();
    assert_eq!(g.twin(e), None);
    assert_eq!(g.degree(a), 1);
    assert_eq!(g.adjacent_vertices(b), vec![a]);
    g.remove_edge(e);
    assert!(!g.is_valid(e));
    assert_eq!(g.num_edges(), 0);
}
