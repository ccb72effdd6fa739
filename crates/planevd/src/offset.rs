//! Per-face offsets: the part of the clearance-`t` curve of a site that lies in its face.
//!
//! The boundary clearance of a face is monotone along each edge, so the boundary crosses
//! level `t` at isolated points. Walking the face counter-clockwise, the offset runs from
//! each crossing where the boundary moves away from the site to the next crossing where it
//! comes back, as an arc around a point site or a straight piece along a line site.

use crate::diagram::VoronoiDiagram;
use crate::graph::{EdgeId, FaceId};
use crate::point::Point;
use crate::site::Ofs;

#[derive(Clone, Debug, PartialEq)]
pub enum FaceOffset {
    /// `t` is at or beyond the largest clearance on the face boundary.
    Empty,
    /// The full circle around a point site fits inside the face.
    Circle { center: Point, radius: f64 },
    /// Offset pieces in boundary order.
    Open(Vec<Ofs>),
}

#[derive(Clone, Copy, Debug)]
struct Crossing {
    p: Point,
    /// Boundary clearance grows through `t` here.
    rising: bool,
}

/// Offset of face `f` at clearance `t > 0`.
pub fn face_offset(vd: &VoronoiDiagram, f: FaceId, t: f64) -> FaceOffset {
    let g = vd.graph();
    let edges: Vec<EdgeId> = g.face_edges(f).collect();
    let dists: Vec<f64> = edges.iter().map(|&e| g.vertex(g.source(e)).dist).collect();
    let hi = dists.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lo = dists.iter().copied().fold(f64::INFINITY, f64::min);
    if edges.is_empty() || t >= hi {
        return FaceOffset::Empty;
    }
    let site = *vd.face_site(f);
    if t < lo {
        return match site.as_point() {
            Some(center) => FaceOffset::Circle { center, radius: t },
            None => FaceOffset::Empty,
        };
    }

    let mut crossings = Vec::new();
    for &e in &edges {
        let ds = g.vertex(g.source(e)).dist;
        let dt = g.vertex(g.target(e)).dist;
        if (ds - t) * (dt - t) >= 0.0 {
            continue;
        }
        let Some(p) = vd
            .point_at_clearance(e, t)
            .or_else(|| vd.edge_point(e, (t - ds) / (dt - ds)))
        else {
            continue;
        };
        crossings.push(Crossing { p, rising: dt > ds });
    }
    let Some(first) = crossings.iter().position(|c| c.rising) else {
        return FaceOffset::Open(Vec::new());
    };
    crossings.rotate_left(first);
    let pieces = crossings
        .chunks(2)
        .filter_map(|pair| match pair {
            [up, down] if up.rising && !down.rising => Some(site.offset_geometry(up.p, down.p)),
            _ => None,
        })
        .collect();
    FaceOffset::Open(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::regular_polygon;

    fn pentagon() -> (VoronoiDiagram, Vec<FaceId>) {
        let mut vd = VoronoiDiagram::new(100.0, 10).unwrap();
        let faces = regular_polygon(5, 50.0, 0.1)
            .into_iter()
            .map(|p| {
                let id = vd.insert_point_site(p).unwrap();
                vd.site_face(id).unwrap()
            })
            .collect();
        (vd, faces)
    }

    fn clearance_range(vd: &VoronoiDiagram, f: FaceId) -> (f64, f64) {
        let g = vd.graph();
        g.face_edges(f)
            .map(|e| g.vertex(g.source(e)).dist)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| (lo.min(d), hi.max(d)))
    }

    #[test]
    fn offset_beyond_narrowest_face_is_empty() {
        let (vd, faces) = pentagon();
        let (f, hi) = faces
            .iter()
            .map(|&f| (f, clearance_range(&vd, f).1))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert_eq!(face_offset(&vd, f, hi * 1.01), FaceOffset::Empty);
    }

    #[test]
    fn small_offset_is_a_circle() {
        let (vd, faces) = pentagon();
        let (lo, _) = clearance_range(&vd, faces[0]);
        match face_offset(&vd, faces[0], 0.5 * lo) {
            FaceOffset::Circle { radius, .. } => assert!((radius - 0.5 * lo).abs() < 1e-12),
            other => panic!("expected a circle, got {other:?}"),
        }
    }

    #[test]
    fn intermediate_offset_arcs_sit_at_clearance() {
        let (vd, faces) = pentagon();
        let f = faces[2];
        let (lo, hi) = clearance_range(&vd, f);
        let t = 0.5 * (lo + hi);
        let FaceOffset::Open(pieces) = face_offset(&vd, f, t) else {
            panic!("expected open pieces");
        };
        assert!(!pieces.is_empty());
        let center = vd.face_site(f).as_point().unwrap();
        for ofs in pieces {
            let Ofs::Arc { radius, .. } = ofs else {
                panic!("point faces offset to arcs");
            };
            assert!((radius - t).abs() < 1e-6 * t.max(1.0));
            for p in [ofs.start(), ofs.end()] {
                assert!(((p - center).norm() - t).abs() < 1e-6 * t.max(1.0));
            }
        }
    }
}
