//! Face grid: bucketed spatial index over `[-far, far]²` used to seed insertions.
//!
//! Vertices are filed by position; positions outside the square are clamped into the border
//! buckets (the OUTER vertices live far outside it). `nearest` searches rings of buckets
//! around the query until no unsearched ring can hold anything closer than the best hit.

use crate::graph::VertexId;
use crate::point::Point;

#[derive(Clone, Debug)]
pub struct FaceGrid {
    far: f64,
    bins: usize,
    width: f64,
    buckets: Vec<Vec<(VertexId, Point)>>,
}

impl FaceGrid {
    /// Panics if `bins == 0` or `far` is not positive; the diagram validates both first.
    pub fn new(far: f64, bins: usize) -> Self {
        assert!(bins > 0 && far > 0.0, "face grid needs bins > 0 and far > 0");
        Self {
            far,
            bins,
            width: 2.0 * far / bins as f64,
            buckets: vec![Vec::new(); bins * bins],
        }
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    fn cell(&self, p: &Point) -> (usize, usize) {
        let idx = |c: f64| {
            let i = ((c + self.far) / self.width).floor();
            if i.is_nan() || i < 0.0 {
                0
            } else {
                (i as usize).min(self.bins - 1)
            }
        };
        (idx(p.x), idx(p.y))
    }

    #[inline]
    fn slot(&self, (i, j): (usize, usize)) -> usize {
        j * self.bins + i
    }

    pub fn insert(&mut self, v: VertexId, p: Point) {
        let s = self.slot(self.cell(&p));
        self.buckets[s].push((v, p));
    }

    /// Remove `v` filed at `p`; absent ids are ignored.
    pub fn remove(&mut self, v: VertexId, p: &Point) {
        let s = self.slot(self.cell(p));
        self.buckets[s].retain(|&(id, _)| id != v);
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Vertex closest to `p`, or `None` if the grid is empty.
    pub fn nearest(&self, p: &Point) -> Option<VertexId> {
        let (ci, cj) = self.cell(p);
        let mut best: Option<(f64, VertexId)> = None;
        for r in 0..self.bins {
            // everything in ring r is at least (r - 1) bucket widths away
            if let Some((bd, _)) = best {
                if (r as f64 - 1.0) * self.width > bd.sqrt() {
                    break;
                }
            }
            for (i, j) in ring(ci, cj, r, self.bins) {
                for &(v, q) in &self.buckets[self.slot((i, j))] {
                    let d = (q - p).norm_squared();
                    if best.map_or(true, |(bd, _)| d < bd) {
                        best = Some((d, v));
                    }
                }
            }
        }
        best.map(|(_, v)| v)
    }
}

/// Bucket coordinates at Chebyshev distance exactly `r` from `(ci, cj)`, clipped to the grid.
fn ring(ci: usize, cj: usize, r: usize, bins: usize) -> impl Iterator<Item = (usize, usize)> {
    let (ci, cj, r, n) = (ci as isize, cj as isize, r as isize, bins as isize);
    (cj - r..=cj + r).flat_map(move |j| {
        (ci - r..=ci + r).filter_map(move |i| {
            let on_ring = (i - ci).abs() == r || (j - cj).abs() == r;
            (on_ring && (0..n).contains(&i) && (0..n).contains(&j)).then_some((i as usize, j as usize))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn nearest_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut grid = FaceGrid::new(10.0, 8);
        let pts: Vec<Point> = (0..200)
            .map(|_| Point::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)))
            .collect();
        for (i, p) in pts.iter().enumerate() {
            grid.insert(VertexId(i), *p);
        }
        assert_eq!(grid.len(), 200);
        for _ in 0..100 {
            let q = Point::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
            let got = grid.nearest(&q).unwrap();
            let want = (0..pts.len())
                .min_by(|&a, &b| (pts[a] - q).norm().total_cmp(&(pts[b] - q).norm()))
                .unwrap();
            assert!(((pts[got.0] - q).norm() - (pts[want] - q).norm()).abs() < 1e-12);
        }
    }

    #[test]
    fn remove_and_clamp() {
        let mut grid = FaceGrid::new(1.0, 4);
        assert_eq!(grid.nearest(&Point::zeros()), None);
        grid.insert(VertexId(0), Point::new(100.0, -100.0));
        grid.insert(VertexId(1), Point::new(0.1, 0.1));
        assert_eq!(grid.nearest(&Point::new(0.9, -0.9)), Some(VertexId(1)));
        grid.remove(VertexId(1), &Point::new(0.1, 0.1));
        grid.remove(VertexId(5), &Point::new(0.1, 0.1));
        assert_eq!(grid.nearest(&Point::new(-0.9, 0.9)), Some(VertexId(0)));
        assert_eq!(grid.len(), 1);
    }
}
