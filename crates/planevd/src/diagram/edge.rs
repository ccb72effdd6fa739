//! Edge geometry: bisector curves parameterized by clearance `t`.
//!
//! Every curved or straight bisector is evaluated by the clearance of the point sought, so
//! an edge between vertices with clearances `t0` and `t1` is the image of `[t0, t1]`. Edges
//! never contain their apex in the interior (an APEX vertex splits them), which keeps the
//! branch `sign` constant along an edge.

use super::types::EdgeType;
use crate::point::{Point, PointExt};
use crate::site::Site;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bisector {
    /// `mid + sign·dir·√(t² − half²)`.
    PointPoint {
        mid: Point,
        dir: Point,
        half: f64,
        sign: f64,
    },
    /// Parabola with focus at distance `d` from the line, on the side of unit normal `n`:
    /// `foot + n·t + sign·u·√(d(2t − d))`.
    PointLine {
        foot: Point,
        n: Point,
        u: Point,
        d: f64,
        sign: f64,
    },
    /// `origin + t·dir`.
    LineLine { origin: Point, dir: Point },
    /// Parallel line sites: constant clearance, no clearance parameterization.
    Parallel,
    /// Separator from a segment endpoint: `origin + t·dir`.
    Ray { origin: Point, dir: Point },
    /// Null, line-site and outer edges.
    Straight,
}

impl Bisector {
    /// Bisector of two adjacent sites, with the branch still undecided.
    pub fn between(s1: &Site, s2: &Site) -> (EdgeType, Bisector) {
        match (s1, s2) {
            (Site::Point(a), Site::Point(b)) => {
                let d = b.p - a.p;
                let bis = Bisector::PointPoint {
                    mid: (a.p + b.p) * 0.5,
                    dir: d.normalize().rot90(),
                    half: d.norm() * 0.5,
                    sign: 1.0,
                };
                (EdgeType::Line, bis)
            }
            (Site::Point(p), Site::Line(l)) | (Site::Line(l), Site::Point(p)) => {
                let n = l.side_normal();
                if l.has_endpoint(&p.p) {
                    return (EdgeType::Separator, Bisector::Ray { origin: p.p, dir: n });
                }
                let d = l.signed_dist(&p.p);
                let (n, d) = if d < 0.0 { (-n, -d) } else { (n, d) };
                let bis = Bisector::PointLine {
                    foot: p.p - n * d,
                    n,
                    u: n.rot90(),
                    d,
                    sign: 1.0,
                };
                (EdgeType::Parabola, bis)
            }
            (Site::Line(l1), Site::Line(l2)) => {
                let n1 = l1.side_normal();
                let n2 = l2.side_normal();
                let (c1, c2) = (l1.k * l1.c, l2.k * l2.c);
                let det = n1.perp(&n2);
                if det.abs() < 1e-12 {
                    return (EdgeType::ParaLineLine, Bisector::Parallel);
                }
                let solve = |r1: f64, r2: f64| {
                    Point::new((n2.y * r1 - n1.y * r2) / det, (-n2.x * r1 + n1.x * r2) / det)
                };
                let bis = Bisector::LineLine {
                    origin: solve(-c1, -c2),
                    dir: solve(1.0, 1.0),
                };
                (EdgeType::LineLine, bis)
            }
        }
    }

    /// Signed position along the bisector relative to its apex (curved kinds only).
    pub fn along(&self, p: &Point) -> Option<f64> {
        match *self {
            Bisector::PointPoint { mid, dir, .. } => Some((p - mid).dot(&dir)),
            Bisector::PointLine { foot, u, .. } => Some((p - foot).dot(&u)),
            _ => None,
        }
    }

    /// Fix the branch so that the curve passes through the edge's end points.
    pub fn oriented(self, src: &Point, trg: &Point) -> Bisector {
        let (Some(a), Some(b)) = (self.along(src), self.along(trg)) else {
            return self;
        };
        let c = if a.abs() >= b.abs() { a } else { b };
        let s = if c < 0.0 { -1.0 } else { 1.0 };
        match self {
            Bisector::PointPoint { mid, dir, half, .. } => Bisector::PointPoint {
                mid,
                dir,
                half,
                sign: s,
            },
            Bisector::PointLine { foot, n, u, d, .. } => Bisector::PointLine {
                foot,
                n,
                u,
                d,
                sign: s,
            },
            other => other,
        }
    }

    /// Apex point and its clearance, for curved kinds.
    pub fn apex(&self) -> Option<(Point, f64)> {
        match *self {
            Bisector::PointPoint { mid, half, .. } => Some((mid, half)),
            Bisector::PointLine { foot, n, d, .. } => Some((foot + n * (0.5 * d), 0.5 * d)),
            _ => None,
        }
    }

    /// Point at clearance `t`; `None` where clearance does not parameterize the edge.
    pub fn point_at(&self, t: f64) -> Option<Point> {
        match *self {
            Bisector::PointPoint {
                mid,
                dir,
                half,
                sign,
            } => Some(mid + dir * (sign * (t * t - half * half).max(0.0).sqrt())),
            Bisector::PointLine {
                foot,
                n,
                u,
                d,
                sign,
            } => Some(foot + n * t + u * (sign * (d * (2.0 * t - d)).max(0.0).sqrt())),
            Bisector::LineLine { origin, dir } | Bisector::Ray { origin, dir } => {
                Some(origin + dir * t)
            }
            Bisector::Parallel | Bisector::Straight => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_point_branches() {
        let a = Site::point(Point::new(-1.0, 0.0));
        let b = Site::point(Point::new(1.0, 0.0));
        let (kind, bis) = Bisector::between(&a, &b);
        assert_eq!(kind, EdgeType::Line);
        let up = bis.oriented(&Point::new(0.0, 1.0), &Point::new(0.0, 2.0));
        let down = bis.oriented(&Point::new(0.0, -1.0), &Point::new(0.0, -2.0));
        let t = 2f64.sqrt();
        assert!((up.point_at(t).unwrap() - Point::new(0.0, 1.0)).norm() < 1e-12);
        assert!((down.point_at(t).unwrap() - Point::new(0.0, -1.0)).norm() < 1e-12);
        assert_eq!(bis.apex(), Some((Point::new(0.0, 0.0), 1.0)));
    }

    #[test]
    fn parabola_points_are_equidistant() {
        let p = Site::point(Point::new(0.0, 1.0));
        let l = Site::line(Point::new(-5.0, 0.0), Point::new(5.0, 0.0), 1.0);
        let (kind, bis) = Bisector::between(&p, &l);
        assert_eq!(kind, EdgeType::Parabola);
        for t in [0.5, 0.7, 1.0, 3.0] {
            for s in [-1.0, 1.0] {
                let q = if s > 0.0 {
                    bis.oriented(&Point::new(1.0, 1.0), &Point::new(2.0, 2.5))
                } else {
                    bis.oriented(&Point::new(-1.0, 1.0), &Point::new(-2.0, 2.5))
                }
                .point_at(t)
                .unwrap();
                assert!((p.distance(&q) - t).abs() < 1e-12);
                assert!((l.distance(&q) - t).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn line_line_and_separator() {
        let l1 = Site::line(Point::new(0.0, 0.0), Point::new(4.0, 0.0), 1.0);
        let l2 = Site::line(Point::new(0.0, 4.0), Point::new(0.0, 0.0), 1.0);
        let (kind, bis) = Bisector::between(&l1, &l2);
        assert_eq!(kind, EdgeType::LineLine);
        let q = bis.point_at(1.0).unwrap();
        assert!((q - Point::new(1.0, 1.0)).norm() < 1e-12);

        let e = Site::point(Point::new(0.0, 0.0));
        let (kind, bis) = Bisector::between(&e, &l1);
        assert_eq!(kind, EdgeType::Separator);
        assert_eq!(bis.point_at(2.0), Some(Point::new(0.0, 2.0)));

        let l3 = Site::line(Point::new(4.0, 2.0), Point::new(0.0, 2.0), 1.0);
        assert_eq!(Bisector::between(&l1, &l3).0, EdgeType::ParaLineLine);
    }
}
