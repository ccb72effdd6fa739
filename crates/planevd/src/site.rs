//! Sites: the point and segment generators of Voronoi faces.
//!
//! A segment `A → B` is represented by two oriented [`LineSite`]s, one per side. The
//! positive site (`k = +1`) owns the face left of `A → B`, the negative site the face on
//! the right. Distances are always to the closed segment.

use crate::point::{Point, PointExt};
use std::fmt;

/// Index into the diagram's site table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteId(pub usize);

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SiteId({})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointSite {
    pub p: Point,
}

/// Oriented segment with line equation `a·x + b·y + c = 0`, `(a, b)` the unit left normal
/// of `start → end`, and side `k ∈ {+1, -1}`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSite {
    pub start: Point,
    pub end: Point,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub k: f64,
}

impl LineSite {
    pub fn new(start: Point, end: Point, k: f64) -> Self {
        let n = (end - start).normalize().rot90();
        Self {
            start,
            end,
            a: n.x,
            b: n.y,
            c: -n.dot(&start),
            k,
        }
    }

    /// Unit normal pointing into this site's face.
    #[inline]
    pub fn side_normal(&self) -> Point {
        Point::new(self.k * self.a, self.k * self.b)
    }

    /// Signed distance to the carrier line, positive on this site's side.
    #[inline]
    pub fn signed_dist(&self, p: &Point) -> f64 {
        self.k * (self.a * p.x + self.b * p.y + self.c)
    }

    /// Unit direction `start → end`.
    #[inline]
    pub fn direction(&self) -> Point {
        (self.end - self.start).normalize()
    }

    #[inline]
    pub fn param(&self, p: &Point) -> f64 {
        p.segment_param(&self.start, &self.end)
    }

    /// True if `p` is exactly one of the two endpoints.
    #[inline]
    pub fn has_endpoint(&self, p: &Point) -> bool {
        *p == self.start || *p == self.end
    }
}

/// Analytic offset primitive handed to offsetting collaborators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ofs {
    Line {
        start: Point,
        end: Point,
    },
    Arc {
        start: Point,
        end: Point,
        center: Point,
        radius: f64,
        /// Clockwise traversal from `start` to `end`.
        cw: bool,
    },
}

impl Ofs {
    pub fn start(&self) -> Point {
        match *self {
            Ofs::Line { start, .. } | Ofs::Arc { start, .. } => start,
        }
    }
    pub fn end(&self) -> Point {
        match *self {
            Ofs::Line { end, .. } | Ofs::Arc { end, .. } => end,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Site {
    Point(PointSite),
    Line(LineSite),
}

impl Site {
    pub fn point(p: Point) -> Self {
        Site::Point(PointSite { p })
    }

    pub fn line(start: Point, end: Point, k: f64) -> Self {
        Site::Line(LineSite::new(start, end, k))
    }

    #[inline]
    pub fn is_line(&self) -> bool {
        matches!(self, Site::Line(_))
    }

    #[inline]
    pub fn is_point(&self) -> bool {
        matches!(self, Site::Point(_))
    }

    pub fn as_point(&self) -> Option<Point> {
        match self {
            Site::Point(ps) => Some(ps.p),
            Site::Line(_) => None,
        }
    }

    pub fn as_line(&self) -> Option<&LineSite> {
        match self {
            Site::Line(ls) => Some(ls),
            Site::Point(_) => None,
        }
    }

    /// Closest point of the site to `p`.
    pub fn apex_point(&self, p: &Point) -> Point {
        match self {
            Site::Point(ps) => ps.p,
            Site::Line(ls) => {
                let t = ls.param(p).clamp(0.0, 1.0);
                ls.start + (ls.end - ls.start) * t
            }
        }
    }

    pub fn distance(&self, p: &Point) -> f64 {
        (p - self.apex_point(p)).norm()
    }

    /// True if `p` projects onto the closed segment (always true for point sites).
    pub fn in_region(&self, p: &Point) -> bool {
        match self {
            Site::Point(_) => true,
            Site::Line(ls) => (0.0..=1.0).contains(&ls.param(p)),
        }
    }

    /// Offset primitive between two points at equal clearance from this site.
    pub fn offset_geometry(&self, start: Point, end: Point) -> Ofs {
        match self {
            Site::Point(ps) => {
                let center = ps.p;
                Ofs::Arc {
                    start,
                    end,
                    center,
                    radius: (start - center).norm(),
                    cw: (start - center).perp(&(end - center)) < 0.0,
                }
            }
            Site::Line(_) => Ofs::Line { start, end },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_site_sides_and_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(2.0, 0.0);
        let pos = LineSite::new(a, b, 1.0);
        let neg = LineSite::new(a, b, -1.0);
        let p = Point::new(1.0, 0.5);
        assert!((pos.signed_dist(&p) - 0.5).abs() < 1e-15);
        assert!((neg.signed_dist(&p) + 0.5).abs() < 1e-15);
        assert_eq!(pos.side_normal(), Point::new(0.0, 1.0));
        let s = Site::Line(pos);
        assert!((s.distance(&Point::new(3.0, 0.0)) - 1.0).abs() < 1e-15);
        assert!(s.in_region(&p));
        assert!(!s.in_region(&Point::new(-0.1, 1.0)));
        assert!(pos.has_endpoint(&b));
    }

    #[test]
    fn offset_geometry_kinds() {
        let s = Site::point(Point::new(0.0, 0.0));
        match s.offset_geometry(Point::new(1.0, 0.0), Point::new(0.0, 1.0)) {
            Ofs::Arc { radius, cw, .. } => {
                assert_eq!(radius, 1.0);
                assert!(!cw);
            }
            other => panic!("expected arc, got {other:?}"),
        }
        let l = Site::line(Point::new(0.0, 0.0), Point::new(1.0, 0.0), 1.0);
        let o = l.offset_geometry(Point::new(0.0, 0.1), Point::new(1.0, 0.1));
        assert!(matches!(o, Ofs::Line { .. }));
        assert_eq!(o.end(), Point::new(1.0, 0.1));
    }
}
