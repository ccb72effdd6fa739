//! 2D points and orientation predicates.
//!
//! Points are plain `nalgebra::Vector2<f64>` values; [`PointExt`] adds the handful of
//! predicates the diagram needs. `Vector2::perp` already gives the 2D cross product.

use crate::numeric::Accumulator;
use nalgebra::Vector2;

pub type Point = Vector2<f64>;

/// Signed doubled area of triangle `(a, b, c)`, summed with an [`Accumulator`].
/// Positive when `c` lies left of the directed line `a → b`.
pub fn orientation(a: &Point, b: &Point, c: &Point) -> f64 {
    let acc = Accumulator::from_terms(&[
        b.x * c.y,
        -b.x * a.y,
        -a.x * c.y,
        -b.y * c.x,
        b.y * a.x,
        a.y * c.x,
    ]);
    acc.sum()
}

pub trait PointExt {
    /// Counter-clockwise rotation by 90°.
    fn rot90(&self) -> Point;
    /// True if `self` lies strictly right of the directed line `a → b`.
    fn is_right(&self, a: &Point, b: &Point) -> bool;
    /// Projection parameter of `self` onto `a → b` (0 at `a`, 1 at `b`).
    fn segment_param(&self, a: &Point, b: &Point) -> f64;
    /// Distance to the closed segment `[a, b]`.
    fn dist_to_segment(&self, a: &Point, b: &Point) -> f64;
}

impl PointExt for Point {
    #[inline]
    fn rot90(&self) -> Point {
        Point::new(-self.y, self.x)
    }

    fn is_right(&self, a: &Point, b: &Point) -> bool {
        orientation(a, b, self) < 0.0
    }

    fn segment_param(&self, a: &Point, b: &Point) -> f64 {
        let d = b - a;
        let l2 = d.norm_squared();
        if l2 == 0.0 {
            return 0.0;
        }
        (self - a).dot(&d) / l2
    }

    fn dist_to_segment(&self, a: &Point, b: &Point) -> f64 {
        let t = self.segment_param(a, b).clamp(0.0, 1.0);
        (self - (a + (b - a) * t)).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_and_is_right() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        assert!(Point::new(0.5, -1.0).is_right(&a, &b));
        assert!(!Point::new(0.5, 1.0).is_right(&a, &b));
        assert!(!Point::new(2.0, 0.0).is_right(&a, &b));
        assert_eq!(orientation(&a, &b, &Point::new(0.3, 2.0)), 2.0);
        // nearly collinear
        let a = Point::new(1.0, 1.0);
        let b = Point::new(2.0, 2.0);
        let c = Point::new(3.0, 3.0 - 1e-12);
        assert!(c.is_right(&a, &b));
    }

    #[test]
    fn segment_distance_and_param() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(2.0, 0.0);
        let p = Point::new(1.0, 3.0);
        assert_eq!(p.segment_param(&a, &b), 0.5);
        assert_eq!(p.dist_to_segment(&a, &b), 3.0);
        let q = Point::new(-3.0, 4.0);
        assert_eq!(q.dist_to_segment(&a, &b), 5.0);
        assert_eq!(Point::new(1.0, 0.0).rot90(), Point::new(0.0, 1.0));
    }
}
